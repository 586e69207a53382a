//! A hyper-backed [`Call`](callrx_core::Call) implementation.
//!
//! [`HyperTransport`] owns a pooled hyper_util legacy client and the runtime
//! its calls run on. Each [`HyperCall`] sends one request, buffers the
//! response body and reports the outcome to the adapter.
//!
//! Successful bodies are turned into values by a [`Converter`]. Unsuccessful
//! bodies are kept as raw bytes on the [`Response`](callrx_core::Response).
//!
//! # Example
//!
//! ```ignore
//! use callrx::RxCallAdapterFactory;
//! use callrx::transport::{HyperTransport, StringConverter};
//!
//! let transport = HyperTransport::new()?;
//! let call = transport.get("http://localhost:8080/greeting", StringConverter)?;
//!
//! let greeting = RxCallAdapterFactory::create().body(call).into_single().await?;
//! ```

mod call;
mod converter;
mod hyper;

pub use call::HyperCall;
pub use converter::{BytesConverter, Converter, JsonConverter, StringConverter, UnitConverter};
pub use self::hyper::{HyperTransport, HyperTransportBuilder, TransportBuildError};
