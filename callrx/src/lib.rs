//! Adapt single-use HTTP calls into reactive shapes.
//!
//! This crate turns a [`Call`], an HTTP request that runs at most once and
//! reports its outcome through a callback, into one of five shapes:
//!
//! - [`Observable`]: a plain [`Stream`](futures::Stream) of values
//! - [`Flowable`]: a stream that keeps only the latest undelivered value
//! - [`Single`]: a future resolving to exactly one value
//! - [`Maybe`]: a future resolving to zero or one value
//! - [`Completable`]: a future resolving on completion only
//!
//! What the shape carries depends on the projection chosen on the
//! [`RxCallAdapterFactory`]: the raw [`Response`], only the body, or a
//! [`CallResult`] that never fails.
//!
//! ## Example
//!
//! ```ignore
//! use callrx::RxCallAdapterFactory;
//! use callrx::transport::{HyperTransport, StringConverter};
//!
//! let transport = HyperTransport::new()?;
//! let factory = RxCallAdapterFactory::create();
//!
//! // Body projection: a 404 fails with CallError::Http.
//! let call = transport.get("http://localhost:8080/greeting", StringConverter)?;
//! let greeting = factory.body(call).into_single().await?;
//!
//! // Result projection: transport failures become values.
//! let call = transport.get("http://localhost:8080/greeting", StringConverter)?;
//! let result = factory.result(call).into_single().await?;
//! match result {
//!     CallResult::Response(response) => println!("HTTP {}", response.code()),
//!     CallResult::Error(err) => eprintln!("no response: {err}"),
//! }
//! ```
//!
//! ## Stream Example
//!
//! ```ignore
//! use futures::StreamExt;
//!
//! let observable = factory.response(call).into_observable();
//! let mut subscription = observable.subscribe();
//! while let Some(item) = subscription.next().await {
//!     match item {
//!         Ok(response) if response.is_successful() => println!("ok"),
//!         Ok(response) => println!("HTTP {} {}", response.code(), response.reason()),
//!         Err(e) => eprintln!("failed: {e}"),
//!     }
//! }
//! ```
//!
//! ## Cancellation
//!
//! Every subscription owns a [`Disposable`]. Disposing it, or dropping the
//! subscription or future before it terminates, cancels the in-flight
//! call. After disposal nothing else is delivered, even if the call races
//! to completion.
//!
//! Shapes are cold: each subscription runs the call again. Calls are
//! single-use, so a second subscription fails with
//! [`CallError::IllegalState`] instead of sending a second request.
//!
//! ## Scheduling
//!
//! By default the call is started on the subscriber's task. A factory built
//! with a runtime [`Handle`](tokio::runtime::Handle) subscribes on that
//! runtime instead:
//!
//! ```ignore
//! let factory = RxCallAdapterFactory::builder()
//!     .scheduler(runtime.handle().clone())
//!     .build();
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Emit `tracing` events for subscriptions, cancellation and requests |

mod adapter;
mod bridge;
mod disposable;
mod scheduler;
mod shape;
mod source;
mod subscription;

pub mod projection;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use adapter::{Adaptation, FactoryBuilder, RxCallAdapterFactory};
pub use bridge::CallStream;
pub use disposable::Disposable;
pub use scheduler::SubscribeOn;
pub use shape::{
    Adapted, Completable, CompletableFuture, Flowable, Latest, Maybe, MaybeFuture, Observable,
    ReturnShape, Single, SingleFuture,
};
pub use source::{BodySource, CallSource, EventStream, ResultSource, Source};
pub use subscription::Subscription;

// Re-export core types
pub use callrx_core::*;
