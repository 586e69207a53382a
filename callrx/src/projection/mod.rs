//! Projections of the bridge's response stream.
//!
//! - [`BodyStream`]: unwrap bodies, turning unsuccessful responses into
//!   stream errors
//! - [`ResultStream`]: wrap every outcome into a [`CallResult`] value and
//!   never fail with an HTTP or transport error
//!
//! [`CallResult`]: callrx_core::CallResult

mod body;
mod result;

pub use body::BodyStream;
pub use result::ResultStream;
