//! The asynchronous call abstraction consumed by the adapters.

use std::sync::Arc;

use crate::error::{CallError, TransportError};
use crate::response::Response;

/// What a call reports when it finishes: a response or a transport failure.
pub type Outcome<T> = Result<Response<T>, TransportError>;

/// Completion callback handed to [`Call::enqueue`].
pub type Callback<T> = Box<dyn FnOnce(Outcome<T>) + Send + 'static>;

/// A single-use asynchronous request handle.
///
/// Implementations run the request on their own executor and invoke the
/// callback exactly once with the outcome. A call can be enqueued at most
/// once; a second `enqueue` must fail with [`CallError::IllegalState`]
/// without running the request again.
///
/// `cancel` is cooperative: it may be called at any time, from any thread,
/// and a call that is still in flight should complete with
/// [`TransportError::Canceled`] or drop its callback.
pub trait Call: Send + Sync + 'static {
    /// The converted body type of a successful response.
    type Body: Send + 'static;

    /// Start the call and report its outcome to `callback`.
    fn enqueue(&self, callback: Callback<Self::Body>) -> Result<(), CallError>;

    /// Request cancellation of the call.
    fn cancel(&self);

    /// Returns true once the call has been enqueued.
    fn is_executed(&self) -> bool;

    /// Returns true once cancellation was requested.
    fn is_canceled(&self) -> bool;
}

impl<C: Call + ?Sized> Call for Arc<C> {
    type Body = C::Body;

    fn enqueue(&self, callback: Callback<Self::Body>) -> Result<(), CallError> {
        (**self).enqueue(callback)
    }

    fn cancel(&self) {
        (**self).cancel()
    }

    fn is_executed(&self) -> bool {
        (**self).is_executed()
    }

    fn is_canceled(&self) -> bool {
        (**self).is_canceled()
    }
}

impl<C: Call + ?Sized> Call for Box<C> {
    type Body = C::Body;

    fn enqueue(&self, callback: Callback<Self::Body>) -> Result<(), CallError> {
        (**self).enqueue(callback)
    }

    fn cancel(&self) {
        (**self).cancel()
    }

    fn is_executed(&self) -> bool {
        (**self).is_executed()
    }

    fn is_canceled(&self) -> bool {
        (**self).is_canceled()
    }
}
