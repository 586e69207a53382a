//! Non-escalating outcome wrapper.

use crate::error::{CallError, TransportError};
use crate::response::Response;

/// The outcome of a call as a single value.
///
/// Result-shaped adapters never fail with a transport error or an HTTP
/// error. Instead, every outcome is delivered as one `CallResult` followed by
/// normal completion:
///
/// - [`CallResult::Response`] when the server answered, successfully or not
/// - [`CallResult::Error`] when no response was obtained
///
/// Accessing the variant that is not present returns
/// [`CallError::IllegalState`].
#[derive(Debug, Clone)]
pub enum CallResult<T> {
    /// The transport succeeded; the response itself may be unsuccessful.
    Response(Response<T>),
    /// The call never produced a response.
    Error(TransportError),
}

impl<T> CallResult<T> {
    /// Wrap a received response.
    pub fn from_response(response: Response<T>) -> Self {
        CallResult::Response(response)
    }

    /// Wrap a transport failure.
    pub fn from_error(error: TransportError) -> Self {
        CallResult::Error(error)
    }

    /// Returns true if the call never produced a response.
    pub fn is_error(&self) -> bool {
        matches!(self, CallResult::Error(_))
    }

    /// The response, or `IllegalState` for an error result.
    pub fn response(&self) -> Result<&Response<T>, CallError> {
        match self {
            CallResult::Response(response) => Ok(response),
            CallResult::Error(_) => Err(CallError::illegal_state(
                "error result has no response",
            )),
        }
    }

    /// The transport error, or `IllegalState` for a response result.
    pub fn error(&self) -> Result<&TransportError, CallError> {
        match self {
            CallResult::Error(error) => Ok(error),
            CallResult::Response(_) => Err(CallError::illegal_state(
                "response result has no error",
            )),
        }
    }

    /// Consume the result and return the response.
    pub fn into_response(self) -> Result<Response<T>, CallError> {
        match self {
            CallResult::Response(response) => Ok(response),
            CallResult::Error(_) => Err(CallError::illegal_state(
                "error result has no response",
            )),
        }
    }

    /// Consume the result and return the transport error.
    pub fn into_error(self) -> Result<TransportError, CallError> {
        match self {
            CallResult::Error(error) => Ok(error),
            CallResult::Response(_) => Err(CallError::illegal_state(
                "response result has no error",
            )),
        }
    }
}

impl<T> From<Response<T>> for CallResult<T> {
    fn from(response: Response<T>) -> Self {
        CallResult::Response(response)
    }
}

impl<T> From<TransportError> for CallResult<T> {
    fn from(error: TransportError) -> Self {
        CallResult::Error(error)
    }
}
