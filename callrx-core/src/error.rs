//! Error types for adapted calls.
//!
//! This module provides the three failure families a subscriber can observe:
//! - [`TransportError`]: the call never produced a response
//! - [`HttpError`]: a response arrived but its status was unsuccessful
//! - [`CallError`]: the error carried by every adapted stream

use std::io;

use bytes::Bytes;
use http::HeaderMap;

use crate::response::Response;

/// Failure to obtain any response at all.
///
/// Transport errors cover I/O failures, connection failures, cancellation
/// and body conversion failures. They are surfaced as stream errors in
/// response and body shapes and wrapped as values in result shapes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// An I/O error while sending the request or reading the response.
    #[error("I/O error: {message}")]
    Io { kind: io::ErrorKind, message: String },

    /// The connection could not be established.
    #[error("connect error: {0}")]
    Connect(String),

    /// The call was canceled before it produced a response.
    #[error("canceled")]
    Canceled,

    /// The request could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The response body could not be converted.
    #[error("decode error: {0}")]
    Decode(String),
}

impl TransportError {
    /// Create an I/O error of the given kind.
    pub fn io<S: Into<String>>(kind: io::ErrorKind, message: S) -> Self {
        TransportError::Io {
            kind,
            message: message.into(),
        }
    }

    /// Returns true if the call was canceled.
    pub fn is_canceled(&self) -> bool {
        matches!(self, TransportError::Canceled)
    }

    /// Get the I/O error kind, if this is an I/O error.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            TransportError::Io { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        TransportError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// A response was received but its status indicates failure.
///
/// Produced by the unwrap-body projection in place of the raw response.
/// It keeps the status, reason, headers and raw error body of the response.
#[derive(Clone, Debug, thiserror::Error)]
#[error("HTTP {code} {reason}")]
pub struct HttpError {
    code: u16,
    reason: String,
    headers: HeaderMap,
    error_body: Option<Bytes>,
}

impl HttpError {
    pub(crate) fn new(
        code: u16,
        reason: String,
        headers: HeaderMap,
        error_body: Option<Bytes>,
    ) -> Self {
        Self {
            code,
            reason,
            headers,
            error_body,
        }
    }

    /// Build an HTTP error from an unsuccessful response.
    pub fn from_response<T>(response: &Response<T>) -> Self {
        Self::new(
            response.code(),
            response.reason().to_string(),
            response.headers().clone(),
            response.error_body().cloned(),
        )
    }

    /// The HTTP status code.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The HTTP reason phrase.
    pub fn message(&self) -> &str {
        &self.reason
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw error body, if the response carried one.
    pub fn error_body(&self) -> Option<&Bytes> {
        self.error_body.as_ref()
    }
}

/// Error delivered by adapted streams and futures.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CallError {
    /// An unsuccessful HTTP outcome, escalated by a body shape.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The call never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The adapter or call was misused (e.g. subscribing an executed call).
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A value was constructed from invalid input.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// A single-value shape completed without a value.
    #[error("sequence completed without a value")]
    NoElement,

    /// A single-value or optional-value shape saw more than one value.
    #[error("sequence emitted more than one value")]
    MultipleElements,
}

impl CallError {
    /// Create an illegal state error.
    pub fn illegal_state<S: Into<String>>(message: S) -> Self {
        CallError::IllegalState(message.into())
    }

    /// Create an illegal argument error.
    pub fn illegal_argument<S: Into<String>>(message: S) -> Self {
        CallError::IllegalArgument(message.into())
    }

    /// The error reported when a single-use call is subscribed twice.
    pub fn already_executed() -> Self {
        CallError::IllegalState("Already executed".to_string())
    }

    /// Returns true for an escalated HTTP outcome.
    pub fn is_http(&self) -> bool {
        matches!(self, CallError::Http(_))
    }

    /// Returns true for a transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_))
    }

    /// Returns true for adapter or call misuse.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, CallError::IllegalState(_))
    }

    /// Get the HTTP error, if this is one.
    pub fn http(&self) -> Option<&HttpError> {
        match self {
            CallError::Http(err) => Some(err),
            _ => None,
        }
    }

    /// Get the transport error, if this is one.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            CallError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_http_error_display() {
        let response = Response::<String>::error(StatusCode::NOT_FOUND, "Hi")
            .unwrap()
            .with_reason("Client Error");
        let err = HttpError::from_response(&response);
        assert_eq!(err.to_string(), "HTTP 404 Client Error");
        assert_eq!(err.code(), 404);
        assert_eq!(err.message(), "Client Error");
        assert_eq!(err.error_body().unwrap().as_ref(), b"Hi");
    }

    #[test]
    fn test_http_error_canonical_reason() {
        let response = Response::<String>::error(StatusCode::SERVICE_UNAVAILABLE, "").unwrap();
        let err = HttpError::from_response(&response);
        assert_eq!(err.to_string(), "HTTP 503 Service Unavailable");
    }

    #[test]
    fn test_transport_error_from_io() {
        let io = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset");
        let err = TransportError::from(io);
        assert_eq!(err.io_kind(), Some(io::ErrorKind::ConnectionReset));
        assert!(!err.is_canceled());
        assert!(TransportError::Canceled.is_canceled());
    }

    #[test]
    fn test_call_error_predicates() {
        let err = CallError::from(TransportError::Canceled);
        assert!(err.is_transport());
        assert!(!err.is_http());
        assert_eq!(err.transport(), Some(&TransportError::Canceled));

        let err = CallError::already_executed();
        assert!(err.is_illegal_state());
        assert_eq!(err.to_string(), "illegal state: Already executed");
        assert!(err.http().is_none());
    }

    #[test]
    fn test_call_error_transparent_display() {
        let err = CallError::from(TransportError::Decode("bad json".into()));
        assert_eq!(err.to_string(), "decode error: bad json");
    }
}
