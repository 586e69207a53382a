//! The outcome of a call that reached the server.
//!
//! This module provides [`Response`], which carries the status of a completed
//! HTTP exchange along with either a converted body (2xx) or the raw error body.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::error::{CallError, HttpError};

#[derive(Debug, Clone)]
enum Payload<T> {
    Body(T),
    Error(Bytes),
}

/// An HTTP response received without transport failure.
///
/// A response is either successful, in which case it holds a body of type
/// `T`, or unsuccessful, in which case it holds the raw error body. The
/// constructors enforce that successful responses have a 2xx status and
/// error responses a status of 400 or above.
///
/// # Example
///
/// ```
/// use callrx_core::Response;
/// use http::StatusCode;
///
/// let ok = Response::success("Hi".to_string());
/// assert!(ok.is_successful());
/// assert_eq!(ok.body().map(String::as_str), Some("Hi"));
///
/// let missing = Response::<String>::error(StatusCode::NOT_FOUND, "gone").unwrap();
/// assert!(!missing.is_successful());
/// assert_eq!(missing.reason(), "Not Found");
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    status: StatusCode,
    reason: Option<String>,
    headers: HeaderMap,
    payload: Payload<T>,
}

impl<T> Response<T> {
    /// Create a successful `200 OK` response.
    pub fn success(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            reason: None,
            headers: HeaderMap::new(),
            payload: Payload::Body(body),
        }
    }

    /// Create a successful response with an explicit 2xx status.
    pub fn success_with_status(status: StatusCode, body: T) -> Result<Self, CallError> {
        if !status.is_success() {
            return Err(CallError::illegal_argument(format!(
                "status must be 2xx for a successful response: {}",
                status.as_u16()
            )));
        }
        Ok(Self {
            status,
            reason: None,
            headers: HeaderMap::new(),
            payload: Payload::Body(body),
        })
    }

    /// Create an unsuccessful response with the raw error body.
    pub fn error(status: StatusCode, error_body: impl Into<Bytes>) -> Result<Self, CallError> {
        if status.as_u16() < 400 {
            return Err(CallError::illegal_argument(format!(
                "status must be >= 400 for an error response: {}",
                status.as_u16()
            )));
        }
        Ok(Self {
            status,
            reason: None,
            headers: HeaderMap::new(),
            payload: Payload::Error(error_body.into()),
        })
    }

    /// Set the reason phrase sent by the server.
    pub fn with_reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the response headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// The HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The numeric HTTP status code.
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    /// The reason phrase.
    ///
    /// Falls back to the canonical reason for the status when the server
    /// did not send one.
    pub fn reason(&self) -> &str {
        match &self.reason {
            Some(reason) => reason,
            None => self.status.canonical_reason().unwrap_or(""),
        }
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns true if the status is 2xx.
    pub fn is_successful(&self) -> bool {
        matches!(self.payload, Payload::Body(_))
    }

    /// The converted body of a successful response.
    pub fn body(&self) -> Option<&T> {
        match &self.payload {
            Payload::Body(body) => Some(body),
            Payload::Error(_) => None,
        }
    }

    /// Consume the response and return the body of a successful response.
    pub fn into_body(self) -> Option<T> {
        match self.payload {
            Payload::Body(body) => Some(body),
            Payload::Error(_) => None,
        }
    }

    /// The raw error body of an unsuccessful response.
    pub fn error_body(&self) -> Option<&Bytes> {
        match &self.payload {
            Payload::Body(_) => None,
            Payload::Error(bytes) => Some(bytes),
        }
    }

    /// Unwrap the body, turning an unsuccessful response into an [`HttpError`].
    pub fn into_result(self) -> Result<T, HttpError> {
        match self.payload {
            Payload::Body(body) => Ok(body),
            Payload::Error(bytes) => {
                let reason = self.reason.unwrap_or_else(|| {
                    self.status.canonical_reason().unwrap_or("").to_string()
                });
                Err(HttpError::new(
                    self.status.as_u16(),
                    reason,
                    self.headers,
                    Some(bytes),
                ))
            }
        }
    }

    /// Transform the body, preserving status, reason and headers.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            status: self.status,
            reason: self.reason,
            headers: self.headers,
            payload: match self.payload {
                Payload::Body(body) => Payload::Body(f(body)),
                Payload::Error(bytes) => Payload::Error(bytes),
            },
        }
    }
}
