use std::error::Error as StdError;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use callrx_core::{Call, CallError, Callback, Outcome, Response, TransportError};
use http_body_util::{BodyExt, Full};
use hyper::ext::ReasonPhrase;
use tokio::runtime::Handle;
use tokio::sync::Notify;

use super::converter::Converter;
use super::hyper::HyperClient;

/// One HTTP request, runnable once.
///
/// Enqueueing spawns the request on the transport's runtime. The response
/// body is buffered in full before the outcome is reported, so the callback
/// sees either a complete [`Response`] or a [`TransportError`].
pub struct HyperCall<T> {
    client: HyperClient,
    handle: Handle,
    request: Mutex<Option<http::Request<Bytes>>>,
    converter: Arc<dyn Converter<T>>,
    executed: AtomicBool,
    canceled: Arc<AtomicBool>,
    cancel: Arc<Notify>,
}

impl<T: Send + 'static> HyperCall<T> {
    pub(crate) fn new(
        client: HyperClient,
        handle: Handle,
        request: http::Request<Bytes>,
        converter: Arc<dyn Converter<T>>,
    ) -> Self {
        Self {
            client,
            handle,
            request: Mutex::new(Some(request)),
            converter,
            executed: AtomicBool::new(false),
            canceled: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(Notify::new()),
        }
    }
}

impl<T> std::fmt::Debug for HyperCall<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperCall")
            .field("executed", &self.executed.load(Ordering::Acquire))
            .field("canceled", &self.canceled.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Call for HyperCall<T> {
    type Body = T;

    fn enqueue(&self, callback: Callback<T>) -> Result<(), CallError> {
        if self.executed.swap(true, Ordering::AcqRel) {
            return Err(CallError::already_executed());
        }
        let request = self
            .request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(CallError::already_executed)?;

        let client = self.client.clone();
        let converter = self.converter.clone();
        let canceled = self.canceled.clone();
        let cancel = self.cancel.clone();

        #[cfg(feature = "tracing")]
        tracing::debug!(method = %request.method(), uri = %request.uri(), "sending request");

        self.handle.spawn(async move {
            let outcome = if canceled.load(Ordering::Acquire) {
                Err(TransportError::Canceled)
            } else {
                tokio::select! {
                    _ = cancel.notified() => Err(TransportError::Canceled),
                    outcome = execute(client, request, converter) => outcome,
                }
            };

            #[cfg(feature = "tracing")]
            match &outcome {
                Ok(response) => tracing::debug!(status = response.code(), "request finished"),
                Err(err) => tracing::debug!(error = %err, "request failed"),
            }

            callback(outcome);
        });
        Ok(())
    }

    fn cancel(&self) {
        if !self.canceled.swap(true, Ordering::AcqRel) {
            // Stores a permit if the request task is not waiting yet.
            self.cancel.notify_one();
        }
    }

    fn is_executed(&self) -> bool {
        self.executed.load(Ordering::Acquire)
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}

async fn execute<T: Send + 'static>(
    client: HyperClient,
    request: http::Request<Bytes>,
    converter: Arc<dyn Converter<T>>,
) -> Outcome<T> {
    let response = client
        .request(request.map(Full::new))
        .await
        .map_err(request_error)?;

    let (parts, body) = response.into_parts();
    let bytes = body
        .collect()
        .await
        .map_err(|e| body_error(&e))?
        .to_bytes();

    let reason = parts
        .extensions
        .get::<ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .map(str::to_owned);

    let response = if parts.status.is_success() {
        Response::success_with_status(parts.status, converter.convert(bytes)?)
    } else {
        Response::error(parts.status, bytes)
    };
    let response = response
        .map_err(|e| TransportError::Decode(e.to_string()))?
        .with_headers(parts.headers);

    Ok(match reason {
        Some(reason) => response.with_reason(reason),
        None => response,
    })
}

fn request_error(err: hyper_util::client::legacy::Error) -> TransportError {
    if err.is_connect() {
        return TransportError::Connect(err.to_string());
    }
    body_error(&err)
}

/// Prefer the kind of an underlying I/O error; a peer that hangs up
/// mid-message has none, so report it as an unexpected EOF.
fn body_error(err: &(dyn StdError + 'static)) -> TransportError {
    let mut source = Some(err);
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<io::Error>() {
            return TransportError::io(io.kind(), err.to_string());
        }
        source = current.source();
    }
    TransportError::io(io::ErrorKind::UnexpectedEof, err.to_string())
}
