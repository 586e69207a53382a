use std::pin::Pin;
use std::task::{Context, Poll, ready};

use callrx_core::{CallError, Response};
use futures::Stream;
use pin_project_lite::pin_project;

pin_project! {
    /// Unwraps response bodies, escalating unsuccessful responses.
    ///
    /// - A successful response yields its body.
    /// - An unsuccessful response yields [`CallError::Http`] and terminates
    ///   the stream; whatever the upstream reports afterwards is withheld.
    /// - Upstream errors and completion pass through unless the stream has
    ///   already terminated.
    pub struct BodyStream<S> {
        #[pin]
        upstream: S,
        terminated: bool,
    }
}

impl<S> BodyStream<S> {
    pub fn new(upstream: S) -> Self {
        Self {
            upstream,
            terminated: false,
        }
    }

    pub fn into_inner(self) -> S {
        self.upstream
    }
}

impl<S, T> Stream for BodyStream<S>
where
    S: Stream<Item = Result<Response<T>, CallError>>,
{
    type Item = Result<T, CallError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.terminated {
            return Poll::Ready(None);
        }

        match ready!(this.upstream.poll_next(cx)) {
            Some(Ok(response)) => match response.into_result() {
                Ok(body) => Poll::Ready(Some(Ok(body))),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(code = err.code(), "escalating unsuccessful response");
                    *this.terminated = true;
                    Poll::Ready(Some(Err(CallError::Http(err))))
                }
            },
            Some(Err(err)) => {
                *this.terminated = true;
                Poll::Ready(Some(Err(err)))
            }
            None => {
                *this.terminated = true;
                Poll::Ready(None)
            }
        }
    }
}
