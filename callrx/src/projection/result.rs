use std::pin::Pin;
use std::task::{Context, Poll, ready};

use callrx_core::{CallError, CallResult, Response};
use futures::Stream;
use pin_project_lite::pin_project;

pin_project! {
    /// Wraps every outcome into a [`CallResult`] value.
    ///
    /// Responses become [`CallResult::Response`] whether or not they are
    /// successful. A transport error becomes [`CallResult::Error`] followed
    /// by normal completion.
    ///
    /// A result stream can still fail. Errors that are not transport
    /// failures, such as [`CallError::IllegalState`] from subscribing an
    /// executed call, are not outcomes of the call and pass through as
    /// stream errors.
    pub struct ResultStream<S> {
        #[pin]
        upstream: S,
        terminated: bool,
    }
}

impl<S> ResultStream<S> {
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

impl<S, T> Stream for ResultStream<S>
where
    S: Stream<Item = Result<Response<T>, CallError>>,
{
    type Item = Result<CallResult<T>, CallError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.terminated {
            return Poll::Ready(None);
        }

        match ready!(this.upstream.poll_next(cx)) {
            Some(Ok(response)) => Poll::Ready(Some(Ok(CallResult::Response(response)))),
            Some(Err(CallError::Transport(err))) => {
                // Completion is synthesized on the next poll.
                *this.terminated = true;
                Poll::Ready(Some(Ok(CallResult::Error(err))))
            }
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
