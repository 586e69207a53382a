use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use callrx_core::CallError;
use futures::StreamExt;

use crate::subscription::Subscription;

/// Collapse a stream into at most one value.
///
/// Waits for the terminal event so that a second value is reported as
/// [`CallError::MultipleElements`] rather than silently truncated.
fn poll_at_most_one<T>(
    stream: &mut Subscription<T>,
    slot: &mut Option<T>,
    cx: &mut Context<'_>,
) -> Poll<Result<Option<T>, CallError>> {
    loop {
        match ready!(stream.poll_next_unpin(cx)) {
            Some(Ok(value)) => {
                if slot.is_some() {
                    stream.dispose();
                    return Poll::Ready(Err(CallError::MultipleElements));
                }
                *slot = Some(value);
            }
            Some(Err(err)) => return Poll::Ready(Err(err)),
            None => return Poll::Ready(Ok(slot.take())),
        }
    }
}

/// Resolves to the only value of the adapted call.
///
/// - an error before any value resolves to that error
/// - an empty stream resolves to [`CallError::NoElement`]
/// - a second value resolves to [`CallError::MultipleElements`]
///
/// Dropping the future cancels the call.
#[must_use = "futures do nothing unless polled"]
pub struct SingleFuture<T> {
    stream: Subscription<T>,
    value: Option<T>,
}

impl<T> SingleFuture<T> {
    pub(crate) fn new(stream: Subscription<T>) -> Self {
        Self {
            stream,
            value: None,
        }
    }
}

impl<T> Future for SingleFuture<T> {
    type Output = Result<T, CallError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let value = ready!(poll_at_most_one(&mut this.stream, &mut this.value, cx))?;
        Poll::Ready(value.ok_or(CallError::NoElement))
    }
}

impl<T> Unpin for SingleFuture<T> {}

/// Resolves to the value of the adapted call, if there is one.
///
/// An empty stream resolves to `Ok(None)`. Errors and a second value are
/// reported as for [`SingleFuture`].
#[must_use = "futures do nothing unless polled"]
pub struct MaybeFuture<T> {
    stream: Subscription<T>,
    value: Option<T>,
}

impl<T> MaybeFuture<T> {
    pub(crate) fn new(stream: Subscription<T>) -> Self {
        Self {
            stream,
            value: None,
        }
    }
}

impl<T> Future for MaybeFuture<T> {
    type Output = Result<Option<T>, CallError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        poll_at_most_one(&mut this.stream, &mut this.value, cx)
    }
}

impl<T> Unpin for MaybeFuture<T> {}

/// Resolves when the adapted call terminates, discarding any value.
#[must_use = "futures do nothing unless polled"]
pub struct CompletableFuture {
    stream: Subscription<()>,
}

impl CompletableFuture {
    pub(crate) fn new(stream: Subscription<()>) -> Self {
        Self { stream }
    }
}

impl Future for CompletableFuture {
    type Output = Result<(), CallError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            match ready!(self.stream.poll_next_unpin(cx)) {
                Some(Ok(())) => continue,
                Some(Err(err)) => return Poll::Ready(Err(err)),
                None => return Poll::Ready(Ok(())),
            }
        }
    }
}
