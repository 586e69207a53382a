//! Consumer side of a stream-shaped adaptation.

use std::pin::Pin;
use std::task::{Context, Poll};

use callrx_core::CallError;
use futures::Stream;

use crate::disposable::Disposable;
use crate::source::EventStream;

/// One active subscription to an adapted call.
///
/// A `Subscription` is a [`Stream`] of `Result<T, CallError>`. An `Err`
/// item is the terminal error; the stream ending without one is normal
/// completion.
///
/// # Cancellation
///
/// Call [`dispose`](Self::dispose) (or dispose a handle obtained from
/// [`disposable`](Self::disposable)) to cancel the underlying call. After
/// disposal the stream ends without emitting anything else, even if the
/// call races to completion. Dropping a subscription that has not
/// terminated disposes it.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
///
/// let mut subscription = observable.subscribe();
/// while let Some(item) = subscription.next().await {
///     match item {
///         Ok(body) => println!("got {body}"),
///         Err(e) => eprintln!("failed: {e}"),
///     }
/// }
/// ```
pub struct Subscription<T> {
    inner: EventStream<T>,
    disposable: Disposable,
    terminated: bool,
}

impl<T> Subscription<T> {
    pub(crate) fn new(inner: EventStream<T>, disposable: Disposable) -> Self {
        Self {
            inner,
            disposable,
            terminated: false,
        }
    }

    /// Get a handle that disposes this subscription.
    pub fn disposable(&self) -> Disposable {
        self.disposable.clone()
    }

    /// Dispose this subscription, canceling the call if it is in flight.
    pub fn dispose(&self) {
        self.disposable.dispose();
    }

    /// Returns true once this subscription has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposable.is_disposed()
    }

    /// Returns true once a terminal event has been delivered.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Result<T, CallError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.terminated || this.disposable.is_disposed() {
            return Poll::Ready(None);
        }
        this.disposable.register(cx.waker());

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(value))) => {
                if this.disposable.is_disposed() {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("suppressing value after dispose");
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(Ok(value)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.terminated = true;
                if this.disposable.is_disposed() {
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.terminated = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if !self.terminated {
            self.disposable.dispose();
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.disposable.is_disposed())
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures::channel::mpsc;

    #[tokio::test]
    async fn test_error_is_terminal() {
        let events = futures::stream::iter(vec![
            Err(CallError::already_executed()),
            Ok("late"),
        ])
        .boxed();
        let mut subscription = Subscription::new(events, Disposable::new());

        assert!(subscription.next().await.unwrap().is_err());
        assert!(subscription.is_terminated());
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dispose_wakes_pending_consumer() {
        let (tx, rx) = mpsc::unbounded::<Result<&str, CallError>>();
        let mut subscription = Subscription::new(rx.boxed(), Disposable::new());
        let disposable = subscription.disposable();

        let consumer = tokio::spawn(async move { subscription.next().await.is_none() });
        tokio::task::yield_now().await;

        disposable.dispose();
        assert!(consumer.await.unwrap());

        // The upstream may still push; nobody sees it.
        let _ = tx.unbounded_send(Ok("late"));
    }

    #[test]
    fn test_drop_disposes_unless_terminated() {
        let disposable = Disposable::new();
        let subscription = Subscription::new(
            futures::stream::empty::<Result<(), CallError>>().boxed(),
            disposable.clone(),
        );
        drop(subscription);
        assert!(disposable.is_disposed());

        let disposable = Disposable::new();
        let mut subscription = Subscription::new(
            futures::stream::empty::<Result<(), CallError>>().boxed(),
            disposable.clone(),
        );
        assert!(futures::executor::block_on(subscription.next()).is_none());
        drop(subscription);
        assert!(!disposable.is_disposed());
    }
}
