use std::pin::Pin;
use std::task::{Context, Poll};

use callrx_core::CallError;
use futures::Stream;
use pin_project_lite::pin_project;

/// Upper bound on upstream items drained by one poll, so that an upstream
/// that is always ready cannot starve the consumer.
const DRAIN_BUDGET: usize = 64;

pin_project! {
    /// Latest-wins backpressure.
    ///
    /// The consumer expresses demand by polling. On each poll every item the
    /// upstream already has ready is drained and only the newest value is
    /// kept; older undelivered values are dropped, not queued. A terminal
    /// error or completion that arrives while a value is pending is
    /// delivered after that value.
    pub struct Latest<S, T> {
        #[pin]
        upstream: S,
        pending: Option<T>,
        error: Option<CallError>,
        upstream_done: bool,
        dropped: u64,
    }
}

impl<S, T> Latest<S, T> {
    pub fn new(upstream: S) -> Self {
        Self {
            upstream,
            pending: None,
            error: None,
            upstream_done: false,
            dropped: 0,
        }
    }

    /// Get a reference to the upstream.
    pub fn get_ref(&self) -> &S {
        &self.upstream
    }

    /// Number of values replaced by a newer one before delivery.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl<S, T> Stream for Latest<S, T>
where
    S: Stream<Item = Result<T, CallError>>,
{
    type Item = Result<T, CallError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        let mut budget = DRAIN_BUDGET;
        while !*this.upstream_done && budget > 0 {
            budget -= 1;
            match this.upstream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(value))) => {
                    if this.pending.replace(value).is_some() {
                        *this.dropped += 1;
                        #[cfg(feature = "tracing")]
                        tracing::trace!("dropping undelivered value for a newer one");
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    *this.error = Some(err);
                    *this.upstream_done = true;
                }
                Poll::Ready(None) => *this.upstream_done = true,
                Poll::Pending => break,
            }
        }

        if let Some(value) = this.pending.take() {
            return Poll::Ready(Some(Ok(value)));
        }
        if *this.upstream_done {
            return Poll::Ready(this.error.take().map(Err));
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callrx_core::TransportError;
    use futures::StreamExt;
    use futures::channel::mpsc;
    use futures::stream;

    #[tokio::test]
    async fn test_keeps_only_latest_ready_value() {
        let (tx, rx) = mpsc::unbounded::<Result<i32, CallError>>();
        let mut latest = Latest::new(rx);

        tx.unbounded_send(Ok(1)).unwrap();
        tx.unbounded_send(Ok(2)).unwrap();
        tx.unbounded_send(Ok(3)).unwrap();

        assert_eq!(latest.next().await.unwrap().unwrap(), 3);
        assert_eq!(latest.dropped(), 2);

        tx.unbounded_send(Ok(4)).unwrap();
        drop(tx);
        assert_eq!(latest.next().await.unwrap().unwrap(), 4);
        assert!(latest.next().await.is_none());
    }

    #[tokio::test]
    async fn test_value_delivered_before_error() {
        let upstream = stream::iter(vec![
            Ok("Hi"),
            Err(CallError::from(TransportError::Canceled)),
        ]);
        let mut latest = Latest::new(upstream);

        assert_eq!(latest.next().await.unwrap().unwrap(), "Hi");
        assert!(latest.next().await.unwrap().unwrap_err().is_transport());
        assert!(latest.next().await.is_none());
    }

    #[tokio::test]
    async fn test_single_value_then_completion() {
        let mut latest = Latest::new(stream::iter(vec![Ok::<_, CallError>("Hi")]));
        assert_eq!(latest.next().await.unwrap().unwrap(), "Hi");
        assert!(latest.next().await.is_none());
        assert!(latest.next().await.is_none());
        assert_eq!(latest.dropped(), 0);
    }
}
