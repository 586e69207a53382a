//! Hand-off of subscriptions onto a caller-chosen runtime.

use callrx_core::CallError;
use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::disposable::Disposable;
use crate::source::{EventStream, Source};

/// Subscribes upstream on `handle` and forwards its items to the consumer.
///
/// The upstream is driven by a task spawned on the runtime. Items cross
/// over a channel with capacity 1, so the task runs at most one item ahead
/// of the consumer. When the consumer goes away the task stops and drops
/// the upstream, which disposes the bridge and cancels the call.
pub struct SubscribeOn<S> {
    upstream: S,
    handle: Handle,
}

impl<S> SubscribeOn<S> {
    pub fn new(upstream: S, handle: Handle) -> Self {
        Self { upstream, handle }
    }
}

impl<S> Source for SubscribeOn<S>
where
    S: Source + Clone,
    S::Item: Send + 'static,
{
    type Item = S::Item;

    fn subscribe(&self, disposable: &Disposable) -> EventStream<S::Item> {
        let (tx, mut rx) = mpsc::channel::<Result<S::Item, CallError>>(1);
        let upstream = self.upstream.clone();
        let disposable = disposable.clone();

        self.handle.spawn(async move {
            let mut events = upstream.subscribe(&disposable);
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    item = events.next() => match item {
                        Some(item) => {
                            let terminal = item.is_err();
                            if tx.send(item).await.is_err() || terminal {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        futures::stream::poll_fn(move |cx| rx.poll_recv(cx)).boxed()
    }
}
