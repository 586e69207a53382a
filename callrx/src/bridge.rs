//! Call-to-stream bridge.
//!
//! [`CallStream`] runs one [`Call`] for one subscription and delivers its
//! outcome as a single-element stream: the [`Response`] followed by
//! completion, or a transport error.
//!
//! # Cancellation
//!
//! Once the call is enqueued, the bridge registers a dispose hook on the
//! subscription's [`Disposable`] that cancels the call if it has not
//! terminated yet. A subscription whose enqueue was rejected never cancels. Once disposed, the
//! completion callback drops whatever the call reports and the stream ends
//! without emitting. Dropping a stream that has not terminated disposes it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use callrx_core::{Call, CallError, Callback, Outcome, Response, TransportError};
use futures::Stream;
use futures::channel::oneshot;
use futures::task::AtomicWaker;

use crate::disposable::Disposable;

#[derive(Default)]
struct Shared {
    terminated: AtomicBool,
    waker: AtomicWaker,
}

enum State<T> {
    /// Subscribing failed; the error is delivered on the first poll.
    Failed(CallError),
    /// The call is in flight.
    Waiting(oneshot::Receiver<Outcome<T>>),
    /// The response was emitted; completion is next.
    Completing,
    Done,
}

/// A single-subscription stream over one execution of a [`Call`].
///
/// Yields exactly one of:
/// - `Ok(response)` then end of stream, for any response (2xx or not)
/// - `Err(CallError::Transport(_))`, when the call failed
/// - `Err(CallError::IllegalState(_))`, when the call was already executed
///
/// After the subscription is disposed the stream ends without emitting.
pub struct CallStream<T> {
    state: State<T>,
    disposable: Disposable,
    shared: Arc<Shared>,
}

impl<T: Send + 'static> CallStream<T> {
    /// Subscribe to `call`, starting it immediately.
    ///
    /// A call that was already executed is not run again; the returned
    /// stream fails with [`CallError::IllegalState`] instead.
    pub fn subscribe<C>(call: Arc<C>, disposable: &Disposable) -> Self
    where
        C: Call<Body = T>,
    {
        let shared = Arc::new(Shared::default());
        let stream = |state| Self {
            state,
            disposable: disposable.clone(),
            shared: shared.clone(),
        };

        if disposable.is_disposed() {
            return stream(State::Done);
        }

        if call.is_executed() {
            #[cfg(feature = "tracing")]
            tracing::debug!("subscribe rejected: call already executed");
            return stream(State::Failed(CallError::already_executed()));
        }

        let (tx, rx) = oneshot::channel();
        let guard = disposable.clone();
        let callback: Callback<T> = Box::new(move |outcome| {
            if guard.is_disposed() {
                #[cfg(feature = "tracing")]
                tracing::trace!("dropping call outcome after dispose");
                return;
            }
            let _ = tx.send(outcome);
        });

        #[cfg(feature = "tracing")]
        tracing::debug!("enqueueing call");

        if let Err(err) = call.enqueue(callback) {
            // The call belongs to whoever enqueued it; never cancel it from here.
            return stream(State::Failed(err));
        }

        {
            let shared = shared.clone();
            disposable.on_dispose(move || {
                if !shared.terminated.load(Ordering::Acquire) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("canceling in-flight call");
                    call.cancel();
                }
                shared.waker.wake();
            });
        }

        stream(State::Waiting(rx))
    }

    fn terminate(&mut self) {
        self.state = State::Done;
        self.shared.terminated.store(true, Ordering::Release);
    }
}

impl<T: Send + 'static> Stream for CallStream<T> {
    type Item = Result<Response<T>, CallError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match std::mem::replace(&mut this.state, State::Done) {
            State::Failed(err) => {
                this.terminate();
                if this.disposable.is_disposed() {
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(Err(err)))
            }
            State::Waiting(mut rx) => {
                if this.disposable.is_disposed() {
                    return Poll::Ready(None);
                }
                this.shared.waker.register(cx.waker());

                match Pin::new(&mut rx).poll(cx) {
                    Poll::Pending => {
                        this.state = State::Waiting(rx);
                        Poll::Pending
                    }
                    Poll::Ready(outcome) => {
                        this.shared.terminated.store(true, Ordering::Release);
                        if this.disposable.is_disposed() {
                            return Poll::Ready(None);
                        }
                        match outcome {
                            Ok(Ok(response)) => {
                                this.state = State::Completing;
                                Poll::Ready(Some(Ok(response)))
                            }
                            Ok(Err(err)) => Poll::Ready(Some(Err(err.into()))),
                            // The call dropped its callback without reporting.
                            Err(oneshot::Canceled) => {
                                Poll::Ready(Some(Err(TransportError::Canceled.into())))
                            }
                        }
                    }
                }
            }
            State::Completing | State::Done => {
                this.terminate();
                Poll::Ready(None)
            }
        }
    }
}

impl<T> Drop for CallStream<T> {
    fn drop(&mut self) {
        if !self.shared.terminated.load(Ordering::Acquire) {
            self.disposable.dispose();
        }
    }
}

impl<T> Unpin for CallStream<T> {}
