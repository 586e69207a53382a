//! Cooperative cancellation handle shared by one subscription.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::Waker;

use futures::task::AtomicWaker;

type Hook = Box<dyn FnOnce() + Send + 'static>;

/// Cancellation handle for a single subscription.
///
/// Disposing flips a flag that every stage checks before emitting, runs the
/// registered dispose hooks (the bridge registers one that cancels the
/// underlying call) and wakes the consumer so it observes the end of the
/// stream. Disposing twice is a no-op.
///
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct Disposable {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    disposed: AtomicBool,
    hooks: Mutex<Vec<Hook>>,
    waker: AtomicWaker,
}

impl Inner {
    fn hooks(&self) -> MutexGuard<'_, Vec<Hook>> {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Disposable {
    /// Create a handle that is not yet disposed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose the subscription.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("subscription disposed");

        let hooks = std::mem::take(&mut *self.inner.hooks());
        for hook in hooks {
            hook();
        }
        self.inner.waker.wake();
    }

    /// Returns true once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Run `hook` when the subscription is disposed.
    ///
    /// If the subscription is already disposed the hook runs immediately.
    pub(crate) fn on_dispose<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut hooks = self.inner.hooks();
            if !self.is_disposed() {
                hooks.push(Box::new(hook));
                return;
            }
        }
        hook();
    }

    /// Register the consumer's waker to be woken on dispose.
    pub(crate) fn register(&self, waker: &Waker) {
        self.inner.waker.register(waker);
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
