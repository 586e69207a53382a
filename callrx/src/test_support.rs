//! Hand-driven [`Call`] for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use callrx_core::{Call, CallError, Callback, Outcome};

/// A call whose outcome is reported by the test via [`complete`](Self::complete).
pub(crate) struct ManualCall<T> {
    callback: Mutex<Option<Callback<T>>>,
    executed: AtomicBool,
    canceled: AtomicBool,
    enqueued: AtomicUsize,
}

impl<T: Send + 'static> ManualCall<T> {
    pub(crate) fn new() -> Self {
        Self {
            callback: Mutex::new(None),
            executed: AtomicBool::new(false),
            canceled: AtomicBool::new(false),
            enqueued: AtomicUsize::new(0),
        }
    }

    /// Report the outcome, as the call's executor would.
    pub(crate) fn complete(&self, outcome: Outcome<T>) {
        let callback = self.callback.lock().unwrap().take();
        if let Some(callback) = callback {
            callback(outcome);
        }
    }

    /// Drop the pending callback without invoking it.
    pub(crate) fn drop_callback(&self) {
        self.callback.lock().unwrap().take();
    }

    pub(crate) fn enqueue_count(&self) -> usize {
        self.enqueued.load(Ordering::SeqCst)
    }
}

impl<T: Send + 'static> Call for ManualCall<T> {
    type Body = T;

    fn enqueue(&self, callback: Callback<T>) -> Result<(), CallError> {
        if self.executed.swap(true, Ordering::SeqCst) {
            return Err(CallError::already_executed());
        }
        self.enqueued.fetch_add(1, Ordering::SeqCst);
        *self.callback.lock().unwrap() = Some(callback);
        Ok(())
    }

    fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    fn is_executed(&self) -> bool {
        self.executed.load(Ordering::SeqCst)
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}
