//! Cancellation for blocking dispatcher calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::signal::StateSignal;

/// Lets a caller abandon a pending `call_elevator_with_cancel`.
///
/// Cancelling wakes every signal the token is watching, so a blocked dispatcher
/// notices without waiting out its poll interval.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
    watchers: Mutex<Vec<Weak<StateSignal>>>,
}

impl CancelToken {
    /// Create an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token cancelled and wake watchers. Idempotent.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let watchers = std::mem::take(&mut *self.watchers.lock());
        for signal in watchers.iter().filter_map(Weak::upgrade) {
            signal.publish();
        }
    }

    /// Whether [`CancelToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Publish on `signal` when this token is cancelled.
    pub(crate) fn watch(&self, signal: &Arc<StateSignal>) {
        let mut watchers = self.watchers.lock();
        watchers.retain(|w| w.strong_count() > 0);
        watchers.push(Arc::downgrade(signal));
        drop(watchers);
        // Cancelled between the caller's check and registration.
        if self.is_cancelled() {
            signal.publish();
        }
    }
}

/// Cancels the wrapped token when dropped.
#[derive(Debug)]
#[cfg_attr(not(feature = "tokio-runtime"), allow(dead_code))]
pub(crate) struct CancelOnDrop(pub(crate) Arc<CancelToken>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
