//! Condvar-based change notification.
//!
//! Units publish on every state transition; waiters remember the generation they
//! last saw, rescan, and then block until the generation moves past it. Reading
//! the generation *before* the rescan means a publish that races with the scan
//! is never lost.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Generation counter paired with a condition variable.
#[derive(Debug, Default)]
pub struct StateSignal {
    generation: Mutex<u64>,
    condvar: Condvar,
}

impl StateSignal {
    /// Create a signal at generation zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Bump the generation and wake every waiter.
    pub fn publish(&self) {
        {
            let mut generation = self.generation.lock();
            *generation = generation.wrapping_add(1);
        }
        self.condvar.notify_all();
    }

    /// Block until the generation differs from `seen` or `timeout` elapses.
    ///
    /// Returns the generation observed on wake-up.
    pub fn wait_past(&self, seen: u64, timeout: Duration) -> u64 {
        let deadline = Instant::now() + timeout;
        let mut generation = self.generation.lock();
        while *generation == seen {
            if self.condvar.wait_until(&mut generation, deadline).timed_out() {
                break;
            }
        }
        *generation
    }
}
