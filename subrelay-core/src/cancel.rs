//! Cooperative cancellation
//!
//! A [`CancelToken`] is polled at every wait point of a capture. It is
//! `Sync` and `const`-constructible so it can live in a `static` and be
//! tripped from another task or an interrupt handler.

use portable_atomic::{AtomicBool, Ordering};

/// Flag that aborts an in-progress capture at its next poll
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    /// Create a token in the not-cancelled state
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Clear a previous cancellation so the token can be reused
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}
