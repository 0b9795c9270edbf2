//! Cooperative cancellation for orchestration runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation token checked between orchestration steps.
///
/// The signal handler only sets the token; the orchestration loop notices it
/// at the next step boundary and runs the normal stop path. There is no
/// preemption: a blocking probe or external command finishes its current
/// attempt before the cancellation is observed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
