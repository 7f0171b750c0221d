//! Cancellation and progress reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Returned when a run stops because its token was cancelled.
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("typechecking was cancelled")]
pub struct Cancelled;

/// Shared flag polled between components and between members of a large
/// component. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Coarse progress: `done` of `total` components finished.
pub trait ProgressSink {
    fn report(&mut self, done: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn report(&mut self, done: usize, total: usize) {
        self(done, total);
    }
}

/// Ignores progress.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _done: usize, _total: usize) {}
}
