//! Progress reporting and cooperative cancellation for long runs.

use std::sync::atomic::{AtomicBool, Ordering};

/// Receives `(done, total)` after each outer-loop iteration.
///
/// Observers are advisory and must not influence results.
pub trait ProgressObserver {
    fn on_progress(&self, done: usize, total: usize);
}

/// Observer that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    #[inline]
    fn on_progress(&self, _done: usize, _total: usize) {}
}

impl<F: Fn(usize, usize)> ProgressObserver for F {
    #[inline]
    fn on_progress(&self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Emits a `debug!` event at every tenth of the run.
#[derive(Debug, Clone, Copy)]
pub struct TracingProgress {
    pub task: &'static str,
}

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let decile = done * 10 / total;
        let previous = done.saturating_sub(1) * 10 / total;
        if done == total || decile != previous {
            tracing::debug!(task = self.task, done, total, "progress {}%", done * 100 / total);
        }
    }
}

/// Optional observer and cancellation flag for a run.
#[derive(Clone, Copy)]
pub struct RunHooks<'a> {
    pub progress: &'a dyn ProgressObserver,
    pub cancel: Option<&'a AtomicBool>,
}

impl Default for RunHooks<'_> {
    fn default() -> Self {
        Self {
            progress: &NoProgress,
            cancel: None,
        }
    }
}

impl std::fmt::Debug for RunHooks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHooks")
            .field("cancel", &self.cancel.map(|c| c.load(Ordering::Relaxed)))
            .finish_non_exhaustive()
    }
}

impl<'a> RunHooks<'a> {
    pub fn with_progress(progress: &'a dyn ProgressObserver) -> Self {
        Self {
            progress,
            cancel: None,
        }
    }

    pub fn cancel_on(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// `true` once the cancellation flag has been raised.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false)
    }

    #[inline]
    pub fn report(&self, done: usize, total: usize) {
        self.progress.on_progress(done, total);
    }
}
