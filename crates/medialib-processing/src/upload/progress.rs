//! Upload progress reporting.
//!
//! Progress values are fractions in `[0, 1]`. A [`ProgressReporter`] keeps them
//! monotonically non-decreasing and emits `1.0` exactly once, through
//! [`ProgressReporter::complete`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Share of the progress range covered by the blob write
pub const WRITE_PHASE_END: f64 = 0.8;

/// Progress reported once thumbnail generation finished or was skipped
pub const THUMBNAIL_PHASE_END: f64 = 0.9;

/// Highest value reported before completion
const MAX_INTERMEDIATE: f64 = 0.99;

/// Receiver of upload progress updates
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn on_progress(&self, progress: f64) {
        self(progress)
    }
}

/// Sink that ignores progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _progress: f64) {}
}

/// Monotonic progress emitter for a single upload
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    last: Mutex<Option<f64>>,
    completed: AtomicBool,
}

impl ProgressReporter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            last: Mutex::new(None),
            completed: AtomicBool::new(false),
        }
    }

    /// Report an intermediate value
    ///
    /// Values are clamped below `1.0`; values not above the last reported one are dropped.
    pub fn report(&self, progress: f64) {
        if !progress.is_finite() || self.completed.load(Ordering::SeqCst) {
            return;
        }
        let progress = progress.clamp(0.0, MAX_INTERMEDIATE);

        {
            let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
            if last.is_some_and(|l| progress <= l) {
                return;
            }
            *last = Some(progress);
        }
        self.sink.on_progress(progress);
    }

    /// Report byte-level write progress, scaled into the write phase
    pub fn report_bytes(&self, written: u64, total: u64) {
        if total == 0 {
            return;
        }
        let fraction = (written as f64 / total as f64).min(1.0);
        self.report(fraction * WRITE_PHASE_END);
    }

    /// Emit the final `1.0`. Later calls are no-ops.
    pub fn complete(&self) {
        if self.completed.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(1.0);
        self.sink.on_progress(1.0);
    }

    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}
