//! Progress reporting for bulk runs
//!
//! Observational only: a sink sees one update after every job completion,
//! correctness never depends on it.

use flyer_types::ProgressUpdate;

pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, update: ProgressUpdate);
}

/// Sink that drops every update
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&self, _update: ProgressUpdate) {}
}

/// Sink that logs every update at info level
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&self, update: ProgressUpdate) {
        log::info!(
            "Processed {}/{} SKUs | success: {} | failed: {}",
            update.completed,
            update.total,
            update.succeeded,
            update.failed
        );
    }
}
