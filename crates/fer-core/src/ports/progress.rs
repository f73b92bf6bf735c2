//! Progress reporting for batch classification.

use crate::domain::PredictionRecord;

/// Events emitted while a batch is classified.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Classification started for an image.
    Started {
        /// Path to the image.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total images in batch, if known.
        total: Option<usize>,
    },
    /// An image was classified.
    Completed {
        /// The prediction.
        record: PredictionRecord,
    },
    /// An image could not be loaded.
    Skipped {
        /// Path to the image, or a placeholder when unknown.
        path: String,
        /// Why it was skipped.
        reason: String,
    },
    /// The batch is done.
    Finished {
        /// Images classified.
        processed: usize,
        /// Images skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called for every event, in order.
    fn on_event(&self, event: ProgressEvent);
}
