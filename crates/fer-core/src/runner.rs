//! Batch classification over an image source.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::domain::{BatchSummary, PredictionRecord};
use crate::inference::{preprocess, LazyModel};
use crate::pipeline::predict;
use crate::ports::{ImageSource, PredictionOutput, ProgressEvent, ProgressSink};

/// Timestamp used when no clock is configured.
pub const EPOCH_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// Classifies every image of a source and streams the records to an output.
///
/// Images that fail to load are reported as skipped. Anything that fails
/// after an image is loaded (model loading, inference, output) aborts the
/// batch.
pub struct BatchClassifier<'a> {
    model: &'a LazyModel,
    include_probabilities: bool,
    clock: fn() -> String,
}

impl<'a> BatchClassifier<'a> {
    /// Creates a runner over a lazily loaded model.
    #[must_use]
    pub fn new(model: &'a LazyModel) -> Self {
        Self {
            model,
            include_probabilities: false,
            clock: || EPOCH_TIMESTAMP.to_string(),
        }
    }

    /// Whether records carry all seven class probabilities.
    #[must_use]
    pub const fn with_probabilities(mut self, include: bool) -> Self {
        self.include_probabilities = include;
        self
    }

    /// Sets the function that stamps each record.
    #[must_use]
    pub const fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    /// Runs the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded, inference fails, or
    /// the output cannot be written.
    pub fn run(
        &self,
        source: &dyn ImageSource,
        output: &dyn PredictionOutput,
        progress: &dyn ProgressSink,
    ) -> Result<BatchSummary> {
        let total = source.count_hint();
        let mut summary = BatchSummary::default();

        for (index, image_result) in source.images().enumerate() {
            let image = match image_result {
                Ok(img) => img,
                Err(e) => {
                    // The error carries the path through its context
                    progress.on_event(ProgressEvent::Skipped {
                        path: format!("image {index}"),
                        reason: format!("{e:#}"),
                    });
                    summary.skipped += 1;
                    continue;
                }
            };

            progress.on_event(ProgressEvent::Started {
                path: image.path.clone(),
                index,
                total,
            });

            let model = self.model.get()?;
            let input = preprocess(&image.image)
                .with_context(|| format!("Failed to preprocess {}", image.path))?;
            let prediction = predict(model, &input)
                .with_context(|| format!("Failed to classify {}", image.path))?;
            debug!(
                "{} -> {} ({:.3})",
                image.path, prediction.emotion, prediction.confidence
            );

            let record = PredictionRecord::new(
                image.path.as_str(),
                (self.clock)(),
                image.dimensions(),
                &prediction,
                self.include_probabilities,
            );
            output.write(&record)?;

            *summary.counts.entry(prediction.emotion).or_default() += 1;
            summary.processed += 1;

            progress.on_event(ProgressEvent::Completed { record });
        }

        output.flush()?;

        progress.on_event(ProgressEvent::Finished {
            processed: summary.processed,
            skipped: summary.skipped,
        });
        info!(
            "Classified {} images, skipped {}",
            summary.processed, summary.skipped
        );

        Ok(summary)
    }
}
