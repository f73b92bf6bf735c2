//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use fer_core::domain::{FaceImage, PredictionRecord};
use fer_core::ports::{ImageSource, PredictionOutput, ProgressEvent, ProgressSink};

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images, optionally interleaved with load failures, and
/// tracks iteration for assertions.
pub struct MockImageSource {
    items: Vec<Result<FaceImage, String>>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<FaceImage>) -> Self {
        Self {
            items: images.into_iter().map(Ok).collect(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Appends an item that fails to load with `reason`.
    #[must_use]
    pub fn with_failure(mut self, reason: &str) -> Self {
        self.items.push(Err(reason.to_string()));
        self
    }

    /// Appends an image.
    #[must_use]
    pub fn with_image(mut self, image: FaceImage) -> Self {
        self.items.push(Ok(image));
        self
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<FaceImage>> + Send + '_> {
        if let Ok(mut c) = self.iteration_count.lock() {
            *c += 1;
        }
        Box::new(self.items.iter().map(|item| match item {
            Ok(image) => Ok(image.clone()),
            Err(reason) => Err(anyhow::anyhow!("{reason}")),
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Mock implementation of `PredictionOutput` for testing.
///
/// Captures records for later assertions.
pub struct MockPredictionOutput {
    records: Arc<Mutex<Vec<PredictionRecord>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockPredictionOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured records.
    #[must_use]
    pub fn records(&self) -> Vec<PredictionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockPredictionOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionOutput for MockPredictionOutput {
    fn write(&self, record: &PredictionRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count(&self, pred: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fer_core::domain::ImageDimensions;
    use fer_core::{Emotion, Prediction};

    #[test]
    fn test_mock_image_source_empty() {
        let source = MockImageSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.images().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_image_source_failure() {
        let img = image::DynamicImage::new_luma8(48, 48);
        let source = MockImageSource::new(vec![FaceImage::new("a.png", img)])
            .with_failure("corrupt");

        let items: Vec<_> = source.images().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1].as_ref().unwrap_err().to_string(), "corrupt");
    }

    #[test]
    fn test_mock_prediction_output() {
        let output = MockPredictionOutput::new();
        let prediction = Prediction {
            emotion: Emotion::Fear,
            confidence: 1.0,
            probabilities: [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        };
        let record = PredictionRecord::new(
            "a.png",
            "2024-01-01T00:00:00Z",
            ImageDimensions::new(48, 48),
            &prediction,
            false,
        );

        output.write(&record).unwrap();
        output.flush().unwrap();

        assert_eq!(output.records().len(), 1);
        assert_eq!(output.records()[0].label, "Fear");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();
        sink.on_event(ProgressEvent::Started {
            path: "a.png".into(),
            index: 0,
            total: Some(1),
        });
        sink.on_event(ProgressEvent::Finished {
            processed: 1,
            skipped: 0,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.finished_counts(), Some((1, 0)));
    }
}
