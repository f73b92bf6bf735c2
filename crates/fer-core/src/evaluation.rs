//! Accuracy and confusion statistics over labelled samples.

use serde::Serialize;
use tracing::debug;

use crate::classifier::{Emotion, LABELS};
use crate::error::Result;
use crate::model::{Model, NUM_CLASSES};
use crate::pipeline::infer_emotion;
use crate::tensor::Tensor;

/// A preprocessed image with its ground-truth class.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    /// Ground truth.
    pub emotion: Emotion,
    /// `[1, 1, 48, 48]` input tensor.
    pub image: Tensor,
}

/// Counts of (actual, predicted) class pairs. Rows are actual classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    counts: [[usize; NUM_CLASSES]; NUM_CLASSES],
}

#[allow(clippy::cast_precision_loss)]
impl ConfusionMatrix {
    /// Empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one outcome.
    pub fn record(&mut self, actual: Emotion, predicted: Emotion) {
        self.counts[actual.index()][predicted.index()] += 1;
    }

    /// Number of samples with this (actual, predicted) pair.
    #[must_use]
    pub const fn count(&self, actual: Emotion, predicted: Emotion) -> usize {
        self.counts[actual.index()][predicted.index()]
    }

    /// Raw counts, rows indexed by actual class.
    #[must_use]
    pub const fn rows(&self) -> &[[usize; NUM_CLASSES]; NUM_CLASSES] {
        &self.counts
    }

    /// Total samples recorded.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Samples on the diagonal.
    #[must_use]
    pub fn correct(&self) -> usize {
        (0..NUM_CLASSES).map(|i| self.counts[i][i]).sum()
    }

    /// Samples whose actual class is `emotion`.
    #[must_use]
    pub fn support(&self, emotion: Emotion) -> usize {
        self.counts[emotion.index()].iter().sum()
    }

    /// Fraction of correct predictions, 0 for an empty matrix.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct() as f64 / total as f64,
        }
    }

    /// Recall of one class, `None` when it has no samples.
    #[must_use]
    pub fn recall(&self, emotion: Emotion) -> Option<f64> {
        match self.support(emotion) {
            0 => None,
            support => Some(self.count(emotion, emotion) as f64 / support as f64),
        }
    }

    /// Precision of one class, `None` when it was never predicted.
    #[must_use]
    pub fn precision(&self, emotion: Emotion) -> Option<f64> {
        let predicted: usize = self.counts.iter().map(|row| row[emotion.index()]).sum();
        match predicted {
            0 => None,
            n => Some(self.count(emotion, emotion) as f64 / n as f64),
        }
    }

    /// Summarizes the matrix for reporting.
    #[must_use]
    pub fn report(&self) -> EvaluationReport {
        EvaluationReport {
            samples: self.total(),
            correct: self.correct(),
            accuracy: self.accuracy(),
            classes: Emotion::ALL
                .iter()
                .map(|&emotion| ClassMetrics {
                    emotion,
                    label: LABELS[emotion.index()],
                    support: self.support(emotion),
                    recall: self.recall(emotion),
                    precision: self.precision(emotion),
                })
                .collect(),
            confusion: self.counts,
        }
    }
}

/// Serializable evaluation summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
    /// Rows are actual classes, columns predicted.
    pub confusion: [[usize; NUM_CLASSES]; NUM_CLASSES],
}

/// Per-class statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub emotion: Emotion,
    pub label: &'static str,
    pub support: usize,
    pub recall: Option<f64>,
    pub precision: Option<f64>,
}

/// Classifies every sample and tallies the outcomes.
///
/// # Errors
///
/// Returns the first inference error; a sample with the wrong image shape
/// fails the whole evaluation.
pub fn evaluate<I>(model: &Model, samples: I) -> Result<ConfusionMatrix>
where
    I: IntoIterator<Item = LabeledSample>,
{
    let mut matrix = ConfusionMatrix::new();
    for sample in samples {
        let predicted = infer_emotion(model, &sample.image)?;
        matrix.record(sample.emotion, predicted);
    }
    debug!(
        "Evaluated {} samples, {} correct",
        matrix.total(),
        matrix.correct()
    );
    Ok(matrix)
}
