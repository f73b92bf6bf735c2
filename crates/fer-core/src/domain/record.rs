//! Classification output records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ImageDimensions;
use crate::classifier::{Emotion, Prediction};

/// Classification result for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Path to the classified image.
    pub path: String,
    /// Timestamp of classification (ISO 8601).
    pub timestamp: String,
    /// Original image dimensions, before resizing to 48x48.
    pub dimensions: ImageDimensions,
    /// Class index, 0-6.
    pub index: usize,
    /// Class label, e.g. `"Happy"`.
    pub label: String,
    /// Softmax probability of the predicted class.
    pub confidence: f32,
    /// Softmax probability of every class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<BTreeMap<Emotion, f32>>,
}

impl PredictionRecord {
    /// Builds a record from a prediction.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        timestamp: impl Into<String>,
        dimensions: ImageDimensions,
        prediction: &Prediction,
        include_probabilities: bool,
    ) -> Self {
        let probabilities = include_probabilities.then(|| {
            Emotion::ALL
                .iter()
                .map(|&e| (e, prediction.probabilities[e.index()]))
                .collect()
        });

        Self {
            path: path.into(),
            timestamp: timestamp.into(),
            dimensions,
            index: prediction.emotion.index(),
            label: prediction.emotion.label().to_string(),
            confidence: prediction.confidence,
            probabilities,
        }
    }
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Images classified.
    pub processed: usize,
    /// Images that could not be loaded.
    pub skipped: usize,
    /// Classified images per emotion.
    pub counts: BTreeMap<Emotion, usize>,
}
