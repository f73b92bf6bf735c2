//! Emotion labels and the argmax decision over logits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::model::NUM_CLASSES;
use crate::tensor::Tensor;

/// Class labels in logit order.
pub const LABELS: [&str; NUM_CLASSES] = [
    "Angry", "Disgust", "Fear", "Happy", "Sad", "Surprise", "Neutral",
];

/// One of the seven FER-2013 expression classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    /// Class 0.
    Angry,
    /// Class 1.
    Disgust,
    /// Class 2.
    Fear,
    /// Class 3.
    Happy,
    /// Class 4.
    Sad,
    /// Class 5.
    Surprise,
    /// Class 6.
    Neutral,
}

impl Emotion {
    /// All classes in logit order.
    pub const ALL: [Self; NUM_CLASSES] = [
        Self::Angry,
        Self::Disgust,
        Self::Fear,
        Self::Happy,
        Self::Sad,
        Self::Surprise,
        Self::Neutral,
    ];

    /// Position of this class in the logits.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display label, e.g. `"Happy"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        LABELS[self as usize]
    }
}

impl TryFrom<usize> for Emotion {
    type Error = usize;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL.get(index).copied().ok_or(index)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Picks the class with the largest logit; ties go to the lowest index.
///
/// # Errors
///
/// Returns [`ShapeError::Incompatible`] unless `logits` is `[1, 7]`.
pub fn classify(logits: &Tensor) -> Result<Emotion, ShapeError> {
    if logits.shape() != [1, NUM_CLASSES] {
        return Err(ShapeError::Incompatible {
            op: "classify",
            left: logits.shape().to_vec(),
            right: vec![1, NUM_CLASSES],
        });
    }

    let mut best = 0;
    for (i, &v) in logits.data().iter().enumerate().skip(1) {
        if v > logits.data()[best] {
            best = i;
        }
    }

    Ok(Emotion::ALL[best])
}

/// A classification together with its softmax probabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Argmax class.
    pub emotion: Emotion,
    /// Softmax probability of `emotion`.
    pub confidence: f32,
    /// Softmax probability of every class, in logit order.
    pub probabilities: [f32; NUM_CLASSES],
}

impl Prediction {
    /// Builds a prediction from `[1, 7]` logits.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::Incompatible`] unless `logits` is `[1, 7]`.
    pub fn from_logits(logits: &Tensor) -> Result<Self, ShapeError> {
        let emotion = classify(logits)?;
        let mut probabilities = [0.0; NUM_CLASSES];
        probabilities.copy_from_slice(crate::kernels::softmax(logits).data());
        Ok(Self {
            emotion,
            confidence: probabilities[emotion.index()],
            probabilities,
        })
    }
}
