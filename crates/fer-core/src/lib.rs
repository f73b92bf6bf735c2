//! FER Core - Emotion classifier for 48x48 grayscale face crops
//!
//! This crate holds the tensor stream format, the fixed CNN and its kernels,
//! the argmax decision, plus the domain types and ports used by the batch
//! runner and the adapters.

pub mod classifier;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod format;
pub mod inference;
pub mod kernels;
pub mod model;
pub mod pipeline;
pub mod ports;
pub mod runner;
pub mod tensor;

pub use classifier::{classify, Emotion, Prediction, LABELS};
pub use domain::{BatchSummary, FaceImage, ImageDimensions, PredictionRecord};
pub use error::{Error, FormatError, ModelError, Result, ShapeError};
pub use evaluation::{evaluate, ConfusionMatrix, EvaluationReport, LabeledSample};
pub use format::{write_tensors, TensorStream};
pub use inference::{normalize_pixels, preprocess, LazyModel};
pub use model::Model;
pub use pipeline::{infer, infer_emotion, predict};
pub use ports::{ImageSource, PredictionOutput, ProgressEvent, ProgressSink};
pub use runner::BatchClassifier;
pub use tensor::Tensor;
