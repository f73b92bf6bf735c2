//! Core domain types for emotion classification.

mod image;
mod record;

pub use image::{FaceImage, ImageDimensions};
pub use record::{BatchSummary, PredictionRecord};
