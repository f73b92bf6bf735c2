//! Traits at the boundary between the classifier and its I/O adapters.

mod image_source;
mod prediction_output;
mod progress;

pub use image_source::ImageSource;
pub use prediction_output::PredictionOutput;
pub use progress::{ProgressEvent, ProgressSink};
