//! Model loading and input preparation.
//!
//! Provides:
//! - Lazy, load-once access to the parameter file
//! - Conversion of decoded face crops into `[1, 1, 48, 48]` input tensors

mod loader;
mod preprocess;

pub use loader::LazyModel;
pub use preprocess::{normalize_pixels, preprocess};
