//! Test support utilities for fer.
//!
//! Provides mocks, synthetic model and image builders for testing the
//! classification pipeline without a trained parameter file.
//!
//! # Example
//!
//! ```
//! use fer_test_support::{MockImageSource, SyntheticImageBuilder, SyntheticModelBuilder};
//!
//! // A model whose answer does not depend on the input
//! let model = SyntheticModelBuilder::bias_only([0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0]).build();
//!
//! // Face crops and a source that yields them
//! let face = SyntheticImageBuilder::uniform_gray(48, 48, 128);
//! let source = MockImageSource::new(vec![face]);
//! ```

mod builders;
mod mocks;

pub use builders::{fer2013_csv, SyntheticImageBuilder, SyntheticModelBuilder};
pub use mocks::{MockImageSource, MockPredictionOutput, MockProgressSink};
