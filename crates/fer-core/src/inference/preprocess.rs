//! Converts face crops into network input.

// Allow common image code patterns
#![allow(clippy::cast_possible_truncation)]

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::ShapeError;
use crate::model::{IMAGE_SHAPE, IMAGE_SIZE};
use crate::tensor::Tensor;

/// Preprocesses a face crop for classification.
///
/// The crop is converted to 8-bit grayscale, resized to exactly 48x48 if it
/// is not already that size, and scaled to `[0, 1]`. Finding and cropping
/// the face is the caller's job.
///
/// # Returns
/// Tensor of shape `(1, 1, 48, 48)`
///
/// # Errors
///
/// Returns an error if the resized buffer does not hold 48x48 pixels.
pub fn preprocess(image: &DynamicImage) -> Result<Tensor, ShapeError> {
    let gray = image.to_luma8();
    let size = IMAGE_SIZE as u32;
    let gray = if gray.dimensions() == (size, size) {
        gray
    } else {
        image::imageops::resize(&gray, size, size, FilterType::Lanczos3)
    };

    normalize_pixels(gray.as_raw())
}

/// Builds an input tensor from 2304 row-major grayscale bytes.
///
/// # Errors
///
/// Returns [`ShapeError::ElementCount`] if `pixels` is not 48x48.
pub fn normalize_pixels(pixels: &[u8]) -> Result<Tensor, ShapeError> {
    let data = pixels.iter().map(|&p| f32::from(p) / 255.0).collect();
    Tensor::new(data, IMAGE_SHAPE.to_vec())
}
