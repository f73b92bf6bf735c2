//! Fixed forward pass from a 48x48 face crop to emotion logits.

use crate::classifier::{classify, Emotion, Prediction};
use crate::error::{Result, ShapeError};
use crate::kernels::{conv2d, linear, max_pool2x2, relu};
use crate::model::{Model, FC_FEATURES, IMAGE_SHAPE};
use crate::tensor::Tensor;

/// Runs the network on one `[1, 1, 48, 48]` image and returns `[1, 7]` logits.
///
/// The model is only borrowed and every intermediate is allocated per call,
/// so any number of threads may call this on the same model.
///
/// # Errors
///
/// Returns a [`ShapeError`] if the image is not `[1, 1, 48, 48]`.
pub fn infer(model: &Model, image: &Tensor) -> Result<Tensor> {
    if image.shape() != IMAGE_SHAPE {
        return Err(ShapeError::Incompatible {
            op: "infer",
            left: image.shape().to_vec(),
            right: IMAGE_SHAPE.to_vec(),
        }
        .into());
    }

    // Conv1 + ReLU + MaxPool: 48x48 -> 24x24, 12 channels
    let x = conv2d(image, model.conv1_weight(), model.conv1_bias())?;
    let x = max_pool2x2(&relu(&x))?;

    // Conv2 + ReLU + MaxPool: 24x24 -> 12x12, 24 channels
    let x = conv2d(&x, model.conv2_weight(), model.conv2_bias())?;
    let x = max_pool2x2(&relu(&x))?;

    // Row-major flatten matches how fc.weight was laid out at training time.
    let x = x.reshape(&[1, FC_FEATURES])?;

    Ok(linear(&x, model.fc_weight(), model.fc_bias())?)
}

/// Classifies one image.
///
/// # Errors
///
/// Returns a [`ShapeError`] if the image is not `[1, 1, 48, 48]`.
pub fn infer_emotion(model: &Model, image: &Tensor) -> Result<Emotion> {
    Ok(classify(&infer(model, image)?)?)
}

/// Classifies one image and reports the softmax probabilities.
///
/// # Errors
///
/// Returns a [`ShapeError`] if the image is not `[1, 1, 48, 48]`.
pub fn predict(model: &Model, image: &Tensor) -> Result<Prediction> {
    Ok(Prediction::from_logits(&infer(model, image)?)?)
}
