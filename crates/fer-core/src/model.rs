//! Fixed CNN architecture and its parameter assembler.
//!
//! Architecture: two conv blocks (3x3 conv, `ReLU`, 2x2 max pool) followed by
//! one dense layer.
//! Input: 48x48 grayscale face crop
//! Output: 7 emotion logits

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{ModelError, Result, ShapeError};
use crate::format::{write_tensors, TensorStream};
use crate::tensor::Tensor;

/// Input image width and height.
pub const IMAGE_SIZE: usize = 48;
/// Shape of one input image, batch size one.
pub const IMAGE_SHAPE: [usize; 4] = [1, 1, IMAGE_SIZE, IMAGE_SIZE];
/// Square convolution kernel size.
pub const KERNEL_SIZE: usize = 3;
/// Output channels of the first conv block.
pub const CONV1_CHANNELS: usize = 12;
/// Output channels of the second conv block.
pub const CONV2_CHANNELS: usize = 24;
/// Number of emotion classes.
pub const NUM_CLASSES: usize = 7;

// 48x48 -> 24x24 -> 12x12
// Flattened: 24 * 12 * 12 = 3456
/// Input width of the dense layer.
pub const FC_FEATURES: usize = CONV2_CHANNELS * (IMAGE_SIZE / 4) * (IMAGE_SIZE / 4);

/// Parameter names in stream order.
pub const PARAMETER_NAMES: [&str; 6] = [
    "conv1.weight",
    "conv1.bias",
    "conv2.weight",
    "conv2.bias",
    "fc.weight",
    "fc.bias",
];

/// Parameter shapes in stream order.
pub const PARAMETER_SHAPES: [&[usize]; 6] = [
    &[CONV1_CHANNELS, 1, KERNEL_SIZE, KERNEL_SIZE],
    &[CONV1_CHANNELS],
    &[CONV2_CHANNELS, CONV1_CHANNELS, KERNEL_SIZE, KERNEL_SIZE],
    &[CONV2_CHANNELS],
    &[NUM_CLASSES, FC_FEATURES],
    &[NUM_CLASSES],
];

/// Trained parameters of the emotion classifier.
///
/// Every field has its architecture shape; a `Model` that exists is valid.
/// It is never mutated, so one instance can serve any number of concurrent
/// inference calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    conv1_weight: Tensor,
    conv1_bias: Tensor,
    conv2_weight: Tensor,
    conv2_bias: Tensor,
    fc_weight: Tensor,
    fc_bias: Tensor,
}

impl Model {
    /// Assembles a model from flat tensors in stream order.
    ///
    /// Tensors past the sixth are ignored.
    ///
    /// # Errors
    ///
    /// - [`ModelError::InsufficientTensors`] if fewer than six tensors are present
    /// - [`ShapeError::ParameterMismatch`] if a tensor's element count does not
    ///   match its parameter shape
    pub fn from_stream(stream: TensorStream) -> Result<Self> {
        let found = stream.len();
        if found < PARAMETER_SHAPES.len() {
            return Err(ModelError::InsufficientTensors {
                expected: PARAMETER_SHAPES.len(),
                found,
            }
            .into());
        }
        if found > PARAMETER_SHAPES.len() {
            warn!(
                "Ignoring {} trailing tensors after the model parameters",
                found - PARAMETER_SHAPES.len()
            );
        }

        let mut tensors = stream.into_tensors().into_iter().enumerate();
        let mut next = || -> Result<Tensor> {
            let (index, tensor) = tensors.next().ok_or(ModelError::InsufficientTensors {
                expected: PARAMETER_SHAPES.len(),
                found,
            })?;
            shape_parameter(index, tensor)
        };

        Ok(Self {
            conv1_weight: next()?,
            conv1_bias: next()?,
            conv2_weight: next()?,
            conv2_bias: next()?,
            fc_weight: next()?,
            fc_bias: next()?,
        })
    }

    /// Reads and assembles a model from a tensor stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is malformed or does not fit the architecture.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        Self::from_stream(TensorStream::read(reader)?)
    }

    /// Loads a model from a parameter file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The tensor stream is malformed
    /// - The tensors do not fit the architecture
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading model from {}", path.display());

        let file = File::open(path)?;
        let model = Self::read(BufReader::new(file))?;

        info!("Loaded model from {}", path.display());
        Ok(model)
    }

    /// Writes the six parameters as a tensor stream, in assembler order.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        write_tensors(writer, self.parameters().iter().map(|(_, t)| *t))?;
        Ok(())
    }

    /// Saves the model to a parameter file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write(BufWriter::new(file))?;
        debug!("Saved model to {}", path.display());
        Ok(())
    }

    /// Named parameters in stream order.
    #[must_use]
    pub fn parameters(&self) -> [(&'static str, &Tensor); 6] {
        [
            (PARAMETER_NAMES[0], &self.conv1_weight),
            (PARAMETER_NAMES[1], &self.conv1_bias),
            (PARAMETER_NAMES[2], &self.conv2_weight),
            (PARAMETER_NAMES[3], &self.conv2_bias),
            (PARAMETER_NAMES[4], &self.fc_weight),
            (PARAMETER_NAMES[5], &self.fc_bias),
        ]
    }

    /// First conv layer weight, `[12, 1, 3, 3]`.
    #[must_use]
    pub const fn conv1_weight(&self) -> &Tensor {
        &self.conv1_weight
    }

    /// First conv layer bias, `[12]`.
    #[must_use]
    pub const fn conv1_bias(&self) -> &Tensor {
        &self.conv1_bias
    }

    /// Second conv layer weight, `[24, 12, 3, 3]`.
    #[must_use]
    pub const fn conv2_weight(&self) -> &Tensor {
        &self.conv2_weight
    }

    /// Second conv layer bias, `[24]`.
    #[must_use]
    pub const fn conv2_bias(&self) -> &Tensor {
        &self.conv2_bias
    }

    /// Dense layer weight, `[7, 3456]`.
    #[must_use]
    pub const fn fc_weight(&self) -> &Tensor {
        &self.fc_weight
    }

    /// Dense layer bias, `[7]`.
    #[must_use]
    pub const fn fc_bias(&self) -> &Tensor {
        &self.fc_bias
    }
}

/// Gives the flat tensor at `index` its architecture shape.
fn shape_parameter(index: usize, tensor: Tensor) -> Result<Tensor> {
    let expected = PARAMETER_SHAPES[index];
    if tensor.numel() != expected.iter().product::<usize>() {
        return Err(ShapeError::ParameterMismatch {
            index,
            expected: expected.to_vec(),
            actual: tensor.shape().to_vec(),
        }
        .into());
    }
    Ok(tensor.reshape(expected)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn flat_parameters() -> Vec<Tensor> {
        PARAMETER_SHAPES
            .iter()
            .enumerate()
            .map(|(i, shape)| {
                let n: usize = shape.iter().product();
                Tensor::flat((0..n).map(|j| (i + j) as f32 * 1e-3).collect())
            })
            .collect()
    }

    #[test]
    fn test_fc_features() {
        assert_eq!(FC_FEATURES, 3456);
    }

    #[test]
    fn test_assembles_parameters_in_order() {
        let model = Model::from_stream(TensorStream::new(flat_parameters())).unwrap();
        assert_eq!(model.conv1_weight().shape(), &[12, 1, 3, 3]);
        assert_eq!(model.conv1_bias().shape(), &[12]);
        assert_eq!(model.conv2_weight().shape(), &[24, 12, 3, 3]);
        assert_eq!(model.conv2_bias().shape(), &[24]);
        assert_eq!(model.fc_weight().shape(), &[7, 3456]);
        assert_eq!(model.fc_bias().shape(), &[7]);
        assert!((model.conv2_bias().data()[0] - 0.003).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_first_tensor_is_shape_error() {
        let mut tensors = flat_parameters();
        tensors[0] = Tensor::flat(vec![0.0; 10]);
        let err = Model::from_stream(TensorStream::new(tensors)).unwrap_err();
        match err {
            Error::Shape(ShapeError::ParameterMismatch {
                index,
                expected,
                actual,
            }) => {
                assert_eq!(index, 0);
                assert_eq!(expected, vec![12, 1, 3, 3]);
                assert_eq!(actual, vec![10]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_longer_tensor_is_rejected() {
        let mut tensors = flat_parameters();
        tensors[5] = Tensor::flat(vec![0.0; 8]);
        let err = Model::from_stream(TensorStream::new(tensors)).unwrap_err();
        assert!(matches!(
            err,
            Error::Shape(ShapeError::ParameterMismatch { index: 5, .. })
        ));
    }

    #[test]
    fn test_too_few_tensors_is_model_error() {
        let mut tensors = flat_parameters();
        tensors.truncate(4);
        let err = Model::from_stream(TensorStream::new(tensors)).unwrap_err();
        assert!(matches!(
            err,
            Error::Model(ModelError::InsufficientTensors {
                expected: 6,
                found: 4
            })
        ));
    }

    #[test]
    fn test_trailing_tensors_are_ignored() {
        let mut tensors = flat_parameters();
        tensors.push(Tensor::flat(vec![1.0, 2.0]));
        let with_extra = Model::from_stream(TensorStream::new(tensors)).unwrap();
        let plain = Model::from_stream(TensorStream::new(flat_parameters())).unwrap();
        assert_eq!(with_extra, plain);
    }

    #[test]
    fn test_write_then_read_restores_model() {
        let model = Model::from_stream(TensorStream::new(flat_parameters())).unwrap();
        let mut bytes = Vec::new();
        model.write(&mut bytes).unwrap();
        assert_eq!(Model::read(bytes.as_slice()).unwrap(), model);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fer_model.bin");
        let model = Model::from_stream(TensorStream::new(flat_parameters())).unwrap();
        model.save(&path).unwrap();
        assert_eq!(Model::load(&path).unwrap(), model);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Model::load("/nonexistent/fer_model.bin").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
