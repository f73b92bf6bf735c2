//! Owned, row-major `f32` tensor.

use crate::error::ShapeError;

/// A contiguous row-major buffer of `f32` values with a shape.
///
/// `shape.iter().product() == data.len()` always holds. Tensors are never
/// mutated after construction; operations return fresh tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl Tensor {
    /// Creates a tensor, checking that `data` fills `shape` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::ElementCount`] if the element count does not
    /// match the product of `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, ShapeError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(ShapeError::ElementCount {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    /// Creates a rank-1 tensor holding `data`.
    #[must_use]
    pub fn flat(data: Vec<f32>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }

    /// Creates a tensor of zeros.
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: vec![0.0; shape.iter().product()],
            shape: shape.to_vec(),
        }
    }

    /// Reinterprets the buffer under a new shape without copying.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::ElementCount`] unless the new shape has exactly
    /// as many elements as the tensor.
    pub fn reshape(self, shape: &[usize]) -> Result<Self, ShapeError> {
        Self::new(self.data, shape.to_vec())
    }

    /// Applies `f` to every element, keeping the shape.
    #[must_use]
    pub fn map(&self, f: impl FnMut(f32) -> f32) -> Self {
        Self {
            data: self.data.iter().copied().map(f).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Dimension sizes.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major element buffer.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Consumes the tensor and returns its buffer.
    #[must_use]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Splits a `[1, C, H, W]` shape into `(C, H, W)`.
    pub(crate) fn nchw(&self, op: &'static str) -> Result<(usize, usize, usize), ShapeError> {
        match self.shape.as_slice() {
            &[1, c, h, w] => Ok((c, h, w)),
            _ => Err(ShapeError::Rank {
                op,
                expected: 4,
                actual: self.shape.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_element_count() {
        let err = Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::ElementCount {
                shape: vec![2, 2],
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_reshape_keeps_data_order() {
        let t = Tensor::flat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = t.reshape(&[2, 3]).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_reshape_rejects_longer_buffer() {
        let t = Tensor::flat(vec![0.0; 5]);
        assert!(t.reshape(&[2, 2]).is_err());
    }

    #[test]
    fn test_nchw_requires_unit_batch() {
        let t = Tensor::zeros(&[2, 1, 4, 4]);
        assert!(t.nchw("test").is_err());
        let t = Tensor::zeros(&[1, 3, 4, 5]);
        assert_eq!(t.nchw("test").unwrap(), (3, 4, 5));
    }

    #[test]
    fn test_scalar_shape_has_one_element() {
        let t = Tensor::new(vec![7.0], vec![]).unwrap();
        assert_eq!(t.numel(), 1);
        assert_eq!(t.rank(), 0);
    }
}
