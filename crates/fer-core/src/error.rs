//! Error taxonomy for loading and running the classifier.
//!
//! Loading fails with [`FormatError`] (bytes do not form a tensor stream) or
//! [`ModelError`] (stream has the wrong structure). Element-count and
//! dimension problems, at load time or inside a kernel, are [`ShapeError`]s.

use thiserror::Error;

/// Result alias used throughout `fer-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed or truncated binary tensor stream.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The source ended before the 8-byte tensor count could be read.
    #[error("model file is empty or its tensor count header is truncated")]
    EmptyOrTruncatedHeader,
    /// Tensor `index` declared more data than the source holds.
    #[error("tensor {index} is truncated: declared element count exceeds remaining bytes")]
    TruncatedTensorData {
        /// Position of the tensor in the stream.
        index: usize,
    },
    /// The byte source failed for a reason other than running out of data.
    #[error("failed to read tensor stream")]
    Io(#[source] std::io::Error),
}

/// Element-count or dimension mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A parameter tensor does not match its fixed architecture shape.
    #[error("parameter {index}: expected shape {expected:?}, got {actual:?}")]
    ParameterMismatch {
        /// Position of the tensor in the stream.
        index: usize,
        /// Shape required by the architecture.
        expected: Vec<usize>,
        /// Shape of the flat tensor found in the stream.
        actual: Vec<usize>,
    },
    /// Buffer length does not equal the product of the requested shape.
    #[error("shape {shape:?} needs {expected} elements, buffer has {actual}")]
    ElementCount {
        /// Requested shape.
        shape: Vec<usize>,
        /// Product of the requested shape.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },
    /// An operation received a tensor of the wrong rank.
    #[error("{op}: expected rank {expected}, got shape {actual:?}")]
    Rank {
        /// Operation name.
        op: &'static str,
        /// Required rank.
        expected: usize,
        /// Offending shape.
        actual: Vec<usize>,
    },
    /// Two operands cannot be combined.
    #[error("{op}: incompatible shapes {left:?} and {right:?}")]
    Incompatible {
        /// Operation name.
        op: &'static str,
        /// Shape of the first operand.
        left: Vec<usize>,
        /// Shape of the second operand.
        right: Vec<usize>,
    },
    /// 2x2 pooling requires even spatial dimensions.
    #[error("{op}: spatial dimensions {height}x{width} must both be even")]
    OddSpatial {
        /// Operation name.
        op: &'static str,
        /// Input height.
        height: usize,
        /// Input width.
        width: usize,
    },
}

/// Structural problems with the tensor stream as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The stream holds fewer tensors than the architecture needs.
    #[error("model needs {expected} tensors, stream has {found}")]
    InsufficientTensors {
        /// Tensors required by the architecture.
        expected: usize,
        /// Tensors present in the stream.
        found: usize,
    },
}

/// Any failure produced by `fer-core`.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed tensor stream.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Shape mismatch at load time or inside a kernel.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// Wrong number of tensors.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// The model file could not be opened or created.
    #[error("model file I/O failed")]
    Io(#[from] std::io::Error),
}
