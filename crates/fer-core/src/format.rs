//! Binary tensor stream format.
//!
//! Layout, all integers little-endian `u64`:
//!
//! ```text
//! tensor_count
//! repeat tensor_count times:
//!     element_count
//!     f32[element_count]   (little-endian)
//! ```
//!
//! There is no magic, version or checksum. Tensors are stored flat; giving
//! them a shape is the model assembler's job.

use std::io::{self, Read, Write};

use tracing::{debug, trace};

use crate::error::FormatError;
use crate::tensor::Tensor;

/// Ordered flat tensors exactly as they appear in a stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TensorStream {
    tensors: Vec<Tensor>,
}

impl TensorStream {
    /// Wraps tensors in stream order.
    #[must_use]
    pub const fn new(tensors: Vec<Tensor>) -> Self {
        Self { tensors }
    }

    /// Reads a whole stream from `reader`.
    ///
    /// # Errors
    ///
    /// - [`FormatError::EmptyOrTruncatedHeader`] if the tensor count cannot be read
    /// - [`FormatError::TruncatedTensorData`] if a tensor's element count or
    ///   data runs past the end of the source
    /// - [`FormatError::Io`] for any other read failure
    pub fn read<R: Read>(mut reader: R) -> Result<Self, FormatError> {
        let count = read_u64(&mut reader)
            .map_err(|e| eof_as(e, FormatError::EmptyOrTruncatedHeader))?;
        debug!("Tensor stream declares {count} tensors");

        let mut tensors = Vec::new();
        for (_, index) in (0..count).zip(0usize..) {
            let tensor = read_tensor(&mut reader, index)?;
            trace!("Read tensor {index} with {} elements", tensor.numel());
            tensors.push(tensor);
        }

        Ok(Self { tensors })
    }

    /// Writes the stream in the same format [`TensorStream::read`] accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write<W: Write>(&self, writer: W) -> io::Result<()> {
        write_tensors(writer, &self.tensors)
    }

    /// Number of tensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Returns true if the stream holds no tensors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Tensors in stream order.
    #[must_use]
    pub fn tensors(&self) -> &[Tensor] {
        &self.tensors
    }

    /// Consumes the stream and returns its tensors.
    #[must_use]
    pub fn into_tensors(self) -> Vec<Tensor> {
        self.tensors
    }
}

/// Writes `tensors` as a flat tensor stream. Shapes are not recorded.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_tensors<'a, W, I>(mut writer: W, tensors: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Tensor>,
    I::IntoIter: ExactSizeIterator,
{
    let tensors = tensors.into_iter();
    writer.write_all(&(tensors.len() as u64).to_le_bytes())?;

    for tensor in tensors {
        writer.write_all(&(tensor.numel() as u64).to_le_bytes())?;
        let mut bytes = Vec::with_capacity(tensor.numel() * 4);
        for value in tensor.data() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        writer.write_all(&bytes)?;
    }

    writer.flush()
}

fn read_tensor<R: Read>(reader: &mut R, index: usize) -> Result<Tensor, FormatError> {
    let truncated = || FormatError::TruncatedTensorData { index };

    let count = read_u64(reader).map_err(|e| eof_as(e, truncated()))?;

    // Oversized counts are not rejected up front; they surface as a short read.
    let byte_len = usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(truncated)?;

    let mut bytes = Vec::new();
    reader
        .by_ref()
        .take(byte_len as u64)
        .read_to_end(&mut bytes)
        .map_err(FormatError::Io)?;
    if bytes.len() != byte_len {
        return Err(truncated());
    }

    let data = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(Tensor::flat(data))
}

fn read_u64<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn eof_as(err: io::Error, eof: FormatError) -> FormatError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        eof
    } else {
        FormatError::Io(err)
    }
}
