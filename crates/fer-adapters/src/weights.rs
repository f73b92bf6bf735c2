//! Conversion between the tensor stream format and safetensors.
//!
//! Parameters are stored under their layer names (`conv1.weight`, ...) with
//! their architecture shapes. Only F32 tensors are accepted on import.

use anyhow::{Context, Result};
use fer_core::model::{PARAMETER_NAMES, PARAMETER_SHAPES};
use fer_core::{Model, Tensor, TensorStream};
use safetensors::tensor::TensorView;
use safetensors::{serialize, Dtype, SafeTensors};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Encodes a model as safetensors bytes.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_safetensors(model: &Model) -> Result<Vec<u8>> {
    let buffers: Vec<(&str, Vec<usize>, Vec<u8>)> = model
        .parameters()
        .iter()
        .map(|(name, tensor)| {
            let bytes = tensor.data().iter().flat_map(|v| v.to_le_bytes()).collect();
            (*name, tensor.shape().to_vec(), bytes)
        })
        .collect();

    let mut views = HashMap::new();
    for (name, shape, bytes) in &buffers {
        let view = TensorView::new(Dtype::F32, shape.clone(), bytes)
            .with_context(|| format!("Invalid tensor '{name}'"))?;
        views.insert((*name).to_string(), view);
    }

    serialize(&views, &None).context("Failed to serialize safetensors")
}

/// Decodes a model from safetensors bytes.
///
/// # Errors
///
/// Returns an error if a parameter is missing, is not F32, or has the
/// wrong shape.
pub fn from_safetensors(data: &[u8]) -> Result<Model> {
    let tensors = SafeTensors::deserialize(data).context("Failed to parse safetensors")?;

    let mut flat = Vec::with_capacity(PARAMETER_NAMES.len());
    for (name, shape) in PARAMETER_NAMES.iter().zip(PARAMETER_SHAPES) {
        let view = tensors
            .tensor(name)
            .with_context(|| format!("Failed to get tensor '{name}'"))?;

        if view.dtype() != Dtype::F32 {
            anyhow::bail!("Tensor '{name}' is {:?}, expected F32", view.dtype());
        }
        if view.shape() != shape {
            anyhow::bail!(
                "Tensor '{name}' has shape {:?}, expected {shape:?}",
                view.shape()
            );
        }

        let data = view
            .data()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        flat.push(Tensor::flat(data));
    }

    let extra = tensors.names().len().saturating_sub(PARAMETER_NAMES.len());
    if extra > 0 {
        debug!("Ignoring {extra} extra safetensors entries");
    }

    Ok(Model::from_stream(TensorStream::new(flat))?)
}

/// Writes a model to a safetensors file.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn export_safetensors(model: &Model, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_safetensors(model)?;
    std::fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Exported model to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Reads a model from a safetensors file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold the six
/// parameters.
pub fn import_safetensors(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    debug!("Loading safetensors from {}", path.display());

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;

    from_safetensors(&data).with_context(|| format!("Invalid model: {}", path.display()))
}
