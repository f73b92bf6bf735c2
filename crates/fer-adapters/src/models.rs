//! Model file location and inspection.

use anyhow::{Context, Result};
use fer_core::model::{PARAMETER_NAMES, PARAMETER_SHAPES};
use fer_core::{Model, TensorStream};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// File name of the parameter file inside the models directory.
pub const MODEL_FILENAME: &str = "fer_model.bin";

static MODELS_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Overrides the models directory for the rest of the process.
///
/// `None` restores the default location.
pub fn set_models_dir(dir: Option<PathBuf>) {
    if let Ok(mut guard) = MODELS_DIR_OVERRIDE.write() {
        *guard = dir;
    }
}

/// Returns the models directory path.
///
/// Uses the override if one is set, otherwise `XDG_DATA_HOME/fer/models`
/// or `~/.local/share/fer/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    if let Some(dir) = MODELS_DIR_OVERRIDE
        .read()
        .ok()
        .and_then(|guard| guard.clone())
    {
        return dir;
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fer")
        .join("models")
}

/// Path of the parameter file used when none is given.
#[must_use]
pub fn default_model_path() -> PathBuf {
    models_dir().join(MODEL_FILENAME)
}

/// What a parameter file contains, whether or not it is a valid model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInspection {
    /// Inspected file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Hex SHA-256 of the file.
    pub sha256: String,
    /// Tensors declared by the stream.
    pub tensor_count: usize,
    /// One entry per tensor, in stream order.
    pub tensors: Vec<TensorEntry>,
    /// Tensors past the six parameters.
    pub trailing: usize,
    /// Why the tensors do not form a model, if they don't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

impl ModelInspection {
    /// Returns true if the file loads as a model.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.problem.is_none()
    }
}

/// One tensor of an inspected stream.
#[derive(Debug, Clone, Serialize)]
pub struct TensorEntry {
    pub index: usize,
    /// Parameter name, `None` for trailing tensors.
    pub name: Option<&'static str>,
    pub elements: usize,
    /// Shape the assembler gives this position, `None` for trailing tensors.
    pub expected_shape: Option<Vec<usize>>,
    pub matches: bool,
}

/// Reads a parameter file and reports its contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a tensor stream.
/// A stream that parses but does not fit the architecture is reported
/// through [`ModelInspection::problem`] instead.
pub fn inspect_model_file(path: impl AsRef<Path>) -> Result<ModelInspection> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read model: {}", path.display()))?;

    let sha256 = format!("{:x}", Sha256::digest(&bytes));
    debug!("{} sha256 {sha256}", path.display());

    let stream = TensorStream::read(bytes.as_slice())
        .with_context(|| format!("Malformed tensor stream: {}", path.display()))?;

    let tensors = stream
        .tensors()
        .iter()
        .enumerate()
        .map(|(index, tensor)| {
            let expected = PARAMETER_SHAPES.get(index);
            TensorEntry {
                index,
                name: PARAMETER_NAMES.get(index).copied(),
                elements: tensor.numel(),
                expected_shape: expected.map(|shape| shape.to_vec()),
                matches: expected
                    .is_some_and(|shape| shape.iter().product::<usize>() == tensor.numel()),
            }
        })
        .collect();

    let tensor_count = stream.len();
    let problem = Model::from_stream(stream).err().map(|e| e.to_string());

    Ok(ModelInspection {
        path: path.to_path_buf(),
        size: bytes.len() as u64,
        sha256,
        tensor_count,
        tensors,
        trailing: tensor_count.saturating_sub(PARAMETER_SHAPES.len()),
        problem,
    })
}
