//! Lazily loaded model.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::model::Model;

/// A model that is read from disk on first access.
pub struct LazyModel {
    path: PathBuf,
    model: OnceCell<Model>,
}

impl LazyModel {
    /// Creates a new lazy model loader.
    ///
    /// The file is not touched until `get()` is called.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            model: OnceCell::new(),
        }
    }

    /// Gets the model, loading it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model file cannot be read
    /// - The tensor stream is malformed
    /// - The tensors do not fit the architecture
    pub fn get(&self) -> Result<&Model> {
        self.model.get_or_try_init(|| {
            debug!("Loading model from {}", self.path.display());
            Model::load(&self.path)
                .with_context(|| format!("Failed to load model: {}", self.path.display()))
        })
    }

    /// Returns true if the model has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Path of the parameter file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl From<Model> for LazyModel {
    fn from(model: Model) -> Self {
        Self {
            path: PathBuf::from("<memory>"),
            model: OnceCell::with_value(model),
        }
    }
}
