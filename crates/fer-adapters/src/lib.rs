//! FER Adapters - External adapters for fer.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - FER-2013 CSV dataset
//! - Model file location and inspection
//! - Safetensors conversion

pub mod fer2013;
pub mod fs;
pub mod models;
pub mod weights;

pub use fer2013::{Fer2013Options, Fer2013Samples};
pub use fs::FsImageSource;
pub use models::{default_model_path, inspect_model_file, models_dir, set_models_dir};
pub use weights::{export_safetensors, import_safetensors};
