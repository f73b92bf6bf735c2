//! CLI command definitions and handlers.

pub mod classify;
pub mod evaluate;
pub mod model;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fer_adapters::{default_model_path, set_models_dir};
use tracing::debug;

/// FER - Classify facial expressions in 48x48 face crops
#[derive(Parser)]
#[command(name = "fer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared classify arguments (paths, model, output flags).
    #[command(flatten)]
    pub classify: classify::ClassifyArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Classify face images
    Classify(classify::ClassifyArgs),
    /// Measure accuracy on a FER-2013 CSV file
    Evaluate(evaluate::EvaluateArgs),
    /// Inspect and convert parameter files
    Model(model::ModelArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed.
    Success = 0,
    /// Command failed.
    Error = 1,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

/// Picks the parameter file: an explicit path wins, then a models
/// directory override, then the default location.
pub fn resolve_model_path(model: Option<&Path>, models_dir: Option<&Path>) -> PathBuf {
    if let Some(path) = model {
        return path.to_path_buf();
    }

    if let Some(dir) = models_dir {
        debug!("Using custom models directory: {}", dir.display());
        set_models_dir(Some(dir.to_path_buf()));
    }

    default_model_path()
}
