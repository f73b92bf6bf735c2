//! Model command - inspect and convert parameter files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use fer_adapters::{export_safetensors, import_safetensors, inspect_model_file};
use fer_core::Model;

use super::{resolve_model_path, ExitCode};
use crate::config::AppConfig;

/// Arguments for the model command
#[derive(Args)]
pub struct ModelArgs {
    #[command(subcommand)]
    pub command: ModelCommand,
}

/// Model subcommands
#[derive(Subcommand)]
pub enum ModelCommand {
    /// Report the tensors in a parameter file and its SHA-256
    Inspect {
        /// Parameter file (defaults to the configured model)
        file: Option<PathBuf>,
    },
    /// Convert a parameter file to safetensors
    Export {
        /// Parameter file to read
        input: PathBuf,
        /// Safetensors file to write
        output: PathBuf,
    },
    /// Convert a safetensors file to the parameter file format
    Import {
        /// Safetensors file to read
        input: PathBuf,
        /// Parameter file to write
        output: PathBuf,
    },
    /// Print the parameter file path used by default
    Path,
}

/// Run the model command.
pub fn run(args: &ModelArgs, config: &AppConfig) -> Result<ExitCode> {
    match &args.command {
        ModelCommand::Inspect { file } => inspect(file.clone(), config),
        ModelCommand::Export { input, output } => {
            let model = Model::load(input)
                .with_context(|| format!("Failed to load model: {}", input.display()))?;
            export_safetensors(&model, output)?;
            Ok(ExitCode::Success)
        }
        ModelCommand::Import { input, output } => {
            let model = import_safetensors(input)?;
            model
                .save(output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            Ok(ExitCode::Success)
        }
        ModelCommand::Path => {
            println!("{}", configured_model_path(config).display());
            Ok(ExitCode::Success)
        }
    }
}

fn configured_model_path(config: &AppConfig) -> PathBuf {
    resolve_model_path(config.model.path.as_deref(), config.model.dir.as_deref())
}

fn inspect(file: Option<PathBuf>, config: &AppConfig) -> Result<ExitCode> {
    let path = file.unwrap_or_else(|| configured_model_path(config));
    let report = inspect_model_file(&path)?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(problem) = &report.problem {
        eprintln!("error: {problem}");
        return Ok(ExitCode::Error);
    }
    Ok(ExitCode::Success)
}
