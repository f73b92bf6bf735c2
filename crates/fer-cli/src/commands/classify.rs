//! Classify command - predict the expression of each face crop.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use fer_adapters::FsImageSource;
use fer_core::{BatchClassifier, ImageSource, LazyModel};
use tracing::{debug, info};

use super::{resolve_model_path, ExitCode};
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

impl OutputFormat {
    /// Parses a config file value.
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "json" => Some(Self::Json),
            "jsonl" => Some(Self::Jsonl),
            _ => None,
        }
    }
}

/// Arguments for classifying images.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClassifyArgs {
    /// Face images or directories to classify
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Parameter file (overrides config and models directory)
    #[arg(short, long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Include all seven class probabilities in each record
    #[arg(long)]
    pub probabilities: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl ClassifyArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if args.model.is_none() {
            args.model.clone_from(&config.model.path);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.model.dir);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(OutputFormat::from_config);
        }

        // Boolean output options: CLI flag wins, then config
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.probabilities {
            args.probabilities = config.output.probabilities.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Output format with fallback to JSONL.
    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Run the classify command.
///
/// Expects `args` to have been processed through `with_config()` first.
pub fn run(args: &ClassifyArgs) -> Result<ExitCode> {
    info!("Running classify command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let model_path = resolve_model_path(args.model.as_deref(), args.models_dir.as_deref());
    debug!("Model file: {}", model_path.display());
    let model = LazyModel::new(model_path);

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout(args.format(), args.pretty);

    BatchClassifier::new(&model)
        .with_probabilities(args.probabilities)
        .with_clock(iso_timestamp)
        .run(&source, &output, &progress_bar)?;

    Ok(ExitCode::Success)
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            fer_core::runner::EPOCH_TIMESTAMP.to_string()
        }
    }
}
