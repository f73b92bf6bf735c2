//! Evaluate command - accuracy over a labelled FER-2013 file.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fer_adapters::{Fer2013Options, Fer2013Samples};
use fer_core::{evaluate, EvaluationReport, Model};
use serde::Serialize;
use tracing::info;

use super::{resolve_model_path, ExitCode};
use crate::config::AppConfig;

/// Arguments for the evaluate command.
#[derive(Args, Clone, Default)]
pub struct EvaluateArgs {
    /// FER-2013 CSV file (`emotion,pixels[,Usage]`)
    pub dataset: PathBuf,

    /// Parameter file (overrides config and models directory)
    #[arg(short, long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Stop after this many samples
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Only use rows from this split, e.g. `PublicTest`
    #[arg(long)]
    pub usage: Option<String>,

    /// Pretty-print the report
    #[arg(long)]
    pub pretty: bool,
}

impl EvaluateArgs {
    /// Apply configuration file values, respecting CLI precedence.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if args.model.is_none() {
            args.model.clone_from(&config.model.path);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.model.dir);
        }
        args.limit = args.limit.or(config.evaluate.limit);
        if args.usage.is_none() {
            args.usage.clone_from(&config.evaluate.usage);
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        args
    }
}

#[derive(Serialize)]
struct Report<'a> {
    dataset: &'a str,
    model: &'a str,
    skipped_rows: usize,
    #[serde(flatten)]
    metrics: EvaluationReport,
}

/// Run the evaluate command.
pub fn run(args: &EvaluateArgs) -> Result<ExitCode> {
    let model_path = resolve_model_path(args.model.as_deref(), args.models_dir.as_deref());
    let model = Model::load(&model_path)
        .with_context(|| format!("Failed to load model: {}", model_path.display()))?;

    let options = Fer2013Options {
        limit: args.limit.and_then(|n| usize::try_from(n).ok()),
        usage: args.usage.clone(),
    };
    let mut samples = Fer2013Samples::open(&args.dataset, options)?;
    let matrix = evaluate(&model, &mut samples)?;

    info!(
        "Accuracy {:.4} over {} samples",
        matrix.accuracy(),
        matrix.total()
    );

    let dataset = args.dataset.to_string_lossy();
    let model = model_path.to_string_lossy();
    let report = Report {
        dataset: &dataset,
        model: &model,
        skipped_rows: samples.skipped(),
        metrics: matrix.report(),
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    writeln!(io::stdout().lock(), "{json}")?;

    Ok(ExitCode::Success)
}
