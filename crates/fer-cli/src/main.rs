//! FER CLI - Facial expression classification for face crops.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{classify::ClassifyArgs, Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let result = match cli.command {
        Some(Commands::Classify(args)) => {
            commands::classify::run(&ClassifyArgs::with_config(args, &config))
        }
        Some(Commands::Evaluate(args)) => commands::evaluate::run(
            &commands::evaluate::EvaluateArgs::with_config(args, &config),
        ),
        Some(Commands::Model(ref args)) => commands::model::run(args, &config),
        None => {
            // Default behavior: classify with flattened args
            if cli.classify.paths.is_empty() {
                eprintln!("error: No paths specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            commands::classify::run(&ClassifyArgs::with_config(cli.classify, &config))
        }
    };

    match result {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error.into()
        }
    }
}
