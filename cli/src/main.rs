//! skirmish - battle telemetry unit analytics.
//!
//! Usage:
//!   skirmish convert [CSV]
//!   skirmish analyze [PARQUET] [--catalog JSON] [--top N] [--output CSV]
//!   skirmish catalog [JSON] [--preview N]
//!   skirmish run [CSV] [--catalog JSON] [--top N]
//!
//! Paths left out on the command line come from the stored config.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use skirmish_core::analysis::AnalysisOptions;
use skirmish_core::config::SkirmishConfig;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Unit statistics from exported battle telemetry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a battle CSV export to Parquet
    Convert { csv: Option<PathBuf> },
    /// Aggregate unit statistics from a Parquet dataset
    Analyze {
        parquet: Option<PathBuf>,
        #[arg(short, long)]
        catalog: Option<PathBuf>,
        #[arg(short, long)]
        top: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load a unit catalog and list its first entries
    Catalog {
        json: Option<PathBuf>,
        #[arg(short, long, default_value_t = 5)]
        preview: usize,
    },
    /// Convert, then analyze the result
    Run {
        csv: Option<PathBuf>,
        #[arg(short, long)]
        catalog: Option<PathBuf>,
        #[arg(short, long)]
        top: Option<usize>,
    },
}

/// Initialize logging, writing to SKIRMISH_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("SKIRMISH_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Use the argument if given, otherwise the configured default.
fn resolve(arg: Option<PathBuf>, configured: Option<PathBuf>, what: &str) -> Option<PathBuf> {
    let path = arg.or(configured);
    if path.is_none() {
        tracing::error!("No {what} given and none configured");
    }
    path
}

fn analysis_options(config: &SkirmishConfig, top: Option<usize>, output: Option<PathBuf>) -> AnalysisOptions {
    AnalysisOptions {
        top_n: top.unwrap_or(config.top_n),
        output,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let config = SkirmishConfig::load();

    match cli.command {
        Commands::Convert { csv } => {
            let Some(csv) = resolve(csv, config.battles_csv.clone(), "CSV path") else {
                return ExitCode::from(2);
            };
            commands::convert(&csv).await;
        }
        Commands::Analyze {
            parquet,
            catalog,
            top,
            output,
        } => {
            let Some(parquet) = resolve(parquet, config.battles_parquet(), "Parquet path") else {
                return ExitCode::from(2);
            };
            let Some(catalog) = resolve(catalog, config.catalog_json.clone(), "catalog path") else {
                return ExitCode::from(2);
            };
            let options = analysis_options(&config, top, output);
            commands::analyze(&parquet, &catalog, &options).await;
        }
        Commands::Catalog { json, preview } => {
            let Some(json) = resolve(json, config.catalog_json.clone(), "catalog path") else {
                return ExitCode::from(2);
            };
            commands::catalog(&json, preview);
        }
        Commands::Run { csv, catalog, top } => {
            let Some(csv) = resolve(csv, config.battles_csv.clone(), "CSV path") else {
                return ExitCode::from(2);
            };
            let Some(catalog) = resolve(catalog, config.catalog_json.clone(), "catalog path") else {
                return ExitCode::from(2);
            };
            let options = analysis_options(&config, top, None);
            commands::run(&csv, &catalog, &options).await;
        }
    }

    ExitCode::SUCCESS
}
