//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs the build pipeline
//! - prints the run summary
//! - writes the exports

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BuildArgs, CheckArgs, Command};
use crate::domain::BuildConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `agrifood` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Build(args) => handle_build(args),
        Command::Check(args) => handle_check(args),
    }
}

/// Diagnostics go to stderr so stdout stays reserved for the run summary.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn handle_build(args: BuildArgs) -> Result<(), AppError> {
    let config = build_config_from_args(&args);
    let run = pipeline::run_build(&config)?;

    crate::io::export::write_records_json(&config.out_path, &run.records)?;
    if let Some(path) = &config.export_csv {
        crate::io::export::write_records_csv(path, &run.records)?;
    }

    if !args.quiet {
        println!("{}", crate::report::format_run_summary(&run));
        println!("OK -> {} ({} records)", config.out_path.display(), run.records.len());
    }

    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let config = BuildConfig {
        data_dir: resolve_data_dir(args.data_dir.clone()),
        out_path: PathBuf::new(), // never written by `check`
        export_csv: None,
    };
    let run = pipeline::run_build(&config)?;

    println!("{}", crate::report::format_run_summary(&run));
    if args.row_errors {
        print!("{}", crate::report::format_row_errors(&run));
    }

    Ok(())
}

pub fn build_config_from_args(args: &BuildArgs) -> BuildConfig {
    BuildConfig {
        data_dir: resolve_data_dir(args.data_dir.clone()),
        out_path: args
            .out
            .clone()
            .or_else(|| std::env::var_os("AGRIFOOD_OUT").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("public/data/processed.json")),
        export_csv: args.export_csv.clone(),
    }
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("AGRIFOOD_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data/raw"))
}
