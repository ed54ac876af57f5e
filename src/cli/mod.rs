//! Command-line parsing for the agri-food ETL.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pipeline code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "agrifood", version, about = "Agri-food indicators ETL (four CSV tables -> one JSON record list)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline and write the JSON record list (optionally CSV).
    Build(BuildArgs),
    /// Load, fill, and join the inputs without writing any output.
    ///
    /// Exits non-zero on schema errors or duplicate keys; useful as a data
    /// quality gate before publishing.
    Check(CheckArgs),
}

/// Options for `build`.
#[derive(Debug, Parser, Clone)]
pub struct BuildArgs {
    /// Directory containing production.csv, population.csv, diet_cost.csv,
    /// and obesity.csv. Defaults to $AGRIFOOD_DATA_DIR, then "data/raw".
    #[arg(short = 'd', long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output JSON path. Defaults to $AGRIFOOD_OUT, then
    /// "public/data/processed.json".
    #[arg(short = 'o', long, value_name = "JSON")]
    pub out: Option<PathBuf>,

    /// Also export the records as CSV.
    #[arg(long, value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Suppress the run summary on stdout.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Options for `check`.
#[derive(Debug, Parser, Clone)]
pub struct CheckArgs {
    /// Directory containing the four input CSVs. Same defaults as `build`.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// List individual row errors instead of only counting them.
    #[arg(long)]
    pub row_errors: bool,
}
