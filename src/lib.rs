//! `agrifood-etl` library crate.
//!
//! The binary (`agrifood`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - modules are reusable (e.g., future web backend, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fill;
pub mod io;
pub mod join;
pub mod metrics;
pub mod report;
