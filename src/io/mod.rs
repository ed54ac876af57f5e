//! Input/output helpers.
//!
//! - CSV ingest + normalization (`ingest`)
//! - record exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
