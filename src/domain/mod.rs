//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalized input rows (`SeriesRow`, `ProductionRow`)
//! - keyed facts and the year-slot arena (`TimePoint`, `YearSlots`)
//! - joined/enriched rows and the export schema (`JoinedRow`, `OutputRecord`)

pub mod types;

pub use types::*;
