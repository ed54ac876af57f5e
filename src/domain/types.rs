//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during joining and metric computation
//! - exported to JSON/CSV
//! - reloaded later by downstream consumers (dashboards, notebooks)
//!
//! Missing values are `Option<f64>` throughout. Zero and NaN are never used
//! as sentinels: every derived computation checks presence before touching a
//! possibly-missing operand.

use std::path::PathBuf;

use serde::Serialize;

/// First year of the dense obesity series (inclusive).
pub const FIRST_YEAR: i32 = 2017;

/// Last year of the dense obesity series (inclusive).
pub const LAST_YEAR: i32 = 2023;

/// Number of year slots in the dense obesity series.
pub const YEAR_SPAN: usize = (LAST_YEAR - FIRST_YEAR + 1) as usize;

/// Fixed-size arena of one value slot per year in `[FIRST_YEAR, LAST_YEAR]`.
///
/// Index `i` corresponds to year `FIRST_YEAR + i`. Using a fixed array (not a
/// sparse map) keeps the interpolation and boundary-fill logic index-safe.
pub type YearSlots = [Option<f64>; YEAR_SPAN];

/// The four input tables, used for error messages and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Production,
    Population,
    DietCost,
    Obesity,
}

impl Table {
    pub fn display_name(self) -> &'static str {
        match self {
            Table::Production => "production",
            Table::Population => "population",
            Table::DietCost => "diet_cost",
            Table::Obesity => "obesity",
        }
    }

    /// CSV file name for this table inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Table::Production => "production.csv",
            Table::Population => "population.csv",
            Table::DietCost => "diet_cost.csv",
            Table::Obesity => "obesity.csv",
        }
    }
}

/// A normalized row of a country+year table (population, diet cost, obesity).
///
/// `year` stays optional after normalization: rows with an unparsable year are
/// retained here and only fall out later, when facts are keyed by
/// (country, year).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub country: String,
    pub year: Option<i32>,
    pub value: Option<f64>,
}

/// A normalized production row. Category is a free-form label (a commodity or
/// an "Agriculture" aggregate); multiple categories coexist per country+year.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRow {
    pub country: String,
    pub year: Option<i32>,
    pub category: String,
    pub value: Option<f64>,
}

/// A keyed country+year fact. The gap filler emits these: dense over
/// `[FIRST_YEAR, LAST_YEAR]` per country, `value: None` only when the country
/// had no data at all.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    pub country: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// One production row denormalized with the matching country+year facts.
///
/// Created once by the joiner, enriched (never re-keyed) by the metric
/// engine, terminal when exported.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub country: String,
    pub year: i32,
    pub category: String,
    pub production_value: Option<f64>,
    pub population: Option<f64>,
    pub diet_cost: Option<f64>,
    pub obesity: Option<f64>,
}

/// The exported record schema, one record per (country, year, category).
///
/// `Option::None` serializes as JSON `null`; booleans are real booleans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub country: String,
    pub category: String,
    pub year: i32,
    pub production_value: Option<f64>,
    pub population: Option<f64>,
    pub production_per_capita: Option<f64>,
    pub production_growth_pct: Option<f64>,
    pub diet_cost_value: Option<f64>,
    pub diet_cost_variation_pct: Option<f64>,
    pub obesity_value: Option<f64>,
    pub obesity_prevalence_pct: Option<f64>,
    pub obesity_prevalence_variation_pct: Option<f64>,
    pub has_diet_cost: bool,
    pub has_obesity: bool,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus environment defaults.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding the four input CSVs.
    pub data_dir: PathBuf,
    /// Path of the JSON record list to write.
    pub out_path: PathBuf,
    /// Optional CSV export of the same records.
    pub export_csv: Option<PathBuf>,
}
