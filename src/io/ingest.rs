//! CSV ingest and normalization.
//!
//! This module is responsible for turning the four raw input CSVs into typed
//! rows that are safe to join and compute on.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Lenient values**: an unparsable number or year becomes a missing
//!   value, never an error
//! - **Row-level validation** (skip rows without a country, but report them)
//! - **Deterministic behavior** (rows keep their input order)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{ProductionRow, SeriesRow, Table};
use crate::error::AppError;

/// A row-level problem encountered during ingest.
///
/// These are reported in the run summary but never abort the run: the only
/// fatal ingest conditions are an unreadable file or a missing column.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// One normalized input table plus its ingest bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedTable<T> {
    pub table: Table,
    pub rows: Vec<T>,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

/// All four normalized input tables.
#[derive(Debug, Clone)]
pub struct IngestedInputs {
    pub production: IngestedTable<ProductionRow>,
    pub population: IngestedTable<SeriesRow>,
    pub diet_cost: IngestedTable<SeriesRow>,
    pub obesity: IngestedTable<SeriesRow>,
}

/// Load and normalize the four input CSVs from `data_dir`.
pub fn load_input_tables(data_dir: &Path) -> Result<IngestedInputs, AppError> {
    let production = read_production_table(open_table(data_dir, Table::Production)?)?;
    let population = read_series_table(open_table(data_dir, Table::Population)?, Table::Population)?;
    let diet_cost = read_series_table(open_table(data_dir, Table::DietCost)?, Table::DietCost)?;
    let obesity = read_series_table(open_table(data_dir, Table::Obesity)?, Table::Obesity)?;

    warn_row_errors(&production);
    warn_row_errors(&population);
    warn_row_errors(&diet_cost);
    warn_row_errors(&obesity);

    Ok(IngestedInputs {
        production,
        population,
        diet_cost,
        obesity,
    })
}

fn warn_row_errors<T>(ingested: &IngestedTable<T>) {
    if !ingested.row_errors.is_empty() {
        warn!(
            table = ingested.table.display_name(),
            rows_read = ingested.rows_read,
            row_errors = ingested.row_errors.len(),
            "Rows skipped during ingest"
        );
    }
}

fn open_table(data_dir: &Path, table: Table) -> Result<File, AppError> {
    let path = data_dir.join(table.file_name());
    debug!(path = %path.display(), "Opening input table");
    File::open(&path).map_err(|e| {
        AppError::io(format!(
            "Failed to open {} table '{}': {e}",
            table.display_name(),
            path.display()
        ))
    })
}

/// Normalize a country+year table (population, diet cost, obesity).
///
/// Population stores its value in `valuetotal`; the others use `value`.
pub fn read_series_table<R: Read>(reader: R, table: Table) -> Result<IngestedTable<SeriesRow>, AppError> {
    let value_col = match table {
        Table::Population => "valuetotal",
        _ => "value",
    };

    read_table(reader, table, &["area", "year", value_col], |record, cols| {
        let country = required_str(record, cols, "area")?;
        Ok(SeriesRow {
            country: country.to_string(),
            year: parse_opt_year(optional_str(record, cols, "year")),
            value: parse_opt_f64(optional_str(record, cols, value_col)),
        })
    })
}

/// Normalize the production table (country+year+category).
pub fn read_production_table<R: Read>(reader: R) -> Result<IngestedTable<ProductionRow>, AppError> {
    read_table(
        reader,
        Table::Production,
        &["area", "item", "year", "value"],
        |record, cols| {
            let country = required_str(record, cols, "area")?;
            let category = required_str(record, cols, "item")?;
            Ok(ProductionRow {
                country: country.to_string(),
                year: parse_opt_year(optional_str(record, cols, "year")),
                category: category.to_string(),
                value: parse_opt_f64(optional_str(record, cols, "value")),
            })
        },
    )
}

fn read_table<R, T>(
    reader: R,
    table: Table,
    required: &[&str],
    parse: impl Fn(&StringRecord, &HashMap<String, usize>) -> Result<T, String>,
) -> Result<IngestedTable<T>, AppError>
where
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| {
            AppError::io(format!(
                "Failed to read CSV headers of {} table: {e}",
                table.display_name()
            ))
        })?
        .clone();

    let cols = build_header_map(&headers);
    for name in required {
        if !cols.contains_key(*name) {
            return Err(AppError::io(format!(
                "Missing required column `{name}` in {} table",
                table.display_name()
            )));
        }
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in csv_reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse(&record, &cols) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(IngestedTable {
        table,
        rows,
        rows_read,
        row_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿Area"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn required_str<'a>(
    record: &'a StringRecord,
    cols: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    optional_str(record, cols, name).ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn optional_str<'a>(record: &'a StringRecord, cols: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = cols.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Lenient numeric parse: anything that is not a finite number is missing.
fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Lenient year parse.
///
/// Accepts plain integers and float spellings of integers (`"2020.0"`, as
/// numeric exports sometimes produce); anything else is missing.
fn parse_opt_year(s: Option<&str>) -> Option<i32> {
    let s = s?;
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&v) {
        Some(v as i32)
    } else {
        None
    }
}
