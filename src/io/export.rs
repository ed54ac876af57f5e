//! Export the enriched record list to JSON and CSV.
//!
//! JSON is the primary output (a flat array of records, missing values as
//! `null`), matching what downstream dashboards consume. The CSV export is an
//! optional convenience for spreadsheets; missing values become empty fields.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::info;

use crate::domain::OutputRecord;
use crate::error::AppError;

/// Write the record list as a JSON array.
pub fn write_records_json(path: &Path, records: &[OutputRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::io(format!("Failed to create output JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer(BufWriter::new(file), records)
        .map_err(|e| AppError::io(format!("Failed to write output JSON '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = records.len(), "Wrote JSON records");
    Ok(())
}

/// Write the record list as CSV with a header row.
pub fn write_records_csv(path: &Path, records: &[OutputRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::io(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), rows = records.len(), "Wrote CSV records");
    Ok(())
}
