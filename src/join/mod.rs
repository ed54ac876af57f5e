//! Merge the four tables into one denormalized row set.
//!
//! Population, diet cost, and (filled) obesity are country+year facts; each
//! one fans out to every category row of that country+year in production.
//!
//! Join rules:
//! - population: **inner** — production without population context is dropped;
//! - diet cost: **left** — a missing entry leaves the field missing;
//! - filled obesity: **left** — only countries with zero obesity data, or
//!   years outside the filled range, show up missing here.
//!
//! Duplicate keys where uniqueness is assumed are fatal; resolving them
//! silently would produce wrong fan-outs.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::{JoinedRow, ProductionRow, SeriesRow, Table, TimePoint};
use crate::error::AppError;

/// Produce one [`JoinedRow`] per production row whose (country, year) exists
/// in the population table.
///
/// Rows whose year failed to parse cannot be keyed and are dropped by the
/// inner join, matching what a key-equality merge does with an absent key.
pub fn join_tables(
    production: &[ProductionRow],
    population: &[SeriesRow],
    diet_cost: &[SeriesRow],
    obesity_filled: &[TimePoint],
) -> Result<Vec<JoinedRow>, AppError> {
    let population = series_map(population, Table::Population)?;
    let diet_cost = series_map(diet_cost, Table::DietCost)?;

    // The gap filler already rejected duplicates and emits one point per
    // country+year, so this map build cannot collide.
    let obesity: HashMap<(&str, i32), Option<f64>> = obesity_filled
        .iter()
        .map(|p| ((p.country.as_str(), p.year), p.value))
        .collect();

    let mut seen: HashSet<(&str, i32, &str)> = HashSet::with_capacity(production.len());
    let mut out = Vec::new();

    for row in production {
        let Some(year) = row.year else { continue };

        if !seen.insert((row.country.as_str(), year, row.category.as_str())) {
            return Err(AppError::structural(format!(
                "Duplicate (country, year, category) key in production table: {} / {year} / {}",
                row.country, row.category
            )));
        }

        let key = (row.country.as_str(), year);
        let Some(&pop_value) = population.get(&key) else {
            continue; // inner join: no population context, row dropped
        };

        out.push(JoinedRow {
            country: row.country.clone(),
            year,
            category: row.category.clone(),
            production_value: row.value,
            population: pop_value,
            diet_cost: diet_cost.get(&key).copied().flatten(),
            obesity: obesity.get(&key).copied().flatten(),
        });
    }

    debug!(
        production_rows = production.len(),
        joined_rows = out.len(),
        "Tables joined"
    );

    Ok(out)
}

/// Key a country+year table for lookup, rejecting duplicate keys.
fn series_map<'a>(
    rows: &'a [SeriesRow],
    table: Table,
) -> Result<HashMap<(&'a str, i32), Option<f64>>, AppError> {
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(year) = row.year else { continue };
        if map.insert((row.country.as_str(), year), row.value).is_some() {
            return Err(AppError::structural(format!(
                "Duplicate (country, year) key in {} table: {} / {year}",
                table.display_name(),
                row.country
            )));
        }
    }
    Ok(map)
}
