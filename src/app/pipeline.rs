//! Shared build pipeline used by the `build` and `check` subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> gap fill -> join -> metrics
//!
//! The subcommands (and tests) then focus on presentation and exports.

use tracing::info;

use crate::domain::{BuildConfig, OutputRecord, YEAR_SPAN};
use crate::error::AppError;
use crate::io::ingest::{IngestedInputs, load_input_tables};

/// All computed outputs of a single build.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub inputs: IngestedInputs,
    pub filled_countries: usize,
    pub joined_rows: usize,
    pub records: Vec<OutputRecord>,
}

/// Execute the full pipeline from the configured data directory.
pub fn run_build(config: &BuildConfig) -> Result<RunOutput, AppError> {
    let inputs = load_input_tables(&config.data_dir)?;
    build_from_inputs(inputs)
}

/// Execute the pipeline on pre-loaded tables.
///
/// This is the whole core: each stage consumes the previous stage's complete
/// output and produces a new one, so re-running on identical inputs yields
/// identical records.
pub fn build_from_inputs(inputs: IngestedInputs) -> Result<RunOutput, AppError> {
    let filled = crate::fill::fill_obesity(&inputs.obesity.rows)?;
    let filled_countries = filled.len() / YEAR_SPAN;

    let joined = crate::join::join_tables(
        &inputs.production.rows,
        &inputs.population.rows,
        &inputs.diet_cost.rows,
        &filled,
    )?;
    let joined_rows = joined.len();

    let records = crate::metrics::enrich(joined);

    info!(
        filled_countries,
        joined_rows,
        records = records.len(),
        "Pipeline complete"
    );

    Ok(RunOutput {
        inputs,
        filled_countries,
        joined_rows,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProductionRow, SeriesRow, Table};
    use crate::io::ingest::IngestedTable;

    fn table<T>(table: Table, rows: Vec<T>) -> IngestedTable<T> {
        IngestedTable {
            table,
            rows_read: rows.len(),
            rows,
            row_errors: vec![],
        }
    }

    fn production(country: &str, year: i32, category: &str, value: f64) -> ProductionRow {
        ProductionRow {
            country: country.to_string(),
            year: Some(year),
            category: category.to_string(),
            value: Some(value),
        }
    }

    fn series(country: &str, year: i32, value: f64) -> SeriesRow {
        SeriesRow {
            country: country.to_string(),
            year: Some(year),
            value: Some(value),
        }
    }

    /// Country "A", category "Wheat", production at 2020/2021, population for
    /// both years, no diet cost, a single raw obesity point at 2020.
    fn example_inputs() -> IngestedInputs {
        IngestedInputs {
            production: table(
                Table::Production,
                vec![
                    production("A", 2020, "Wheat", 100.0),
                    production("A", 2021, "Wheat", 150.0),
                ],
            ),
            population: table(
                Table::Population,
                vec![series("A", 2020, 1000.0), series("A", 2021, 1100.0)],
            ),
            diet_cost: table(Table::DietCost, vec![]),
            obesity: table(Table::Obesity, vec![series("A", 2020, 50.0)]),
        }
    }

    #[test]
    fn end_to_end_example() {
        let run = build_from_inputs(example_inputs()).unwrap();
        assert_eq!(run.records.len(), 2);
        assert_eq!(run.filled_countries, 1);

        let r2021 = run
            .records
            .iter()
            .find(|r| r.year == 2021)
            .expect("2021 record");

        let per_capita = r2021.production_per_capita.unwrap();
        assert!((per_capita - 150.0 / 1100.0).abs() < 1e-12);
        assert_eq!(r2021.production_growth_pct, Some(50.0));
        assert!(!r2021.has_diet_cost);
        assert_eq!(r2021.diet_cost_value, None);

        // 2020 is the only obesity anchor, so 2021 is forward-filled to 50.
        assert!(r2021.has_obesity);
        assert_eq!(r2021.obesity_value, Some(50.0));

        let prevalence = r2021.obesity_prevalence_pct.unwrap();
        assert!((prevalence - 100.0 * 50.0 / 1100.0).abs() < 1e-12);

        // Case count is unchanged but population grew, so prevalence fell.
        let variation = r2021.obesity_prevalence_variation_pct.unwrap();
        assert!((variation - (-100.0 / 11.0)).abs() < 1e-9);
    }

    #[test]
    fn rerunning_identical_inputs_is_idempotent() {
        let first = build_from_inputs(example_inputs()).unwrap();
        let second = build_from_inputs(example_inputs()).unwrap();
        assert_eq!(first.records, second.records);
    }

    #[test]
    fn join_cardinality_matches_population_coverage() {
        let mut inputs = example_inputs();
        inputs
            .production
            .rows
            .push(production("B", 2020, "Wheat", 10.0)); // no population for B

        let run = build_from_inputs(inputs).unwrap();
        assert_eq!(run.records.len(), 2);
        assert!(run.records.iter().all(|r| r.country == "A"));
    }
}
