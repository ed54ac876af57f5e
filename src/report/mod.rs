//! Run-summary formatting.
//!
//! We keep formatting code in one place so:
//! - the join/metric code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::{Table, YEAR_SPAN};
use crate::io::ingest::{IngestedTable, RowError};

/// Maximum number of row errors listed per table before eliding the rest.
const MAX_LISTED_ROW_ERRORS: usize = 20;

/// Format the full run summary (per-table ingest stats + pipeline counts).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== agrifood - build summary ===\n");
    out.push_str(&format!("generated: {}\n", Local::now().to_rfc3339()));

    out.push_str("\nInputs:\n");
    out.push_str(&format_table_line(&run.inputs.production));
    out.push_str(&format_table_line(&run.inputs.population));
    out.push_str(&format_table_line(&run.inputs.diet_cost));
    out.push_str(&format_table_line(&run.inputs.obesity));

    out.push_str(&format!(
        "\nObesity fill: {} countries x {} years\n",
        run.filled_countries, YEAR_SPAN
    ));
    out.push_str(&format!(
        "Join: {} production rows -> {} joined rows (inner join with population)\n",
        run.inputs.production.rows.len(),
        run.joined_rows
    ));
    out.push_str(&format!("Output records: {}\n", run.records.len()));

    out
}

fn format_table_line<T>(table: &IngestedTable<T>) -> String {
    format!(
        "- {:<11} read={} kept={} row_errors={}\n",
        table.table.display_name(),
        table.rows_read,
        table.rows.len(),
        table.row_errors.len()
    )
}

/// List row errors per table (up to [`MAX_LISTED_ROW_ERRORS`] each).
pub fn format_row_errors(run: &RunOutput) -> String {
    let mut out = String::new();
    append_row_errors(&mut out, Table::Production, &run.inputs.production.row_errors);
    append_row_errors(&mut out, Table::Population, &run.inputs.population.row_errors);
    append_row_errors(&mut out, Table::DietCost, &run.inputs.diet_cost.row_errors);
    append_row_errors(&mut out, Table::Obesity, &run.inputs.obesity.row_errors);
    out
}

fn append_row_errors(out: &mut String, table: Table, errors: &[RowError]) {
    if errors.is_empty() {
        return;
    }
    out.push_str(&format!("{} row errors:\n", table.display_name()));
    for error in errors.iter().take(MAX_LISTED_ROW_ERRORS) {
        out.push_str(&format!("- line {}: {}\n", error.line, error.message));
    }
    if errors.len() > MAX_LISTED_ROW_ERRORS {
        out.push_str(&format!(
            "- ... and {} more\n",
            errors.len() - MAX_LISTED_ROW_ERRORS
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_from_inputs;
    use crate::domain::{ProductionRow, SeriesRow};
    use crate::io::ingest::IngestedInputs;

    fn table<T>(table: Table, rows: Vec<T>) -> IngestedTable<T> {
        IngestedTable {
            table,
            rows_read: rows.len(),
            rows,
            row_errors: vec![],
        }
    }

    #[test]
    fn summary_contains_counts() {
        let inputs = IngestedInputs {
            production: table(
                Table::Production,
                vec![ProductionRow {
                    country: "A".to_string(),
                    year: Some(2020),
                    category: "Wheat".to_string(),
                    value: Some(100.0),
                }],
            ),
            population: table(
                Table::Population,
                vec![SeriesRow {
                    country: "A".to_string(),
                    year: Some(2020),
                    value: Some(1000.0),
                }],
            ),
            diet_cost: table(Table::DietCost, vec![]),
            obesity: table(Table::Obesity, vec![]),
        };

        let run = build_from_inputs(inputs).unwrap();
        let summary = format_run_summary(&run);

        assert!(summary.contains("production"));
        assert!(summary.contains("1 production rows -> 1 joined rows"));
        assert!(summary.contains("Output records: 1"));
    }
}
