//! Derived indicators for the joined row set.
//!
//! Everything here follows one rule: an undefined ratio is a missing value.
//! Division by a zero or missing denominator, growth against a zero or
//! missing prior value, and the first entry of every series all yield `None`,
//! never zero, infinity, or NaN.
//!
//! Ordering matters for the period-over-period metrics, so this module first
//! establishes the canonical (country, category, year) stable sort and then:
//!
//! - production growth scans the per-(country, category) run of rows;
//! - diet-cost variation and obesity prevalence variation are country+year
//!   facts, so they are computed once per country over its distinct years
//!   (ascending) and broadcast to every category row of that country+year.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{JoinedRow, OutputRecord};

/// Enrich the joined rows with every derived indicator and project them onto
/// the output schema.
///
/// Row count is preserved: no filtering happens here, including for rows
/// whose derived fields all end up missing.
pub fn enrich(mut rows: Vec<JoinedRow>) -> Vec<OutputRecord> {
    rows.sort_by(|a, b| {
        (a.country.as_str(), a.category.as_str(), a.year)
            .cmp(&(b.country.as_str(), b.category.as_str(), b.year))
    });

    let facts = country_year_facts(&rows);

    let mut out = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        // Previous row of the same country+category series, if any. The sort
        // above guarantees series rows are adjacent and ascending by year.
        let prior_production = match idx.checked_sub(1).map(|i| &rows[i]) {
            Some(prev) if prev.country == row.country && prev.category == row.category => {
                prev.production_value
            }
            _ => None,
        };

        let derived = &facts[&(row.country.as_str(), row.year)];

        out.push(OutputRecord {
            country: row.country.clone(),
            category: row.category.clone(),
            year: row.year,
            production_value: row.production_value,
            population: row.population,
            production_per_capita: per_capita(row.production_value, row.population),
            production_growth_pct: pct_change(prior_production, row.production_value),
            diet_cost_value: row.diet_cost,
            diet_cost_variation_pct: derived.diet_variation,
            obesity_value: row.obesity,
            obesity_prevalence_pct: derived.prevalence,
            obesity_prevalence_variation_pct: derived.prevalence_variation,
            has_diet_cost: row.diet_cost.is_some(),
            has_obesity: row.obesity.is_some(),
        });
    }

    debug!(rows = out.len(), "Derived indicators computed");
    out
}

/// Country+year facts shared by every category row of that country+year.
#[derive(Debug, Clone, Copy, Default)]
struct CountryYearDerived {
    diet_cost: Option<f64>,
    prevalence: Option<f64>,
    diet_variation: Option<f64>,
    prevalence_variation: Option<f64>,
}

/// Compute per-country variation series over distinct years.
///
/// Diet cost and obesity prevalence do not have a category dimension, so
/// their period-over-period variation must be computed on the deduplicated
/// country+year sequence, not on the category-fanned row list.
fn country_year_facts<'a>(rows: &'a [JoinedRow]) -> BTreeMap<(&'a str, i32), CountryYearDerived> {
    let mut facts: BTreeMap<(&str, i32), CountryYearDerived> = BTreeMap::new();
    for row in rows {
        facts
            .entry((row.country.as_str(), row.year))
            .or_insert_with(|| CountryYearDerived {
                diet_cost: row.diet_cost,
                prevalence: prevalence_pct(row.obesity, row.population),
                ..Default::default()
            });
    }

    // BTreeMap iterates (country, year) ascending, so consecutive keys with
    // the same country form that country's year-ordered series.
    let keys: Vec<(&str, i32)> = facts.keys().copied().collect();
    for pair in keys.windows(2) {
        if pair[0].0 != pair[1].0 {
            continue; // series boundary: first year of the next country
        }
        let prior = facts[&pair[0]];
        if let Some(current) = facts.get_mut(&pair[1]) {
            current.diet_variation = pct_change(prior.diet_cost, current.diet_cost);
            current.prevalence_variation = pct_change(prior.prevalence, current.prevalence);
        }
    }

    facts
}

/// Percentage change `(current − previous) / previous × 100`.
///
/// Missing when either operand is missing or the prior value is zero (an
/// undefined growth, not an infinite one).
pub fn pct_change(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    let previous = previous?;
    let current = current?;
    if previous == 0.0 {
        return None;
    }
    let pct = (current - previous) / previous * 100.0;
    pct.is_finite().then_some(pct)
}

/// Production value per inhabitant; defined only for a positive population.
pub fn per_capita(value: Option<f64>, population: Option<f64>) -> Option<f64> {
    let value = value?;
    let population = population?;
    if population > 0.0 {
        Some(value / population)
    } else {
        None
    }
}

/// Obesity prevalence as a percentage of population.
pub fn prevalence_pct(cases: Option<f64>, population: Option<f64>) -> Option<f64> {
    let cases = cases?;
    let population = population?;
    if population > 0.0 {
        Some(100.0 * cases / population)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(country: &str, year: i32, category: &str) -> JoinedRow {
        JoinedRow {
            country: country.to_string(),
            year,
            category: category.to_string(),
            production_value: None,
            population: None,
            diet_cost: None,
            obesity: None,
        }
    }

    #[test]
    fn pct_change_rules() {
        assert_eq!(pct_change(Some(100.0), Some(150.0)), Some(50.0));
        assert_eq!(pct_change(Some(100.0), Some(50.0)), Some(-50.0));
        assert_eq!(pct_change(Some(0.0), Some(50.0)), None);
        assert_eq!(pct_change(None, Some(50.0)), None);
        assert_eq!(pct_change(Some(100.0), None), None);
    }

    #[test]
    fn per_capita_requires_positive_population() {
        assert_eq!(per_capita(Some(150.0), Some(1000.0)), Some(0.15));
        assert_eq!(per_capita(Some(150.0), Some(0.0)), None);
        assert_eq!(per_capita(Some(150.0), Some(-5.0)), None);
        assert_eq!(per_capita(None, Some(1000.0)), None);
        assert_eq!(per_capita(Some(150.0), None), None);
    }

    #[test]
    fn prevalence_requires_cases_and_population() {
        assert_eq!(prevalence_pct(Some(50.0), Some(1000.0)), Some(5.0));
        assert_eq!(prevalence_pct(Some(50.0), Some(0.0)), None);
        assert_eq!(prevalence_pct(None, Some(1000.0)), None);
    }

    #[test]
    fn growth_is_missing_for_first_entry_of_each_series() {
        let mut a = joined("A", 2020, "Wheat");
        a.production_value = Some(100.0);
        a.population = Some(1000.0);
        let mut b = joined("A", 2021, "Wheat");
        b.production_value = Some(150.0);
        b.population = Some(1000.0);
        let mut c = joined("A", 2020, "Apples");
        c.production_value = Some(40.0);
        c.population = Some(1000.0);

        let records = enrich(vec![a, b, c]);

        // Sorted: (A, Apples, 2020), (A, Wheat, 2020), (A, Wheat, 2021).
        assert_eq!(records[0].category, "Apples");
        assert_eq!(records[0].production_growth_pct, None);
        assert_eq!(records[1].production_growth_pct, None);
        assert_eq!(records[2].production_growth_pct, Some(50.0));
    }

    #[test]
    fn growth_is_missing_after_zero_prior() {
        let mut a = joined("A", 2020, "Wheat");
        a.production_value = Some(0.0);
        let mut b = joined("A", 2021, "Wheat");
        b.production_value = Some(10.0);

        let records = enrich(vec![a, b]);
        assert_eq!(records[1].production_growth_pct, None);
    }

    #[test]
    fn diet_variation_does_not_leak_across_categories() {
        // Two categories fan out the same country+year diet costs. The
        // variation must come from the country's year series (3.0 -> 3.3),
        // identically on both category rows of 2021.
        let mut rows = Vec::new();
        for category in ["Wheat", "Apples"] {
            for (year, cost) in [(2020, 3.0), (2021, 3.3)] {
                let mut row = joined("A", year, category);
                row.diet_cost = Some(cost);
                rows.push(row);
            }
        }

        let records = enrich(rows);
        for record in &records {
            match record.year {
                2020 => assert_eq!(record.diet_cost_variation_pct, None),
                2021 => {
                    let v = record.diet_cost_variation_pct.unwrap();
                    assert!((v - 10.0).abs() < 1e-9);
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn prevalence_variation_follows_population_changes() {
        let mut a = joined("A", 2020, "Wheat");
        a.population = Some(1000.0);
        a.obesity = Some(50.0);
        let mut b = joined("A", 2021, "Wheat");
        b.population = Some(1100.0);
        b.obesity = Some(50.0);

        let records = enrich(vec![a, b]);

        assert_eq!(records[0].obesity_prevalence_pct, Some(5.0));
        let p2021 = records[1].obesity_prevalence_pct.unwrap();
        assert!((p2021 - 100.0 * 50.0 / 1100.0).abs() < 1e-9);

        // Same case count, larger population: prevalence fell ~9.09%.
        let v = records[1].obesity_prevalence_variation_pct.unwrap();
        assert!((v - (-100.0 / 11.0)).abs() < 1e-9);
    }

    #[test]
    fn availability_flags_reflect_raw_joined_values() {
        let mut a = joined("A", 2020, "Wheat");
        a.diet_cost = Some(3.0);
        a.obesity = Some(50.0);
        // population missing, so every derived metric is missing anyway
        let records = enrich(vec![a]);

        assert!(records[0].has_diet_cost);
        assert!(records[0].has_obesity);
        assert_eq!(records[0].obesity_prevalence_pct, None);
    }

    #[test]
    fn rows_all_missing_are_kept() {
        let records = enrich(vec![joined("A", 2020, "Wheat")]);
        assert_eq!(records.len(), 1);
        assert!(!records[0].has_diet_cost);
        assert!(!records[0].has_obesity);
        assert_eq!(records[0].production_per_capita, None);
    }
}
