//! Per-country gap filling for the obesity series.
//!
//! The obesity table is sparse: most countries report only a few of the years
//! in `[FIRST_YEAR, LAST_YEAR]`. Before joining we reconstruct a dense series
//! per country:
//!
//! 1. re-index each country's (year → value) mapping onto the full range;
//! 2. linearly interpolate missing years strictly between two originally
//!    present anchors;
//! 3. extend the boundaries: backward-fill the leading gap, forward-fill the
//!    trailing gap.
//!
//! A country with zero present values keeps all slots missing; that is data
//! absence, not an error. Years outside the range are ignored.
//!
//! Each country's slots are a fixed-size array indexed by year offset, so the
//! interpolation and boundary logic never touches a sparse map.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{FIRST_YEAR, LAST_YEAR, SeriesRow, TimePoint, YEAR_SPAN, YearSlots};
use crate::error::AppError;

/// Reconstruct a dense `[FIRST_YEAR, LAST_YEAR]` series for every country
/// present in `rows`.
///
/// Output is grouped by country (ascending by label) with years ascending
/// within each country: exactly `YEAR_SPAN` points per country.
///
/// A duplicated (country, year) key is a structural violation.
pub fn fill_obesity(rows: &[SeriesRow]) -> Result<Vec<TimePoint>, AppError> {
    let mut groups: BTreeMap<&str, YearSlots> = BTreeMap::new();
    let mut seen: HashSet<(&str, i32)> = HashSet::new();

    for row in rows {
        // Every country in the input gets a group, even when none of its rows
        // can be keyed; it then falls through as an all-missing series.
        let slots = groups.entry(row.country.as_str()).or_insert([None; YEAR_SPAN]);

        let Some(year) = row.year else { continue };
        if !seen.insert((row.country.as_str(), year)) {
            return Err(AppError::structural(format!(
                "Duplicate (country, year) key in obesity table: {} / {year}",
                row.country
            )));
        }
        if (FIRST_YEAR..=LAST_YEAR).contains(&year) {
            slots[(year - FIRST_YEAR) as usize] = row.value;
        }
    }

    let mut groups: Vec<(&str, YearSlots)> = groups.into_iter().collect();

    // Country groups are independent, so the fill itself can run in parallel;
    // output order comes from the sorted group list, not from scheduling.
    groups.par_iter_mut().for_each(|(_, slots)| fill_slots(slots));

    debug!(countries = groups.len(), "Obesity series filled");

    let mut out = Vec::with_capacity(groups.len() * YEAR_SPAN);
    for (country, slots) in groups {
        for (offset, value) in slots.into_iter().enumerate() {
            out.push(TimePoint {
                country: country.to_string(),
                year: FIRST_YEAR + offset as i32,
                value,
            });
        }
    }
    Ok(out)
}

/// Fill one country's slot array in place.
///
/// Only originally-present slots act as interpolation anchors; values created
/// by interpolation are never re-used as anchors, and boundary extension runs
/// after interpolation on whatever gaps remain at the edges.
pub fn fill_slots(slots: &mut YearSlots) {
    let anchors: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.map(|_| idx))
        .collect();

    let (Some(&first), Some(&last)) = (anchors.first(), anchors.last()) else {
        // No data at all for this country; the series stays missing.
        return;
    };

    for pair in anchors.windows(2) {
        let (i, j) = (pair[0], pair[1]);
        let (Some(a), Some(b)) = (slots[i], slots[j]) else {
            continue;
        };
        for k in i + 1..j {
            let t = (k - i) as f64 / (j - i) as f64;
            slots[k] = Some(a + (b - a) * t);
        }
    }

    // Boundary extension: copy the nearest anchor value outward.
    for k in 0..first {
        slots[k] = slots[first];
    }
    for k in last + 1..YEAR_SPAN {
        slots[k] = slots[last];
    }
}
