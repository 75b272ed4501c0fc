//! Data Processor Module
//! Derives computed columns and filters the storm table without mutating it.

use crate::data::observation::{CategoryFilter, StormObservation, StormRecord};
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable table of derived storm rows.
///
/// Filters return new tables; the rows of an existing table never change.
#[derive(Debug, Clone)]
pub struct StormTable {
    rows: Arc<[StormRecord]>,
}

impl StormTable {
    pub fn rows(&self) -> &[StormRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep rows satisfying `predicate`.
    pub fn filter<P>(&self, predicate: P) -> StormTable
    where
        P: Fn(&StormRecord) -> bool,
    {
        self.rows
            .iter()
            .filter(|r| predicate(*r))
            .cloned()
            .collect()
    }

    /// Drop rows carrying the unnamed-storm sentinels.
    pub fn named(&self) -> StormTable {
        self.filter(|r| r.observation.is_named())
    }

    /// Keep `from <= year <= to`.
    pub fn within_years(&self, from: i32, to: i32) -> StormTable {
        self.filter(|r| (from..=to).contains(&r.year()))
    }

    /// Keep rows whose pressure was actually recorded (`> 0`).
    pub fn with_recorded_pressure(&self) -> StormTable {
        self.filter(|r| r.observation.has_recorded_pressure())
    }

    pub fn matching_category(&self, filter: &CategoryFilter) -> StormTable {
        self.filter(|r| filter.matches(r.category()))
    }

    /// Rows whose year/month/day did not form a calendar date.
    pub fn invalid_dates(&self) -> impl Iterator<Item = &StormRecord> {
        self.rows.iter().filter(|r| r.observation_date.is_none())
    }

    /// Project a numeric column out of the table.
    pub fn values<F>(&self, column: F) -> Vec<f64>
    where
        F: Fn(&StormRecord) -> f64,
    {
        self.rows.iter().map(column).collect()
    }
}

impl FromIterator<StormRecord> for StormTable {
    fn from_iter<I: IntoIterator<Item = StormRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Adds derived columns to loaded observations.
pub struct ColumnDeriver;

impl ColumnDeriver {
    /// Attach `wind_speed_mph` and `observation_date` to every row.
    ///
    /// The input slice is left untouched. Rows with an invalid date keep an
    /// absent date; they are reported, not dropped.
    pub fn derive(observations: &[StormObservation]) -> StormTable {
        let table: StormTable = observations
            .iter()
            .cloned()
            .map(StormRecord::derive)
            .collect();

        let invalid = table.invalid_dates().count();
        if invalid > 0 {
            warn!("{} rows have an invalid year/month/day; their date is absent", invalid);
        }
        debug!("Derived columns for {} rows", table.len());
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::observation::{obs, KNOTS_TO_MPH};

    fn sample() -> Vec<StormObservation> {
        let mut bad_date = obs("BAD", 1980, "TS", 40.0);
        bad_date.month = 13;
        let mut no_pressure = obs("ABLE", 1951, "H2", 90.0);
        no_pressure.pressure = 0.0;
        vec![
            obs("NOTNAMED", 1950, "TD", 25.0),
            no_pressure,
            obs("BAKER", 2008, "H1", 70.0),
            obs("CHARLIE", 2009, "TS", 50.0),
            bad_date,
        ]
    }

    #[test]
    fn test_derive_appends_columns_without_mutating_input() {
        let input = sample();
        let before = input.clone();
        let table = ColumnDeriver::derive(&input);
        assert_eq!(input, before);
        assert_eq!(table.len(), 5);
        let baker = &table.rows()[2];
        assert!((baker.wind_speed_mph - 70.0 * KNOTS_TO_MPH).abs() < 1e-9);
        assert!(baker.observation_date.is_some());
    }

    #[test]
    fn test_invalid_dates_are_kept_and_reported() {
        let table = ColumnDeriver::derive(&sample());
        let invalid: Vec<_> = table.invalid_dates().map(|r| r.name()).collect();
        assert_eq!(invalid, vec!["BAD"]);
    }

    #[test]
    fn test_filters() {
        let table = ColumnDeriver::derive(&sample());
        assert_eq!(table.named().len(), 4);
        let window = table.within_years(1951, 2008);
        assert!(window.rows().iter().all(|r| (1951..=2008).contains(&r.year())));
        assert_eq!(window.len(), 3);
        assert_eq!(table.with_recorded_pressure().len(), 4);
        assert_eq!(table.matching_category(&CategoryFilter::Hurricane).len(), 2);
        // source table is unaffected by filtering
        assert_eq!(table.len(), 5);
    }
}
