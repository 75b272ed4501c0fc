//! Storm Aggregator Module
//! Group-by counts, means and year-over-year deltas over the derived table.
//!
//! Every function is pure: it reads an immutable [`StormTable`] and returns a
//! fresh result. Year-keyed outputs are `BTreeMap`s, so they iterate in
//! ascending year order regardless of input row order.

use crate::data::{CategoryFilter, StormRecord, StormTable};
use crate::error::{Result, StormError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Year-keyed metric, ascending by year.
pub type YearSeries = BTreeMap<i32, f64>;

/// Kind of year-over-year delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Absolute,
    Percent,
}

/// Mean wind and pressure for one (category, year, month, day, lat, long) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMean {
    pub category: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub mean_wind_kts: f64,
    pub mean_pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LocationKey {
    category: String,
    year: i32,
    month: u32,
    day: u32,
    // bit patterns give exact-equality grouping on floats; +0.0 folds -0.0
    latitude: u64,
    longitude: u64,
}

impl LocationKey {
    fn of(record: &StormRecord) -> Self {
        let o = &record.observation;
        Self {
            category: o.category.clone(),
            year: o.year,
            month: o.month,
            day: o.day,
            latitude: (o.latitude + 0.0).to_bits(),
            longitude: (o.longitude + 0.0).to_bits(),
        }
    }
}

/// Aggregations used by the report sections.
pub struct Aggregator;

impl Aggregator {
    /// Unique storm names per year, optionally without the unnamed sentinels.
    pub fn distinct_storm_count_by_year(
        table: &StormTable,
        exclude_unnamed: bool,
    ) -> Result<BTreeMap<i32, usize>> {
        let rows = table
            .rows()
            .iter()
            .filter(|r| !exclude_unnamed || r.observation.is_named());
        non_empty(
            distinct_names_by(rows, |r| r.year()),
            "distinct_storm_count_by_year",
        )
    }

    /// Unique storm names per (year, category) for categories passing `filter`.
    pub fn distinct_storm_count_by_year_and_category(
        table: &StormTable,
        filter: &CategoryFilter,
    ) -> Result<BTreeMap<(i32, String), usize>> {
        let rows = table.rows().iter().filter(|r| filter.matches(r.category()));
        non_empty(
            distinct_names_by(rows, |r| (r.year(), r.category().to_string())),
            "distinct_storm_count_by_year_and_category",
        )
    }

    /// Unique storm names per category, all years collapsed.
    pub fn distinct_storm_count_by_category(
        table: &StormTable,
        filter: &CategoryFilter,
    ) -> Result<BTreeMap<String, usize>> {
        let rows = table.rows().iter().filter(|r| filter.matches(r.category()));
        non_empty(
            distinct_names_by(rows, |r| r.category().to_string()),
            "distinct_storm_count_by_category",
        )
    }

    /// Unique storm names per calendar month (1-12), all years collapsed.
    ///
    /// Rows whose month falls outside 1-12 are not counted.
    pub fn count_by_month(
        table: &StormTable,
        filter: &CategoryFilter,
    ) -> Result<BTreeMap<u32, usize>> {
        let rows = table
            .rows()
            .iter()
            .filter(|r| CALENDAR_MONTHS.contains(&r.month()))
            .filter(|r| filter.matches(r.category()));
        non_empty(distinct_names_by(rows, |r| r.month()), "count_by_month")
    }

    /// Mean `wind_speed_mph` per year over every row (not per storm).
    pub fn mean_wind_speed_by_year(table: &StormTable) -> Result<YearSeries> {
        let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for record in table.rows() {
            let entry = sums.entry(record.year()).or_insert((0.0, 0));
            entry.0 += record.wind_speed_mph;
            entry.1 += 1;
        }
        let means = sums
            .into_iter()
            .map(|(year, (sum, n))| (year, sum / n as f64))
            .collect();
        non_empty(means, "mean_wind_speed_by_year")
    }

    /// Mean wind (kts) and pressure per composite location key.
    ///
    /// With `require_positive_pressure`, rows whose pressure is the `0`
    /// sentinel are dropped before grouping.
    pub fn mean_by_category_year_month_day_location(
        table: &StormTable,
        require_positive_pressure: bool,
    ) -> Result<Vec<LocationMean>> {
        let mut groups: HashMap<LocationKey, (f64, f64, usize, &StormRecord)> = HashMap::new();
        for record in table
            .rows()
            .iter()
            .filter(|r| !require_positive_pressure || r.observation.has_recorded_pressure())
        {
            let entry = groups
                .entry(LocationKey::of(record))
                .or_insert((0.0, 0.0, 0, record));
            entry.0 += record.observation.wind_speed_knots;
            entry.1 += record.observation.pressure;
            entry.2 += 1;
        }

        let mut means: Vec<LocationMean> = groups
            .into_values()
            .map(|(wind, pressure, n, first)| {
                let o = &first.observation;
                LocationMean {
                    category: o.category.clone(),
                    year: o.year,
                    month: o.month,
                    day: o.day,
                    latitude: o.latitude,
                    longitude: o.longitude,
                    mean_wind_kts: wind / n as f64,
                    mean_pressure: pressure / n as f64,
                }
            })
            .collect();

        means.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(a.year.cmp(&b.year))
                .then(a.month.cmp(&b.month))
                .then(a.day.cmp(&b.day))
                .then(a.latitude.total_cmp(&b.latitude))
                .then(a.longitude.total_cmp(&b.longitude))
        });

        if means.is_empty() {
            return Err(StormError::empty("mean_by_category_year_month_day_location"));
        }
        Ok(means)
    }

    /// Delta between consecutive years, rounded to two decimals.
    ///
    /// The series is sorted by year first; the earliest year has no delta and
    /// is dropped. Percent deltas are fractions (`0.5` = +50%) and fail with
    /// `UndefinedRatio` when the previous value is zero.
    pub fn year_over_year_change(
        series: &[(i32, f64)],
        kind: ChangeKind,
    ) -> Result<Vec<(i32, f64)>> {
        if series.len() < 2 {
            return Err(StormError::empty("year_over_year_change"));
        }
        let mut sorted = series.to_vec();
        sorted.sort_by_key(|&(year, _)| year);

        sorted
            .windows(2)
            .map(|pair| {
                let (_, previous) = pair[0];
                let (year, current) = pair[1];
                let delta = match kind {
                    ChangeKind::Absolute => current - previous,
                    ChangeKind::Percent => {
                        if previous == 0.0 {
                            return Err(StormError::UndefinedRatio { year });
                        }
                        (current - previous) / previous
                    }
                };
                Ok((year, round2(delta)))
            })
            .collect()
    }

    /// Restrict a year series to `from <= year <= to`.
    pub fn series_within_years(series: &YearSeries, from: i32, to: i32) -> Result<YearSeries> {
        if from > to {
            return Err(StormError::empty("series_within_years"));
        }
        let window: YearSeries = series.range(from..=to).map(|(&y, &v)| (y, v)).collect();
        non_empty(window, "series_within_years")
    }

    /// Flatten a count map into an ordered `(year, value)` series.
    pub fn to_series(counts: &BTreeMap<i32, usize>) -> Vec<(i32, f64)> {
        counts.iter().map(|(&year, &n)| (year, n as f64)).collect()
    }
}

const CALENDAR_MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

fn distinct_names_by<'a, K, I, F>(rows: I, key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    I: Iterator<Item = &'a StormRecord>,
    F: Fn(&StormRecord) -> K,
{
    let mut names: BTreeMap<K, HashSet<&'a str>> = BTreeMap::new();
    for record in rows {
        names.entry(key(record)).or_default().insert(record.name());
    }
    names.into_iter().map(|(k, set)| (k, set.len())).collect()
}

fn non_empty<K, V>(map: BTreeMap<K, V>, operation: &'static str) -> Result<BTreeMap<K, V>> {
    if map.is_empty() {
        Err(StormError::empty(operation))
    } else {
        Ok(map)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
