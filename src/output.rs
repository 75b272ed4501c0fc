//! Summary output: the aggregated tables serialized as JSON.

use crate::config::Config;
use crate::data::{CategoryFilter, StormTable};
use crate::error::{Result, StormError};
use crate::stats::{Aggregator, ChangeKind, ColumnSummary, StatsCalculator, Trend, YearSeries};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const SUMMARY_FILE_NAME: &str = "summary.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearDelta {
    pub year: i32,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub year: i32,
    pub category: String,
    pub storms: usize,
}

/// Everything the report computes, one field per section.
///
/// A section whose aggregation failed is `None` (`null` in JSON); the failure
/// is logged and the other sections are unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub source: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub rows: usize,
    pub invalid_dates: usize,
    pub first_observation: Option<NaiveDate>,
    pub last_observation: Option<NaiveDate>,
    pub columns: Option<Vec<ColumnSummary>>,
    pub storms_per_year: Option<BTreeMap<i32, usize>>,
    pub storm_trend: Option<Trend>,
    pub absolute_change: Option<Vec<YearDelta>>,
    pub percent_change: Option<Vec<YearDelta>>,
    pub hurricanes_by_year_and_category: Option<Vec<CategoryCount>>,
    pub hurricanes_by_category: Option<BTreeMap<String, usize>>,
    pub mean_wind_mph_by_year: Option<YearSeries>,
    pub mean_wind_trend: Option<Trend>,
    pub hurricanes_by_month: Option<BTreeMap<u32, usize>>,
}

impl AnalysisSummary {
    pub fn compute(source: &Path, table: &StormTable, config: &Config) -> Self {
        let analysis = &config.analysis;
        let named = table.named();

        let storms_per_year = section(
            "storms per year",
            Aggregator::distinct_storm_count_by_year(table, analysis.exclude_unnamed),
        );
        let storm_series = storms_per_year.as_ref().map(Aggregator::to_series);
        let change = |kind| {
            storm_series.as_ref().and_then(|series| {
                section(
                    "year-over-year change",
                    Aggregator::year_over_year_change(series, kind),
                )
                .map(to_deltas)
            })
        };

        let mean_wind = section(
            "mean wind speed",
            Aggregator::mean_wind_speed_by_year(table).and_then(|by_year| {
                Aggregator::series_within_years(&by_year, analysis.from_year, analysis.to_year)
            }),
        );

        let dates = table.rows().iter().filter_map(|r| r.observation_date);

        Self {
            source: source.to_path_buf(),
            generated_at: Utc::now(),
            rows: table.len(),
            invalid_dates: table.invalid_dates().count(),
            first_observation: dates.clone().min(),
            last_observation: dates.max(),
            columns: section("describe", StatsCalculator::describe_table(table)),
            storm_trend: storm_series
                .as_ref()
                .and_then(|s| StatsCalculator::linear_trend(&to_points(s)).ok()),
            absolute_change: change(ChangeKind::Absolute),
            percent_change: change(ChangeKind::Percent),
            hurricanes_by_year_and_category: section(
                "hurricanes by year and category",
                Aggregator::distinct_storm_count_by_year_and_category(
                    &named,
                    &CategoryFilter::Hurricane,
                ),
            )
            .map(|counts| {
                counts
                    .into_iter()
                    .map(|((year, category), storms)| CategoryCount {
                        year,
                        category,
                        storms,
                    })
                    .collect()
            }),
            hurricanes_by_category: section(
                "hurricanes by category",
                Aggregator::distinct_storm_count_by_category(&named, &CategoryFilter::Hurricane),
            ),
            mean_wind_trend: mean_wind.as_ref().and_then(|by_year| {
                let points: Vec<(f64, f64)> =
                    by_year.iter().map(|(&y, &v)| (y as f64, v)).collect();
                StatsCalculator::linear_trend(&points).ok()
            }),
            mean_wind_mph_by_year: mean_wind,
            hurricanes_by_month: section(
                "hurricanes by month",
                Aggregator::count_by_month(&named, &CategoryFilter::Hurricane),
            ),
            storms_per_year,
        }
    }

    /// Write `summary.json` into `dir`, creating it if needed.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|source| StormError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(SUMMARY_FILE_NAME);
        let json = serde_json::to_string_pretty(self).map_err(|e| StormError::Io {
            path: path.clone(),
            source: e.into(),
        })?;
        std::fs::write(&path, json).map_err(|source| StormError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}

fn section<T>(name: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Section '{}' failed: {}", name, e);
            None
        }
    }
}

fn to_deltas(deltas: Vec<(i32, f64)>) -> Vec<YearDelta> {
    deltas
        .into_iter()
        .map(|(year, delta)| YearDelta { year, delta })
        .collect()
}

fn to_points(series: &[(i32, f64)]) -> Vec<(f64, f64)> {
    series.iter().map(|&(y, v)| (y as f64, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{obs, ColumnDeriver};

    #[test]
    fn test_summary_sections() {
        let table = ColumnDeriver::derive(&[
            obs("ABLE", 1998, "H1", 70.0),
            obs("BAKER", 1998, "TS", 50.0),
            obs("ABLE", 1999, "H2", 90.0),
            obs("NOTNAMED", 1999, "TD", 25.0),
        ]);
        let summary = AnalysisSummary::compute(Path::new("tracks.csv"), &table, &Config::default());

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.invalid_dates, 0);
        let per_year = summary.storms_per_year.as_ref().unwrap();
        assert_eq!(per_year[&1998], 2);
        assert_eq!(per_year[&1999], 1);
        assert_eq!(
            summary.absolute_change,
            Some(vec![YearDelta { year: 1999, delta: -1.0 }])
        );
        assert_eq!(
            summary.percent_change,
            Some(vec![YearDelta { year: 1999, delta: -0.5 }])
        );
        assert_eq!(summary.hurricanes_by_month.as_ref().unwrap()[&8], 1);
        assert_eq!(summary.hurricanes_by_category.as_ref().unwrap().len(), 2);
        assert_eq!(summary.hurricanes_by_year_and_category.as_ref().unwrap().len(), 2);
        assert!(summary.mean_wind_mph_by_year.is_some());
    }

    #[test]
    fn test_failed_section_is_null() {
        let table = ColumnDeriver::derive(&[obs("ONLY", 2000, "TS", 40.0)]);
        let summary = AnalysisSummary::compute(Path::new("x.csv"), &table, &Config::default());
        // one year: no delta, no trend, no hurricanes
        assert!(summary.absolute_change.is_none());
        assert!(summary.storm_trend.is_none());
        assert!(summary.hurricanes_by_month.is_none());
        assert!(summary.storms_per_year.is_some());
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let table = ColumnDeriver::derive(&[obs("ONLY", 2000, "H1", 80.0)]);
        let summary = AnalysisSummary::compute(Path::new("x.csv"), &table, &Config::default());
        let path = summary.write_json(&dir.path().join("out")).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["rows"], 1);
        assert_eq!(value["storms_per_year"]["2000"], 1);
        assert!(value["absolute_change"].is_null());
    }
}
