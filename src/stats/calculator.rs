//! Statistics Calculator Module
//! Descriptive statistics per numeric column and linear trend fits.

use crate::data::{StormRecord, StormTable};
use crate::error::{Result, StormError};
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self {
            column: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

impl Trend {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

type ColumnAccessor = fn(&StormRecord) -> Option<f64>;

fn wind_knots(r: &StormRecord) -> Option<f64> {
    Some(r.observation.wind_speed_knots)
}

fn wind_mph(r: &StormRecord) -> Option<f64> {
    Some(r.wind_speed_mph)
}

// the 0 sentinel is not a reading
fn recorded_pressure(r: &StormRecord) -> Option<f64> {
    r.observation
        .has_recorded_pressure()
        .then_some(r.observation.pressure)
}

fn latitude(r: &StormRecord) -> Option<f64> {
    Some(r.observation.latitude)
}

fn longitude(r: &StormRecord) -> Option<f64> {
    Some(r.observation.longitude)
}

/// Numeric columns summarized by [`StatsCalculator::describe_table`].
const DESCRIBED_COLUMNS: [(&str, ColumnAccessor); 5] = [
    ("wind_speed_knots", wind_knots),
    ("wind_speed_mph", wind_mph),
    ("pressure", recorded_pressure),
    ("latitude", latitude),
    ("longitude", longitude),
];

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        ColumnSummary {
            column: String::new(),
            count: n,
            mean: Statistics::mean(values.iter()),
            std: Statistics::std_dev(values.iter()),
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Summaries for every numeric column, computed in parallel.
    pub fn describe_table(table: &StormTable) -> Result<Vec<ColumnSummary>> {
        if table.is_empty() {
            return Err(StormError::empty("describe_table"));
        }

        Ok(DESCRIBED_COLUMNS
            .par_iter()
            .map(|&(name, accessor)| {
                let values: Vec<f64> = table.rows().iter().filter_map(accessor).collect();
                let mut summary = Self::compute_descriptive_stats(&values);
                summary.column = name.to_string();
                summary
            })
            .collect())
    }

    /// Ordinary least-squares fit used for trend overlays.
    pub fn linear_trend(points: &[(f64, f64)]) -> Result<Trend> {
        if points.len() < 2 {
            return Err(StormError::empty("linear_trend"));
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

        let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        let sxy: f64 = points
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum();
        if sxx == 0.0 {
            return Err(StormError::empty("linear_trend"));
        }

        let slope = sxy / sxx;
        Ok(Trend {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }
}
