//! stormtrack - exploratory analysis of historical storm-track data
//!
//! Loads a storm-track CSV, derives speed/date columns, aggregates counts,
//! means and year-over-year changes, and renders the report charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod stats;

// Re-exports for library users
pub use config::Config;
pub use data::{CategoryFilter, ColumnDeriver, StormLoader, StormObservation, StormRecord, StormTable};
pub use error::{Result, StormError};
pub use output::AnalysisSummary;
pub use pipeline::{prepare, run, RunReport};
pub use stats::{Aggregator, ChangeKind, LocationMean, StatsCalculator, YearSeries};
