//! Stats module - aggregation, descriptive statistics and distributions

mod aggregator;
mod calculator;
pub mod distribution;

pub use aggregator::{Aggregator, ChangeKind, LocationMean, YearSeries};
pub use calculator::{ColumnSummary, StatsCalculator, Trend};
pub use distribution::{HexCell, HexGrid, HistogramBin};
