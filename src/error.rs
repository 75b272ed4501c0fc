//! Error taxonomy shared by the loader, deriver, aggregator and charts.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StormError {
    #[error("Data unavailable at {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },
    #[error("No rows left for {operation}")]
    EmptyInput { operation: &'static str },
    #[error("Percent change undefined for {year}: previous value is zero")]
    UndefinedRatio { year: i32 },
    #[error("Invalid date {year}-{month}-{day}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("Failed to render chart {}: {reason}", path.display())]
    Chart { path: PathBuf, reason: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StormError {
    pub(crate) fn empty(operation: &'static str) -> Self {
        StormError::EmptyInput { operation }
    }
}

pub type Result<T> = std::result::Result<T, StormError>;
