//! Data module - CSV loading and column derivation

mod loader;
mod observation;
mod processor;

pub use loader::{StormLoader, REQUIRED_COLUMNS};
pub use observation::{
    is_hurricane_code, CategoryFilter, StormObservation, StormRecord, KNOTS_TO_MPH,
    UNNAMED_SENTINELS,
};
pub use processor::{ColumnDeriver, StormTable};

#[cfg(test)]
pub(crate) use observation::obs;
