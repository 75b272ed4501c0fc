//! Storm Observation Types
//! Raw track points as loaded, and the derived rows every later stage reads.

use crate::error::{Result, StormError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Names used in the source data for storms that were never named.
pub const UNNAMED_SENTINELS: [&str; 2] = ["NOTNAMED", "SUBTROP1"];

/// Knots to miles-per-hour factor used for the derived speed column.
pub const KNOTS_TO_MPH: f64 = 1.15;

/// One recorded position/intensity reading, exactly as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StormObservation {
    pub name: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub wind_speed_knots: f64,
    /// `0` means "not recorded".
    pub pressure: f64,
}

impl StormObservation {
    pub fn is_named(&self) -> bool {
        !UNNAMED_SENTINELS.contains(&self.name.as_str())
    }

    pub fn is_hurricane(&self) -> bool {
        is_hurricane_code(&self.category)
    }

    pub fn has_recorded_pressure(&self) -> bool {
        self.pressure > 0.0
    }

    pub fn wind_speed_mph(&self) -> f64 {
        self.wind_speed_knots * KNOTS_TO_MPH
    }

    /// Calendar date of the reading, or `InvalidDate` when the parts don't form one.
    pub fn observation_date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(StormError::InvalidDate {
            year: self.year,
            month: self.month,
            day: self.day,
        })
    }
}

/// Hurricane-strength category codes contain an `H` (H1..H5).
pub fn is_hurricane_code(category: &str) -> bool {
    category.contains('H')
}

/// An observation with its derived columns attached.
#[derive(Debug, Clone, PartialEq)]
pub struct StormRecord {
    pub observation: StormObservation,
    pub wind_speed_mph: f64,
    pub observation_date: Option<NaiveDate>,
}

impl StormRecord {
    pub fn derive(observation: StormObservation) -> Self {
        let wind_speed_mph = observation.wind_speed_mph();
        let observation_date = observation.observation_date().ok();
        Self {
            observation,
            wind_speed_mph,
            observation_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.observation.name
    }

    pub fn year(&self) -> i32 {
        self.observation.year
    }

    pub fn month(&self) -> u32 {
        self.observation.month
    }

    pub fn category(&self) -> &str {
        &self.observation.category
    }
}

/// Selects which category codes take part in an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    Any,
    Hurricane,
    NonHurricane,
    Code(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::Any => true,
            CategoryFilter::Hurricane => is_hurricane_code(category),
            CategoryFilter::NonHurricane => !is_hurricane_code(category),
            CategoryFilter::Code(code) => category == code,
        }
    }
}

#[cfg(test)]
pub(crate) fn obs(name: &str, year: i32, category: &str, wind_kts: f64) -> StormObservation {
    StormObservation {
        name: name.to_string(),
        year,
        month: 8,
        day: 15,
        latitude: 25.0,
        longitude: -75.0,
        category: category.to_string(),
        wind_speed_knots: wind_kts,
        pressure: 990.0,
    }
}
