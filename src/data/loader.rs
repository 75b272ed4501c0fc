//! CSV Data Loader Module
//! Reads the storm-track CSV with Polars and materializes typed observations.

use crate::data::observation::StormObservation;
use crate::error::{Result, StormError};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Columns every storm-track file must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "NAME", "YEAR", "MONTH", "DAY", "LAT", "LONG", "WIND_KTS", "PRESSURE", "CAT",
];

/// Handles CSV file loading with Polars.
pub struct StormLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for StormLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl StormLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Load a CSV file using Polars.
    ///
    /// Fails with `DataUnavailable` when the file is missing, can't be parsed
    /// as a table, or lacks one of [`REQUIRED_COLUMNS`].
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame> {
        self.file_path = Some(file_path.to_path_buf());

        if !file_path.is_file() {
            return Err(unavailable(file_path, "file does not exist"));
        }

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| unavailable(file_path, e))?;

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| df.column(name).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(unavailable(
                file_path,
                format!("missing columns: {}", missing.join(", ")),
            ));
        }

        self.df = Some(df);
        info!(
            "Loaded {} rows from {}",
            self.get_row_count(),
            file_path.display()
        );
        debug!("Columns: {}", self.get_columns().join(", "));
        self.df
            .as_ref()
            .ok_or_else(|| unavailable(file_path, "no data loaded"))
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Convert the loaded frame into typed observations.
    ///
    /// Rows with a null or out-of-range required cell are skipped and counted.
    pub fn observations(&self) -> Result<Vec<StormObservation>> {
        let path = self.get_file_path().cloned().unwrap_or_default();
        let df = self
            .df
            .as_ref()
            .ok_or_else(|| unavailable(&path, "no data loaded"))?;

        let observations = Self::frame_to_observations(df).map_err(|e| unavailable(&path, e))?;
        let skipped = self.get_row_count() - observations.len();
        if skipped > 0 {
            warn!("Skipped {} rows with missing or malformed values", skipped);
        }
        if observations.is_empty() {
            return Err(unavailable(&path, "no usable rows"));
        }
        debug!("Materialized {} observations", observations.len());
        Ok(observations)
    }

    /// Load and materialize in one step.
    pub fn load(file_path: &Path) -> Result<Vec<StormObservation>> {
        let mut loader = Self::new();
        loader.load_csv(file_path)?;
        loader.observations()
    }

    fn frame_to_observations(df: &DataFrame) -> PolarsResult<Vec<StormObservation>> {
        let names = df.column("NAME")?.cast(&DataType::String)?;
        let categories = df.column("CAT")?.cast(&DataType::String)?;
        let years = df.column("YEAR")?.cast(&DataType::Int32)?;
        let months = df.column("MONTH")?.cast(&DataType::Int32)?;
        let days = df.column("DAY")?.cast(&DataType::Int32)?;
        let lats = df.column("LAT")?.cast(&DataType::Float64)?;
        let longs = df.column("LONG")?.cast(&DataType::Float64)?;
        let winds = df.column("WIND_KTS")?.cast(&DataType::Float64)?;
        let pressures = df.column("PRESSURE")?.cast(&DataType::Float64)?;

        let columns = ObservationColumns {
            names: names.str()?,
            categories: categories.str()?,
            years: years.i32()?,
            months: months.i32()?,
            days: days.i32()?,
            lats: lats.f64()?,
            longs: longs.f64()?,
            winds: winds.f64()?,
            pressures: pressures.f64()?,
        };
        Ok((0..df.height()).filter_map(|i| columns.row_at(i)).collect())
    }
}

/// Typed views over the required columns of one frame.
struct ObservationColumns<'a> {
    names: &'a StringChunked,
    categories: &'a StringChunked,
    years: &'a Int32Chunked,
    months: &'a Int32Chunked,
    days: &'a Int32Chunked,
    lats: &'a Float64Chunked,
    longs: &'a Float64Chunked,
    winds: &'a Float64Chunked,
    pressures: &'a Float64Chunked,
}

impl ObservationColumns<'_> {
    /// Row `i` as an observation, or `None` when a required cell is null or invalid.
    fn row_at(&self, i: usize) -> Option<StormObservation> {
        let name = self.names.get(i)?.trim();
        let wind_speed_knots = self.winds.get(i)?;
        if name.is_empty() || wind_speed_knots < 0.0 || wind_speed_knots.is_nan() {
            return None;
        }
        Some(StormObservation {
            name: name.to_string(),
            year: self.years.get(i)?,
            month: u32::try_from(self.months.get(i)?).ok()?,
            day: u32::try_from(self.days.get(i)?).ok()?,
            latitude: self.lats.get(i)?,
            longitude: self.longs.get(i)?,
            category: self.categories.get(i)?.trim().to_string(),
            wind_speed_knots,
            pressure: self.pressures.get(i)?,
        })
    }
}

fn unavailable(path: &Path, reason: impl ToString) -> StormError {
    StormError::DataUnavailable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = StormLoader::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, StormError::DataUnavailable { .. }));
    }

    #[test]
    fn test_missing_column_is_unavailable() {
        let file = write_csv("NAME,YEAR,MONTH\nABC,1999,8\n");
        let err = StormLoader::load(file.path()).unwrap_err();
        match err {
            StormError::DataUnavailable { reason, .. } => assert!(reason.contains("WIND_KTS")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_loads_and_trims_rows() {
        let file = write_csv(
            "NAME,YEAR,MONTH,DAY,LAT,LONG,WIND_KTS,PRESSURE,CAT\n\
             ABC ,1999,8,20,25.1,-70.2,80,970,H1\n\
             XYZ,2000,9,1,30.0,-80.5,45,0, TS\n",
        );
        let mut loader = StormLoader::new();
        loader.load_csv(file.path()).unwrap();
        assert_eq!(loader.get_row_count(), 2);
        assert!(loader.get_columns().contains(&"WIND_KTS".to_string()));

        let rows = loader.observations().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "ABC");
        assert_eq!(rows[0].wind_speed_knots, 80.0);
        assert_eq!(rows[1].category, "TS");
        assert_eq!(rows[1].pressure, 0.0);
    }

    #[test]
    fn test_skips_rows_with_missing_cells() {
        let file = write_csv(
            "NAME,YEAR,MONTH,DAY,LAT,LONG,WIND_KTS,PRESSURE,CAT\n\
             ABC,1999,8,20,25.1,-70.2,80,970,H1\n\
             DEF,1999,8,21,25.1,-70.2,,970,H1\n",
        );
        let rows = StormLoader::load(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "ABC");
    }

    #[test]
    fn test_skips_blank_names_and_negative_fields() {
        let file = write_csv(
            "NAME,YEAR,MONTH,DAY,LAT,LONG,WIND_KTS,PRESSURE,CAT\n\
             ABC,1999,8,20,25.1,-70.2,80,970,H1\n\
             ,1999,8,21,25.1,-70.2,80,970,H1\n\
             DEF,1999,-1,21,25.1,-70.2,80,970,H1\n\
             GHI,1999,8,22,25.1,-70.2,-5,970,H1\n",
        );
        let mut loader = StormLoader::new();
        loader.load_csv(file.path()).unwrap();
        assert_eq!(loader.get_file_path().map(|p| p.as_path()), Some(file.path()));
        assert_eq!(loader.get_row_count(), 4);

        let rows = loader.observations().unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ABC"]);
    }
}
