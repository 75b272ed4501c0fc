//! Configuration file handling.
//!
//! Settings are read from `.stormtrack.toml` (or an explicit `--config`
//! path); command-line flags override them afterwards.

use crate::error::{Result, StormError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".stormtrack.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Chart rendering settings.
    #[serde(default)]
    pub charts: ChartConfig,

    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// First year of the window used for the mean wind speed trend.
    #[serde(default = "default_from_year")]
    pub from_year: i32,

    /// Last year (inclusive) of that window.
    #[serde(default = "default_to_year")]
    pub to_year: i32,

    /// Drop `NOTNAMED`/`SUBTROP1` rows from storm counts.
    #[serde(default = "default_true")]
    pub exclude_unnamed: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            from_year: default_from_year(),
            to_year: default_to_year(),
            exclude_unnamed: true,
        }
    }
}

fn default_from_year() -> i32 {
    1951
}

fn default_to_year() -> i32 {
    2008
}

fn default_true() -> bool {
    true
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Render PNG charts at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Number of hexagons across the x range.
    #[serde(default = "default_hexbin_gridsize")]
    pub hexbin_gridsize: usize,

    /// Evaluation points per density curve.
    #[serde(default = "default_density_points")]
    pub density_points: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: default_width(),
            height: default_height(),
            histogram_bins: default_histogram_bins(),
            hexbin_gridsize: default_hexbin_gridsize(),
            density_points: default_density_points(),
        }
    }
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    600
}

fn default_histogram_bins() -> usize {
    30
}

fn default_hexbin_gridsize() -> usize {
    40
}

fn default_density_points() -> usize {
    200
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving chart PNGs and `summary.json`.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("storm_report")
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Not validated here: command-line overrides may still repair the
    /// values, so callers run [`Config::validate`] once they are merged.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StormError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            StormError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given, else `.stormtrack.toml` if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            Self::load(local)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject settings no run could honour.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.from_year > self.analysis.to_year {
            return Err(StormError::Config(format!(
                "from_year {} is after to_year {}",
                self.analysis.from_year, self.analysis.to_year
            )));
        }
        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(StormError::Config("chart size must be non-zero".into()));
        }
        if self.charts.histogram_bins == 0 || self.charts.hexbin_gridsize == 0 {
            return Err(StormError::Config(
                "histogram_bins and hexbin_gridsize must be positive".into(),
            ));
        }
        if self.charts.density_points < 2 {
            return Err(StormError::Config("density_points must be at least 2".into()));
        }
        Ok(())
    }

    /// Default configuration rendered as TOML, for `--init-config`.
    pub fn default_toml() -> String {
        let body = toml::to_string_pretty(&Config::default()).unwrap_or_default();
        format!("# stormtrack configuration\n\n{}", body)
    }
}
