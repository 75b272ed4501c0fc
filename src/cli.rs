//! Command-line interface argument parsing.

use clap::Parser;
use std::path::PathBuf;
use stormtrack::Config;
use tracing::Level;

/// stormtrack - exploratory analysis of historical storm-track data
///
/// Reads a storm-track CSV (NAME, YEAR, MONTH, DAY, LAT, LONG, WIND_KTS,
/// PRESSURE, CAT), writes summary.json and the report charts.
///
/// Examples:
///   stormtrack --input storms.csv
///   stormtrack --input storms.csv --from-year 1970 --to-year 2000
///   stormtrack --input storms.csv --no-charts --output-dir out
///   stormtrack --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Storm-track CSV file to analyze
    #[arg(short, long, value_name = "CSV", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Directory for charts and summary.json
    #[arg(short, long, value_name = "DIR", env = "STORMTRACK_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .stormtrack.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// First year of the mean wind speed window
    #[arg(long, value_name = "YEAR")]
    pub from_year: Option<i32>,

    /// Last year (inclusive) of the mean wind speed window
    #[arg(long, value_name = "YEAR")]
    pub to_year: Option<i32>,

    /// Count NOTNAMED/SUBTROP1 rows as storms
    #[arg(long)]
    pub include_unnamed: bool,

    /// Skip chart rendering, write summary.json only
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Write a default .stormtrack.toml and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::INFO
        }
    }

    /// Apply command-line overrides on top of the file configuration.
    pub fn merge_into(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(year) = self.from_year {
            config.analysis.from_year = year;
        }
        if let Some(year) = self.to_year {
            config.analysis.to_year = year;
        }
        if self.include_unnamed {
            config.analysis.exclude_unnamed = false;
        }
        if self.no_charts {
            config.charts.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let args = Args::parse_from([
            "stormtrack",
            "--input",
            "storms.csv",
            "--from-year",
            "1970",
            "--no-charts",
            "--include-unnamed",
            "-o",
            "out",
        ]);
        let mut config = Config::default();
        args.merge_into(&mut config);
        assert_eq!(config.analysis.from_year, 1970);
        assert_eq!(config.analysis.to_year, 2008);
        assert!(!config.analysis.exclude_unnamed);
        assert!(!config.charts.enabled);
        assert_eq!(config.output.dir, PathBuf::from("out"));
    }

    #[test]
    fn test_input_required_unless_init_config() {
        assert!(Args::try_parse_from(["stormtrack"]).is_err());
        let args = Args::try_parse_from(["stormtrack", "--init-config"]).unwrap();
        assert!(args.input.is_none());
    }

    #[test]
    fn test_log_level() {
        let args = Args::parse_from(["stormtrack", "-i", "x.csv", "-v"]);
        assert_eq!(args.log_level(), Level::DEBUG);
        let args = Args::parse_from(["stormtrack", "-i", "x.csv", "-q"]);
        assert_eq!(args.log_level(), Level::ERROR);
    }

    #[test]
    fn test_overrides_repair_file_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stormtrack.toml");
        std::fs::write(&path, "[analysis]\nfrom_year = 2010\n").unwrap();

        let mut config = Config::load_or_default(Some(&path)).unwrap();
        let args = Args::parse_from(["stormtrack", "-i", "x.csv", "--to-year", "2015"]);
        args.merge_into(&mut config);
        assert_eq!(config.analysis.to_year, 2015);
        assert!(config.validate().is_ok());
    }
}
