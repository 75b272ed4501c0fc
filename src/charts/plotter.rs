//! Chart Plotter Module
//! Turns aggregations into chart-ready series, one section per chart.

use crate::config::Config;
use crate::data::{CategoryFilter, StormTable};
use crate::error::{Result, StormError};
use crate::stats::distribution::{self, HexGrid, HistogramBin};
use crate::stats::{Aggregator, ChangeKind, StatsCalculator, Trend};
use plotters::style::RGBColor;
use tracing::{debug, error};

/// Main series colour
pub const PRIMARY_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue

pub const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),  // Red
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
    RGBColor(26, 188, 156), // Teal
    RGBColor(233, 30, 99),  // Pink
    RGBColor(0, 188, 212),  // Cyan
    RGBColor(255, 87, 34),  // Deep Orange
    RGBColor(121, 85, 72),  // Brown
    RGBColor(96, 125, 139), // Blue Grey
];

/// A labelled polyline.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// What to draw.
#[derive(Debug, Clone)]
pub enum ChartKind {
    Line {
        series: Vec<Series>,
        trend: Option<Trend>,
    },
    Bar(Vec<(f64, f64)>),
    Histogram(Vec<HistogramBin>),
    Density(Vec<Series>),
    Scatter(Vec<(f64, f64)>),
    Hexbin(HexGrid),
}

/// Chart data for a single report section
#[derive(Debug, Clone)]
pub struct ChartData {
    pub file_name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Format x ticks as whole numbers (years, months).
    pub integer_x: bool,
    pub kind: ChartKind,
}

impl ChartData {
    fn new(file_name: &str, title: &str, x_label: &str, y_label: &str, kind: ChartKind) -> Self {
        Self {
            file_name: file_name.to_string(),
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            integer_x: false,
            kind,
        }
    }

    fn integer_x(mut self) -> Self {
        self.integer_x = true;
        self
    }
}

type Section = fn(&StormTable, &Config) -> Result<ChartData>;

/// Number of chart sections in a full report.
pub const SECTION_COUNT: usize = SECTIONS.len();

const SECTIONS: [(&str, Section); 10] = [
    ("storms per year", ChartPlotter::storms_per_year),
    ("absolute change", ChartPlotter::absolute_change),
    ("percent change", ChartPlotter::percent_change),
    ("hurricanes by category", ChartPlotter::hurricanes_by_category),
    ("mean wind speed", ChartPlotter::mean_wind_speed),
    ("wind histogram", ChartPlotter::wind_histogram),
    ("wind density", ChartPlotter::wind_density),
    ("wind vs pressure", ChartPlotter::wind_vs_pressure),
    ("track positions", ChartPlotter::track_positions),
    ("hurricanes by month", ChartPlotter::hurricanes_by_month),
];

/// Builds the report's charts from the derived table.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for the n-th series.
    pub fn series_color(index: usize) -> RGBColor {
        if index == 0 {
            PRIMARY_COLOR
        } else {
            PALETTE[(index - 1) % PALETTE.len()]
        }
    }

    /// Build every section; a section whose aggregation fails is logged and skipped.
    pub fn build_charts(table: &StormTable, config: &Config) -> Vec<ChartData> {
        SECTIONS
            .iter()
            .filter_map(|(name, section)| match section(table, config) {
                Ok(chart) => {
                    debug!("Prepared chart '{}'", name);
                    Some(chart)
                }
                Err(e) => {
                    error!("Skipping chart '{}': {}", name, e);
                    None
                }
            })
            .collect()
    }

    fn named_storm_series(table: &StormTable, config: &Config) -> Result<Vec<(i32, f64)>> {
        let counts =
            Aggregator::distinct_storm_count_by_year(table, config.analysis.exclude_unnamed)?;
        Ok(Aggregator::to_series(&counts))
    }

    pub fn storms_per_year(table: &StormTable, config: &Config) -> Result<ChartData> {
        let points = as_points(&Self::named_storm_series(table, config)?);
        let trend = StatsCalculator::linear_trend(&points).ok();
        Ok(ChartData::new(
            "01_storms_per_year.png",
            "Distinct named storms per year",
            "Year",
            "Storms",
            ChartKind::Line {
                series: vec![Series {
                    label: "storms".into(),
                    points,
                }],
                trend,
            },
        )
        .integer_x())
    }

    pub fn absolute_change(table: &StormTable, config: &Config) -> Result<ChartData> {
        let series = Self::named_storm_series(table, config)?;
        let deltas = Aggregator::year_over_year_change(&series, ChangeKind::Absolute)?;
        Ok(ChartData::new(
            "02_storms_absolute_change.png",
            "Year-over-year change in named storms",
            "Year",
            "Change (storms)",
            ChartKind::Bar(as_points(&deltas)),
        )
        .integer_x())
    }

    pub fn percent_change(table: &StormTable, config: &Config) -> Result<ChartData> {
        let series = Self::named_storm_series(table, config)?;
        let deltas = Aggregator::year_over_year_change(&series, ChangeKind::Percent)?;
        let bars = deltas
            .iter()
            .map(|&(year, ratio)| (year as f64, ratio * 100.0))
            .collect();
        Ok(ChartData::new(
            "03_storms_percent_change.png",
            "Year-over-year percent change in named storms",
            "Year",
            "Change (%)",
            ChartKind::Bar(bars),
        )
        .integer_x())
    }

    pub fn hurricanes_by_category(table: &StormTable, _config: &Config) -> Result<ChartData> {
        let counts = Aggregator::distinct_storm_count_by_year_and_category(
            &table.named(),
            &CategoryFilter::Hurricane,
        )?;

        let mut series: Vec<Series> = Vec::new();
        for ((year, category), n) in counts {
            let point = (year as f64, n as f64);
            match series.iter_mut().find(|s| s.label == category) {
                Some(s) => s.points.push(point),
                None => series.push(Series {
                    label: category,
                    points: vec![point],
                }),
            }
        }
        for s in &mut series {
            s.points.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        series.sort_by(|a, b| a.label.cmp(&b.label));

        Ok(ChartData::new(
            "04_hurricanes_by_category.png",
            "Hurricanes per year by category",
            "Year",
            "Storms",
            ChartKind::Line {
                series,
                trend: None,
            },
        )
        .integer_x())
    }

    pub fn mean_wind_speed(table: &StormTable, config: &Config) -> Result<ChartData> {
        let by_year = Aggregator::mean_wind_speed_by_year(table)?;
        let window = Aggregator::series_within_years(
            &by_year,
            config.analysis.from_year,
            config.analysis.to_year,
        )?;
        let points: Vec<(f64, f64)> = window.iter().map(|(&y, &v)| (y as f64, v)).collect();
        let trend = StatsCalculator::linear_trend(&points).ok();
        let title = format!(
            "Mean wind speed per year, {}-{}",
            config.analysis.from_year, config.analysis.to_year
        );
        Ok(ChartData::new(
            "05_mean_wind_speed.png",
            &title,
            "Year",
            "Mean wind speed (mph)",
            ChartKind::Line {
                series: vec![Series {
                    label: "mean wind".into(),
                    points,
                }],
                trend,
            },
        )
        .integer_x())
    }

    pub fn wind_histogram(table: &StormTable, config: &Config) -> Result<ChartData> {
        let values = table.values(|r| r.wind_speed_mph);
        let bins = distribution::histogram(&values, config.charts.histogram_bins)?;
        Ok(ChartData::new(
            "06_wind_histogram.png",
            "Wind speed distribution",
            "Wind speed (mph)",
            "Observations",
            ChartKind::Histogram(bins),
        ))
    }

    pub fn wind_density(table: &StormTable, config: &Config) -> Result<ChartData> {
        let classes = [
            ("hurricane", CategoryFilter::Hurricane),
            ("non-hurricane", CategoryFilter::NonHurricane),
        ];
        let series: Vec<Series> = classes
            .iter()
            .filter_map(|(label, filter)| {
                let values = table
                    .matching_category(filter)
                    .values(|r| r.wind_speed_mph);
                distribution::gaussian_kde(&values, config.charts.density_points)
                    .ok()
                    .map(|points| Series {
                        label: label.to_string(),
                        points,
                    })
            })
            .collect();
        if series.is_empty() {
            return Err(StormError::empty("wind_density"));
        }
        Ok(ChartData::new(
            "07_wind_density.png",
            "Wind speed density by storm class",
            "Wind speed (mph)",
            "Density",
            ChartKind::Density(series),
        ))
    }

    pub fn wind_vs_pressure(table: &StormTable, _config: &Config) -> Result<ChartData> {
        let means = Aggregator::mean_by_category_year_month_day_location(table, true)?;
        let points = means
            .iter()
            .map(|m| (m.mean_wind_kts, m.mean_pressure))
            .collect();
        Ok(ChartData::new(
            "08_wind_vs_pressure.png",
            "Mean wind vs mean pressure (recorded pressure only)",
            "Mean wind (kts)",
            "Mean pressure (mb)",
            ChartKind::Scatter(points),
        ))
    }

    pub fn track_positions(table: &StormTable, config: &Config) -> Result<ChartData> {
        let points: Vec<(f64, f64)> = table
            .rows()
            .iter()
            .map(|r| (r.observation.longitude, r.observation.latitude))
            .collect();
        let grid = distribution::hexbin(&points, config.charts.hexbin_gridsize)?;
        Ok(ChartData::new(
            "09_track_positions.png",
            "Observation density by position",
            "Longitude",
            "Latitude",
            ChartKind::Hexbin(grid),
        ))
    }

    pub fn hurricanes_by_month(table: &StormTable, _config: &Config) -> Result<ChartData> {
        let months = Aggregator::count_by_month(&table.named(), &CategoryFilter::Hurricane)?;
        let bars = months
            .iter()
            .map(|(&month, &n)| (month as f64, n as f64))
            .collect();
        Ok(ChartData::new(
            "10_hurricanes_by_month.png",
            "Hurricanes by month",
            "Month",
            "Storms",
            ChartKind::Bar(bars),
        )
        .integer_x())
    }
}

fn as_points(series: &[(i32, f64)]) -> Vec<(f64, f64)> {
    series.iter().map(|&(year, v)| (year as f64, v)).collect()
}
