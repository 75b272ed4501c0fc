//! Static Chart Renderer
//! Draws [`ChartData`] to PNG files with plotters' bitmap backend.
//!
//! Layout for every chart:
//! 1. Title centred on top
//! 2. Mesh with axis descriptions
//! 3. Series; line and density charts get a legend in the upper right

use crate::charts::plotter::{ChartData, ChartKind, ChartPlotter, Series, PRIMARY_COLOR};
use crate::error::{Result, StormError};
use crate::stats::{HexGrid, HistogramBin, Trend};
use plotters::coord::Shift;
use plotters::prelude::*;
use rayon::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{error, info};

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const TITLE_FONT: (&str, u32) = ("sans-serif", 22);
const BAR_WIDTH: f64 = 0.8;

// hexbin gradient, low to high count
const HEX_LOW: RGBColor = RGBColor(222, 235, 247);
const HEX_HIGH: RGBColor = RGBColor(8, 48, 107);

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one chart to `path`.
    pub fn render(chart: &ChartData, path: &Path, width: u32, height: u32) -> Result<()> {
        Self::draw(chart, path, (width, height)).map_err(|e| StormError::Chart {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Render every chart into `dir` in parallel; failures are logged and skipped.
    pub fn render_all(charts: &[ChartData], dir: &Path, width: u32, height: u32) -> Vec<PathBuf> {
        charts
            .par_iter()
            .filter_map(|chart| {
                let path = dir.join(&chart.file_name);
                match Self::render(chart, &path, width, height) {
                    Ok(()) => {
                        info!("Wrote {}", path.display());
                        Some(path)
                    }
                    Err(e) => {
                        error!("{}", e);
                        None
                    }
                }
            })
            .collect()
    }

    fn draw(chart: &ChartData, path: &Path, size: (u32, u32)) -> DrawResult<()> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        match &chart.kind {
            ChartKind::Line { series, trend } => {
                Self::draw_lines(&root, chart, series, trend.as_ref())?
            }
            ChartKind::Density(series) => Self::draw_lines(&root, chart, series, None)?,
            ChartKind::Bar(bars) => Self::draw_bars(&root, chart, bars)?,
            ChartKind::Histogram(bins) => Self::draw_histogram(&root, chart, bins)?,
            ChartKind::Scatter(points) => Self::draw_scatter(&root, chart, points)?,
            ChartKind::Hexbin(grid) => Self::draw_hexbin(&root, chart, grid)?,
        }

        root.present()?;
        Ok(())
    }

    fn draw_lines(
        root: &Area<'_>,
        chart: &ChartData,
        series: &[Series],
        trend: Option<&Trend>,
    ) -> DrawResult<()> {
        let points = series.iter().flat_map(|s| s.points.iter().copied());
        let (x_range, y_range) = Self::ranges(points, false);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, TITLE_FONT)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), y_range)?;
        let x_fmt = Self::x_formatter(chart.integer_x);
        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_label_formatter(&x_fmt)
            .draw()?;

        for (i, s) in series.iter().enumerate() {
            let color = ChartPlotter::series_color(i);
            ctx.draw_series(LineSeries::new(
                s.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        if let Some(trend) = trend {
            let ends = [x_range.start, x_range.end];
            ctx.draw_series(LineSeries::new(
                ends.iter().map(|&x| (x, trend.at(x))),
                BLACK.stroke_width(1),
            ))?
            .label(format!("trend ({:+.3}/yr)", trend.slope))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_bars(root: &Area<'_>, chart: &ChartData, bars: &[(f64, f64)]) -> DrawResult<()> {
        let (x_range, y_range) = Self::ranges(bars.iter().copied(), true);
        let half = BAR_WIDTH / 2.0;
        let x_range = (x_range.start - half)..(x_range.end + half);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, TITLE_FONT)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;
        let x_fmt = Self::x_formatter(chart.integer_x);
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_label_formatter(&x_fmt)
            .draw()?;

        ctx.draw_series(bars.iter().map(|&(x, y)| {
            let color = if y >= 0.0 {
                PRIMARY_COLOR
            } else {
                ChartPlotter::series_color(1)
            };
            Rectangle::new([(x - half, 0.0), (x + half, y)], color.filled())
        }))?;
        Ok(())
    }

    fn draw_histogram(root: &Area<'_>, chart: &ChartData, bins: &[HistogramBin]) -> DrawResult<()> {
        let lo = bins.first().map(|b| b.start).unwrap_or(0.0);
        let hi = bins.last().map(|b| b.end).unwrap_or(1.0);
        let top = bins.iter().map(|b| b.count).max().unwrap_or(1).max(1) as f64;

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, TITLE_FONT)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, 0.0..top * 1.05)?;
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()?;

        ctx.draw_series(bins.iter().map(|b| {
            Rectangle::new(
                [(b.start, 0.0), (b.end, b.count as f64)],
                PRIMARY_COLOR.mix(0.7).filled(),
            )
        }))?;
        ctx.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], WHITE.stroke_width(1))
        }))?;
        Ok(())
    }

    fn draw_scatter(root: &Area<'_>, chart: &ChartData, points: &[(f64, f64)]) -> DrawResult<()> {
        let (x_range, y_range) = Self::ranges(points.iter().copied(), false);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, TITLE_FONT)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;
        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()?;

        ctx.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, 2, PRIMARY_COLOR.mix(0.5).filled())),
        )?;
        Ok(())
    }

    fn draw_hexbin(root: &Area<'_>, chart: &ChartData, grid: &HexGrid) -> DrawResult<()> {
        let outline = grid.cells.iter().flat_map(|c| grid.vertices(c));
        let (x_range, y_range) = Self::ranges(outline, false);
        let max = grid.max_count().max(1) as f64;

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, TITLE_FONT)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;
        ctx.configure_mesh()
            .disable_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()?;

        ctx.draw_series(grid.cells.iter().map(|cell| {
            // log scale keeps sparse cells visible next to dense ones
            let t = (cell.count as f64).ln_1p() / max.ln_1p();
            Polygon::new(grid.vertices(cell).to_vec(), gradient(t).filled())
        }))?;
        Ok(())
    }

    fn x_formatter(integer_x: bool) -> impl Fn(&f64) -> String {
        move |x: &f64| {
            if integer_x {
                format!("{:.0}", x)
            } else {
                format!("{:.1}", x)
            }
        }
    }

    /// Padded axis ranges; `include_zero` anchors bars at the origin.
    fn ranges(
        points: impl Iterator<Item = (f64, f64)>,
        include_zero: bool,
    ) -> (Range<f64>, Range<f64>) {
        let (mut x_lo, mut x_hi, mut y_lo, mut y_hi) = (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for (x, y) in points {
            x_lo = x_lo.min(x);
            x_hi = x_hi.max(x);
            y_lo = y_lo.min(y);
            y_hi = y_hi.max(y);
        }
        if include_zero {
            y_lo = y_lo.min(0.0);
            y_hi = y_hi.max(0.0);
        }
        (padded(x_lo, x_hi, 0.02), padded(y_lo, y_hi, 0.08))
    }
}

fn padded(lo: f64, hi: f64, fraction: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let span = if hi > lo { hi - lo } else { 1.0 };
    (lo - span * fraction)..(hi + span * fraction)
}

fn gradient(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        mix(HEX_LOW.0, HEX_HIGH.0),
        mix(HEX_LOW.1, HEX_HIGH.1),
        mix(HEX_LOW.2, HEX_HIGH.2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_pad_and_anchor() {
        let (x, y) = StaticChartRenderer::ranges([(1.0, 5.0), (11.0, 10.0)].into_iter(), true);
        assert!(x.start < 1.0 && x.end > 11.0);
        assert!(y.start < 0.0 && y.end > 10.0);
    }

    #[test]
    fn test_degenerate_ranges_are_widened() {
        let (x, y) = StaticChartRenderer::ranges([(3.0, 3.0)].into_iter(), false);
        assert!(x.end > x.start);
        assert!(y.end > y.start);
        assert_eq!(padded(f64::INFINITY, f64::NEG_INFINITY, 0.1), 0.0..1.0);
    }

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(gradient(0.0), HEX_LOW);
        assert_eq!(gradient(1.0), HEX_HIGH);
        assert_eq!(gradient(7.0), HEX_HIGH);
    }
}
