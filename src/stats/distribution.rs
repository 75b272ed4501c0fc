//! Distribution helpers behind the histogram, density and hexbin charts.

use crate::error::{Result, StormError};
use serde::Serialize;
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// One occupied hexagon: centre and number of points inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HexCell {
    pub x: f64,
    pub y: f64,
    pub count: usize,
}

/// Hexagonal binning result. `sx`/`sy` are the lattice spacings.
#[derive(Debug, Clone, Serialize)]
pub struct HexGrid {
    pub sx: f64,
    pub sy: f64,
    pub cells: Vec<HexCell>,
}

impl HexGrid {
    /// Pointy-top hexagon outline around `cell`.
    pub fn vertices(&self, cell: &HexCell) -> [(f64, f64); 6] {
        let (hx, hy) = (self.sx / 2.0, self.sy / 6.0);
        [
            (cell.x + hx, cell.y - hy),
            (cell.x + hx, cell.y + hy),
            (cell.x, cell.y + 2.0 * hy),
            (cell.x - hx, cell.y + hy),
            (cell.x - hx, cell.y - hy),
            (cell.x, cell.y - 2.0 * hy),
        ]
    }

    pub fn max_count(&self) -> usize {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Result<Vec<HistogramBin>> {
    if values.is_empty() || bins == 0 {
        return Err(StormError::empty("histogram"));
    }
    let (mut lo, mut hi) = bounds(values.iter().copied());
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + i as f64 * width,
            end: lo + (i + 1) as f64 * width,
            count,
        })
        .collect())
}

/// Gaussian kernel density estimate evaluated at `points` evenly spaced
/// positions spanning the data plus three bandwidths either side.
///
/// Bandwidth follows Scott's rule, `std * n^(-1/5)`.
pub fn gaussian_kde(values: &[f64], points: usize) -> Result<Vec<(f64, f64)>> {
    if values.len() < 2 || points < 2 {
        return Err(StormError::empty("gaussian_kde"));
    }
    let n = values.len() as f64;
    let std = Statistics::std_dev(values.iter());
    let bandwidth = if std.is_finite() && std > 0.0 {
        std * n.powf(-0.2)
    } else {
        1.0
    };

    let kernel = Normal::standard();
    let (lo, hi) = bounds(values.iter().copied());
    let (start, end) = (lo - 3.0 * bandwidth, hi + 3.0 * bandwidth);
    let step = (end - start) / (points - 1) as f64;

    Ok((0..points)
        .map(|i| {
            let x = start + i as f64 * step;
            let density = values
                .iter()
                .map(|&v| kernel.pdf((x - v) / bandwidth))
                .sum::<f64>()
                / (n * bandwidth);
            (x, density)
        })
        .collect())
}

/// Bin `(x, y)` points into a hexagonal grid `gridsize` cells wide.
///
/// Two offset rectangular lattices are overlaid; each point goes to the
/// nearer lattice centre, which yields hexagonal cells. Empty cells are omitted.
pub fn hexbin(points: &[(f64, f64)], gridsize: usize) -> Result<HexGrid> {
    if points.is_empty() || gridsize == 0 {
        return Err(StormError::empty("hexbin"));
    }
    let (mut xmin, mut xmax) = bounds(points.iter().map(|p| p.0));
    let (mut ymin, mut ymax) = bounds(points.iter().map(|p| p.1));
    if xmin == xmax {
        xmin -= 0.5;
        xmax += 0.5;
    }
    if ymin == ymax {
        ymin -= 0.5;
        ymax += 0.5;
    }

    let nx = gridsize as f64;
    let ny = (nx / 3f64.sqrt()).max(1.0);
    let sx = (xmax - xmin) / nx;
    let sy = (ymax - ymin) / ny;

    // key: (lattice, column, row)
    let mut cells: BTreeMap<(u8, i64, i64), usize> = BTreeMap::new();
    for &(x, y) in points {
        let ix = (x - xmin) / sx;
        let iy = (y - ymin) / sy;
        let (ix1, iy1) = (ix.round(), iy.round());
        let (ix2, iy2) = (ix.floor(), iy.floor());
        let d1 = (ix - ix1).powi(2) + 3.0 * (iy - iy1).powi(2);
        let d2 = (ix - ix2 - 0.5).powi(2) + 3.0 * (iy - iy2 - 0.5).powi(2);
        let key = if d1 < d2 {
            (0, ix1 as i64, iy1 as i64)
        } else {
            (1, ix2 as i64, iy2 as i64)
        };
        *cells.entry(key).or_insert(0) += 1;
    }

    let cells = cells
        .into_iter()
        .map(|((lattice, i, j), count)| {
            let offset = if lattice == 0 { 0.0 } else { 0.5 };
            HexCell {
                x: xmin + (i as f64 + offset) * sx,
                y: ymin + (j as f64 + offset) * sy,
                count,
            }
        })
        .collect();

    Ok(HexGrid { sx, sy, cells })
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_everything() {
        let values = [1.0, 2.0, 2.5, 3.0, 10.0];
        let bins = histogram(&values, 3).unwrap();
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].start, 1.0);
        assert_eq!(bins[2].end, 10.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].count, 4);
        assert_eq!(bins[2].count, 1);
    }

    #[test]
    fn test_histogram_of_constant_values() {
        let bins = histogram(&[5.0, 5.0], 4).unwrap();
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_kde_integrates_to_one() {
        let values: Vec<f64> = (0..200).map(|i| (i % 37) as f64 * 1.7 + 20.0).collect();
        let curve = gaussian_kde(&values, 400).unwrap();
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        assert!((area - 1.0).abs() < 0.02, "area = {area}");
        assert!(curve.iter().all(|&(_, d)| d >= 0.0));
    }

    #[test]
    fn test_kde_needs_two_values() {
        assert!(gaussian_kde(&[1.0], 10).is_err());
    }

    #[test]
    fn test_hexbin_conserves_points() {
        let points: Vec<(f64, f64)> = (0..500)
            .map(|i| ((i % 50) as f64 * -1.3, (i % 17) as f64 * 0.9 + 10.0))
            .collect();
        let grid = hexbin(&points, 10).unwrap();
        assert_eq!(grid.cells.iter().map(|c| c.count).sum::<usize>(), points.len());
        assert!(grid.max_count() >= 1);
    }

    #[test]
    fn test_hexbin_single_location() {
        let grid = hexbin(&[(-80.0, 25.0); 7], 20).unwrap();
        assert_eq!(grid.cells.len(), 1);
        assert_eq!(grid.cells[0].count, 7);
        let v = grid.vertices(&grid.cells[0]);
        assert!(v.iter().all(|&(x, _)| (x - grid.cells[0].x).abs() <= grid.sx / 2.0 + 1e-12));
    }
}
