//! Regular lat/lon grids: coordinate axes, index windows and 2-D slices.

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// Tolerance for inclusive coordinate comparisons, in degrees.
const COORD_EPSILON: f64 = 1e-9;

/// Coordinate axes of a time-indexed lat/lon dataset.
///
/// Latitude and longitude axes are monotonic; either direction is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    pub times: Vec<DateTime<Utc>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
}

impl GridAxes {
    pub fn new(times: Vec<DateTime<Utc>>, lats: Vec<f64>, lons: Vec<f64>) -> Self {
        Self { times, lats, lons }
    }

    /// Length of the time dimension.
    pub fn time_len(&self) -> usize {
        self.times.len()
    }

    /// True when the longitude axis uses the 0..360 convention.
    pub fn lon_is_0_360(&self) -> bool {
        self.lons.iter().any(|&lon| lon > 180.0)
    }

    /// Inclusive lat/lon range selection.
    ///
    /// Returns `None` when the region does not cover any grid point.
    pub fn select(&self, region: &BoundingBox) -> Option<GridWindow> {
        let region = region.with_longitude_convention(self.lon_is_0_360());
        let lat = select_range(&self.lats, region.min_y, region.max_y)?;
        let lon = select_range(&self.lons, region.min_x, region.max_x)?;
        Some(GridWindow { lat, lon })
    }

    /// Coverage of the spatial axes.
    pub fn coverage(&self) -> Option<BoundingBox> {
        axis_bounds(&self.lats, &self.lons)
    }
}

/// A rectangular block of grid indices (end-exclusive ranges).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridWindow {
    pub lat: Range<usize>,
    pub lon: Range<usize>,
}

impl GridWindow {
    pub fn height(&self) -> usize {
        self.lat.len()
    }

    pub fn width(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty() || self.lon.is_empty()
    }
}

/// A 2-D lat × lon block of values with its coordinates.
///
/// Values are row-major: `values[row * lons.len() + col]` sits at
/// `(lats[row], lons[col])`. Missing values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSlice {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub values: Vec<f32>,
}

impl GridSlice {
    pub fn new(lats: Vec<f64>, lons: Vec<f64>, values: Vec<f32>) -> Self {
        debug_assert_eq!(lats.len() * lons.len(), values.len());
        Self { lats, lons, values }
    }

    pub fn width(&self) -> usize {
        self.lons.len()
    }

    pub fn height(&self) -> usize {
        self.lats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        self.values.get(row * self.width() + col).copied()
    }

    /// Extract the block covered by `window` (indices relative to this slice).
    pub fn window(&self, window: &GridWindow) -> GridSlice {
        let lat_end = window.lat.end.min(self.height());
        let lon_end = window.lon.end.min(self.width());
        let lats = self.lats[window.lat.start.min(lat_end)..lat_end].to_vec();
        let lons = self.lons[window.lon.start.min(lon_end)..lon_end].to_vec();

        let mut values = Vec::with_capacity(lats.len() * lons.len());
        for row in window.lat.start..lat_end {
            let start = row * self.width();
            values.extend_from_slice(&self.values[start + window.lon.start..start + lon_end]);
        }

        GridSlice { lats, lons, values }
    }

    /// Inclusive crop to a region. Cropping twice with the same (or a larger)
    /// region returns the same slice.
    pub fn crop(&self, region: &BoundingBox) -> Option<GridSlice> {
        let lon_0_360 = self.lons.iter().any(|&lon| lon > 180.0);
        let region = region.with_longitude_convention(lon_0_360);
        let lat = select_range(&self.lats, region.min_y, region.max_y)?;
        let lon = select_range(&self.lons, region.min_x, region.max_x)?;
        Some(self.window(&GridWindow { lat, lon }))
    }

    /// Apply a pointwise function.
    pub fn map<F>(&self, f: F) -> GridSlice
    where
        F: Fn(f32) -> f32,
    {
        GridSlice {
            lats: self.lats.clone(),
            lons: self.lons.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two slices on the same grid pointwise.
    pub fn zip_with<F>(&self, other: &GridSlice, f: F) -> Option<GridSlice>
    where
        F: Fn(f32, f32) -> f32,
    {
        if self.lats != other.lats || self.lons != other.lons {
            return None;
        }
        Some(GridSlice {
            lats: self.lats.clone(),
            lons: self.lons.clone(),
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Minimum and maximum of the non-NaN values.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        let (min, max) = self
            .values
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });
        (min <= max).then_some((min, max))
    }
}

/// Indices of a monotonic axis whose values fall inside `[lo, hi]`.
pub fn select_range(axis: &[f64], lo: f64, hi: f64) -> Option<Range<usize>> {
    let mut first = None;
    let mut last = None;
    for (i, &value) in axis.iter().enumerate() {
        if value >= lo - COORD_EPSILON && value <= hi + COORD_EPSILON {
            first.get_or_insert(i);
            last = Some(i);
        }
    }
    match (first, last) {
        (Some(first), Some(last)) => Some(first..last + 1),
        _ => None,
    }
}

/// Coordinate at a fractional index, interpolating between axis points.
pub fn interpolate_axis(axis: &[f64], position: f64) -> f64 {
    match axis.len() {
        0 => f64::NAN,
        1 => axis[0],
        n => {
            let position = position.clamp(0.0, (n - 1) as f64);
            let lower = (position.floor() as usize).min(n - 2);
            let t = position - lower as f64;
            axis[lower] + t * (axis[lower + 1] - axis[lower])
        }
    }
}

fn axis_bounds(lats: &[f64], lons: &[f64]) -> Option<BoundingBox> {
    let fold = |axis: &[f64]| {
        axis.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| (min.min(v), max.max(v)))
    };
    if lats.is_empty() || lons.is_empty() {
        return None;
    }
    let (min_y, max_y) = fold(lats);
    let (min_x, max_x) = fold(lons);
    Some(BoundingBox::new(min_x, min_y, max_x, max_y))
}
