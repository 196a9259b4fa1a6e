//! Geographic bounding box for regions of interest.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// `x` is longitude and `y` is latitude. Both edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when min <= max on both axes and every edge is finite.
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Grow the box by `margin` degrees on every side.
    pub fn expand(&self, margin: f64) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x - margin,
            min_y: (self.min_y - margin).max(-90.0),
            max_x: self.max_x + margin,
            max_y: (self.max_y + margin).min(90.0),
        }
    }

    /// Shift the longitudes by a whole number of turns so the box fits a
    /// 0..360 or -180..180 axis convention.
    pub fn with_longitude_convention(&self, zero_to_360: bool) -> BoundingBox {
        let shift = if zero_to_360 && self.min_x < 0.0 {
            360.0
        } else if !zero_to_360 && self.max_x > 180.0 {
            -360.0
        } else {
            0.0
        };

        BoundingBox {
            min_x: self.min_x + shift,
            max_x: self.max_x + shift,
            ..*self
        }
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}..{}°E, {}..{}°N]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}
