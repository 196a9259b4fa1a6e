//! Geographic overlays: land shading and coastline from a land/sea mask,
//! boundary lines from shapefiles.

use std::path::Path;

use forecast_common::GridSlice;
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use shapefile::dbase::FieldValue;
use tiny_skia::{Mask, Pixmap};

use crate::contour::{self, Contour, ContourConfig, Point};
use crate::error::{RenderError, RenderResult};
use crate::gradient::{fill_cells, Color};
use crate::map::MapFrame;

/// Mask values at or above this count as land.
pub const LAND_THRESHOLD: f32 = 0.5;

/// Indonesia/Malaysia land boundary across Borneo, west to east, from
/// Natural Earth 1:110m admin-0 lines.
const BORNEO_BORDER: &[(f64, f64)] = &[
    (109.663, 2.006),
    (109.830, 1.338),
    (110.514, 0.773),
    (111.159, 0.976),
    (111.798, 0.904),
    (112.380, 1.410),
    (112.860, 1.498),
    (113.806, 1.218),
    (114.621, 1.431),
    (115.134, 2.821),
    (115.519, 3.169),
    (115.866, 4.307),
    (117.015, 4.306),
    (117.882, 4.138),
];

/// Keep only shapes whose attribute `field` equals `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFilter {
    pub field: String,
    pub value: String,
}

/// Whether a dBase attribute matches the expected text. Character fields
/// compare trimmed and case-insensitively; numeric fields compare as numbers.
pub fn field_value_matches(value: &FieldValue, expected: &str) -> bool {
    let expected = expected.trim();
    match value {
        FieldValue::Character(Some(text)) | FieldValue::Memo(text) => text.trim().eq_ignore_ascii_case(expected),
        FieldValue::Numeric(Some(n)) => expected.parse::<f64>().map(|e| (e - n).abs() < 1e-9).unwrap_or(false),
        FieldValue::Integer(n) => expected.parse::<i32>().map(|e| e == *n).unwrap_or(false),
        _ => false,
    }
}

/// Boundary lines loaded from a shapefile, in lon/lat.
#[derive(Debug, Clone, Default)]
pub struct BoundaryLayer {
    pub name: String,
    pub lines: Vec<Vec<Coord<f64>>>,
}

impl BoundaryLayer {
    pub fn from_lines(name: impl Into<String>, lines: Vec<Vec<Coord<f64>>>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Read polylines and polygon rings from a shapefile (the `.dbf` next
    /// to it supplies attributes for `filter`).
    pub fn from_shapefile(path: impl AsRef<Path>, filter: Option<&FeatureFilter>) -> RenderResult<Self> {
        let path = path.as_ref();
        let mut reader = shapefile::Reader::from_path(path)
            .map_err(|e| RenderError::Overlay(format!("cannot open {}: {}", path.display(), e)))?;

        let mut lines = Vec::new();
        let mut matched = 0usize;
        for item in reader.iter_shapes_and_records() {
            let (shape, record) =
                item.map_err(|e| RenderError::Overlay(format!("bad record in {}: {}", path.display(), e)))?;

            if let Some(filter) = filter {
                let keep = record
                    .get(&filter.field)
                    .map(|value| field_value_matches(value, &filter.value))
                    .unwrap_or(false);
                if !keep {
                    continue;
                }
            }
            matched += 1;
            lines.extend(shape_lines(&shape));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!(
            layer = %name,
            shapes = matched,
            lines = lines.len(),
            filtered = filter.is_some(),
            "Loaded boundary layer"
        );
        if filter.is_some() && matched == 0 {
            tracing::warn!(layer = %name, "No shapes matched the boundary filter");
        }
        Ok(Self { name, lines })
    }

    /// Coarse national borders compiled into the binary, used when no
    /// borders shapefile can be read.
    pub fn builtin_borders() -> Self {
        let line = BORNEO_BORDER.iter().map(|&(x, y)| Coord { x, y }).collect();
        Self::from_lines("builtin_borders", vec![line])
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn shape_lines(shape: &shapefile::Shape) -> Vec<Vec<Coord<f64>>> {
    let to_coords = |points: &[shapefile::Point]| -> Vec<Coord<f64>> {
        points.iter().map(|p| Coord { x: p.x, y: p.y }).collect()
    };
    match shape {
        shapefile::Shape::Polyline(line) => line.parts().iter().map(|part| to_coords(part.as_slice())).collect(),
        shapefile::Shape::Polygon(polygon) => polygon.rings().iter().map(|ring| to_coords(ring.points())).collect(),
        _ => vec![],
    }
}

/// Stroke a boundary layer clipped to the map panel. Returns the number of
/// lines drawn.
pub fn draw_boundaries(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    layer: &BoundaryLayer,
    color: Color,
    width: f32,
    dash: Option<&[f32]>,
    clip: Option<&Mask>,
) -> usize {
    let view = frame.region.expand(0.5);
    let contours: Vec<Contour> = layer
        .lines
        .iter()
        .filter(|line| {
            line.iter()
                .any(|c| view.contains_point(frame.normalize_lon(c.x), c.y))
        })
        .map(|line| Contour {
            level: 0.0,
            points: line
                .iter()
                .map(|c| {
                    let (x, y) = frame.project(c.x, c.y);
                    Point::new(x, y)
                })
                .collect(),
            closed: false,
        })
        .collect();

    contour::stroke_contours(pixmap, &contours, color, width, dash, clip);
    contours.len()
}

/// Shade land cells of a land/sea mask.
pub fn draw_land(pixmap: &mut Pixmap, frame: &MapFrame, mask: &GridSlice, color: Color, clip: Option<&Mask>) -> usize {
    fill_cells(pixmap, frame, mask, clip, |value| (value >= LAND_THRESHOLD).then_some(color))
}

/// Draw the coastline as the 0.5 isoline of the land/sea mask.
pub fn draw_coastline(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    mask: &GridSlice,
    color: Color,
    width: f32,
    clip: Option<&Mask>,
) -> usize {
    let config = ContourConfig {
        levels: vec![LAND_THRESHOLD],
        smoothing_passes: 2,
        labels_enabled: false,
        ..ContourConfig::default()
    };
    let traced = contour::generate_all_contours(&mask.values, mask.width(), mask.height(), &config);
    let lines = contour::project_contours(traced, mask, frame, config.smoothing_passes);
    contour::stroke_contours(pixmap, &lines, color, width, None, clip);
    lines.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PixelRect;
    use forecast_common::BoundingBox;

    #[test]
    fn test_field_value_matches() {
        let name = FieldValue::Character(Some("Barito Selatan ".to_string()));
        assert!(field_value_matches(&name, "barito selatan"));
        assert!(!field_value_matches(&name, "Barito Utara"));
        assert!(!field_value_matches(&FieldValue::Character(None), "x"));
        assert!(field_value_matches(&FieldValue::Numeric(Some(62.0)), "62"));
        assert!(field_value_matches(&FieldValue::Integer(7), "7"));
    }

    #[test]
    fn test_draw_boundaries_skips_far_lines() {
        let frame = MapFrame::new(
            BoundingBox::new(114.0, -2.5, 115.5, -1.0),
            PixelRect::new(0.0, 0.0, 150.0, 150.0),
        );
        let layer = BoundaryLayer::from_lines(
            "test",
            vec![
                vec![Coord { x: 114.2, y: -2.0 }, Coord { x: 115.2, y: -1.5 }],
                vec![Coord { x: 10.0, y: 50.0 }, Coord { x: 11.0, y: 51.0 }],
            ],
        );
        let mut pixmap = Pixmap::new(150, 150).unwrap();
        let drawn = draw_boundaries(&mut pixmap, &frame, &layer, Color::BLACK, 1.0, Some(&[2.0, 2.0]), None);
        assert_eq!(drawn, 1);
        assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0));
    }

    #[test]
    fn test_builtin_borders_cross_borneo() {
        let layer = BoundaryLayer::builtin_borders();
        assert_eq!(layer.lines.len(), 1);

        let north = MapFrame::new(
            BoundingBox::new(109.0, 0.0, 118.5, 5.0),
            PixelRect::new(0.0, 0.0, 200.0, 100.0),
        );
        let mut pixmap = Pixmap::new(200, 100).unwrap();
        assert_eq!(draw_boundaries(&mut pixmap, &north, &layer, Color::BLACK, 1.0, None, None), 1);

        let south = MapFrame::new(
            BoundingBox::new(114.0, -2.5, 115.5, -1.0),
            PixelRect::new(0.0, 0.0, 150.0, 150.0),
        );
        let mut pixmap = Pixmap::new(150, 150).unwrap();
        assert_eq!(draw_boundaries(&mut pixmap, &south, &layer, Color::BLACK, 1.0, None, None), 0);
    }

    #[test]
    fn test_missing_shapefile_is_an_error() {
        let err = BoundaryLayer::from_shapefile("/nonexistent/borders.shp", None).unwrap_err();
        assert!(matches!(err, RenderError::Overlay(_)));
    }
}
