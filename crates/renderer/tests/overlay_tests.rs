//! Tests for land, coastline and boundary overlays.

use forecast_common::{BoundingBox, GridSlice};
use geo_types::Coord;
use renderer::gradient::Color;
use renderer::map::{MapFrame, PixelRect};
use renderer::overlay::{draw_boundaries, draw_coastline, draw_land, BoundaryLayer, FeatureFilter};
use test_utils::{axis, create_land_mask, require_test_file};
use tiny_skia::Pixmap;

fn frame() -> MapFrame {
    MapFrame::new(
        BoundingBox::new(114.0, -2.5, 115.5, -1.0),
        PixelRect::new(0.0, 0.0, 300.0, 300.0),
    )
}

fn mask() -> GridSlice {
    GridSlice::new(axis(-2.5, 0.25, 7), axis(114.0, 0.25, 7), create_land_mask(7, 7))
}

#[test]
fn test_land_cells_are_shaded() {
    let land = mask();
    let expected = land.values.iter().filter(|v| **v >= 0.5).count();
    let mut pixmap = Pixmap::new(300, 300).unwrap();

    let drawn = draw_land(&mut pixmap, &frame(), &land, Color::new(200, 190, 170, 255), None);
    assert_eq!(drawn, expected);
    assert!(drawn > 0 && drawn < 49);
}

#[test]
fn test_coastline_follows_mask_edge() {
    let mut pixmap = Pixmap::new(300, 300).unwrap();
    let lines = draw_coastline(&mut pixmap, &frame(), &mask(), Color::BLACK, 1.0, None);
    assert!(lines >= 1);
    assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0));
}

#[test]
fn test_all_sea_mask_has_no_coastline() {
    let sea = GridSlice::new(axis(-2.5, 0.25, 7), axis(114.0, 0.25, 7), vec![0.0; 49]);
    let mut pixmap = Pixmap::new(300, 300).unwrap();
    assert_eq!(draw_coastline(&mut pixmap, &frame(), &sea, Color::BLACK, 1.0, None), 0);
    assert_eq!(draw_land(&mut pixmap, &frame(), &sea, Color::BLACK, None), 0);
}

#[test]
fn test_wrapped_longitudes_are_drawn() {
    // Region given west of -180; the line still lands on it
    let layer = BoundaryLayer::from_lines(
        "wrapped",
        vec![vec![Coord { x: 114.5, y: -2.0 }, Coord { x: 115.0, y: -1.5 }]],
    );
    let frame = MapFrame::new(
        BoundingBox::new(-245.5, -2.5, -244.0, -1.0),
        PixelRect::new(0.0, 0.0, 300.0, 300.0),
    );
    let mut pixmap = Pixmap::new(300, 300).unwrap();
    assert_eq!(draw_boundaries(&mut pixmap, &frame, &layer, Color::BLACK, 1.0, None, None), 1);
}

#[test]
fn test_feature_filter_deserializes() {
    let filter: FeatureFilter = serde_json::from_str(r#"{"field": "NAMOBJ", "value": "Barito Selatan"}"#).unwrap();
    assert_eq!(filter.field, "NAMOBJ");
}

#[test]
fn test_admin_shapefile_filter() {
    let path = require_test_file!("admin_regions.shp");
    let filter = FeatureFilter {
        field: "NAMOBJ".to_string(),
        value: "Barito Selatan".to_string(),
    };
    let all = BoundaryLayer::from_shapefile(&path, None).unwrap();
    let filtered = BoundaryLayer::from_shapefile(&path, Some(&filter)).unwrap();
    assert!(filtered.lines.len() <= all.lines.len());
}
