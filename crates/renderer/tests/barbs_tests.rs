//! Tests for wind barb rendering module.

use forecast_common::{BoundingBox, GridSlice};
use renderer::barbs::{
    barb_strides, calculate_barb_positions, render_wind_barbs, uv_to_speed_direction, BarbConfig,
    BarbFlags, MS_TO_KNOTS,
};
use renderer::map::{MapFrame, PixelRect};
use test_utils::{assert_approx_eq, axis, create_constant_grid, create_u_wind_grid, create_v_wind_grid};
use tiny_skia::Pixmap;

fn barito_frame(size: f32) -> MapFrame {
    MapFrame::new(
        BoundingBox::new(114.0, -2.5, 115.5, -1.0),
        PixelRect::new(0.0, 0.0, size, size),
    )
}

fn slice(values: Vec<f32>) -> GridSlice {
    GridSlice::new(axis(-2.5, 0.25, 7), axis(114.0, 0.25, 7), values)
}

// ============================================================================
// uv_to_speed_direction tests
//
// U > 0 means wind blowing eastward (from the west), V > 0 blowing
// northward (from the south). Directions are where the wind comes FROM.
// ============================================================================

#[test]
fn test_uv_calm_wind() {
    let (speed, _direction) = uv_to_speed_direction(0.0, 0.0);
    assert!(speed < 0.001);
}

#[test]
fn test_uv_speed_calculation_3_4_5() {
    for (u, v) in [(3.0, 4.0), (3.0, -4.0), (-3.0, 4.0), (-3.0, -4.0)] {
        let (speed, _) = uv_to_speed_direction(u, v);
        assert_approx_eq!(speed, 5.0, 1e-9);
    }
}

#[test]
fn test_uv_cardinal_directions() {
    // Southerly: blowing toward the north
    let (_, dir) = uv_to_speed_direction(0.0, 10.0);
    assert_approx_eq!(dir, 180.0, 1e-9);

    // North-westerly
    let (_, dir) = uv_to_speed_direction(5.0, -5.0);
    assert_approx_eq!(dir, 315.0, 1e-9);
}

#[test]
fn test_speed_to_knots() {
    let (speed, _) = uv_to_speed_direction(6.0, 8.0);
    assert_approx_eq!(speed * MS_TO_KNOTS, 19.4384, 1e-6);
}

// ============================================================================
// Barb feathers
// ============================================================================

#[test]
fn test_flags_round_to_nearest_five_knots() {
    assert_eq!(BarbFlags::from_knots(7.4).knots(), 5);
    assert_eq!(BarbFlags::from_knots(7.6).knots(), 10);
    assert_eq!(BarbFlags::from_knots(47.0).knots(), 45);
    assert_eq!(BarbFlags::from_knots(-3.0).knots(), 0);
}

#[test]
fn test_flags_decomposition() {
    let flags = BarbFlags::from_knots(115.0);
    assert_eq!(flags.pennants, 2);
    assert_eq!(flags.full, 1);
    assert!(flags.half);
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn test_strides_respect_spacing() {
    // 0.25° cells at 100 px/degree are 25 px apart; 45 px spacing needs every 2nd
    let frame = barito_frame(150.0);
    let field = slice(create_constant_grid(7, 7, 1.0));
    assert_eq!(barb_strides(&field, &frame, 45.0), (2, 2));
    assert_eq!(barb_strides(&field, &frame, 10.0), (1, 1));
}

#[test]
fn test_positions_skip_nan_and_thin_grid() {
    let frame = barito_frame(700.0);
    let config = BarbConfig {
        spacing: 1.0,
        ..BarbConfig::default()
    };
    let mut u = create_u_wind_grid(7, 7);
    u[0] = f32::NAN;
    let glyphs = calculate_barb_positions(&slice(u), &slice(create_v_wind_grid(7, 7)), &frame, &config);
    assert_eq!(glyphs.len(), 48);
    assert!(glyphs.iter().all(|g| g.southern));
    assert!(glyphs.iter().all(|g| frame.panel.contains(g.x, g.y)));
}

#[test]
fn test_mismatched_grids_draw_nothing() {
    let frame = barito_frame(300.0);
    let u = slice(create_constant_grid(7, 7, 5.0));
    let v = GridSlice::new(axis(-2.5, 0.25, 7), axis(114.25, 0.25, 7), create_constant_grid(7, 7, 5.0));
    assert!(calculate_barb_positions(&u, &v, &frame, &BarbConfig::default()).is_empty());
}

#[test]
fn test_render_wind_barbs_paints_pixels() {
    let frame = barito_frame(300.0);
    let u = slice(create_constant_grid(7, 7, 10.0));
    let v = slice(create_constant_grid(7, 7, 0.0));
    let mut pixmap = Pixmap::new(300, 300).unwrap();

    let drawn = render_wind_barbs(&mut pixmap, &u, &v, &frame, &BarbConfig::default());
    assert!(drawn > 0);
    assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0));
}
