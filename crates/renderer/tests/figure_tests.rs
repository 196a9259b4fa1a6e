//! Figure composition tests: whole panels drawn from synthetic fields.

use forecast_common::{BoundingBox, GridSlice};
use renderer::{ColorScale, Colormap, FieldLayer, Figure, FigureStyle, Marker, TextRenderer};
use test_utils::{
    axis, create_land_mask, create_precip_rate_grid, create_u_wind_grid, create_v_wind_grid, require_test_font,
};

const TITLE: &str = "Curah Hujan (mm/jam) Valid 00UTC Sun 13 Jul 2025 t+000";

fn region() -> BoundingBox {
    BoundingBox::new(114.0, -2.5, 115.5, -1.0)
}

fn grid(values: Vec<f32>) -> GridSlice {
    GridSlice::new(axis(-2.5, 0.25, 7), axis(114.0, 0.25, 7), values)
}

fn precip_layer() -> FieldLayer {
    let mm_per_hour = create_precip_rate_grid(7, 7, 42).iter().map(|r| r * 3600.0).collect();
    FieldLayer::Shaded {
        field: grid(mm_per_hour),
        scale: ColorScale::new(Colormap::Rain, 0.0, 10.0),
        caption: "Curah Hujan (mm/jam)".to_string(),
    }
}

fn style() -> FigureStyle {
    FigureStyle {
        width: 600,
        height: 420,
        ..FigureStyle::default()
    }
}

fn buntok() -> Marker {
    Marker {
        lon: 114.85,
        lat: -1.71,
        label: "Buntok".to_string(),
    }
}

#[test]
fn test_precip_panel_with_overlays() {
    let rendered = Figure::new(region(), TITLE, precip_layer())
        .with_style(style())
        .with_land_mask(grid(create_land_mask(7, 7)))
        .with_marker(buntok())
        .render(None)
        .unwrap();

    assert_eq!(rendered.title, TITLE);
    assert_eq!(rendered.image.dimensions(), (600, 420));
    assert_eq!(rendered.stats.cells, 49);
    assert!(rendered.stats.coastlines >= 1);
    assert_eq!(rendered.stats.barbs, 0);

    let png = rendered.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (600, 420));
}

#[test]
fn test_wind_panel_draws_barbs() {
    let u = create_u_wind_grid(7, 7);
    let v = create_v_wind_grid(7, 7);
    let speed: Vec<f32> = u
        .iter()
        .zip(&v)
        .map(|(u, v)| u.hypot(*v) * 1.94384)
        .collect();
    let layer = FieldLayer::Shaded {
        field: grid(speed),
        scale: ColorScale::new(Colormap::Wind, 0.0, 20.0).with_bins(10),
        caption: "Kecepatan Angin 10m (knot)".to_string(),
    };

    let rendered = Figure::new(region(), "Kecepatan Angin 10m (knot)", layer)
        .with_style(style())
        .with_wind(grid(u), grid(v))
        .render(None)
        .unwrap();
    assert!(rendered.stats.barbs > 0);
}

#[test]
fn test_region_outside_grid_leaves_panel_blank() {
    // Grid sits far from the region: nothing is drawn inside the panel,
    // but composing the figure still works
    let far = GridSlice::new(axis(40.0, 0.25, 7), axis(10.0, 0.25, 7), vec![5.0; 49]);
    let layer = FieldLayer::Shaded {
        field: far,
        scale: ColorScale::new(Colormap::Rain, 0.0, 10.0),
        caption: String::new(),
    };
    let rendered = Figure::new(region(), "x", layer).with_style(style()).render(None).unwrap();
    let white = rendered
        .image
        .pixels()
        .filter(|p| p.0 == [255, 255, 255, 255])
        .count();
    assert!(white > 600 * 420 / 2);
}

#[test]
fn test_text_is_drawn_with_font() {
    let font_path = require_test_font!();
    let text = TextRenderer::load(&font_path).unwrap();

    let plain = Figure::new(region(), TITLE, precip_layer())
        .with_style(style())
        .render(None)
        .unwrap();
    let labeled = Figure::new(region(), TITLE, precip_layer())
        .with_style(style())
        .with_marker(buntok())
        .render(Some(&text))
        .unwrap();

    assert!(labeled.stats.text_drawn);
    // The title band is blank without text and inked with it
    let inked = |img: &image::RgbaImage| {
        (0..600)
            .flat_map(|x| (0..30).map(move |y| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0[0] < 128)
            .count()
    };
    assert_eq!(inked(&plain.image), 0);
    assert!(inked(&labeled.image) > 50);
}
