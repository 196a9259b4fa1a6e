//! Pseudo-color mesh rendering for gridded fields.
//!
//! Each grid point owns the cell reaching halfway to its neighbours (the
//! nearest-cell convention), so a 7×7 regional crop draws as 49 flat tiles.

use forecast_common::GridSlice;
use tiny_skia::{Mask, Paint, Pixmap, Rect, Transform};

use crate::map::MapFrame;
use crate::style::{hex_to_rgb, ColorScale};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Opaque color from `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        hex_to_rgb(hex).map(|(r, g, b)| Self::new(r, g, b, 255))
    }

    /// Like [`Color::from_hex`] but falls back to `fallback` and logs.
    pub fn from_hex_or(hex: &str, fallback: Color) -> Self {
        Self::from_hex(hex).unwrap_or_else(|| {
            tracing::warn!(color = %hex, "Unparsable color, using fallback");
            fallback
        })
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }

    pub fn paint<'a>(self, anti_alias: bool) -> Paint<'a> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(self.r, self.g, self.b, self.a);
        paint.anti_alias = anti_alias;
        paint
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Boundaries between cells along an axis: midpoints between neighbours,
/// extended half a step past each end. `n` points give `n + 1` edges.
pub fn cell_edges(axis: &[f64]) -> Vec<f64> {
    match axis.len() {
        0 => vec![],
        1 => vec![axis[0] - 0.125, axis[0] + 0.125],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(axis[0] - (axis[1] - axis[0]) / 2.0);
            for pair in axis.windows(2) {
                edges.push((pair[0] + pair[1]) / 2.0);
            }
            edges.push(axis[n - 1] + (axis[n - 1] - axis[n - 2]) / 2.0);
            edges
        }
    }
}

/// Pixel rectangle of cell `(row, col)`.
fn cell_rect(frame: &MapFrame, lat_edges: &[f64], lon_edges: &[f64], row: usize, col: usize) -> Option<Rect> {
    let (x0, y0) = frame.project(lon_edges[col], lat_edges[row]);
    let (x1, y1) = frame.project(lon_edges[col + 1], lat_edges[row + 1]);
    Rect::from_ltrb(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
}

/// Fill every cell for which `color_of` returns a color. Returns the number
/// of cells drawn.
pub fn fill_cells<F>(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    slice: &GridSlice,
    clip: Option<&Mask>,
    color_of: F,
) -> usize
where
    F: Fn(f32) -> Option<Color>,
{
    let lat_edges = cell_edges(&slice.lats);
    let lon_edges = cell_edges(&slice.lons);
    let mut drawn = 0;

    for row in 0..slice.height() {
        for col in 0..slice.width() {
            let Some(color) = slice.get(row, col).and_then(&color_of) else {
                continue;
            };
            let Some(rect) = cell_rect(frame, &lat_edges, &lon_edges, row, col) else {
                continue;
            };
            // Hard edges so neighbouring cells do not leave seams
            pixmap.fill_rect(rect, &color.paint(false), Transform::identity(), clip);
            drawn += 1;
        }
    }

    drawn
}

/// Draw a field as a pseudo-color mesh. NaN cells stay transparent.
pub fn render_mesh(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    slice: &GridSlice,
    scale: &ColorScale,
    clip: Option<&Mask>,
) -> usize {
    let drawn = fill_cells(pixmap, frame, slice, clip, |value| scale.color_for(value));
    tracing::debug!(
        cells = drawn,
        width = slice.width(),
        height = slice.height(),
        colormap = scale.colormap.name(),
        "Rendered mesh"
    );
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PixelRect;
    use crate::style::Colormap;
    use forecast_common::BoundingBox;

    #[test]
    fn test_interpolate_color() {
        let mid = interpolate_color(Color::BLACK, Color::WHITE, 0.5);
        assert_eq!(mid, Color::new(128, 128, 128, 255));
        assert_eq!(interpolate_color(Color::BLACK, Color::WHITE, 2.0), Color::WHITE);
    }

    #[test]
    fn test_cell_edges() {
        assert_eq!(cell_edges(&[0.0, 1.0, 2.0]), vec![-0.5, 0.5, 1.5, 2.5]);
        assert_eq!(cell_edges(&[2.0, 1.0]), vec![2.5, 1.5, 0.5]);
        assert!(cell_edges(&[]).is_empty());
    }

    #[test]
    fn test_mesh_fills_cells_and_skips_nan() {
        let region = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let frame = MapFrame::new(region, PixelRect::new(0.0, 0.0, 40.0, 40.0));
        let slice = GridSlice::new(
            vec![0.5, 1.5],
            vec![0.5, 1.5],
            vec![0.0, 10.0, f32::NAN, 5.0],
        );
        let scale = ColorScale::new(Colormap::Rain, 0.0, 10.0);
        let mut pixmap = Pixmap::new(40, 40).unwrap();

        let drawn = render_mesh(&mut pixmap, &frame, &slice, &scale, None);
        assert_eq!(drawn, 3);

        // Row 0 is lat 0.5, the bottom half of the image; (row 1, col 0) is NaN
        let top_left = pixmap.pixel(5, 5).unwrap();
        assert_eq!(top_left.alpha(), 0);
        let bottom_left = pixmap.pixel(5, 35).unwrap();
        assert_eq!((bottom_left.red(), bottom_left.green(), bottom_left.blue()), (255, 255, 255));
        let bottom_right = pixmap.pixel(35, 35).unwrap();
        assert_eq!((bottom_right.red(), bottom_right.green(), bottom_right.blue()), (0x54, 0x27, 0x8f));
    }
}
