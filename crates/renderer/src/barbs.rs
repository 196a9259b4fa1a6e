//! Wind barb rendering.
//!
//! Each glyph is built as a small SVG document (staff plus pennants, full
//! and half barbs for the speed rounded to 5 knots), parsed with usvg and
//! rasterized with resvg straight onto the figure, rotated so the staff
//! points to where the wind blows from.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Write as _;

use forecast_common::GridSlice;
use tiny_skia::{Pixmap, Transform};

use crate::map::MapFrame;

/// Metres per second to knots.
pub const MS_TO_KNOTS: f64 = 1.94384;

/// Configuration for wind barb rendering
#[derive(Debug, Clone)]
pub struct BarbConfig {
    /// Glyph box size in pixels (the staff is a bit under half of it)
    pub size: f32,
    /// Minimum distance between neighbouring glyphs, in pixels
    pub spacing: f32,
    /// Color of the barb (hex format, e.g., "#000000")
    pub color: String,
    pub line_width: f32,
    /// Draw feathers on the other side of the staff south of the equator
    pub flip_southern: bool,
}

impl Default for BarbConfig {
    fn default() -> Self {
        Self {
            size: 44.0,
            spacing: 45.0,
            color: "#000000".to_string(),
            line_width: 1.3,
            flip_southern: true,
        }
    }
}

/// Convert U and V wind components (m/s) to speed (m/s) and the direction
/// the wind blows FROM, in degrees clockwise from north.
pub fn uv_to_speed_direction(u: f32, v: f32) -> (f64, f64) {
    let u = u as f64;
    let v = v as f64;

    let speed = u.hypot(v);
    // atan2(-u, -v) is 0 for a northerly (v < 0) and 90 for an easterly (u < 0)
    let mut direction = (-u).atan2(-v) * 180.0 / PI;
    if direction < 0.0 {
        direction += 360.0;
    }
    (speed, direction)
}

/// Feathers making up a barb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarbFlags {
    pub pennants: u32,
    pub full: u32,
    pub half: bool,
}

impl BarbFlags {
    /// Round to the nearest 5 knots: 50 per pennant, 10 per full barb,
    /// 5 for a half barb.
    pub fn from_knots(knots: f64) -> Self {
        let rounded = if knots.is_finite() {
            ((knots.max(0.0) / 5.0).round() * 5.0) as u32
        } else {
            0
        };
        Self {
            pennants: rounded / 50,
            full: (rounded % 50) / 10,
            half: rounded % 10 >= 5,
        }
    }

    pub fn is_calm(&self) -> bool {
        self.pennants == 0 && self.full == 0 && !self.half
    }

    pub fn knots(&self) -> u32 {
        self.pennants * 50 + self.full * 10 + if self.half { 5 } else { 0 }
    }
}

/// SVG for a barb pointing north with its station at the centre.
pub fn barb_svg(flags: BarbFlags, southern: bool, config: &BarbConfig) -> String {
    let s = config.size;
    let c = s / 2.0;
    let staff = s * 0.45;
    let feather = staff * 0.45;
    let lean = feather * 0.3;
    let gap = staff * 0.16;
    let side = if southern { -1.0 } else { 1.0 };

    let mut body = String::new();
    if flags.is_calm() {
        let _ = write!(body, r#"<circle cx="{c}" cy="{c}" r="{r}" fill="none"/>"#, r = s * 0.1);
    } else {
        let tip = c - staff;
        let _ = write!(body, r#"<line x1="{c}" y1="{c}" x2="{c}" y2="{tip}"/>"#);

        let mut y = tip;
        for _ in 0..flags.pennants {
            let _ = write!(
                body,
                r#"<polygon points="{c},{y} {fx},{y} {c},{yb}" stroke="none"/>"#,
                fx = c + side * feather,
                yb = y + gap,
            );
            y += gap * 1.5;
        }
        for _ in 0..flags.full {
            let _ = write!(
                body,
                r#"<line x1="{c}" y1="{y}" x2="{fx}" y2="{fy}"/>"#,
                fx = c + side * feather,
                fy = y - lean,
            );
            y += gap;
        }
        if flags.half {
            // A lone half barb sits one step in from the tip
            if flags.pennants == 0 && flags.full == 0 {
                y += gap;
            }
            let _ = write!(
                body,
                r#"<line x1="{c}" y1="{y}" x2="{fx}" y2="{fy}"/>"#,
                fx = c + side * feather / 2.0,
                fy = y - lean / 2.0,
            );
        }
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}"><g stroke="{color}" fill="{color}" stroke-width="{w}" stroke-linecap="round">{body}</g></svg>"#,
        color = config.color,
        w = config.line_width,
    )
}

/// Grid strides so neighbouring glyphs are at least `spacing` pixels apart.
pub fn barb_strides(field: &GridSlice, frame: &MapFrame, spacing: f32) -> (usize, usize) {
    let step = |axis: &[f64]| {
        if axis.len() < 2 {
            return 1;
        }
        let degrees = (axis[1] - axis[0]).abs() as f32;
        let cell_px = degrees * frame.pixels_per_degree();
        if cell_px <= 0.0 {
            1
        } else {
            ((spacing / cell_px).ceil() as usize).max(1)
        }
    };
    (step(&field.lats), step(&field.lons))
}

/// One glyph placed on the figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarbGlyph {
    pub x: f32,
    pub y: f32,
    /// Direction the wind blows from, degrees clockwise from north
    pub direction: f64,
    pub flags: BarbFlags,
    pub southern: bool,
}

/// Glyphs for every grid point kept after thinning.
pub fn calculate_barb_positions(
    u: &GridSlice,
    v: &GridSlice,
    frame: &MapFrame,
    config: &BarbConfig,
) -> Vec<BarbGlyph> {
    if u.lats != v.lats || u.lons != v.lons {
        tracing::warn!("Wind components are on different grids, skipping barbs");
        return vec![];
    }

    let (row_step, col_step) = barb_strides(u, frame, config.spacing);
    let mut glyphs = Vec::new();

    for row in (0..u.height()).step_by(row_step) {
        for col in (0..u.width()).step_by(col_step) {
            let (Some(uu), Some(vv)) = (u.get(row, col), v.get(row, col)) else {
                continue;
            };
            if uu.is_nan() || vv.is_nan() {
                continue;
            }
            let (x, y) = frame.project(u.lons[col], u.lats[row]);
            if !frame.panel.contains(x, y) {
                continue;
            }
            let (speed, direction) = uv_to_speed_direction(uu, vv);
            let flags = BarbFlags::from_knots(speed * MS_TO_KNOTS);
            let southern = config.flip_southern && u.lats[row] < 0.0;
            glyphs.push(BarbGlyph {
                x,
                y,
                direction,
                flags,
                southern,
            });
        }
    }

    glyphs
}

/// Draw barbs for raw u/v components (m/s). Returns the number drawn.
pub fn render_wind_barbs(
    pixmap: &mut Pixmap,
    u: &GridSlice,
    v: &GridSlice,
    frame: &MapFrame,
    config: &BarbConfig,
) -> usize {
    let glyphs = calculate_barb_positions(u, v, frame, config);
    let options = usvg::Options::default();
    let mut trees: HashMap<(u32, bool), Option<usvg::Tree>> = HashMap::new();
    let half = config.size / 2.0;
    let mut drawn = 0;

    for glyph in glyphs {
        let flags = glyph.flags;
        let tree = trees.entry((flags.knots(), glyph.southern)).or_insert_with(|| {
            let svg = barb_svg(flags, glyph.southern, config);
            match usvg::Tree::from_str(&svg, &options) {
                Ok(tree) => Some(tree),
                Err(e) => {
                    tracing::warn!(error = %e, knots = flags.knots(), "Failed to parse barb SVG");
                    None
                }
            }
        });
        let Some(tree) = tree else {
            continue;
        };

        // Calm circles are not rotated
        let angle = if flags.is_calm() { 0.0 } else { glyph.direction as f32 };
        let transform = Transform::from_translate(-half, -half)
            .post_rotate(angle)
            .post_translate(glyph.x, glyph.y);
        resvg::render(tree, transform, &mut pixmap.as_mut());
        drawn += 1;
    }

    tracing::debug!(barbs = drawn, "Rendered wind barbs");
    drawn
}
