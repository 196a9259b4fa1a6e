//! Figure composition: one labeled map panel with title, colorbar,
//! overlays and marker.
//!
//! Graphics are drawn with tiny-skia, then the pixmap is converted to an
//! `RgbaImage` so text can be laid over it. Overlays are decoration: a
//! missing mask or boundary layer only skips that layer.

use forecast_common::{BoundingBox, GridSlice};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::barbs::{render_wind_barbs, BarbConfig};
use crate::contour::{render_field_contours, ContourConfig};
use crate::error::{RenderError, RenderResult};
use crate::gradient::{render_mesh, Color};
use crate::map::{format_lat, format_lon, nice_step, tick_values, FigureLayout, MapFrame, PixelRect};
use crate::overlay::{draw_boundaries, draw_coastline, draw_land, BoundaryLayer};
use crate::png::encode_image;
use crate::style::ColorScale;
use crate::text::{decimals_for_step, format_value, TextRenderer};

const TICK_LENGTH: f32 = 5.0;
const BORDER_DASH: [f32; 2] = [1.5, 2.5];

/// Colors, sizes and line widths of a figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub land_color: String,
    pub coastline_color: String,
    pub coastline_width: f32,
    pub border_color: String,
    pub border_width: f32,
    pub admin_color: String,
    pub admin_width: f32,
    pub marker_color: String,
    pub marker_radius: f32,
    pub text_color: String,
    pub title_font_size: f32,
    pub label_font_size: f32,
    pub contour_color: String,
    pub contour_width: f32,
    pub contour_labels: bool,
    pub barb_size: f32,
    pub barb_spacing: f32,
    pub barb_color: String,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 700,
            background: "#ffffff".to_string(),
            land_color: "#e8e4d8".to_string(),
            coastline_color: "#333333".to_string(),
            coastline_width: 1.0,
            border_color: "#555555".to_string(),
            border_width: 1.0,
            admin_color: "#000000".to_string(),
            admin_width: 1.6,
            marker_color: "#d62728".to_string(),
            marker_radius: 4.0,
            text_color: "#000000".to_string(),
            title_font_size: 20.0,
            label_font_size: 13.0,
            contour_color: "#000000".to_string(),
            contour_width: 1.2,
            contour_labels: true,
            barb_size: 44.0,
            barb_spacing: 45.0,
            barb_color: "#000000".to_string(),
        }
    }
}

impl FigureStyle {
    pub fn barb_config(&self) -> BarbConfig {
        BarbConfig {
            size: self.barb_size,
            spacing: self.barb_spacing,
            color: self.barb_color.clone(),
            ..BarbConfig::default()
        }
    }
}

/// The field drawn in the map panel.
#[derive(Debug, Clone)]
pub enum FieldLayer {
    /// Pseudo-color mesh with a colorbar captioned `caption`.
    Shaded {
        field: GridSlice,
        scale: ColorScale,
        caption: String,
    },
    /// Labeled isolines every `interval`.
    Contours { field: GridSlice, interval: f32 },
}

impl FieldLayer {
    pub fn field(&self) -> &GridSlice {
        match self {
            FieldLayer::Shaded { field, .. } | FieldLayer::Contours { field, .. } => field,
        }
    }

    fn has_colorbar(&self) -> bool {
        matches!(self, FieldLayer::Shaded { .. })
    }
}

/// A labeled point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub lon: f64,
    pub lat: f64,
    pub label: String,
}

/// Counts of what ended up on the figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub cells: usize,
    pub contours: usize,
    pub barbs: usize,
    pub coastlines: usize,
    pub boundary_lines: usize,
    pub text_drawn: bool,
}

/// A finished figure.
#[derive(Debug, Clone)]
pub struct RenderedFigure {
    pub image: RgbaImage,
    pub title: String,
    pub stats: RenderStats,
}

impl RenderedFigure {
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        encode_image(&self.image)
    }
}

/// Builder for one map figure.
#[derive(Debug, Clone)]
pub struct Figure<'a> {
    region: BoundingBox,
    title: String,
    layer: FieldLayer,
    style: FigureStyle,
    wind: Option<(GridSlice, GridSlice)>,
    land_mask: Option<GridSlice>,
    borders: Option<&'a BoundaryLayer>,
    admin: Option<&'a BoundaryLayer>,
    marker: Option<Marker>,
}

impl<'a> Figure<'a> {
    pub fn new(region: BoundingBox, title: impl Into<String>, layer: FieldLayer) -> Self {
        Self {
            region,
            title: title.into(),
            layer,
            style: FigureStyle::default(),
            wind: None,
            land_mask: None,
            borders: None,
            admin: None,
            marker: None,
        }
    }

    pub fn with_style(mut self, style: FigureStyle) -> Self {
        self.style = style;
        self
    }

    /// Raw u/v components (m/s) for barbs.
    pub fn with_wind(mut self, u: GridSlice, v: GridSlice) -> Self {
        self.wind = Some((u, v));
        self
    }

    pub fn with_land_mask(mut self, mask: GridSlice) -> Self {
        self.land_mask = Some(mask);
        self
    }

    pub fn with_borders(mut self, layer: &'a BoundaryLayer) -> Self {
        self.borders = Some(layer);
        self
    }

    pub fn with_admin(mut self, layer: &'a BoundaryLayer) -> Self {
        self.admin = Some(layer);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Draw the figure. Text is skipped when no font is available.
    pub fn render(&self, text: Option<&TextRenderer>) -> RenderResult<RenderedFigure> {
        let style = &self.style;
        let (width, height) = (style.width, style.height);
        if self.layer.field().is_empty() {
            return Err(RenderError::EmptyField(self.title.clone()));
        }
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;

        let layout = FigureLayout::compute(width, height, self.region, self.layer.has_colorbar());
        let frame = layout.frame;
        let clip = frame.clip_mask(width, height);
        let clip = clip.as_ref();
        let mut stats = RenderStats::default();

        pixmap.fill(Color::from_hex_or(&style.background, Color::WHITE).to_skia());

        if let Some(mask) = &self.land_mask {
            draw_land(&mut pixmap, &frame, mask, Color::from_hex_or(&style.land_color, Color::WHITE), clip);
        }

        match &self.layer {
            FieldLayer::Shaded { field, scale, .. } => {
                stats.cells = render_mesh(&mut pixmap, &frame, field, scale, clip);
            }
            FieldLayer::Contours { field, interval } => {
                let config = ContourConfig {
                    line_width: style.contour_width,
                    line_color: Color::from_hex_or(&style.contour_color, Color::BLACK),
                    labels_enabled: style.contour_labels,
                    ..ContourConfig::for_field(field, *interval)
                };
                if config.levels.is_empty() {
                    tracing::warn!(interval = *interval, "Field has no contour levels in range");
                }
                stats.contours = render_field_contours(&mut pixmap, &frame, field, &config, clip).len();
            }
        }

        match &self.land_mask {
            Some(mask) => {
                stats.coastlines = draw_coastline(
                    &mut pixmap,
                    &frame,
                    mask,
                    Color::from_hex_or(&style.coastline_color, Color::BLACK),
                    style.coastline_width,
                    clip,
                );
            }
            None => tracing::warn!("No land mask, skipping land shading and coastline"),
        }

        if let Some(layer) = self.borders {
            stats.boundary_lines += draw_boundaries(
                &mut pixmap,
                &frame,
                layer,
                Color::from_hex_or(&style.border_color, Color::BLACK),
                style.border_width,
                Some(BORDER_DASH.as_slice()),
                clip,
            );
        }
        if let Some(layer) = self.admin {
            stats.boundary_lines += draw_boundaries(
                &mut pixmap,
                &frame,
                layer,
                Color::from_hex_or(&style.admin_color, Color::BLACK),
                style.admin_width,
                None,
                clip,
            );
        }

        if let Some((u, v)) = &self.wind {
            stats.barbs = render_wind_barbs(&mut pixmap, u, v, &frame, &style.barb_config());
        }

        let marker_at = self.marker.as_ref().and_then(|m| {
            let (x, y) = frame.project(m.lon, m.lat);
            if !frame.panel.contains(x, y) {
                tracing::warn!(lon = m.lon, lat = m.lat, "Marker lies outside the map panel");
                return None;
            }
            let color = Color::from_hex_or(&style.marker_color, Color::BLACK);
            if let Some(dot) = PathBuilder::from_circle(x, y, style.marker_radius) {
                pixmap.fill_path(&dot, &color.paint(true), FillRule::Winding, Transform::identity(), None);
            }
            Some((x, y, m.label.as_str()))
        });

        let ticks = GraticuleTicks::for_region(&self.region);
        let text_color = Color::from_hex_or(&style.text_color, Color::BLACK);
        draw_frame(&mut pixmap, &frame, &ticks, text_color);
        if let (FieldLayer::Shaded { scale, .. }, Some(bar)) = (&self.layer, layout.colorbar) {
            draw_colorbar(&mut pixmap, &bar, scale, text_color);
        }

        let mut image = pixmap_to_image(&pixmap)?;

        match text {
            Some(text) => {
                let color = text_color.to_rgba();
                let label_size = style.label_font_size;
                let title_y = ((layout.title.height - style.title_font_size) / 2.0).max(0.0) as i32;
                text.draw_centered(
                    &mut image,
                    &self.title,
                    (layout.title.width / 2.0) as i32,
                    title_y,
                    style.title_font_size,
                    color,
                );

                for &lon in &ticks.lons {
                    let (x, _) = frame.project(lon, self.region.min_y);
                    let y = (frame.panel.bottom() + TICK_LENGTH + 3.0) as i32;
                    text.draw_centered(&mut image, &format_lon(lon), x as i32, y, label_size, color);
                }
                for &lat in &ticks.lats {
                    let (_, y) = frame.project(self.region.min_x, lat);
                    let right = (frame.panel.x - TICK_LENGTH - 3.0) as i32;
                    text.draw_right_aligned(&mut image, &format_lat(lat), right, y as i32, label_size, color);
                }

                if let (FieldLayer::Shaded { scale, caption, .. }, Some(bar)) = (&self.layer, layout.colorbar) {
                    let bar_ticks = scale.ticks();
                    let step = match bar_ticks.as_slice() {
                        [a, b, ..] => b - a,
                        _ => 1.0,
                    };
                    let decimals = decimals_for_step(step);
                    let mut widest = 0;
                    for value in bar_ticks {
                        let y = colorbar_y(&bar, scale, value);
                        let label = format_value(value, decimals);
                        let (w, h) = text.measure(&label, label_size);
                        widest = widest.max(w);
                        text.draw(&mut image, &label, (bar.right() + 8.0) as i32, y as i32 - h / 2, label_size, color);
                    }
                    let (caption_w, caption_h) = text.measure(caption, label_size);
                    let x = bar.right() as i32 + 14 + widest;
                    let y = (bar.y + bar.height / 2.0) as i32 - caption_w / 2;
                    if x + caption_h < width as i32 {
                        text.draw_vertical(&mut image, caption, x, y, label_size, color);
                    }
                }

                if let Some((x, y, label)) = marker_at {
                    let (_, h) = text.measure(label, label_size);
                    text.draw_with_background(&mut image, label, x as i32 + 6, y as i32 - h - 4, label_size, color);
                }
                stats.text_drawn = true;
            }
            None => tracing::warn!("No font loaded, figure has no text"),
        }

        tracing::debug!(
            width = width,
            height = height,
            cells = stats.cells,
            contours = stats.contours,
            barbs = stats.barbs,
            coastlines = stats.coastlines,
            boundary_lines = stats.boundary_lines,
            "Rendered figure"
        );

        Ok(RenderedFigure {
            image,
            title: self.title.clone(),
            stats,
        })
    }
}

/// Round lon/lat values for the frame ticks.
#[derive(Debug, Clone, PartialEq)]
struct GraticuleTicks {
    lons: Vec<f64>,
    lats: Vec<f64>,
}

impl GraticuleTicks {
    fn for_region(region: &BoundingBox) -> Self {
        let lon_step = nice_step(region.width(), 5);
        let lat_step = nice_step(region.height(), 5);
        Self {
            lons: tick_values(region.min_x, region.max_x, lon_step),
            lats: tick_values(region.min_y, region.max_y, lat_step),
        }
    }
}

fn line(pixmap: &mut Pixmap, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &color.paint(true), &stroke, Transform::identity(), None);
    }
}

fn stroke_rect(pixmap: &mut Pixmap, rect: &PixelRect, color: Color, width: f32) {
    if let Some(r) = rect.to_skia() {
        let path = PathBuilder::from_rect(r);
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &color.paint(false), &stroke, Transform::identity(), None);
    }
}

/// Panel border with outward ticks on the bottom and left edges.
fn draw_frame(pixmap: &mut Pixmap, frame: &MapFrame, ticks: &GraticuleTicks, color: Color) {
    let panel = frame.panel;
    stroke_rect(pixmap, &panel, color, 1.0);
    for &lon in &ticks.lons {
        let (x, _) = frame.project(lon, frame.region.min_y);
        line(pixmap, (x, panel.bottom()), (x, panel.bottom() + TICK_LENGTH), color, 1.0);
    }
    for &lat in &ticks.lats {
        let (_, y) = frame.project(frame.region.min_x, lat);
        line(pixmap, (panel.x - TICK_LENGTH, y), (panel.x, y), color, 1.0);
    }
}

/// Pixel row of a value on a vertical colorbar (minimum at the bottom).
fn colorbar_y(bar: &PixelRect, scale: &ColorScale, value: f32) -> f32 {
    let t = ((value - scale.min) / (scale.max - scale.min)).clamp(0.0, 1.0);
    bar.bottom() - t * bar.height
}

fn draw_colorbar(pixmap: &mut Pixmap, bar: &PixelRect, scale: &ColorScale, color: Color) {
    for (from, to, band) in scale.bands() {
        let (y0, y1) = (colorbar_y(bar, scale, to), colorbar_y(bar, scale, from));
        if let Some(rect) = Rect::from_ltrb(bar.x, y0, bar.right(), y1.max(y0 + 0.5)) {
            pixmap.fill_rect(rect, &band.paint(false), Transform::identity(), None);
        }
    }
    stroke_rect(pixmap, bar, color, 1.0);
    for value in scale.ticks() {
        let y = colorbar_y(bar, scale, value);
        line(pixmap, (bar.right(), y), (bar.right() + 4.0, y), color, 1.0);
    }
}

/// Demultiply a pixmap into a straight-alpha image.
fn pixmap_to_image(pixmap: &Pixmap) -> RenderResult<RgbaImage> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| RenderError::Encode("pixmap size does not match image buffer".to_string()))
}
