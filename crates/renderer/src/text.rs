//! Text drawing with a TrueType font loaded at runtime.

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

use crate::error::{RenderError, RenderResult};

/// Draws strings onto figure images.
pub struct TextRenderer {
    font: Font<'static>,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer").finish_non_exhaustive()
    }
}

impl TextRenderer {
    pub fn from_bytes(data: Vec<u8>) -> RenderResult<Self> {
        Font::try_from_vec(data)
            .map(|font| Self { font })
            .ok_or_else(|| RenderError::Font("not a usable TrueType font".to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("cannot read {}: {}", path.display(), e)))?;
        let renderer = Self::from_bytes(data)?;
        tracing::info!(path = %path.display(), "Loaded font");
        Ok(renderer)
    }

    /// Width and height in pixels of `text` at `size`.
    pub fn measure(&self, text: &str, size: f32) -> (i32, i32) {
        text_size(Scale::uniform(size), &self.font, text)
    }

    /// Draw with the top-left corner at `(x, y)`.
    pub fn draw(&self, img: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>) {
        draw_text_mut(img, color, x, y, Scale::uniform(size), &self.font, text);
    }

    /// Draw horizontally centred on `cx`.
    pub fn draw_centered(&self, img: &mut RgbaImage, text: &str, cx: i32, y: i32, size: f32, color: Rgba<u8>) {
        let (w, _) = self.measure(text, size);
        self.draw(img, text, cx - w / 2, y, size, color);
    }

    /// Draw right-aligned to `right`, vertically centred on `cy`.
    pub fn draw_right_aligned(&self, img: &mut RgbaImage, text: &str, right: i32, cy: i32, size: f32, color: Rgba<u8>) {
        let (w, h) = self.measure(text, size);
        self.draw(img, text, right - w, cy - h / 2, size, color);
    }

    /// Draw over a translucent white box for readability on busy maps.
    pub fn draw_with_background(&self, img: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>) {
        let (w, h) = self.measure(text, size);
        let padding = 2;
        let backdrop = RgbaImage::from_pixel(
            (w + 2 * padding).max(1) as u32,
            (h + 2 * padding).max(1) as u32,
            Rgba([255, 255, 255, 220]),
        );
        imageops::overlay(img, &backdrop, (x - padding) as i64, (y - padding) as i64);
        self.draw(img, text, x, y, size, color);
    }

    /// Draw reading bottom-to-top, with the text's left end at the bottom.
    /// `(x, y)` is the top-left of the rotated text's bounding box.
    pub fn draw_vertical(&self, img: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>) {
        let (w, h) = self.measure(text, size);
        if w <= 0 || h <= 0 {
            return;
        }
        let mut strip = RgbaImage::new(w as u32 + 2, h as u32 + 2);
        self.draw(&mut strip, text, 1, 1, size, color);
        let rotated = imageops::rotate270(&strip);
        imageops::overlay(img, &rotated, x as i64, y as i64);
    }
}

/// Format a value with a fixed number of decimals, avoiding "-0".
pub fn format_value(value: f32, decimals: usize) -> String {
    let factor = 10f32.powi(decimals as i32);
    let mut rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        rounded = 0.0;
    }
    format!("{:.*}", decimals, rounded)
}

/// Decimals needed to show multiples of `step` exactly (0 to 2).
pub fn decimals_for_step(step: f32) -> usize {
    (0..=2)
        .find(|&d| {
            let scaled = step * 10f32.powi(d);
            (scaled - scaled.round()).abs() < 1e-3
        })
        .unwrap_or(2) as usize
}
