//! Colormaps and value-to-color scales.

use serde::{Deserialize, Serialize};

use crate::gradient::{interpolate_color, Color};

/// Color stop for a colormap, positioned on `0.0..=1.0`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f32,
    pub color: String,
    pub label: Option<String>,
}

impl ColorStop {
    fn at(value: f32, color: &str) -> Self {
        Self {
            value,
            color: color.to_string(),
            label: None,
        }
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Named colormaps used by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    /// White through blues to purple, for rainfall
    Rain,
    /// Blue, white, red
    Diverging,
    /// White through greens and yellows to dark red, for wind speed
    Wind,
}

impl Colormap {
    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Rain => "rain",
            Colormap::Diverging => "diverging",
            Colormap::Wind => "wind",
        }
    }

    /// Stops sorted by position.
    pub fn stops(&self) -> Vec<ColorStop> {
        match self {
            Colormap::Rain => vec![
                ColorStop::at(0.0, "#ffffff"),
                ColorStop::at(0.15, "#deebf7"),
                ColorStop::at(0.3, "#c6dbef"),
                ColorStop::at(0.45, "#9ecae1"),
                ColorStop::at(0.6, "#6baed6"),
                ColorStop::at(0.75, "#3182bd"),
                ColorStop::at(0.9, "#08519c"),
                ColorStop::at(1.0, "#54278f"),
            ],
            Colormap::Diverging => vec![
                ColorStop::at(0.0, "#2166ac"),
                ColorStop::at(0.25, "#67a9cf"),
                ColorStop::at(0.5, "#f7f7f7"),
                ColorStop::at(0.75, "#ef8a62"),
                ColorStop::at(1.0, "#b2182b"),
            ],
            Colormap::Wind => vec![
                ColorStop::at(0.0, "#ffffff"),
                ColorStop::at(0.2, "#c7e9c0"),
                ColorStop::at(0.4, "#74c476"),
                ColorStop::at(0.6, "#fed976"),
                ColorStop::at(0.8, "#fd8d3c"),
                ColorStop::at(1.0, "#bd0026"),
            ],
        }
    }

    /// Color at normalized position `t` (clamped to `0.0..=1.0`).
    pub fn sample(&self, t: f32) -> Color {
        sample_stops(&self.stops(), t)
    }
}

impl std::str::FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rain" | "blues" => Ok(Colormap::Rain),
            "diverging" | "coolwarm" | "rdbu" => Ok(Colormap::Diverging),
            "wind" => Ok(Colormap::Wind),
            other => Err(format!("unknown colormap '{}'", other)),
        }
    }
}

fn sample_stops(stops: &[ColorStop], t: f32) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let color_of = |stop: &ColorStop| {
        hex_to_rgb(&stop.color)
            .map(|(r, g, b)| Color::new(r, g, b, 255))
            .unwrap_or(Color::new(200, 200, 200, 255))
    };

    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Color::transparent(),
    };
    if t <= first.value {
        return color_of(first);
    }
    if t >= last.value {
        return color_of(last);
    }

    for pair in stops.windows(2) {
        let (low, high) = (&pair[0], &pair[1]);
        if t >= low.value && t <= high.value {
            let span = high.value - low.value;
            let local = if span.abs() < f32::EPSILON { 0.0 } else { (t - low.value) / span };
            return interpolate_color(color_of(low), color_of(high), local);
        }
    }
    color_of(last)
}

/// Maps data values onto a colormap over `[min, max]`.
///
/// Values outside the range take the end colors, NaN has no color. With
/// `bins` set, the range is split into equal bands each drawn in the color
/// of its midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    pub colormap: Colormap,
    pub min: f32,
    pub max: f32,
    pub bins: Option<usize>,
}

impl ColorScale {
    pub fn new(colormap: Colormap, min: f32, max: f32) -> Self {
        let (min, max) = widen_degenerate(min, max);
        Self {
            colormap,
            min,
            max,
            bins: None,
        }
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = (bins > 0).then_some(bins);
        self
    }

    /// Normalized position of a value after clamping and binning.
    pub fn position(&self, value: f32) -> Option<f32> {
        if value.is_nan() {
            return None;
        }
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        Some(match self.bins {
            Some(bins) => {
                let bin = ((t * bins as f32).floor() as usize).min(bins - 1);
                (bin as f32 + 0.5) / bins as f32
            }
            None => t,
        })
    }

    pub fn color_for(&self, value: f32) -> Option<Color> {
        self.position(value).map(|t| self.colormap.sample(t))
    }

    /// Bands for drawing a colorbar, lowest first: `(from, to, color)`.
    pub fn bands(&self) -> Vec<(f32, f32, Color)> {
        let count = self.bins.unwrap_or(64);
        let step = (self.max - self.min) / count as f32;
        (0..count)
            .map(|i| {
                let from = self.min + step * i as f32;
                let to = from + step;
                (from, to, self.colormap.sample((i as f32 + 0.5) / count as f32))
            })
            .collect()
    }

    /// Colorbar tick values: bin edges for small discretized scales,
    /// otherwise round numbers across the range.
    pub fn ticks(&self) -> Vec<f32> {
        match self.bins {
            Some(bins) if bins <= 12 => {
                let step = (self.max - self.min) / bins as f32;
                (0..=bins).map(|i| self.min + step * i as f32).collect()
            }
            _ => {
                let step = crate::map::nice_step((self.max - self.min) as f64, 6) as f32;
                crate::map::tick_values(self.min as f64, self.max as f64, step as f64)
                    .into_iter()
                    .map(|v| v as f32)
                    .collect()
            }
        }
    }
}

/// A flat field still needs a non-empty range to normalize against.
fn widen_degenerate(min: f32, max: f32) -> (f32, f32) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max - min < 1e-6 {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}
