//! Plate carrée map frame: pixel ↔ lon/lat mapping and figure layout.

use forecast_common::BoundingBox;

/// Axis-aligned rectangle in figure pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn to_skia(&self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// Maps a geographic region onto a pixel rectangle with equal-degree
/// scaling in both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    pub region: BoundingBox,
    pub panel: PixelRect,
}

impl MapFrame {
    pub fn new(region: BoundingBox, panel: PixelRect) -> Self {
        Self { region, panel }
    }

    /// Pixel position of a lon/lat point. Longitudes are brought to within
    /// 180° of the region's western edge first, so 0..360 grids line up
    /// with -180..180 regions.
    pub fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let lon = self.normalize_lon(lon);
        let fx = (lon - self.region.min_x) / self.region.width();
        let fy = (self.region.max_y - lat) / self.region.height();
        (
            self.panel.x + (fx * self.panel.width as f64) as f32,
            self.panel.y + (fy * self.panel.height as f64) as f32,
        )
    }

    /// Lon/lat under a pixel.
    pub fn unproject(&self, x: f32, y: f32) -> (f64, f64) {
        let fx = ((x - self.panel.x) / self.panel.width) as f64;
        let fy = ((y - self.panel.y) / self.panel.height) as f64;
        (
            self.region.min_x + fx * self.region.width(),
            self.region.max_y - fy * self.region.height(),
        )
    }

    /// Pixels per degree of longitude (equal to pixels per degree of
    /// latitude when the layout kept the aspect ratio).
    pub fn pixels_per_degree(&self) -> f32 {
        self.panel.width / self.region.width() as f32
    }

    pub fn normalize_lon(&self, lon: f64) -> f64 {
        let mut lon = lon;
        while lon - self.region.min_x >= 180.0 {
            lon -= 360.0;
        }
        while self.region.min_x - lon > 180.0 {
            lon += 360.0;
        }
        lon
    }

    /// Mask that limits drawing to the map panel.
    pub fn clip_mask(&self, width: u32, height: u32) -> Option<tiny_skia::Mask> {
        let mut mask = tiny_skia::Mask::new(width, height)?;
        let path = tiny_skia::PathBuilder::from_rect(self.panel.to_skia()?);
        mask.fill_path(
            &path,
            tiny_skia::FillRule::Winding,
            false,
            tiny_skia::Transform::identity(),
        );
        Some(mask)
    }
}

/// Where each part of the figure goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureLayout {
    pub width: u32,
    pub height: u32,
    pub title: PixelRect,
    pub frame: MapFrame,
    pub colorbar: Option<PixelRect>,
}

const TITLE_FRACTION: f32 = 0.08;
const LEFT_MARGIN: f32 = 70.0;
const BOTTOM_MARGIN: f32 = 40.0;
const RIGHT_MARGIN: f32 = 30.0;
const COLORBAR_AREA: f32 = 120.0;
const COLORBAR_GAP: f32 = 20.0;
const COLORBAR_WIDTH: f32 = 20.0;

impl FigureLayout {
    /// Fit the region into the figure keeping one degree of longitude the
    /// same length as one degree of latitude.
    pub fn compute(width: u32, height: u32, region: BoundingBox, with_colorbar: bool) -> Self {
        let (w, h) = (width as f32, height as f32);
        let title_height = (h * TITLE_FRACTION).max(32.0);
        let right = if with_colorbar { COLORBAR_AREA } else { RIGHT_MARGIN };

        let avail_x = LEFT_MARGIN;
        let avail_y = title_height + 8.0;
        let avail_w = (w - LEFT_MARGIN - right).max(1.0);
        let avail_h = (h - avail_y - BOTTOM_MARGIN).max(1.0);

        let aspect = (region.width() / region.height()) as f32;
        let (panel_w, panel_h) = if avail_w / avail_h > aspect {
            (avail_h * aspect, avail_h)
        } else {
            (avail_w, avail_w / aspect)
        };
        let panel = PixelRect::new(
            avail_x + (avail_w - panel_w) / 2.0,
            avail_y + (avail_h - panel_h) / 2.0,
            panel_w,
            panel_h,
        );

        let colorbar = with_colorbar.then(|| {
            PixelRect::new(panel.right() + COLORBAR_GAP, panel.y, COLORBAR_WIDTH, panel.height)
        });

        Self {
            width,
            height,
            title: PixelRect::new(0.0, 0.0, w, title_height),
            frame: MapFrame::new(region, panel),
            colorbar,
        }
    }
}

/// A round step (1, 2, 2.5 or 5 times a power of ten) giving about
/// `target` intervals across `range`.
pub fn nice_step(range: f64, target: usize) -> f64 {
    if !(range > 0.0) || target == 0 {
        return 1.0;
    }
    let raw = range / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 2.5 {
        2.5
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Multiples of `step` inside `[min, max]`.
pub fn tick_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || max < min {
        return vec![];
    }
    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// "114.5°E", "60°W", "0°".
pub fn format_lon(lon: f64) -> String {
    let lon = ((lon + 180.0).rem_euclid(360.0)) - 180.0;
    let hemisphere = if lon > 1e-9 {
        "E"
    } else if lon < -1e-9 {
        "W"
    } else {
        ""
    };
    format!("{}°{}", trim_degrees(lon.abs()), hemisphere)
}

/// "1.5°S", "10°N", "0°".
pub fn format_lat(lat: f64) -> String {
    let hemisphere = if lat > 1e-9 {
        "N"
    } else if lat < -1e-9 {
        "S"
    } else {
        ""
    };
    format!("{}°{}", trim_degrees(lat.abs()), hemisphere)
}

fn trim_degrees(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barito() -> BoundingBox {
        BoundingBox::new(114.0, -2.5, 115.5, -1.0)
    }

    #[test]
    fn test_project_corners() {
        let frame = MapFrame::new(barito(), PixelRect::new(10.0, 20.0, 300.0, 300.0));
        assert_eq!(frame.project(114.0, -1.0), (10.0, 20.0));
        assert_eq!(frame.project(115.5, -2.5), (310.0, 320.0));

        let (lon, lat) = frame.unproject(160.0, 170.0);
        assert!((lon - 114.75).abs() < 1e-6);
        assert!((lat + 1.75).abs() < 1e-6);
    }

    #[test]
    fn test_project_0_360_longitudes() {
        let frame = MapFrame::new(
            BoundingBox::new(-40.0, 10.0, -30.0, 20.0),
            PixelRect::new(0.0, 0.0, 100.0, 100.0),
        );
        let (x, _) = frame.project(325.0, 15.0);
        assert!((x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_layout_keeps_aspect() {
        let layout = FigureLayout::compute(1000, 700, barito(), true);
        let panel = layout.frame.panel;
        assert!((panel.width - panel.height).abs() < 1e-3);
        let colorbar = layout.colorbar.unwrap();
        assert!(colorbar.x > panel.right());
        assert!(colorbar.right() <= 1000.0);
        assert!(panel.y >= layout.title.bottom());
        assert!(panel.bottom() <= 700.0);
    }

    #[test]
    fn test_nice_step_and_ticks() {
        assert_eq!(nice_step(10.0, 5), 2.0);
        assert_eq!(nice_step(15.0, 6), 2.5);
        assert_eq!(nice_step(1.5, 5), 0.5);
        assert_eq!(tick_values(114.0, 115.5, 0.5), vec![114.0, 114.5, 115.0, 115.5]);
        assert_eq!(tick_values(-2.5, -1.0, 0.5), vec![-2.5, -2.0, -1.5, -1.0]);
    }

    #[test]
    fn test_coordinate_labels() {
        assert_eq!(format_lon(114.5), "114.5°E");
        assert_eq!(format_lon(300.0), "60°W");
        assert_eq!(format_lat(-1.5), "1.5°S");
        assert_eq!(format_lat(0.0), "0°");
    }
}
