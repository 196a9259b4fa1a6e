//! Contour line (isoline) rendering using the marching squares algorithm.
//!
//! Contours are traced in grid index space, mapped to figure pixels through
//! the map frame, smoothed, stroked and labelled with their level. Labels are
//! drawn from line segments so they need no font.

use forecast_common::grid::interpolate_axis;
use forecast_common::GridSlice;
use tiny_skia::{FillRule, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::gradient::Color;
use crate::map::{MapFrame, PixelRect};

/// A point in 2D space (grid or pixel coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A line segment between two points
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A complete contour line (polyline)
#[derive(Debug, Clone)]
pub struct Contour {
    pub level: f32,
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Configuration for contour rendering
#[derive(Debug, Clone)]
pub struct ContourConfig {
    /// Contour levels to draw
    pub levels: Vec<f32>,
    /// Line width in pixels
    pub line_width: f32,
    pub line_color: Color,
    /// Number of Chaikin smoothing passes (0 = no smoothing)
    pub smoothing_passes: u32,
    pub labels_enabled: bool,
    /// Label glyph height in pixels
    pub label_font_size: f32,
    /// Minimum distance between labels along a line, in pixels
    pub label_spacing: f32,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            levels: vec![],
            line_width: 1.5,
            line_color: Color::BLACK,
            smoothing_passes: 2,
            labels_enabled: true,
            label_font_size: 11.0,
            label_spacing: 160.0,
        }
    }
}

impl ContourConfig {
    /// Levels every `interval` across the field's value range.
    pub fn for_field(field: &GridSlice, interval: f32) -> Self {
        let levels = field
            .value_range()
            .map(|(min, max)| generate_contour_levels(min, max, interval))
            .unwrap_or_default();
        Self {
            levels,
            ..Self::default()
        }
    }
}

/// Label text for a level: no decimals for whole numbers, one otherwise.
pub fn level_label(level: f32) -> String {
    if (level - level.round()).abs() < 0.01 {
        format!("{:.0}", level)
    } else {
        format!("{:.1}", level)
    }
}

/// Generate contour levels automatically based on data range and interval
pub fn generate_contour_levels(min_value: f32, max_value: f32, interval: f32) -> Vec<f32> {
    if !(interval > 0.0) || !(max_value > min_value) {
        return vec![];
    }

    // Multiples of the interval, counted by index so steps do not drift
    let first = (min_value / interval).ceil() as i64;
    let last = (max_value / interval).floor() as i64;
    (first..=last).map(|i| i as f32 * interval).collect()
}

/// Marching squares over a row-major grid, producing segments in grid
/// index coordinates (x = column, y = row). Cells touching NaN are skipped.
pub fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let case = (tl >= level) as u8
                | ((tr >= level) as u8) << 1
                | ((br >= level) as u8) << 2
                | ((bl >= level) as u8) << 3;

            cell_segments(case, x as f32, y as f32, [tl, tr, br, bl], level, &mut segments);
        }
    }

    segments
}

/// Append the segments for one cell. Corners are `[tl, tr, br, bl]`.
fn cell_segments(case: u8, x: f32, y: f32, corners: [f32; 4], level: f32, out: &mut Vec<Segment>) {
    let [tl, tr, br, bl] = corners;
    let top = || interpolate_edge(Point::new(x, y), Point::new(x + 1.0, y), tl, tr, level);
    let right = || interpolate_edge(Point::new(x + 1.0, y), Point::new(x + 1.0, y + 1.0), tr, br, level);
    let bottom = || interpolate_edge(Point::new(x, y + 1.0), Point::new(x + 1.0, y + 1.0), bl, br, level);
    let left = || interpolate_edge(Point::new(x, y), Point::new(x, y + 1.0), tl, bl, level);
    let mut push = |start: Point, end: Point| out.push(Segment { start, end });

    match case {
        1 | 14 => push(left(), top()),
        2 | 13 => push(top(), right()),
        3 | 12 => push(left(), right()),
        4 | 11 => push(right(), bottom()),
        6 | 9 => push(top(), bottom()),
        7 | 8 => push(left(), bottom()),
        // Saddles: resolve by the cell-centre average
        5 | 10 => {
            let centre_high = (tl + tr + br + bl) / 4.0 >= level;
            if (case == 5) == centre_high {
                push(left(), bottom());
                push(top(), right());
            } else {
                push(left(), top());
                push(right(), bottom());
            }
        }
        _ => {}
    }
}

/// Point where `level` crosses the edge from `a` (value `va`) to `b`.
fn interpolate_edge(a: Point, b: Point, va: f32, vb: f32, level: f32) -> Point {
    if (vb - va).abs() < 1e-6 {
        return Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    }
    let t = ((level - va) / (vb - va)).clamp(0.0, 1.0);
    Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
}

/// Join unordered segments into polylines, growing each line at both ends.
pub fn connect_segments(segments: Vec<Segment>) -> Vec<Contour> {
    const EPSILON: f32 = 0.001;

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;
        let mut points = std::collections::VecDeque::from([segments[start_idx].start, segments[start_idx].end]);

        loop {
            let mut extended = false;
            for (i, seg) in segments.iter().enumerate() {
                if used[i] {
                    continue;
                }
                let (Some(&head), Some(&tail)) = (points.front(), points.back()) else {
                    break;
                };
                if seg.start.distance(&tail) < EPSILON {
                    points.push_back(seg.end);
                } else if seg.end.distance(&tail) < EPSILON {
                    points.push_back(seg.start);
                } else if seg.end.distance(&head) < EPSILON {
                    points.push_front(seg.start);
                } else if seg.start.distance(&head) < EPSILON {
                    points.push_front(seg.end);
                } else {
                    continue;
                }
                used[i] = true;
                extended = true;
            }
            if !extended {
                break;
            }
        }

        let points: Vec<Point> = points.into_iter().collect();
        let closed = points.len() > 2
            && matches!((points.first(), points.last()), (Some(a), Some(b)) if a.distance(b) < EPSILON);
        contours.push(Contour {
            level: 0.0,
            points,
            closed,
        });
    }

    contours
}

/// Apply Chaikin's corner cutting algorithm for smoothing
pub fn smooth_contour(contour: &Contour, iterations: u32) -> Contour {
    if iterations == 0 || contour.points.len() < 3 {
        return contour.clone();
    }

    let mut points = contour.points.clone();
    for _ in 0..iterations {
        let n = points.len();
        let pairs = if contour.closed { n } else { n - 1 };
        let mut next = Vec::with_capacity(pairs * 2 + 2);

        if !contour.closed {
            next.push(points[0]);
        }
        for i in 0..pairs {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            next.push(Point::new(0.75 * p1.x + 0.25 * p2.x, 0.75 * p1.y + 0.25 * p2.y));
            next.push(Point::new(0.25 * p1.x + 0.75 * p2.x, 0.25 * p1.y + 0.75 * p2.y));
        }
        if !contour.closed {
            next.push(points[n - 1]);
        }
        points = next;
    }

    Contour {
        level: contour.level,
        points,
        closed: contour.closed,
    }
}

/// Trace every configured level, in grid index coordinates.
pub fn generate_all_contours(data: &[f32], width: usize, height: usize, config: &ContourConfig) -> Vec<Contour> {
    let mut all = Vec::new();
    for &level in &config.levels {
        let mut contours = connect_segments(march_squares(data, width, height, level));
        for contour in &mut contours {
            contour.level = level;
        }
        all.extend(contours);
    }
    all
}

/// Map grid-index contours to figure pixels, then smooth them.
pub fn project_contours(contours: Vec<Contour>, field: &GridSlice, frame: &MapFrame, smoothing: u32) -> Vec<Contour> {
    contours
        .into_iter()
        .map(|contour| {
            let points = contour
                .points
                .iter()
                .map(|p| {
                    let lon = interpolate_axis(&field.lons, p.x as f64);
                    let lat = interpolate_axis(&field.lats, p.y as f64);
                    let (x, y) = frame.project(lon, lat);
                    Point::new(x, y)
                })
                .collect();
            let projected = Contour { points, ..contour };
            smooth_contour(&projected, smoothing)
        })
        .collect()
}

/// Trace, project and stroke the contours of a field. Returns the contours
/// drawn (pixel coordinates).
pub fn render_field_contours(
    pixmap: &mut Pixmap,
    frame: &MapFrame,
    field: &GridSlice,
    config: &ContourConfig,
    clip: Option<&Mask>,
) -> Vec<Contour> {
    let traced = generate_all_contours(&field.values, field.width(), field.height(), config);
    let contours = project_contours(traced, field, frame, config.smoothing_passes);

    tracing::debug!(
        levels = config.levels.len(),
        first_level = config.levels.first().copied().unwrap_or(f32::NAN),
        last_level = config.levels.last().copied().unwrap_or(f32::NAN),
        contours = contours.len(),
        points = contours.iter().map(|c| c.points.len()).sum::<usize>(),
        "Generated contours"
    );

    stroke_contours(pixmap, &contours, config.line_color, config.line_width, None, clip);
    if config.labels_enabled {
        let labels = place_labels(&contours, config, &frame.panel);
        for label in &labels {
            draw_text_label(pixmap, label, config.label_font_size, config.line_color);
        }
    }
    contours
}

/// Stroke polylines, optionally dashed.
pub fn stroke_contours(
    pixmap: &mut Pixmap,
    contours: &[Contour],
    color: Color,
    width: f32,
    dash: Option<&[f32]>,
    clip: Option<&Mask>,
) {
    let paint = color.paint(true);
    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash: dash.and_then(|d| tiny_skia::StrokeDash::new(d.to_vec(), 0.0)),
        ..Stroke::default()
    };

    for contour in contours {
        let Some((first, rest)) = contour.points.split_first() else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        if contour.closed {
            pb.close();
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), clip);
        }
    }
}

/// A label anchored on a contour line.
#[derive(Debug, Clone)]
pub struct LabelPosition {
    pub x: f32,
    pub y: f32,
    /// Rotation in radians, kept within ±90° so text is never upside down
    pub angle: f32,
    pub text: String,
}

fn contour_length(contour: &Contour) -> f32 {
    contour.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Spread labels evenly along each contour, inside `bounds` and away from
/// labels already placed.
pub fn place_labels(contours: &[Contour], config: &ContourConfig, bounds: &PixelRect) -> Vec<LabelPosition> {
    let margin = config.label_font_size * 1.5;
    let min_distance = config.label_font_size * 4.0;
    let mut placed: Vec<LabelPosition> = Vec::new();

    for contour in contours {
        let total = contour_length(contour);
        if total < config.label_spacing * 0.5 {
            continue;
        }
        let count = ((total / config.label_spacing).floor() as usize).max(1);
        let spacing = total / (count as f32 + 1.0);
        let text = level_label(contour.level);

        let mut walked = 0.0;
        let mut next_at = spacing;
        let mut done = 0;
        for w in contour.points.windows(2) {
            let (p1, p2) = (w[0], w[1]);
            let seg_len = p1.distance(&p2);
            while done < count && seg_len > 0.0 && walked + seg_len >= next_at {
                let t = (next_at - walked) / seg_len;
                let x = p1.x + t * (p2.x - p1.x);
                let y = p1.y + t * (p2.y - p1.y);
                next_at += spacing;
                done += 1;

                let inside = x > bounds.x + margin
                    && x < bounds.right() - margin
                    && y > bounds.y + margin
                    && y < bounds.bottom() - margin;
                let crowded = placed
                    .iter()
                    .any(|l| (l.x - x).hypot(l.y - y) < min_distance);
                if !inside || crowded {
                    continue;
                }

                let mut angle = (p2.y - p1.y).atan2(p2.x - p1.x);
                if angle > std::f32::consts::FRAC_PI_2 {
                    angle -= std::f32::consts::PI;
                } else if angle < -std::f32::consts::FRAC_PI_2 {
                    angle += std::f32::consts::PI;
                }
                placed.push(LabelPosition {
                    x,
                    y,
                    angle,
                    text: text.clone(),
                });
            }
            walked += seg_len;
        }
    }

    placed
}

/// Seven-segment layout: bit 0 top, 1 upper right, 2 lower right,
/// 3 bottom, 4 lower left, 5 upper left, 6 middle.
fn segment_mask(ch: char) -> Option<u8> {
    Some(match ch {
        '0' => 0b011_1111,
        '1' => 0b000_0110,
        '2' => 0b101_1011,
        '3' => 0b100_1111,
        '4' => 0b110_0110,
        '5' => 0b110_1101,
        '6' => 0b111_1101,
        '7' => 0b000_0111,
        '8' => 0b111_1111,
        '9' => 0b110_1111,
        '-' => 0b100_0000,
        _ => return None,
    })
}

/// Draw a rotated label: a translucent white box with stroked digits.
fn draw_text_label(pixmap: &mut Pixmap, label: &LabelPosition, font_size: f32, color: Color) {
    let glyph_w = font_size * 0.55;
    let advance = glyph_w + font_size * 0.2;
    let char_count = label.text.chars().count() as f32;
    let text_w = char_count * advance - font_size * 0.2;
    let pad = font_size * 0.25;

    let transform = Transform::from_translate(label.x, label.y).pre_concat(Transform::from_rotate(label.angle.to_degrees()));

    if let Some(rect) = tiny_skia::Rect::from_xywh(-text_w / 2.0 - pad, -font_size / 2.0 - pad, text_w + 2.0 * pad, font_size + 2.0 * pad) {
        let path = PathBuilder::from_rect(rect);
        pixmap.fill_path(&path, &Color::WHITE.with_alpha(220).paint(true), FillRule::Winding, transform, None);
    }

    let (hw, hh) = (glyph_w / 2.0, font_size / 2.0);
    let ends: [((f32, f32), (f32, f32)); 7] = [
        ((-hw, -hh), (hw, -hh)),
        ((hw, -hh), (hw, 0.0)),
        ((hw, 0.0), (hw, hh)),
        ((-hw, hh), (hw, hh)),
        ((-hw, 0.0), (-hw, hh)),
        ((-hw, -hh), (-hw, 0.0)),
        ((-hw, 0.0), (hw, 0.0)),
    ];

    let mut pb = PathBuilder::new();
    for (i, ch) in label.text.chars().enumerate() {
        let cx = -text_w / 2.0 + glyph_w / 2.0 + i as f32 * advance;
        if ch == '.' {
            pb.push_circle(cx, hh, font_size * 0.06);
            continue;
        }
        let Some(mask) = segment_mask(ch) else {
            continue;
        };
        for (bit, ((x1, y1), (x2, y2))) in ends.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                pb.move_to(cx + x1, *y1);
                pb.line_to(cx + x2, *y2);
            }
        }
    }

    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: (font_size * 0.12).max(1.0),
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &color.paint(true), &stroke, transform, None);
    }
}
