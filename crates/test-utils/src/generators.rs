//! Synthetic field generators.
//!
//! Every generator returns row-major `Vec<f32>` data (row 0 first) in the raw
//! units a GFS dataset would serve, so tests can run values through the same
//! conversions the panel applies.

/// Evenly spaced coordinate axis: `start, start + step, ...` (`n` points).
///
/// # Example
///
/// ```
/// use test_utils::axis;
///
/// let lons = axis(114.0, 0.25, 7);
/// assert_eq!(lons.first(), Some(&114.0));
/// assert_eq!(lons.last(), Some(&115.5));
/// ```
pub fn axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Grid whose value encodes its own position: `col * 1000 + row`.
///
/// Handy for checking that a crop or window picked the right cells.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// 2 m temperature in kelvin, warm tropical afternoon: 293 K (north-west
/// corner) rising to 308 K (south-east corner).
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f32 / (width.max(2) - 1) as f32;
            let y = row as f32 / (height.max(2) - 1) as f32;
            data.push(293.0 + 7.5 * x + 7.5 * y);
        }
    }
    data
}

/// Zonal wind (m/s): easterly in the first rows turning westerly in the last.
pub fn create_u_wind_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let lat_factor = (row as f32 / height.max(1) as f32 - 0.5) * 2.0; // -1 to 1
        data.extend(std::iter::repeat(lat_factor * 8.0).take(width));
    }
    data
}

/// Meridional wind (m/s): varies with column, -5 to +5.
pub fn create_v_wind_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let lon_factor = (col as f32 / width.max(1) as f32 - 0.5) * 2.0;
            data.push(lon_factor * 5.0);
        }
    }
    data
}

/// Surface precipitation rate in kg m⁻² s⁻¹ with scattered convective cells.
///
/// About a quarter of the points rain, at most 0.003 (10.8 mm/h once
/// converted). Deterministic for a given seed.
pub fn create_precip_rate_grid(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            let rate = if hash % 4 == 0 {
                (hash % 3000) as f32 * 1e-6
            } else {
                0.0
            };
            data.push(rate);
        }
    }
    data
}

/// Mean sea level pressure in pascals: 1010 hPa background with a 6 hPa low
/// centred on the grid.
pub fn create_pressure_grid(width: usize, height: usize) -> Vec<f32> {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let radius = (width.max(height) as f32 / 2.0).max(1.0);

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = (col as f32 - cx) / radius;
            let dy = (row as f32 - cy) / radius;
            let dip = 600.0 * (-(dx * dx + dy * dy) * 2.0).exp();
            data.push(101_000.0 - dip);
        }
    }
    data
}

/// Land/sea mask (1 = land, 0 = sea) with a diagonal coastline: everything
/// above the line from the south-west to the north-east corner is land.
pub fn create_land_mask(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f32 / width.max(1) as f32;
            let y = row as f32 / height.max(1) as f32;
            data.push(if y > x { 1.0 } else { 0.0 });
        }
    }
    data
}

/// Grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Zero grid with NaN at the given `(col, row)` positions.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// RGBA gradient (red along x, green along y): many distinct colors, so the
/// PNG encoder takes the truecolor path.
pub fn create_test_rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            pixels.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    pixels
}

/// RGBA pixels drawn from a 10-entry palette, so the PNG encoder takes the
/// indexed path.
pub fn create_banded_pixels(width: usize, height: usize) -> Vec<u8> {
    const BANDS: [(u8, u8, u8); 10] = [
        (255, 255, 255),
        (198, 219, 239),
        (158, 202, 225),
        (107, 174, 214),
        (66, 146, 198),
        (33, 113, 181),
        (8, 81, 156),
        (8, 48, 107),
        (84, 39, 143),
        (63, 0, 125),
    ];

    let mut pixels = Vec::with_capacity(width * height * 4);
    for _y in 0..height {
        for x in 0..width {
            let band = (x * BANDS.len() / width.max(1)).min(BANDS.len() - 1);
            let (r, g, b) = BANDS[band];
            pixels.extend_from_slice(&[r, g, b, 255]);
        }
    }
    pixels
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_endpoints() {
        let lats = axis(-2.5, 0.25, 7);
        assert_eq!(lats.len(), 7);
        assert_eq!(lats[0], -2.5);
        assert_eq!(lats[6], -1.0);
    }

    #[test]
    fn test_temperature_grid_range() {
        let grid = create_temperature_grid(20, 20);
        let min = grid.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = grid.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((min - 293.0).abs() < 1e-3);
        assert!((max - 308.0).abs() < 1e-3);
    }

    #[test]
    fn test_precip_grid_deterministic() {
        let a = create_precip_rate_grid(30, 30, 7);
        let b = create_precip_rate_grid(30, 30, 7);
        assert_eq!(a, b);
        assert_ne!(a, create_precip_rate_grid(30, 30, 8));
        assert!(a.iter().all(|&v| (0.0..0.003).contains(&v)));
    }

    #[test]
    fn test_pressure_grid_has_low_in_middle() {
        let grid = create_pressure_grid(21, 21);
        let centre = grid[10 * 21 + 10];
        assert!(centre < grid[0]);
        assert!((centre - 100_400.0).abs() < 1.0);
    }

    #[test]
    fn test_land_mask_is_binary() {
        let mask = create_land_mask(10, 10);
        assert!(mask.iter().all(|&v| v == 0.0 || v == 1.0));
        assert!(mask.iter().any(|&v| v == 1.0));
        assert!(mask.iter().any(|&v| v == 0.0));
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(10, 10, &[(5, 5), (0, 0)]);
        assert!(grid[0].is_nan());
        assert!(grid[55].is_nan());
        assert!(!grid[1].is_nan());
    }

    #[test]
    fn test_banded_pixels_use_few_colors() {
        let pixels = create_banded_pixels(64, 8);
        let mut colors: Vec<&[u8]> = pixels.chunks_exact(4).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 10);
    }
}
