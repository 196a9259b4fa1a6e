//! PNG encoding for rendered figures.
//!
//! Two encodings are produced:
//! - **Indexed (color type 3)** when the figure has at most 256 distinct
//!   colors. Shaded panels with a discretized scale usually qualify.
//! - **Truecolor with alpha (color type 6)** otherwise (anti-aliased text
//!   and smooth gradients push the count well past 256).
//!
//! [`create_png_auto`] picks the encoding; [`encode_image`] is the entry point
//! used by the panel pipeline.

use std::collections::HashMap;
use std::io::Write;

use image::RgbaImage;
use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for an indexed PNG
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixel count for the parallel palette pass
const PARALLEL_THRESHOLD: usize = 4096;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

type Palette = Vec<(u8, u8, u8, u8)>;

/// Encode an in-memory figure.
pub fn encode_image(image: &RgbaImage) -> RenderResult<Vec<u8>> {
    create_png_auto(image.as_raw(), image.width() as usize, image.height() as usize)
}

/// Encode RGBA pixels, choosing indexed output when the palette fits.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_dimensions(pixels, width, height, 4)?;

    let palette = if width * height >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

/// Encode an indexed PNG from a palette and one index byte per pixel.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> RenderResult<Vec<u8>> {
    check_dimensions(indices, width, height, 1)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(RenderError::Encode(format!(
            "palette must hold 1..={} colors, got {}",
            MAX_PALETTE_SIZE,
            palette.len()
        )));
    }

    let mut png = start_png(width, height, COLOR_TYPE_INDEXED);

    let plte: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some entry is not opaque
    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode a truecolor-with-alpha PNG.
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_dimensions(pixels, width, height, 4)?;

    let mut png = start_png(width, height, COLOR_TYPE_RGBA);
    let idat = deflate_scanlines(pixels, width * 4)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_dimensions(data: &[u8], width: usize, height: usize, bytes_per_pixel: usize) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions {
            width: width as u32,
            height: height as u32,
        });
    }
    let expected = width * height * bytes_per_pixel;
    if data.len() != expected {
        return Err(RenderError::Encode(format!(
            "expected {} bytes for {}x{}, got {}",
            expected,
            width,
            height,
            data.len()
        )));
    }
    Ok(())
}

/// Signature plus IHDR (8-bit depth, no interlace).
fn start_png(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut png = Vec::with_capacity(width * height / 2 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);
    png
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize) -> RenderResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(data.len() + data.len() / row_bytes);
    for row in data.chunks_exact(row_bytes) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    let compress_err = |e: std::io::Error| RenderError::Encode(format!("IDAT compression failed: {}", e));
    encoder.write_all(&raw).map_err(compress_err)?;
    encoder.finish().map_err(compress_err)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

#[inline(always)]
fn unpack_color(packed: u32) -> (u8, u8, u8, u8) {
    let [r, g, b, a] = packed.to_le_bytes();
    (r, g, b, a)
}

fn extract_palette_sequential(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let packed = pack_color(px);
        let index = match lookup.get(&packed) {
            Some(&index) => index,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let index = palette.len() as u8;
                palette.push(unpack_color(packed));
                lookup.insert(packed, index);
                index
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Collect distinct colors per chunk in parallel, merge, then map pixels to
/// palette indices in a second parallel pass.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let pixels_per_chunk = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let chunk_colors: Vec<Vec<u32>> = pixels
        .par_chunks(pixels_per_chunk * 4)
        .map(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack_color(px), ());
                if seen.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            seen.into_keys().collect()
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for packed in chunk_colors.into_iter().flatten() {
        if lookup.contains_key(&packed) {
            continue;
        }
        if palette.len() == MAX_PALETTE_SIZE {
            return None;
        }
        lookup.insert(packed, palette.len() as u8);
        palette.push(unpack_color(packed));
    }

    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack_color(px)).copied().unwrap_or(0))
        .collect();

    Some((palette, indices))
}
