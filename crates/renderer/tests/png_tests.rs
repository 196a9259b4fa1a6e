//! Tests for PNG encoding functionality.
//!
//! Tests the indexed PNG and RGBA PNG encoders, including:
//! - Format selection (auto mode)
//! - Decoding the output back with the `image` crate
//! - File size comparisons for panel-like data

use renderer::png::{create_png, create_png_auto, create_png_indexed, encode_image, PNG_SIGNATURE};
use renderer::RenderError;
use test_utils::{create_banded_pixels, create_test_rgba_pixels};

// ============================================================================
// Helper functions
// ============================================================================

/// Color type byte from the IHDR chunk.
fn color_type(png: &[u8]) -> u8 {
    // signature (8) + length (4) + "IHDR" (4) + width (4) + height (4) + depth (1)
    png[25]
}

fn has_chunk(png: &[u8], name: &[u8; 4]) -> bool {
    png.windows(4).any(|w| w == name)
}

// ============================================================================
// Format selection
// ============================================================================

#[test]
fn test_banded_pixels_use_indexed_png() {
    let pixels = create_banded_pixels(100, 80);
    let png = create_png_auto(&pixels, 100, 80).unwrap();

    assert_eq!(&png[..8], &PNG_SIGNATURE);
    assert_eq!(color_type(&png), 3);
    assert!(has_chunk(&png, b"PLTE"));
    // Every band is opaque
    assert!(!has_chunk(&png, b"tRNS"));
}

#[test]
fn test_gradient_pixels_use_rgba_png() {
    let pixels = create_test_rgba_pixels(300, 300);
    let png = create_png_auto(&pixels, 300, 300).unwrap();
    assert_eq!(color_type(&png), 6);
    assert!(!has_chunk(&png, b"PLTE"));
}

#[test]
fn test_indexed_is_smaller_than_rgba_for_banded_data() {
    let pixels = create_banded_pixels(256, 256);
    let indexed = create_png_auto(&pixels, 256, 256).unwrap();
    let rgba = create_png(&pixels, 256, 256).unwrap();
    assert!(
        indexed.len() < rgba.len(),
        "indexed {} bytes should beat rgba {} bytes",
        indexed.len(),
        rgba.len()
    );
}

// ============================================================================
// Round trips through a real decoder
// ============================================================================

#[test]
fn test_indexed_png_decodes_to_same_pixels() {
    let pixels = create_banded_pixels(64, 48);
    let png = create_png_auto(&pixels, 64, 48).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (64, 48));
    assert_eq!(decoded.as_raw(), &pixels);
}

#[test]
fn test_transparent_palette_entry_survives() {
    let palette = [(255, 255, 255, 0), (8, 81, 156, 255)];
    let indices = [0u8, 1, 1, 0];
    let png = create_png_indexed(2, 2, &palette, &indices).unwrap();
    assert!(has_chunk(&png, b"tRNS"));

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    assert_eq!(decoded.get_pixel(1, 0).0, [8, 81, 156, 255]);
}

#[test]
fn test_encode_image_matches_auto() {
    let pixels = create_banded_pixels(20, 10);
    let img = image::RgbaImage::from_raw(20, 10, pixels.clone()).unwrap();
    assert_eq!(encode_image(&img).unwrap(), create_png_auto(&pixels, 20, 10).unwrap());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_zero_dimensions_rejected() {
    let err = create_png_auto(&[], 0, 10).unwrap_err();
    assert!(matches!(err, RenderError::InvalidDimensions { width: 0, height: 10 }));
}

#[test]
fn test_empty_palette_rejected() {
    let err = create_png_indexed(1, 1, &[], &[0]).unwrap_err();
    assert!(matches!(err, RenderError::Encode(_)));
}
