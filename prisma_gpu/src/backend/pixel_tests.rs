//! Unit tests for pixel-level types
//!
//! Mirrors the numeric-type exchange checks of the original bindings.

use crate::backend::{PixelType, TextureDesc, TextureFormat, TextureTarget};
use crate::error::Error;

// ============================================================================
// PIXEL TYPES
// ============================================================================

#[test]
fn test_pixel_type_sizes() {
    assert_eq!(PixelType::U8.size_bytes(), 1);
    assert_eq!(PixelType::I8.size_bytes(), 1);
    assert_eq!(PixelType::U16.size_bytes(), 2);
    assert_eq!(PixelType::I16.size_bytes(), 2);
    assert_eq!(PixelType::U32.size_bytes(), 4);
    assert_eq!(PixelType::I32.size_bytes(), 4);
    assert_eq!(PixelType::F32.size_bytes(), 4);
}

// ============================================================================
// TEXTURE FORMATS
// ============================================================================

#[test]
fn test_format_band_counts() {
    assert_eq!(TextureFormat::Luminance.bands(), 1);
    assert_eq!(TextureFormat::LuminanceAlpha.bands(), 2);
    assert_eq!(TextureFormat::Rgb.bands(), 3);
    assert_eq!(TextureFormat::Rgba.bands(), 4);
}

#[test]
fn test_format_from_bands_round_trips() {
    for bands in 1..=4 {
        let format = TextureFormat::from_bands(bands).unwrap();
        assert_eq!(format.bands(), bands);
    }
}

#[test]
fn test_format_from_bands_rejects_out_of_range() {
    for bands in [0usize, 5, 16] {
        match TextureFormat::from_bands(bands) {
            Err(Error::InvalidValue(_)) => {}
            other => panic!("expected InvalidValue for {} bands, got {:?}", bands, other),
        }
    }
}

// ============================================================================
// TEXTURE DESCRIPTORS
// ============================================================================

#[test]
fn test_desc_byte_len() {
    let desc = TextureDesc {
        width: 800,
        height: 600,
        target: TextureTarget::TwoD,
        format: TextureFormat::Rgb,
        pixel: PixelType::F32,
    };
    assert_eq!(desc.byte_len(), 800 * 600 * 3 * 4);

    let desc = TextureDesc {
        width: 4,
        height: 4,
        target: TextureTarget::TwoD,
        format: TextureFormat::Luminance,
        pixel: PixelType::U8,
    };
    assert_eq!(desc.byte_len(), 16);
}
