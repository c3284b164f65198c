//! Unit tests for Framebuffer

use std::sync::Arc;

use crate::backend::mock_backend::MockBackend;
use crate::backend::{BackendCaps, PixelType, TextureFormat};
use crate::context::Context;
use crate::error::Error;
use crate::framebuffer::{shape_to_3d, Framebuffer};

fn test_context() -> Arc<Context> {
    Context::new(Box::new(MockBackend::new()))
}

// ============================================================================
// SHAPE NORMALIZATION
// ============================================================================

#[test]
fn test_shape_to_3d_pads_with_ones() {
    assert_eq!(shape_to_3d(&[5]).unwrap(), [5, 1, 1]);
    assert_eq!(shape_to_3d(&[5, 2]).unwrap(), [5, 2, 1]);
    assert_eq!(shape_to_3d(&[5, 3, 1]).unwrap(), [5, 3, 1]);
}

#[test]
fn test_shape_to_3d_rejects_higher_dimensions() {
    assert!(matches!(shape_to_3d(&[5, 3, 3, 1]), Err(Error::InvalidValue(_))));
    assert!(matches!(shape_to_3d(&[]), Err(Error::InvalidValue(_))));
}

// ============================================================================
// CREATION
// ============================================================================

#[test]
fn test_framebuffer_creation() {
    let ctx = test_context();
    let fbo = Framebuffer::with_texture(&ctx, &[800, 600, 3], PixelType::F32).unwrap();

    assert_eq!(fbo.width(), 800);
    assert_eq!(fbo.height(), 600);
    assert_eq!(fbo.texture().format(), TextureFormat::Rgb);
    assert!(!fbo.released());
}

#[test]
fn test_framebuffer_from_low_dimensional_shape() {
    let ctx = test_context();
    // a 1-D shape becomes a single-band row
    let fbo = Framebuffer::with_texture(&ctx, &[64], PixelType::U8).unwrap();
    assert_eq!(fbo.width(), 64);
    assert_eq!(fbo.height(), 1);
    assert_eq!(fbo.texture().format(), TextureFormat::Luminance);
}

#[test]
fn test_framebuffer_rejects_too_many_bands() {
    let ctx = test_context();
    match Framebuffer::with_texture(&ctx, &[16, 16, 5], PixelType::U8) {
        Err(Error::InvalidValue(msg)) => assert!(msg.contains("colour layers")),
        other => panic!("expected InvalidValue, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_framebuffer_requires_fbo_support() {
    let mock = MockBackend::new()
        .with_capabilities(BackendCaps::all().difference(BackendCaps::FRAMEBUFFER_OBJECTS))
        .with_extensions(&[]);
    let ctx = Context::new(Box::new(mock));
    assert!(matches!(
        Framebuffer::with_texture(&ctx, &[16, 16, 3], PixelType::U8),
        Err(Error::HardwareSupport(_))
    ));
}

#[test]
fn test_incomplete_framebuffer_fails_creation() {
    let mut mock = MockBackend::new();
    mock.force_incomplete_framebuffers();
    let ctx = Context::new(Box::new(mock));

    match Framebuffer::with_texture(&ctx, &[16, 16, 3], PixelType::U8) {
        Err(Error::Backend(msg)) => assert!(msg.contains("could not set up framebuffer")),
        other => panic!("expected Backend error, got {:?}", other.map(|_| ())),
    }
}

// ============================================================================
// BIND / RELEASE LIFECYCLE
// ============================================================================

#[test]
fn test_bind_and_unbind() {
    let ctx = test_context();
    let fbo = Framebuffer::with_texture(&ctx, &[32, 32, 4], PixelType::U8).unwrap();
    fbo.bind().unwrap();
    fbo.unbind();
}

#[test]
fn test_release_is_idempotent() {
    let ctx = test_context();
    let mut fbo = Framebuffer::with_texture(&ctx, &[32, 32, 4], PixelType::U8).unwrap();

    fbo.release();
    assert!(fbo.released());
    fbo.release();
    assert!(fbo.released());
}

#[test]
fn test_bind_after_release_fails() {
    let ctx = test_context();
    let mut fbo = Framebuffer::with_texture(&ctx, &[32, 32, 4], PixelType::U8).unwrap();
    fbo.release();

    match fbo.bind() {
        Err(Error::Backend(msg)) => assert!(msg.contains("released")),
        other => panic!("expected Backend error, got {:?}", other),
    }
}

// ============================================================================
// READBACK
// ============================================================================

#[test]
fn test_read_pixels_buffer_size() {
    let ctx = test_context();
    let fbo = Framebuffer::with_texture(&ctx, &[8, 4, 3], PixelType::F32).unwrap();
    let bytes = fbo.read_pixels().unwrap();
    assert_eq!(bytes.len(), 8 * 4 * 3 * 4);

    let floats = fbo.read_pixels_f32().unwrap();
    assert_eq!(floats.len(), 8 * 4 * 3);
}

#[test]
fn test_read_pixels_f32_requires_float_storage() {
    let ctx = test_context();
    let fbo = Framebuffer::with_texture(&ctx, &[8, 4, 3], PixelType::U8).unwrap();
    assert!(matches!(fbo.read_pixels_f32(), Err(Error::InvalidValue(_))));
}

#[test]
fn test_read_after_release_fails() {
    let ctx = test_context();
    let mut fbo = Framebuffer::with_texture(&ctx, &[8, 4, 3], PixelType::F32).unwrap();
    fbo.release();
    assert!(matches!(fbo.read_pixels(), Err(Error::Backend(_))));
}
