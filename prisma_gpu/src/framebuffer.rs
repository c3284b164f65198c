/// Framebuffer - off-screen render target for GPU computation
///
/// A framebuffer object with one colour texture attached, sized from an
/// array-style shape `[width, height, bands]`. Results are read back as
/// raw bytes or as f32 components. Release is explicit and idempotent;
/// dropping releases too.

use std::sync::Arc;

use crate::backend::{BackendCaps, FramebufferHandle, FramebufferStatus, PixelType, TextureFormat};
use crate::context::Context;
use crate::error::Result;
use crate::texture::Texture;
use crate::{gpu_bail, gpu_debug};

/// Normalize an array shape to `[width, height, bands]`
///
/// Lower-dimensional shapes are padded with 1s: `[5]` becomes
/// `[5, 1, 1]`, `[5, 2]` becomes `[5, 2, 1]`.
///
/// # Errors
///
/// `Error::InvalidValue` for empty shapes or more than 3 dimensions.
pub fn shape_to_3d(shape: &[usize]) -> Result<[usize; 3]> {
    if shape.is_empty() || shape.len() > 3 {
        gpu_bail!("prisma::Framebuffer", InvalidValue,
            "shape must have 1 to 3 dimensions (got {})", shape.len());
    }
    let mut out = [1usize; 3];
    out[..shape.len()].copy_from_slice(shape);
    Ok(out)
}

pub struct Framebuffer {
    ctx: Arc<Context>,
    /// None once released
    handle: Option<FramebufferHandle>,
    texture: Texture,
}

impl Framebuffer {
    /// Create a framebuffer with a colour texture of the given shape
    ///
    /// # Errors
    ///
    /// `Error::HardwareSupport` without framebuffer-object support,
    /// `Error::InvalidValue` for a bad shape or band count,
    /// `Error::Backend` when the driver reports the framebuffer
    /// incomplete.
    pub fn with_texture(ctx: &Arc<Context>, shape: &[usize], pixel: PixelType) -> Result<Framebuffer> {
        if !ctx.capabilities().contains(BackendCaps::FRAMEBUFFER_OBJECTS) {
            ctx.require_extension("GL_EXT_framebuffer_object")?;
        }

        let [width, height, bands] = shape_to_3d(shape)?;
        if bands > 4 {
            gpu_bail!("prisma::Framebuffer", InvalidValue,
                "texture cannot have more than 4 colour layers (got {})", bands);
        }
        let format = TextureFormat::from_bands(bands)?;

        let texture = Texture::new(ctx, width as u32, height as u32, format, pixel)?;

        let handle = ctx.backend().create_framebuffer()?;
        ctx.backend().attach_color_texture(handle, texture.handle())?;

        // Bind the status to a local so the backend mutex guard from the call
        // is released before the arms run; the Incomplete arm re-locks to
        // delete the framebuffer, which would otherwise deadlock on the guard
        // still held by a `match` scrutinee temporary.
        let status = ctx.backend().framebuffer_status(handle)?;
        match status {
            FramebufferStatus::Complete => {}
            FramebufferStatus::Incomplete(reason) => {
                ctx.backend().delete_framebuffer(handle);
                gpu_bail!("prisma::Framebuffer", Backend,
                    "could not set up framebuffer: {}", reason);
            }
        }

        gpu_debug!("prisma::Framebuffer", "Created {}x{} framebuffer with {} band(s)",
            width, height, bands);

        Ok(Self {
            ctx: ctx.clone(),
            handle: Some(handle),
            texture,
        })
    }

    /// Set this framebuffer as the active rendering target
    ///
    /// # Errors
    ///
    /// `Error::Backend` on a released framebuffer.
    pub fn bind(&self) -> Result<()> {
        match self.handle {
            Some(handle) => self.ctx.backend().bind_framebuffer(handle),
            None => gpu_bail!("prisma::Framebuffer", Backend,
                "cannot bind a released framebuffer"),
        }
    }

    /// Revert rendering to the default target (the window)
    pub fn unbind(&self) {
        self.ctx.backend().unbind_framebuffer();
    }

    /// Read back the colour attachment as raw bytes
    ///
    /// Rows are ordered bottom-to-top, `bands * pixel_size` bytes per
    /// pixel.
    pub fn read_pixels(&self) -> Result<Vec<u8>> {
        match self.handle {
            Some(handle) => self.ctx.backend().read_pixels(
                handle,
                self.texture.width(),
                self.texture.height(),
                self.texture.format(),
                self.texture.pixel(),
            ),
            None => gpu_bail!("prisma::Framebuffer", Backend,
                "cannot read from a released framebuffer"),
        }
    }

    /// Read back the colour attachment as f32 components
    ///
    /// # Errors
    ///
    /// `Error::InvalidValue` unless the attachment's pixel type is F32.
    pub fn read_pixels_f32(&self) -> Result<Vec<f32>> {
        if self.texture.pixel() != PixelType::F32 {
            gpu_bail!("prisma::Framebuffer", InvalidValue,
                "framebuffer pixel type is {:?}, not F32", self.texture.pixel());
        }
        let bytes = self.read_pixels()?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }

    /// Release the framebuffer object
    ///
    /// Safe to call any number of times; the attached texture is
    /// released when the Framebuffer itself is dropped.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            let mut backend = self.ctx.backend();
            backend.unbind_framebuffer();
            backend.delete_framebuffer(handle);
        }
    }

    /// Whether the framebuffer has been released
    pub fn released(&self) -> bool {
        self.handle.is_none()
    }

    /// The attached colour texture
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.texture.height()
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
