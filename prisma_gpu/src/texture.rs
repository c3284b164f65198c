/// Texture - image storage in video memory
///
/// Thin wrapper over backend texture storage. The one piece of logic it
/// owns is hardware target selection: power-of-two dimensions use the
/// normalized 2D target, anything else needs either native NPOT support
/// or the rectangle-texture extension.

use std::sync::Arc;

use crate::backend::{
    BackendCaps, PixelType, TextureDesc, TextureFormat, TextureHandle, TextureTarget,
};
use crate::context::Context;
use crate::error::Result;
use crate::{gpu_bail, gpu_trace};

/// Select the hardware target for the given texture dimensions
///
/// # Errors
///
/// `Error::HardwareSupport` when the dimensions are not powers of two
/// and the hardware offers neither NPOT textures nor the rectangle
/// target.
pub fn texture_target(ctx: &Context, width: u32, height: u32) -> Result<TextureTarget> {
    if width.is_power_of_two() && height.is_power_of_two() {
        Ok(TextureTarget::TwoD)
    } else if ctx.capabilities().contains(BackendCaps::NPOT_TEXTURES) {
        Ok(TextureTarget::TwoD)
    } else if ctx.has_extension("GL_ARB_texture_rectangle") {
        Ok(TextureTarget::Rectangle)
    } else {
        gpu_bail!("prisma::Texture", HardwareSupport, "non-power-of-two textures");
    }
}

pub struct Texture {
    ctx: Arc<Context>,
    handle: TextureHandle,
    desc: TextureDesc,
}

impl Texture {
    /// Allocate blank texture storage
    ///
    /// # Errors
    ///
    /// `Error::InvalidValue` for zero-sized dimensions,
    /// `Error::HardwareSupport` when no target fits the dimensions.
    pub fn new(
        ctx: &Arc<Context>,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixel: PixelType,
    ) -> Result<Texture> {
        if width == 0 || height == 0 {
            gpu_bail!("prisma::Texture", InvalidValue,
                "texture dimensions must be non-zero (got {}x{})", width, height);
        }

        let target = texture_target(ctx, width, height)?;
        let desc = TextureDesc { width, height, target, format, pixel };
        let handle = ctx.backend().create_texture(&desc)?;
        gpu_trace!("prisma::Texture", "Allocated {}x{} texture ({:?}, {:?})",
            width, height, format, pixel);

        Ok(Self {
            ctx: ctx.clone(),
            handle,
            desc,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Colour band layout
    pub fn format(&self) -> TextureFormat {
        self.desc.format
    }

    /// Component data type
    pub fn pixel(&self) -> PixelType {
        self.desc.pixel
    }

    /// Hardware target the storage was allocated for
    pub fn target(&self) -> TextureTarget {
        self.desc.target
    }

    /// Whether sampling coordinates are normalized to [0, 1]
    ///
    /// Rectangle targets address texels by pixel instead.
    pub fn normalized_coords(&self) -> bool {
        self.desc.target == TextureTarget::TwoD
    }

    pub(crate) fn handle(&self) -> TextureHandle {
        self.handle
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.ctx.backend().delete_texture(self.handle);
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
