/// OpenGL enum conversions for the backend contract types

use prisma_gpu::prisma::backend::{
    PixelType, ShaderStage, TextureFormat, TextureTarget, UniformBaseType, UniformShape,
};
use prisma_gpu::prisma::Result;
use prisma_gpu::gpu_bail;

/// Map a GL_ACTIVE_UNIFORM type to the contract's base type and shape
///
/// Returns None for types the contract does not model (samplers, bools,
/// doubles, ...); such uniforms are skipped during introspection.
pub(crate) fn uniform_type_from_gl(utype: u32) -> Option<(UniformBaseType, UniformShape)> {
    match utype {
        glow::FLOAT => Some((UniformBaseType::Float, UniformShape::Scalar)),
        glow::FLOAT_VEC2 => Some((UniformBaseType::Float, UniformShape::Vec2)),
        glow::FLOAT_VEC3 => Some((UniformBaseType::Float, UniformShape::Vec3)),
        glow::FLOAT_VEC4 => Some((UniformBaseType::Float, UniformShape::Vec4)),
        glow::INT => Some((UniformBaseType::Int, UniformShape::Scalar)),
        glow::INT_VEC2 => Some((UniformBaseType::Int, UniformShape::Vec2)),
        glow::INT_VEC3 => Some((UniformBaseType::Int, UniformShape::Vec3)),
        glow::INT_VEC4 => Some((UniformBaseType::Int, UniformShape::Vec4)),
        glow::FLOAT_MAT2 => Some((UniformBaseType::Float, UniformShape::Mat2)),
        glow::FLOAT_MAT3 => Some((UniformBaseType::Float, UniformShape::Mat3)),
        glow::FLOAT_MAT4 => Some((UniformBaseType::Float, UniformShape::Mat4)),
        _ => None,
    }
}

pub(crate) fn shader_stage_to_gl(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

pub(crate) fn texture_target_to_gl(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::TwoD => glow::TEXTURE_2D,
        TextureTarget::Rectangle => glow::TEXTURE_RECTANGLE,
    }
}

/// Client pixel format (band layout) for upload/readback
pub(crate) fn pixel_format_to_gl(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::Luminance => glow::RED,
        TextureFormat::LuminanceAlpha => glow::RG,
        TextureFormat::Rgb => glow::RGB,
        TextureFormat::Rgba => glow::RGBA,
    }
}

/// Client component type for upload/readback
pub(crate) fn pixel_type_to_gl(pixel: PixelType) -> u32 {
    match pixel {
        PixelType::U8 => glow::UNSIGNED_BYTE,
        PixelType::I8 => glow::BYTE,
        PixelType::U16 => glow::UNSIGNED_SHORT,
        PixelType::I16 => glow::SHORT,
        PixelType::U32 => glow::UNSIGNED_INT,
        PixelType::I32 => glow::INT,
        PixelType::F32 => glow::FLOAT,
    }
}

/// Sized internal storage format for a band/component combination
///
/// # Errors
///
/// `Error::InvalidValue` for 32-bit integer components: core GL has no
/// normalized 32-bit integer texture storage.
pub(crate) fn internal_format(format: TextureFormat, pixel: PixelType) -> Result<i32> {
    let sized = match (pixel, format) {
        (PixelType::U8, TextureFormat::Luminance) => glow::R8,
        (PixelType::U8, TextureFormat::LuminanceAlpha) => glow::RG8,
        (PixelType::U8, TextureFormat::Rgb) => glow::RGB8,
        (PixelType::U8, TextureFormat::Rgba) => glow::RGBA8,

        (PixelType::I8, TextureFormat::Luminance) => glow::R8_SNORM,
        (PixelType::I8, TextureFormat::LuminanceAlpha) => glow::RG8_SNORM,
        (PixelType::I8, TextureFormat::Rgb) => glow::RGB8_SNORM,
        (PixelType::I8, TextureFormat::Rgba) => glow::RGBA8_SNORM,

        (PixelType::U16, TextureFormat::Luminance) => glow::R16,
        (PixelType::U16, TextureFormat::LuminanceAlpha) => glow::RG16,
        (PixelType::U16, TextureFormat::Rgb) => glow::RGB16,
        (PixelType::U16, TextureFormat::Rgba) => glow::RGBA16,

        (PixelType::I16, TextureFormat::Luminance) => glow::R16_SNORM,
        (PixelType::I16, TextureFormat::LuminanceAlpha) => glow::RG16_SNORM,
        (PixelType::I16, TextureFormat::Rgb) => glow::RGB16_SNORM,
        (PixelType::I16, TextureFormat::Rgba) => glow::RGBA16_SNORM,

        (PixelType::F32, TextureFormat::Luminance) => glow::R32F,
        (PixelType::F32, TextureFormat::LuminanceAlpha) => glow::RG32F,
        (PixelType::F32, TextureFormat::Rgb) => glow::RGB32F,
        (PixelType::F32, TextureFormat::Rgba) => glow::RGBA32F,

        (PixelType::U32 | PixelType::I32, _) => {
            gpu_bail!("prisma::opengl", InvalidValue,
                "no normalized 32-bit integer texture storage in core GL \
                 (requested {:?})", pixel);
        }
    };
    Ok(sized as i32)
}

/// Human-readable name for a glCheckFramebufferStatus code
pub(crate) fn framebuffer_status_name(code: u32) -> &'static str {
    match code {
        glow::FRAMEBUFFER_UNDEFINED => "GL_FRAMEBUFFER_UNDEFINED",
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT",
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
            "GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT"
        }
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "GL_FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER",
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "GL_FRAMEBUFFER_INCOMPLETE_READ_BUFFER",
        glow::FRAMEBUFFER_UNSUPPORTED => "GL_FRAMEBUFFER_UNSUPPORTED",
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "GL_FRAMEBUFFER_INCOMPLETE_MULTISAMPLE",
        _ => "unknown framebuffer status",
    }
}

#[cfg(test)]
#[path = "opengl_types_tests.rs"]
mod tests;
