/// Backend trait - the graphics-driver capability contract
///
/// Everything the toolkit core needs from a driver is expressed here:
/// shader compilation and linking, program introspection, the single
/// active-program slot, typed uniform upload/readback, and texture /
/// framebuffer storage. Implemented by backend crates (e.g.
/// OpenGlBackend) and by the in-crate mock used for unit tests.

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::backend::{PixelType, TextureDesc, TextureFormat, UniformInfo, UniformValue};
use crate::error::Result;

new_key_type! {
    /// Opaque handle to one compiled shader stage
    pub struct ShaderHandle;
    /// Opaque handle to one linked program
    pub struct ProgramHandle;
    /// Opaque handle to one allocated texture
    pub struct TextureHandle;
    /// Opaque handle to one framebuffer object
    pub struct FramebufferHandle;
}

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "Vertex"),
            ShaderStage::Fragment => write!(f, "Fragment"),
        }
    }
}

/// Identification strings reported by the driver
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Hardware vendor (e.g., "NVIDIA Corporation")
    pub vendor: String,
    /// Device/renderer name
    pub renderer: String,
    /// Driver/API version string
    pub version: String,
}

bitflags! {
    /// Optional driver capabilities probed at context creation
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BackendCaps: u32 {
        /// Uniform values can be read back without binding the program
        const UNBOUND_UNIFORM_QUERY = 1 << 0;
        /// Non-power-of-two texture dimensions are supported
        const NPOT_TEXTURES = 1 << 1;
        /// Off-screen framebuffer objects are supported
        const FRAMEBUFFER_OBJECTS = 1 << 2;
    }
}

/// Driver-reported resource limits
#[derive(Debug, Clone, Copy)]
pub struct BackendLimits {
    /// Maximum number of colour attachments per framebuffer
    pub max_color_attachments: u32,
    /// Maximum texture dimension in pixels
    pub max_texture_size: u32,
}

/// Completeness state of a framebuffer after attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// The framebuffer can be rendered to
    Complete,
    /// The framebuffer cannot be used; carries the driver's reason
    Incomplete(String),
}

/// Graphics-driver capability contract
///
/// All calls are synchronous and blocking; none may be issued from more
/// than one thread at a time (the toolkit serializes access through a
/// mutex in [`Context`](crate::context::Context)). Delete calls are
/// idempotent: deleting an already-deleted handle is a no-op.
pub trait Backend: Send {
    // ===== IDENTIFICATION =====

    /// Vendor / renderer / version strings
    fn info(&self) -> BackendInfo;

    /// Capability flags probed at creation
    fn capabilities(&self) -> BackendCaps;

    /// Raw extension query by name
    fn has_extension(&self, name: &str) -> bool;

    /// Driver-reported limits
    fn limits(&self) -> BackendLimits;

    // ===== SHADERS AND PROGRAMS =====

    /// Compile one shader stage from source text
    ///
    /// # Errors
    ///
    /// `Error::Compile` carrying the driver diagnostic on failure.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle>;

    /// Release a compiled shader (no-op if already released)
    fn delete_shader(&mut self, shader: ShaderHandle);

    /// Link compiled stages into an executable program
    ///
    /// # Errors
    ///
    /// `Error::Link` carrying the driver diagnostic on failure.
    fn link_program(&mut self, shaders: &[ShaderHandle]) -> Result<ProgramHandle>;

    /// Release a linked program (no-op if already released)
    fn delete_program(&mut self, program: ProgramHandle);

    /// Enumerate the program's active uniforms
    ///
    /// Only uniforms the compiler kept (referenced by reachable code) are
    /// reported; declared-but-unused uniforms are absent.
    fn active_uniforms(&self, program: ProgramHandle) -> Result<Vec<UniformInfo>>;

    /// Make the program the single active one
    fn bind_program(&mut self, program: ProgramHandle) -> Result<()>;

    /// Clear the active-program slot (revert to "no program")
    fn unbind_program(&mut self);

    /// Upload a pre-validated value to one uniform
    ///
    /// The value is guaranteed by the caller to match `info`'s base type,
    /// shape and array length.
    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        info: &UniformInfo,
        value: &UniformValue,
    ) -> Result<()>;

    /// Read one uniform's current value, shaped per `info`
    ///
    /// Permitted while the program is unbound only if
    /// [`BackendCaps::UNBOUND_UNIFORM_QUERY`] is advertised.
    fn get_uniform(&self, program: ProgramHandle, info: &UniformInfo) -> Result<UniformValue>;

    // ===== TEXTURES =====

    /// Allocate blank texture storage
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle>;

    /// Release a texture (no-op if already released)
    fn delete_texture(&mut self, texture: TextureHandle);

    // ===== FRAMEBUFFERS =====

    /// Create an empty framebuffer object
    fn create_framebuffer(&mut self) -> Result<FramebufferHandle>;

    /// Attach a texture as the framebuffer's colour target
    fn attach_color_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        texture: TextureHandle,
    ) -> Result<()>;

    /// Query completeness after attachment
    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> Result<FramebufferStatus>;

    /// Make the framebuffer the active rendering target
    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<()>;

    /// Revert rendering to the default target (the window)
    fn unbind_framebuffer(&mut self);

    /// Release a framebuffer (no-op if already released)
    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Read back the framebuffer's colour attachment as raw bytes
    ///
    /// The returned buffer is `width * height * format.bands() *
    /// pixel.size_bytes()` bytes, rows bottom-to-top.
    fn read_pixels(
        &self,
        framebuffer: FramebufferHandle,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixel: PixelType,
    ) -> Result<Vec<u8>>;
}
