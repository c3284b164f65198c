/*!
# Prisma GPU

GPU-accelerated scientific computing via GLSL shaders.

This crate provides the platform-agnostic core: numeric array data is
uploaded to the GPU, transformed by fragment shaders, and read back
through framebuffer objects. Concrete drivers implement the [`Backend`]
trait (the OpenGL implementation lives in `prisma_gpu_backend_opengl`).

## Architecture

- **Backend**: capability trait a graphics driver implements
- **Context**: one backend connection plus the single active-program slot
- **ShaderUnit**: one compiled shader stage
- **Program**: linked program with typed, shape-checked uniform access
- **Texture** / **Framebuffer**: storage and off-screen render targets

[`Backend`]: crate::backend::Backend
*/

// Internal modules
mod error;
mod runtime;
pub mod log;
pub mod backend;
pub mod context;
pub mod shader;
pub mod texture;
pub mod framebuffer;

// Main prisma namespace module
pub mod prisma {
    // Error types
    pub use crate::error::{Error, Result};

    // Runtime singleton (logging services)
    pub use crate::runtime::Runtime;

    // Context
    pub use crate::context::Context;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: gpu_* macros are exported at the crate root
    }

    // Backend sub-module with the full capability contract
    pub mod backend {
        pub use crate::backend::*;
    }

    // Shader subsystem
    pub use crate::shader::{
        Program, ShaderUnit, UniformDescriptor,
        DEFAULT_FRAGMENT_SOURCE, DEFAULT_VERTEX_SOURCE,
    };

    // Commonly-used contract types, re-exported for convenience
    pub use crate::backend::{
        BackendCaps, BackendInfo, BackendLimits, PixelType, ShaderStage, TextureFormat,
        UniformBaseType, UniformShape, UniformValue,
    };

    // Texture and framebuffer wrappers
    pub use crate::texture::{texture_target, Texture};
    pub use crate::framebuffer::{shape_to_3d, Framebuffer};
}

// Re-export math library at crate root
pub use glam;
