/// GL error draining and reporting
///
/// glGetError is a sticky queue; draining after risky operations keeps
/// one failure from being misattributed to a later call.

use colored::Colorize;
use glow::HasContext;
use prisma_gpu::gpu_warn;

/// Name for a glGetError code
pub(crate) fn error_name(code: u32) -> &'static str {
    match code {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}

/// Drain all pending GL errors, logging each against `operation`
///
/// Returns the number of errors drained.
pub(crate) fn drain_errors(gl: &glow::Context, operation: &str) -> usize {
    let mut drained = 0;
    loop {
        let code = unsafe { gl.get_error() };
        if code == glow::NO_ERROR {
            return drained;
        }
        drained += 1;
        gpu_warn!("prisma::opengl", "{} after {} (0x{:04x})",
            error_name(code).red(), operation, code);
    }
}
