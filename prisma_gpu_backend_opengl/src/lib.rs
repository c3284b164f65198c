/*!
# Prisma GPU - OpenGL Backend

OpenGL 3.3+ implementation of the prisma_gpu backend contract.

This crate implements the [`Backend`] trait over a [`glow::Context`].
Context creation (window, EGL display, ...) stays with the caller: hand
in an already-current `glow::Context` or a proc-address loader.

[`Backend`]: prisma_gpu::prisma::backend::Backend
*/

// OpenGL implementation modules
mod opengl;
mod opengl_types;
mod debug;

pub use opengl::OpenGlBackend;
