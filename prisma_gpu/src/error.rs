//! Error types for the Prisma GPU toolkit
//!
//! This module defines the error types used throughout the toolkit,
//! covering shader translation, uniform access, and backend failures.

use std::fmt;

/// Result type for Prisma GPU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prisma GPU errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Shader source failed to compile (carries the backend diagnostic)
    Compile(String),

    /// Program failed to link (stage mismatch, conflicting uniform
    /// declarations across stages, or backend link failure)
    Link(String),

    /// Uniform name is not in the program's active-uniform set
    UnknownUniform(String),

    /// Value base type does not match the uniform declaration
    TypeMismatch(String),

    /// Value length or container kind does not match the uniform declaration
    ShapeMismatch(String),

    /// Operation requires a bound program (or bound framebuffer) that is missing
    NotBound(String),

    /// Backend-specific failure (driver error, incomplete framebuffer, etc.)
    Backend(String),

    /// Graphics hardware does not support a required feature or extension
    HardwareSupport(String),

    /// A caller-supplied value is out of range (shape, band count, ...)
    InvalidValue(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compile(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::Link(msg) => write!(f, "Program link failed: {}", msg),
            Error::UnknownUniform(msg) => write!(f, "Unknown uniform: {}", msg),
            Error::TypeMismatch(msg) => write!(f, "Uniform type mismatch: {}", msg),
            Error::ShapeMismatch(msg) => write!(f, "Uniform shape mismatch: {}", msg),
            Error::NotBound(msg) => write!(f, "Not bound: {}", msg),
            Error::Backend(msg) => write!(f, "Backend error: {}", msg),
            Error::HardwareSupport(msg) => {
                write!(f, "Your graphics hardware does not support {}", msg)
            }
            Error::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Construct an [`Error`] variant and log it as an ERROR entry.
///
/// The variant name is given bare; all variants carry a message string.
///
/// # Example
///
/// ```no_run
/// # use prisma_gpu::gpu_err;
/// let err = gpu_err!("prisma::Program", UnknownUniform, "no active uniform '{}'", "zoom");
/// ```
#[macro_export]
macro_rules! gpu_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::gpu_error!($source, "{}", message);
        $crate::prisma::Error::$variant(message)
    }};
}

/// Construct an [`Error`] variant, log it, and return it from the
/// enclosing function.
///
/// # Example
///
/// ```no_run
/// # use prisma_gpu::{gpu_bail, prisma::Result};
/// fn check(bands: usize) -> Result<()> {
///     if bands > 4 {
///         gpu_bail!("prisma::Framebuffer", InvalidValue,
///             "texture cannot have more than 4 colour bands (got {})", bands);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! gpu_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::gpu_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
