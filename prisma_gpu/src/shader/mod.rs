/// Shader subsystem: compiled stages, linked programs, and typed uniform
/// access

// Module declarations
pub mod declarations;
pub mod shader;
pub mod program;

// Re-export the public surface
pub use shader::*;
pub use program::*;
