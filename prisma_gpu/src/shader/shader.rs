/// ShaderUnit - one compiled shader stage
///
/// Compilation is eager: construction either yields a unit holding a
/// valid backend handle or fails with the driver diagnostic, so there is
/// no partially-compiled state to observe. Units are immutable after
/// construction; recompiling means creating a new unit.

use std::sync::Arc;

use crate::backend::{ShaderHandle, ShaderStage};
use crate::context::Context;
use crate::error::Result;
use crate::gpu_debug;

pub struct ShaderUnit {
    ctx: Arc<Context>,
    handle: ShaderHandle,
    stage: ShaderStage,
    source: String,
}

impl ShaderUnit {
    /// Compile one stage from source text
    ///
    /// # Errors
    ///
    /// `Error::Compile` carrying the backend diagnostic; no unit is
    /// produced on failure.
    pub fn compile(ctx: &Arc<Context>, stage: ShaderStage, source: &str) -> Result<ShaderUnit> {
        let handle = ctx.backend().compile_shader(stage, source)?;
        gpu_debug!("prisma::ShaderUnit", "Compiled {} shader ({} bytes)", stage, source.len());

        Ok(Self {
            ctx: ctx.clone(),
            handle,
            stage,
            source: source.to_string(),
        })
    }

    /// Compile a vertex stage
    pub fn vertex(ctx: &Arc<Context>, source: &str) -> Result<ShaderUnit> {
        Self::compile(ctx, ShaderStage::Vertex, source)
    }

    /// Compile a fragment stage
    pub fn fragment(ctx: &Arc<Context>, source: &str) -> Result<ShaderUnit> {
        Self::compile(ctx, ShaderStage::Fragment, source)
    }

    /// Pipeline stage this unit was compiled for
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Source text the unit was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Backend handle (valid for the unit's whole lifetime)
    pub(crate) fn handle(&self) -> ShaderHandle {
        self.handle
    }
}

impl Drop for ShaderUnit {
    fn drop(&mut self) {
        // release is idempotent on the backend side
        self.ctx.backend().delete_shader(self.handle);
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
