/// Program - linked GPU program with typed uniform access
///
/// Linking is eager and validation-first: stage multiplicity and
/// cross-stage uniform declarations are checked before the driver link,
/// and the active-uniform set is introspected immediately after it, so a
/// constructed Program is always usable. Uniform writes and reads are
/// validated against the introspected descriptors before any driver call
/// is made; a rejected value never reaches the backend, which is what
/// guarantees "a failed set leaves the previous value unchanged".

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::backend::{
    BackendCaps, ProgramHandle, ShaderStage, UniformBaseType, UniformInfo, UniformShape,
    UniformValue,
};
use crate::context::Context;
use crate::error::Result;
use crate::shader::declarations::{scan_uniform_decls, UniformDecl};
use crate::shader::shader::ShaderUnit;
use crate::{gpu_bail, gpu_debug, gpu_err};

/// Pass-through vertex stage used when only a fragment stage is supplied
pub const DEFAULT_VERTEX_SOURCE: &str = "\
#version 330 core
layout(location = 0) in vec2 position;
void main(void) {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

/// Pass-through fragment stage used when only a vertex stage is supplied
pub const DEFAULT_FRAGMENT_SOURCE: &str = "\
#version 330 core
out vec4 frag_color;
void main(void) {
    frag_color = vec4(1.0, 1.0, 1.0, 1.0);
}
";

// ============================================================================
// Uniform descriptor
// ============================================================================

/// Per-variable metadata for one active uniform
///
/// Derived from the linked program's reflection data at link time; never
/// constructed by callers and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct UniformDescriptor {
    info: UniformInfo,
}

impl UniformDescriptor {
    /// Numeric base type
    pub fn base_type(&self) -> UniformBaseType {
        self.info.base_type
    }

    /// Element shape
    pub fn shape(&self) -> UniformShape {
        self.info.shape
    }

    /// Declared array length (1 if not an array)
    pub fn array_length(&self) -> usize {
        self.info.array_length
    }

    /// Backend-assigned location
    pub fn location(&self) -> i32 {
        self.info.location
    }
}

// ============================================================================
// Program
// ============================================================================

pub struct Program {
    ctx: Arc<Context>,
    handle: ProgramHandle,
    stages: Vec<ShaderStage>,
    uniforms: FxHashMap<String, UniformDescriptor>,
}

impl Program {
    /// Link compiled stages into an executable program
    ///
    /// At most one Vertex and one Fragment unit may be supplied; a
    /// missing stage is filled in with a built-in pass-through stage.
    ///
    /// # Errors
    ///
    /// `Error::Link` if no stages are supplied, a stage appears twice,
    /// two stages declare the same uniform name with different types, or
    /// the driver link fails.
    pub fn link(ctx: &Arc<Context>, units: &[ShaderUnit]) -> Result<Program> {
        if units.is_empty() {
            gpu_bail!("prisma::Program", Link, "at least one shader stage is required");
        }
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if units.iter().filter(|u| u.stage() == stage).count() > 1 {
                gpu_bail!("prisma::Program", Link,
                    "more than one {} stage supplied", stage);
            }
        }

        Self::check_declared_uniforms(units)?;

        // fill in the missing stage with a pass-through default
        let mut implicit = Vec::new();
        if !units.iter().any(|u| u.stage() == ShaderStage::Vertex) {
            implicit.push(ShaderUnit::vertex(ctx, DEFAULT_VERTEX_SOURCE)?);
        }
        if !units.iter().any(|u| u.stage() == ShaderStage::Fragment) {
            implicit.push(ShaderUnit::fragment(ctx, DEFAULT_FRAGMENT_SOURCE)?);
        }

        let handles: Vec<_> = units
            .iter()
            .chain(implicit.iter())
            .map(|u| u.handle())
            .collect();
        let stages: Vec<_> = units
            .iter()
            .chain(implicit.iter())
            .map(|u| u.stage())
            .collect();

        let handle = ctx.backend().link_program(&handles)?;

        let uniforms: FxHashMap<String, UniformDescriptor> = ctx
            .backend()
            .active_uniforms(handle)?
            .into_iter()
            .map(|info| (info.name.clone(), UniformDescriptor { info }))
            .collect();

        gpu_debug!("prisma::Program", "Linked program with {} active uniform(s)", uniforms.len());

        Ok(Program {
            ctx: ctx.clone(),
            handle,
            stages,
            uniforms,
        })
    }

    /// Compile the given sources and link them
    ///
    /// Mirrors the convenience of constructing a program straight from
    /// source text; a `None` stage falls back to the built-in
    /// pass-through.
    pub fn from_sources(
        ctx: &Arc<Context>,
        vertex: Option<&str>,
        fragment: Option<&str>,
    ) -> Result<Program> {
        let mut units = Vec::new();
        if let Some(source) = vertex {
            units.push(ShaderUnit::vertex(ctx, source)?);
        }
        if let Some(source) = fragment {
            units.push(ShaderUnit::fragment(ctx, source)?);
        }
        Self::link(ctx, &units)
    }

    /// Reject same-name/different-type declarations across stages
    ///
    /// Compares the *declared* uniform tables (not the linked active
    /// set), so the conflict is caught deterministically whatever the
    /// driver would do.
    fn check_declared_uniforms(units: &[ShaderUnit]) -> Result<()> {
        let tables: Vec<(ShaderStage, Vec<UniformDecl>)> = units
            .iter()
            .map(|u| (u.stage(), scan_uniform_decls(u.source())))
            .collect();

        for (i, (stage_a, decls_a)) in tables.iter().enumerate() {
            for (stage_b, decls_b) in tables.iter().skip(i + 1) {
                for decl_a in decls_a {
                    for decl_b in decls_b {
                        if decl_a.name == decl_b.name && !decl_a.same_type(decl_b) {
                            gpu_bail!("prisma::Program", Link,
                                "uniform '{}' declared as {} in the {} stage but {} in the {} stage",
                                decl_a.name,
                                decl_a.type_description(), stage_a,
                                decl_b.type_description(), stage_b);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // ===== BIND / UNBIND =====

    /// Make this program the active one
    ///
    /// Re-binding while already bound simply re-asserts the active
    /// program. Binding while another program is bound takes the slot
    /// over, flipping the other program's bound-ness.
    pub fn bind(&self) -> Result<()> {
        let mut slot = self.ctx.program_slot();
        self.ctx.backend().bind_program(self.handle)?;
        *slot = Some(self.handle);
        Ok(())
    }

    /// Deactivate the current active program (revert to "no program")
    pub fn unbind(&self) {
        let mut slot = self.ctx.program_slot();
        self.ctx.backend().unbind_program();
        *slot = None;
    }

    /// Whether this program currently occupies the context's active slot
    pub fn is_bound(&self) -> bool {
        self.ctx.current_program() == Some(self.handle)
    }

    // ===== UNIFORM ACCESS =====

    /// Write one uniform
    ///
    /// # Errors
    ///
    /// `Error::NotBound` while unbound, `Error::UnknownUniform` for a
    /// name outside the active set, `Error::TypeMismatch` /
    /// `Error::ShapeMismatch` when the value does not match the
    /// declaration. On any failure no driver call is made, so the
    /// uniform's previous value is unchanged.
    pub fn set<V: Into<UniformValue>>(&self, name: &str, value: V) -> Result<()> {
        let value = value.into();
        if !self.is_bound() {
            gpu_bail!("prisma::Program", NotBound,
                "program must be bound before setting uniform '{}'", name);
        }
        let descriptor = self.descriptor_or_err(name)?;
        Self::validate_value(name, descriptor, &value)?;
        self.ctx
            .backend()
            .set_uniform(self.handle, &descriptor.info, &value)
    }

    /// Read one uniform's current value, shaped per its descriptor
    ///
    /// Before the program has ever been bound this returns the
    /// shader-declared default — but only when the backend advertises
    /// `UNBOUND_UNIFORM_QUERY`; otherwise `Error::NotBound`.
    pub fn get(&self, name: &str) -> Result<UniformValue> {
        if !self.is_bound()
            && !self.ctx.capabilities().contains(BackendCaps::UNBOUND_UNIFORM_QUERY)
        {
            gpu_bail!("prisma::Program", NotBound,
                "program must be bound before reading uniform '{}'", name);
        }
        let descriptor = self.descriptor_or_err(name)?;
        self.ctx.backend().get_uniform(self.handle, &descriptor.info)
    }

    /// Descriptor for one active uniform, if the name is active
    pub fn descriptor(&self, name: &str) -> Option<&UniformDescriptor> {
        self.uniforms.get(name)
    }

    /// Names of all active uniforms (arbitrary order)
    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.uniforms.keys().map(|n| n.as_str())
    }

    /// Stages this program was linked from (implicit defaults included)
    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    fn descriptor_or_err(&self, name: &str) -> Result<&UniformDescriptor> {
        self.uniforms.get(name).ok_or_else(|| {
            gpu_err!("prisma::Program", UnknownUniform,
                "no active uniform '{}' in program (declared-but-unreferenced \
                 uniforms are optimised away)", name)
        })
    }

    /// Check a value against a descriptor without touching the driver
    fn validate_value(
        name: &str,
        descriptor: &UniformDescriptor,
        value: &UniformValue,
    ) -> Result<()> {
        let info = &descriptor.info;
        let declared_scalar = info.shape == UniformShape::Scalar && info.array_length == 1;

        // container kind: a scalar where a sequence is declared (or the
        // reverse) is a shape error before anything else
        if declared_scalar && !value.is_scalar() {
            gpu_bail!("prisma::Program", ShapeMismatch,
                "uniform '{}' is a scalar but a sequence of {} component(s) was supplied",
                name, value.component_count());
        }
        if !declared_scalar && value.is_scalar() {
            gpu_bail!("prisma::Program", ShapeMismatch,
                "uniform '{}' ({}, array length {}) cannot be set from a single scalar",
                name, info.shape, info.array_length);
        }

        if value.base_type() != info.base_type {
            let (declared, supplied) = match info.base_type {
                UniformBaseType::Float => ("float", "int"),
                UniformBaseType::Int => ("int", "float"),
            };
            gpu_bail!("prisma::Program", TypeMismatch,
                "uniform '{}' is {}-typed but {} data was supplied", name, declared, supplied);
        }

        if !declared_scalar {
            let component_count = info.shape.component_count();
            let supplied = value.component_count();
            if info.array_length == 1 {
                if supplied != component_count {
                    gpu_bail!("prisma::Program", ShapeMismatch,
                        "uniform '{}' ({}) expects exactly {} components, got {}",
                        name, info.shape, component_count, supplied);
                }
            } else if supplied == 0
                || supplied % component_count != 0
                || supplied / component_count > info.array_length
            {
                gpu_bail!("prisma::Program", ShapeMismatch,
                    "uniform '{}' ({}[{}]) expects a non-zero multiple of {} components \
                     covering at most {} element(s), got {}",
                    name, info.shape, info.array_length, component_count,
                    info.array_length, supplied);
            }
        }

        Ok(())
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        // vacate the active slot if this program holds it, then release;
        // both operations are safe to repeat on the backend side
        let mut slot = self.ctx.program_slot();
        if *slot == Some(self.handle) {
            self.ctx.backend().unbind_program();
            *slot = None;
        }
        self.ctx.backend().delete_program(self.handle);
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
