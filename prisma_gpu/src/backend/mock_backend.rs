/// Mock Backend for unit tests (no GPU required)
///
/// Simulates the driver side of the capability contract: "compiles"
/// shader source by scanning its uniform declarations, "links" programs
/// by merging the per-stage declaration tables, reports as active every
/// uniform that is referenced beyond its declaration, and stores uniform
/// values so that set/get round-trips behave like a real driver
/// (including shader-declared initializers as defaults).
///
/// Every trait call is appended to `calls` so tests can assert on
/// forwarding, in the manner of a command recorder.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::backend::{
    Backend, BackendCaps, BackendInfo, BackendLimits, FramebufferHandle, FramebufferStatus,
    PixelType, ProgramHandle, ShaderHandle, ShaderStage, TextureDesc, TextureFormat,
    TextureHandle, UniformBaseType, UniformInfo, UniformShape, UniformValue,
};
use crate::error::Result;
use crate::gpu_bail;
use crate::shader::declarations::{identifier_occurrences, scan_uniform_decls, UniformDecl};

// ============================================================================
// Records
// ============================================================================

#[derive(Debug)]
struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    decls: Vec<UniformDecl>,
}

#[derive(Debug)]
struct ProgramRecord {
    uniforms: Vec<UniformInfo>,
    values: FxHashMap<i32, UniformValue>,
}

#[derive(Debug)]
struct TextureRecord {
    desc: TextureDesc,
}

#[derive(Debug, Default)]
struct FramebufferRecord {
    color: Option<TextureHandle>,
}

// ============================================================================
// Mock Backend
// ============================================================================

pub struct MockBackend {
    shaders: SlotMap<ShaderHandle, ShaderRecord>,
    programs: SlotMap<ProgramHandle, ProgramRecord>,
    textures: SlotMap<TextureHandle, TextureRecord>,
    framebuffers: SlotMap<FramebufferHandle, FramebufferRecord>,

    current_program: Option<ProgramHandle>,
    current_framebuffer: Option<FramebufferHandle>,

    caps: BackendCaps,
    extensions: Vec<String>,
    fail_next_link: Option<String>,
    force_incomplete: bool,

    /// Trait calls in invocation order, for forwarding assertions
    pub calls: Vec<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            shaders: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            current_program: None,
            current_framebuffer: None,
            caps: BackendCaps::all(),
            extensions: vec![
                "GL_EXT_framebuffer_object".to_string(),
                "GL_ARB_texture_rectangle".to_string(),
            ],
            fail_next_link: None,
            force_incomplete: false,
            calls: Vec::new(),
        }
    }

    /// Replace the advertised capability flags
    pub fn with_capabilities(mut self, caps: BackendCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Replace the advertised extension list
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Make the next link_program call fail with the given diagnostic
    pub fn fail_next_link(&mut self, diagnostic: &str) {
        self.fail_next_link = Some(diagnostic.to_string());
    }

    /// Report every framebuffer as incomplete (simulated driver refusal)
    pub fn force_incomplete_framebuffers(&mut self) {
        self.force_incomplete = true;
    }

    /// Program handle currently occupying the active slot
    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    /// Raw stored value of one uniform, for assertions
    pub fn stored_uniform(&self, program: ProgramHandle, location: i32) -> Option<&UniformValue> {
        self.programs.get(program)?.values.get(&location)
    }

    /// Evaluate a declaration's default value (initializer or zeros)
    fn default_value(decl: &UniformDecl) -> UniformValue {
        let total = decl.shape.component_count() * decl.array_length;
        let components = decl
            .initializer
            .as_deref()
            .and_then(|init| eval_initializer(init, decl.shape))
            .unwrap_or_default();

        let mut filled = vec![0.0f64; total];
        for (slot, value) in filled.iter_mut().zip(components.iter()) {
            *slot = *value;
        }

        let scalar = decl.shape == UniformShape::Scalar && decl.array_length == 1;
        match (decl.base_type, scalar) {
            (UniformBaseType::Float, true) => UniformValue::Float(filled[0] as f32),
            (UniformBaseType::Int, true) => UniformValue::Int(filled[0] as i32),
            (UniformBaseType::Float, false) => {
                UniformValue::FloatVec(filled.iter().map(|v| *v as f32).collect())
            }
            (UniformBaseType::Int, false) => {
                UniformValue::IntVec(filled.iter().map(|v| *v as i32).collect())
            }
        }
    }
}

/// Evaluate a simple GLSL initializer: a numeric literal, or a
/// constructor call `typename(a, b, ...)`. A single-argument vector
/// constructor splats; anything fancier is left unevaluated.
fn eval_initializer(text: &str, shape: UniformShape) -> Option<Vec<f64>> {
    let text = text.trim();

    if shape == UniformShape::Scalar {
        return parse_number(text).map(|v| vec![v]);
    }

    let open = text.find('(')?;
    let inner = text[open + 1..].strip_suffix(')')?;
    let args: Vec<f64> = inner
        .split(',')
        .map(|a| parse_number(a.trim()))
        .collect::<Option<_>>()?;

    let count = shape.component_count();
    if args.len() == 1 && !shape.is_matrix() {
        return Some(vec![args[0]; count]);
    }
    if args.len() == 1 && shape.is_matrix() {
        // single-argument matrix constructor: scaled identity
        let n = match shape {
            UniformShape::Mat2 => 2,
            UniformShape::Mat3 => 3,
            _ => 4,
        };
        let mut m = vec![0.0; count];
        for i in 0..n {
            m[i * n + i] = args[0];
        }
        return Some(m);
    }
    if args.len() == count {
        return Some(args);
    }
    None
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim_end_matches(['f', 'F']).parse::<f64>().ok()
}

impl Backend for MockBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            vendor: "Prisma".to_string(),
            renderer: "MockBackend".to_string(),
            version: "1.0 mock".to_string(),
        }
    }

    fn capabilities(&self) -> BackendCaps {
        self.caps
    }

    fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e == name)
    }

    fn limits(&self) -> BackendLimits {
        BackendLimits {
            max_color_attachments: 8,
            max_texture_size: 16384,
        }
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        self.calls.push("compile_shader".to_string());

        // the mock's one compilation rule: an #error directive fails,
        // echoing the driver-diagnostic shape of a real compiler
        for line in source.lines() {
            if let Some(message) = line.trim_start().strip_prefix("#error") {
                gpu_bail!("prisma::mock", Compile,
                    "0:1: '#error' : {}", message.trim());
            }
        }

        let decls = scan_uniform_decls(source);
        Ok(self.shaders.insert(ShaderRecord {
            stage,
            source: source.to_string(),
            decls,
        }))
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.calls.push("delete_shader".to_string());
        self.shaders.remove(shader);
    }

    fn link_program(&mut self, shaders: &[ShaderHandle]) -> Result<ProgramHandle> {
        self.calls.push("link_program".to_string());

        if let Some(diagnostic) = self.fail_next_link.take() {
            gpu_bail!("prisma::mock", Link, "{}", diagnostic);
        }

        let mut records = Vec::with_capacity(shaders.len());
        for &handle in shaders {
            match self.shaders.get(handle) {
                Some(record) => records.push(record),
                None => gpu_bail!("prisma::mock", Backend, "stale shader handle passed to link"),
            }
        }
        if records.is_empty() {
            gpu_bail!("prisma::mock", Link, "no shader stages attached");
        }

        // merge declaration tables; a real driver rejects conflicting
        // redeclarations across stages at link time
        let mut merged: Vec<&UniformDecl> = Vec::new();
        for record in &records {
            for decl in &record.decls {
                match merged.iter().find(|d| d.name == decl.name) {
                    Some(existing) if !existing.same_type(decl) => {
                        gpu_bail!("prisma::mock", Link,
                            "uniform '{}' declared as {} and {} in different stages",
                            decl.name, existing.type_description(), decl.type_description());
                    }
                    Some(_) => {}
                    None => merged.push(decl),
                }
            }
        }

        // active = referenced beyond its declaration in any declaring stage
        let mut uniforms = Vec::new();
        let mut values = FxHashMap::default();
        let mut location = 0i32;
        for decl in &merged {
            let referenced = records.iter().any(|record| {
                record.decls.iter().any(|d| d.name == decl.name)
                    && identifier_occurrences(&record.source, &decl.name) >= 2
            });
            if !referenced {
                continue;
            }
            uniforms.push(UniformInfo {
                name: decl.name.clone(),
                base_type: decl.base_type,
                shape: decl.shape,
                array_length: decl.array_length,
                location,
            });
            values.insert(location, Self::default_value(decl));
            location += 1;
        }

        Ok(self.programs.insert(ProgramRecord { uniforms, values }))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.calls.push("delete_program".to_string());
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.programs.remove(program);
    }

    fn active_uniforms(&self, program: ProgramHandle) -> Result<Vec<UniformInfo>> {
        match self.programs.get(program) {
            Some(record) => Ok(record.uniforms.clone()),
            None => Err(crate::gpu_err!("prisma::mock", Backend, "stale program handle")),
        }
    }

    fn bind_program(&mut self, program: ProgramHandle) -> Result<()> {
        self.calls.push("bind_program".to_string());
        if !self.programs.contains_key(program) {
            gpu_bail!("prisma::mock", Backend, "cannot bind released program");
        }
        self.current_program = Some(program);
        Ok(())
    }

    fn unbind_program(&mut self) {
        self.calls.push("unbind_program".to_string());
        self.current_program = None;
    }

    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        info: &UniformInfo,
        value: &UniformValue,
    ) -> Result<()> {
        self.calls.push(format!("set_uniform {}", info.name));
        if self.current_program != Some(program) {
            gpu_bail!("prisma::mock", Backend,
                "set_uniform issued for a program that is not current");
        }
        let record = match self.programs.get_mut(program) {
            Some(record) => record,
            None => gpu_bail!("prisma::mock", Backend, "stale program handle"),
        };

        // partial array writes update the leading elements only
        let stored = record.values.entry(info.location).or_insert_with(|| {
            match info.base_type {
                UniformBaseType::Float => {
                    UniformValue::FloatVec(vec![0.0; info.total_components()])
                }
                UniformBaseType::Int => UniformValue::IntVec(vec![0; info.total_components()]),
            }
        });
        match (stored, value) {
            (UniformValue::FloatVec(dst), UniformValue::FloatVec(src)) => {
                dst[..src.len()].copy_from_slice(src);
            }
            (UniformValue::IntVec(dst), UniformValue::IntVec(src)) => {
                dst[..src.len()].copy_from_slice(src);
            }
            (stored, value) => *stored = value.clone(),
        }
        Ok(())
    }

    fn get_uniform(&self, program: ProgramHandle, info: &UniformInfo) -> Result<UniformValue> {
        let record = match self.programs.get(program) {
            Some(record) => record,
            None => gpu_bail!("prisma::mock", Backend, "stale program handle"),
        };
        match record.values.get(&info.location) {
            Some(value) => Ok(value.clone()),
            None => gpu_bail!("prisma::mock", Backend,
                "no value stored for location {}", info.location),
        }
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        self.calls.push(format!("create_texture {}x{}", desc.width, desc.height));
        Ok(self.textures.insert(TextureRecord { desc: *desc }))
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.calls.push("delete_texture".to_string());
        self.textures.remove(texture);
    }

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle> {
        self.calls.push("create_framebuffer".to_string());
        Ok(self.framebuffers.insert(FramebufferRecord::default()))
    }

    fn attach_color_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        texture: TextureHandle,
    ) -> Result<()> {
        self.calls.push("attach_color_texture".to_string());
        if !self.textures.contains_key(texture) {
            gpu_bail!("prisma::mock", Backend, "cannot attach released texture");
        }
        match self.framebuffers.get_mut(framebuffer) {
            Some(record) => {
                record.color = Some(texture);
                Ok(())
            }
            None => gpu_bail!("prisma::mock", Backend, "stale framebuffer handle"),
        }
    }

    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> Result<FramebufferStatus> {
        let record = match self.framebuffers.get(framebuffer) {
            Some(record) => record,
            None => gpu_bail!("prisma::mock", Backend, "stale framebuffer handle"),
        };
        if self.force_incomplete {
            return Ok(FramebufferStatus::Incomplete("unsupported attachment combination".to_string()));
        }
        let status = match record.color.and_then(|t| self.textures.get(t)) {
            None => FramebufferStatus::Incomplete("no colour attachment".to_string()),
            Some(texture) if texture.desc.width == 0 || texture.desc.height == 0 => {
                FramebufferStatus::Incomplete("zero-sized attachment".to_string())
            }
            Some(_) => FramebufferStatus::Complete,
        };
        Ok(status)
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<()> {
        self.calls.push("bind_framebuffer".to_string());
        if !self.framebuffers.contains_key(framebuffer) {
            gpu_bail!("prisma::mock", Backend, "cannot bind released framebuffer");
        }
        self.current_framebuffer = Some(framebuffer);
        Ok(())
    }

    fn unbind_framebuffer(&mut self) {
        self.calls.push("unbind_framebuffer".to_string());
        self.current_framebuffer = None;
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.calls.push("delete_framebuffer".to_string());
        if self.current_framebuffer == Some(framebuffer) {
            self.current_framebuffer = None;
        }
        self.framebuffers.remove(framebuffer);
    }

    fn read_pixels(
        &self,
        framebuffer: FramebufferHandle,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixel: PixelType,
    ) -> Result<Vec<u8>> {
        if !self.framebuffers.contains_key(framebuffer) {
            gpu_bail!("prisma::mock", Backend, "stale framebuffer handle");
        }
        // nothing renders in the mock; the buffer is zero-filled
        let len = width as usize * height as usize * format.bands() * pixel.size_bytes();
        Ok(vec![0; len])
    }
}

#[cfg(test)]
#[path = "mock_backend_tests.rs"]
mod tests;
