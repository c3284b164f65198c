/// OpenGlBackend - OpenGL implementation of the Backend trait
///
/// Wraps an already-current glow::Context. Handles are slotmap keys over
/// the native glow objects; uniform locations are resolved by name at
/// call time (drivers cache the lookup, and it sidesteps the opaque
/// location type). All deletes are idempotent handle removals.

use glow::HasContext;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use prisma_gpu::prisma::backend::{
    Backend, BackendCaps, BackendInfo, BackendLimits, FramebufferHandle, FramebufferStatus,
    PixelType, ProgramHandle, ShaderHandle, ShaderStage, TextureDesc, TextureFormat,
    TextureHandle, UniformBaseType, UniformInfo, UniformShape, UniformValue,
};
use prisma_gpu::prisma::Result;
use prisma_gpu::{gpu_bail, gpu_err, gpu_info, gpu_trace};

use crate::debug;
use crate::opengl_types::{
    framebuffer_status_name, internal_format, pixel_format_to_gl, pixel_type_to_gl,
    shader_stage_to_gl, texture_target_to_gl, uniform_type_from_gl,
};

// The function-pointer table inside glow::Context keeps the struct from
// being auto-Send. The context is made current on one thread and must be
// re-currented before use anywhere else; moving the backend without doing
// so is a driver-contract violation, not a memory-safety one.
unsafe impl Send for OpenGlBackend {}

pub struct OpenGlBackend {
    gl: glow::Context,

    shaders: SlotMap<ShaderHandle, glow::NativeShader>,
    programs: SlotMap<ProgramHandle, glow::NativeProgram>,
    /// native texture plus its GL target (2D or rectangle)
    textures: SlotMap<TextureHandle, (glow::NativeTexture, u32)>,
    framebuffers: SlotMap<FramebufferHandle, glow::NativeFramebuffer>,

    info: BackendInfo,
    limits: BackendLimits,
    extensions: FxHashSet<String>,
}

impl OpenGlBackend {
    /// Wrap an already-current GL context
    ///
    /// The context must stay current on the calling thread for the
    /// backend's whole lifetime.
    pub fn new(gl: glow::Context) -> Result<OpenGlBackend> {
        let info = unsafe {
            BackendInfo {
                vendor: gl.get_parameter_string(glow::VENDOR),
                renderer: gl.get_parameter_string(glow::RENDERER),
                version: gl.get_parameter_string(glow::VERSION),
            }
        };
        let limits = unsafe {
            BackendLimits {
                max_color_attachments: gl.get_parameter_i32(glow::MAX_COLOR_ATTACHMENTS) as u32,
                max_texture_size: gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE) as u32,
            }
        };
        let extensions: FxHashSet<String> =
            gl.supported_extensions().iter().cloned().collect();

        gpu_info!("prisma::opengl", "OpenGL backend ready: {} ({})",
            info.renderer, info.version);

        Ok(Self {
            gl,
            shaders: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            info,
            limits,
            extensions,
        })
    }

    /// Build the context from a proc-address loader and wrap it
    ///
    /// # Safety
    ///
    /// The loader must return addresses valid for the GL context that is
    /// current on this thread.
    pub unsafe fn from_loader<F>(loader: F) -> Result<OpenGlBackend>
    where
        F: FnMut(&str) -> *const std::ffi::c_void,
    {
        Self::new(glow::Context::from_loader_function(loader))
    }

    /// Direct access to the underlying GL context (draw calls and other
    /// operations outside the backend contract)
    pub fn raw(&self) -> &glow::Context {
        &self.gl
    }

    fn native_program(&self, program: ProgramHandle) -> Result<glow::NativeProgram> {
        self.programs.get(program).copied().ok_or_else(|| {
            gpu_err!("prisma::opengl", Backend, "stale program handle")
        })
    }

    fn uniform_location(
        &self,
        native: glow::NativeProgram,
        name: &str,
    ) -> Result<glow::NativeUniformLocation> {
        unsafe { self.gl.get_uniform_location(native, name) }.ok_or_else(|| {
            gpu_err!("prisma::opengl", Backend, "driver reports no location for uniform '{}'", name)
        })
    }
}

impl Backend for OpenGlBackend {
    fn info(&self) -> BackendInfo {
        self.info.clone()
    }

    fn capabilities(&self) -> BackendCaps {
        // core 3.3 gives NPOT storage, framebuffer objects, and
        // program-handle uniform queries unconditionally
        BackendCaps::all()
    }

    fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    fn limits(&self) -> BackendLimits {
        self.limits
    }

    // ===== SHADERS AND PROGRAMS =====

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        unsafe {
            let shader = self.gl.create_shader(shader_stage_to_gl(stage)).map_err(|e| {
                gpu_err!("prisma::opengl", Backend, "glCreateShader failed: {}", e)
            })?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);

            if !self.gl.get_shader_compile_status(shader) {
                let diagnostic = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                gpu_bail!("prisma::opengl", Compile, "{}", diagnostic.trim());
            }

            Ok(self.shaders.insert(shader))
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if let Some(native) = self.shaders.remove(shader) {
            unsafe { self.gl.delete_shader(native) };
        }
    }

    fn link_program(&mut self, shaders: &[ShaderHandle]) -> Result<ProgramHandle> {
        let mut natives = Vec::with_capacity(shaders.len());
        for &handle in shaders {
            match self.shaders.get(handle) {
                Some(&native) => natives.push(native),
                None => gpu_bail!("prisma::opengl", Backend, "stale shader handle passed to link"),
            }
        }

        unsafe {
            let program = self.gl.create_program().map_err(|e| {
                gpu_err!("prisma::opengl", Backend, "glCreateProgram failed: {}", e)
            })?;
            for &native in &natives {
                self.gl.attach_shader(program, native);
            }
            self.gl.link_program(program);

            if !self.gl.get_program_link_status(program) {
                let diagnostic = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                gpu_bail!("prisma::opengl", Link, "{}", diagnostic.trim());
            }

            for &native in &natives {
                self.gl.detach_shader(program, native);
            }

            Ok(self.programs.insert(program))
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if let Some(native) = self.programs.remove(program) {
            unsafe { self.gl.delete_program(native) };
        }
    }

    fn active_uniforms(&self, program: ProgramHandle) -> Result<Vec<UniformInfo>> {
        let native = self.native_program(program)?;
        let mut out = Vec::new();
        unsafe {
            let count = self.gl.get_active_uniforms(native);
            for index in 0..count {
                let active = match self.gl.get_active_uniform(native, index) {
                    Some(active) => active,
                    None => continue,
                };
                let (base_type, shape) = match uniform_type_from_gl(active.utype) {
                    Some(pair) => pair,
                    None => {
                        gpu_trace!("prisma::opengl",
                            "Skipping uniform '{}' (unmodelled GL type 0x{:04x})",
                            active.name, active.utype);
                        continue;
                    }
                };
                // the driver reports array uniforms as "name[0]"
                let name = active
                    .name
                    .strip_suffix("[0]")
                    .unwrap_or(&active.name)
                    .to_string();
                out.push(UniformInfo {
                    name,
                    base_type,
                    shape,
                    array_length: active.size.max(1) as usize,
                    location: out.len() as i32,
                });
            }
        }
        Ok(out)
    }

    fn bind_program(&mut self, program: ProgramHandle) -> Result<()> {
        let native = self.native_program(program)?;
        unsafe { self.gl.use_program(Some(native)) };
        Ok(())
    }

    fn unbind_program(&mut self) {
        unsafe { self.gl.use_program(None) };
    }

    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        info: &UniformInfo,
        value: &UniformValue,
    ) -> Result<()> {
        let native = self.native_program(program)?;
        let location = self.uniform_location(native, &info.name)?;
        let location = Some(&location);

        unsafe {
            match info.base_type {
                UniformBaseType::Float => {
                    let data = value.as_f32_slice().ok_or_else(|| {
                        gpu_err!("prisma::opengl", Backend,
                            "float uniform '{}' received non-float data", info.name)
                    })?;
                    match info.shape {
                        UniformShape::Scalar => self.gl.uniform_1_f32_slice(location, data),
                        UniformShape::Vec2 => self.gl.uniform_2_f32_slice(location, data),
                        UniformShape::Vec3 => self.gl.uniform_3_f32_slice(location, data),
                        UniformShape::Vec4 => self.gl.uniform_4_f32_slice(location, data),
                        UniformShape::Mat2 => {
                            self.gl.uniform_matrix_2_f32_slice(location, false, data)
                        }
                        UniformShape::Mat3 => {
                            self.gl.uniform_matrix_3_f32_slice(location, false, data)
                        }
                        UniformShape::Mat4 => {
                            self.gl.uniform_matrix_4_f32_slice(location, false, data)
                        }
                    }
                }
                UniformBaseType::Int => {
                    let data = value.as_i32_slice().ok_or_else(|| {
                        gpu_err!("prisma::opengl", Backend,
                            "int uniform '{}' received non-int data", info.name)
                    })?;
                    match info.shape {
                        UniformShape::Scalar => self.gl.uniform_1_i32_slice(location, data),
                        UniformShape::Vec2 => self.gl.uniform_2_i32_slice(location, data),
                        UniformShape::Vec3 => self.gl.uniform_3_i32_slice(location, data),
                        UniformShape::Vec4 => self.gl.uniform_4_i32_slice(location, data),
                        UniformShape::Mat2 | UniformShape::Mat3 | UniformShape::Mat4 => {
                            gpu_bail!("prisma::opengl", Backend,
                                "integer matrix uniforms do not exist in GLSL");
                        }
                    }
                }
            }
        }

        debug::drain_errors(&self.gl, "glUniform upload");
        Ok(())
    }

    fn get_uniform(&self, program: ProgramHandle, info: &UniformInfo) -> Result<UniformValue> {
        let native = self.native_program(program)?;
        let component_count = info.shape.component_count();
        let scalar = info.shape == UniformShape::Scalar && info.array_length == 1;

        match info.base_type {
            UniformBaseType::Float => {
                let mut data = vec![0.0f32; info.total_components()];
                if info.array_length == 1 {
                    let location = self.uniform_location(native, &info.name)?;
                    unsafe { self.gl.get_uniform_f32(native, &location, &mut data) };
                } else {
                    for element in 0..info.array_length {
                        let location = self
                            .uniform_location(native, &format!("{}[{}]", info.name, element))?;
                        let span = element * component_count..(element + 1) * component_count;
                        unsafe { self.gl.get_uniform_f32(native, &location, &mut data[span]) };
                    }
                }
                Ok(if scalar {
                    UniformValue::Float(data[0])
                } else {
                    UniformValue::FloatVec(data)
                })
            }
            UniformBaseType::Int => {
                let mut data = vec![0i32; info.total_components()];
                if info.array_length == 1 {
                    let location = self.uniform_location(native, &info.name)?;
                    unsafe { self.gl.get_uniform_i32(native, &location, &mut data) };
                } else {
                    for element in 0..info.array_length {
                        let location = self
                            .uniform_location(native, &format!("{}[{}]", info.name, element))?;
                        let span = element * component_count..(element + 1) * component_count;
                        unsafe { self.gl.get_uniform_i32(native, &location, &mut data[span]) };
                    }
                }
                Ok(if scalar {
                    UniformValue::Int(data[0])
                } else {
                    UniformValue::IntVec(data)
                })
            }
        }
    }

    // ===== TEXTURES =====

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        let target = texture_target_to_gl(desc.target);
        let internal = internal_format(desc.format, desc.pixel)?;

        let texture = unsafe {
            let texture = self.gl.create_texture().map_err(|e| {
                gpu_err!("prisma::opengl", Backend, "glGenTextures failed: {}", e)
            })?;
            self.gl.bind_texture(target, Some(texture));
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            // blank storage allocation
            self.gl.tex_image_2d(
                target,
                0,
                internal,
                desc.width as i32,
                desc.height as i32,
                0,
                pixel_format_to_gl(desc.format),
                pixel_type_to_gl(desc.pixel),
                glow::PixelUnpackData::Slice(None),
            );
            self.gl.bind_texture(target, None);
            texture
        };

        if debug::drain_errors(&self.gl, "texture allocation") > 0 {
            unsafe { self.gl.delete_texture(texture) };
            gpu_bail!("prisma::opengl", Backend, "could not allocate {}x{} texture storage",
                desc.width, desc.height);
        }

        Ok(self.textures.insert((texture, target)))
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if let Some((native, _)) = self.textures.remove(texture) {
            unsafe { self.gl.delete_texture(native) };
        }
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle> {
        let framebuffer = unsafe {
            self.gl.create_framebuffer().map_err(|e| {
                gpu_err!("prisma::opengl", Backend, "glGenFramebuffers failed: {}", e)
            })?
        };
        Ok(self.framebuffers.insert(framebuffer))
    }

    fn attach_color_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        texture: TextureHandle,
    ) -> Result<()> {
        let native_framebuffer = match self.framebuffers.get(framebuffer) {
            Some(&native) => native,
            None => gpu_bail!("prisma::opengl", Backend, "stale framebuffer handle"),
        };
        let (native_texture, target) = match self.textures.get(texture) {
            Some(&pair) => pair,
            None => gpu_bail!("prisma::opengl", Backend, "cannot attach released texture"),
        };

        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(native_framebuffer));
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                target,
                Some(native_texture),
                0,
            );
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }

        if debug::drain_errors(&self.gl, "framebuffer attach") > 0 {
            gpu_bail!("prisma::opengl", Backend, "could not create framebuffer texture");
        }
        Ok(())
    }

    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> Result<FramebufferStatus> {
        let native = match self.framebuffers.get(framebuffer) {
            Some(&native) => native,
            None => gpu_bail!("prisma::opengl", Backend, "stale framebuffer handle"),
        };
        let code = unsafe {
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(native));
            let code = self.gl.check_framebuffer_status(glow::READ_FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
            code
        };
        if code == glow::FRAMEBUFFER_COMPLETE {
            Ok(FramebufferStatus::Complete)
        } else {
            Ok(FramebufferStatus::Incomplete(framebuffer_status_name(code).to_string()))
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<()> {
        let native = match self.framebuffers.get(framebuffer) {
            Some(&native) => native,
            None => gpu_bail!("prisma::opengl", Backend, "stale framebuffer handle"),
        };
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(native)) };
        Ok(())
    }

    fn unbind_framebuffer(&mut self) {
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, None) };
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if let Some(native) = self.framebuffers.remove(framebuffer) {
            unsafe { self.gl.delete_framebuffer(native) };
        }
    }

    fn read_pixels(
        &self,
        framebuffer: FramebufferHandle,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixel: PixelType,
    ) -> Result<Vec<u8>> {
        let native = match self.framebuffers.get(framebuffer) {
            Some(&native) => native,
            None => gpu_bail!("prisma::opengl", Backend, "stale framebuffer handle"),
        };

        let len = width as usize * height as usize * format.bands() * pixel.size_bytes();
        let mut data = vec![0u8; len];
        unsafe {
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(native));
            self.gl.read_buffer(glow::COLOR_ATTACHMENT0);
            self.gl.read_pixels(
                0,
                0,
                width as i32,
                height as i32,
                pixel_format_to_gl(format),
                pixel_type_to_gl(pixel),
                glow::PixelPackData::Slice(Some(&mut data)),
            );
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
        }
        debug::drain_errors(&self.gl, "glReadPixels");
        Ok(data)
    }
}
