/// GlowDevice - OpenGL implementation of the GraphicsDevice trait
///
/// JouleGL handles are slotmap keys mapped to the glow objects they stand
/// for. Uniform locations are numbered as they are handed out and dropped
/// with their program.
///
/// Every call assumes the wrapped GL context is current on this thread.

use glow::HasContext;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use joulegl::jgl::device::{
    BarrierFlags, BufferHandle, BufferTarget, DeviceLimits, DrawCommand, DrawState,
    GraphicsDevice, ProgramHandle, ShaderSource, UniformLocation, VertexArrayHandle,
    VertexAttribute,
};
use joulegl::jgl::{Error, Result};

use crate::glow_mapping::{
    barrier_bits, blend_equation, blend_factor, buffer_target, primitive, queried_limit, shader_stage,
};

type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlVertexArray = <glow::Context as HasContext>::VertexArray;
type GlProgram = <glow::Context as HasContext>::Program;
type GlUniformLocation = <glow::Context as HasContext>::UniformLocation;

pub struct GlowDevice {
    gl: glow::Context,
    buffers: SlotMap<BufferHandle, GlBuffer>,
    vertex_arrays: SlotMap<VertexArrayHandle, GlVertexArray>,
    programs: SlotMap<ProgramHandle, GlProgram>,
    uniform_locations: FxHashMap<u32, (ProgramHandle, GlUniformLocation)>,
    next_uniform_location: u32,
}

impl GlowDevice {
    /// Wrap a GL context (4.3 core or later for storage buffers and compute)
    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            buffers: SlotMap::with_key(),
            vertex_arrays: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            uniform_locations: FxHashMap::default(),
            next_uniform_location: 0,
        }
    }

    /// Underlying context, for calls JouleGL does not wrap
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn buffer(&self, handle: BufferHandle) -> Result<GlBuffer> {
        self.buffers.get(handle).copied()
            .ok_or_else(|| Error::BackendError(format!("unknown buffer {:?}", handle)))
    }

    fn program(&self, handle: ProgramHandle) -> Result<GlProgram> {
        self.programs.get(handle).copied()
            .ok_or_else(|| Error::BackendError(format!("unknown program {:?}", handle)))
    }

    fn location(&self, location: UniformLocation) -> Option<&GlUniformLocation> {
        self.uniform_locations.get(&location.0).map(|(_, location)| location)
    }

    /// Compile one stage, returning the info log on failure
    fn compile_shader(&self, source: &ShaderSource<'_>) -> Result<<glow::Context as HasContext>::Shader> {
        unsafe {
            let shader = self.gl.create_shader(shader_stage(source.stage))
                .map_err(Error::BackendError)?;
            self.gl.shader_source(shader, source.code);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(Error::ShaderCompilation(format!("{:?} stage: {}", source.stage, log)));
            }
            Ok(shader)
        }
    }
}

impl GraphicsDevice for GlowDevice {
    fn query_limits(&mut self) -> DeviceLimits {
        unsafe {
            DeviceLimits {
                max_storage_block_size: queried_limit(
                    self.gl.get_parameter_i32(glow::MAX_SHADER_STORAGE_BLOCK_SIZE),
                ),
                max_storage_buffer_bindings: queried_limit(
                    self.gl.get_parameter_i32(glow::MAX_SHADER_STORAGE_BUFFER_BINDINGS),
                ),
                max_work_group_count: queried_limit(
                    self.gl.get_parameter_indexed_i32(glow::MAX_COMPUTE_WORK_GROUP_COUNT, 0),
                ),
            }
        }
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self) -> Result<BufferHandle> {
        let buffer = unsafe { self.gl.create_buffer() }.map_err(Error::BackendError)?;
        Ok(self.buffers.insert(buffer))
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(buffer) = self.buffers.remove(buffer) {
            unsafe { self.gl.delete_buffer(buffer) };
        }
    }

    fn upload_buffer(&mut self, target: BufferTarget, buffer: BufferHandle, data: &[u8]) -> Result<()> {
        let buffer = self.buffer(buffer)?;
        let target = buffer_target(target);
        unsafe {
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, data, glow::DYNAMIC_DRAW);
        }
        Ok(())
    }

    fn read_buffer(&mut self, target: BufferTarget, buffer: BufferHandle, size: usize) -> Result<Vec<u8>> {
        let buffer = self.buffer(buffer)?;
        let target = buffer_target(target);
        let mut data = vec![0u8; size];
        unsafe {
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.get_buffer_sub_data(target, 0, &mut data);
        }
        Ok(data)
    }

    fn clear_buffer(&mut self, buffer: BufferHandle, size: usize) -> Result<()> {
        let buffer = self.buffer(buffer)?;
        let zeros = vec![0u8; size];
        unsafe {
            self.gl.bind_buffer(glow::SHADER_STORAGE_BUFFER, Some(buffer));
            self.gl.buffer_sub_data_u8_slice(glow::SHADER_STORAGE_BUFFER, 0, &zeros);
        }
        Ok(())
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle) -> Result<()> {
        let buffer = self.buffer(buffer)?;
        unsafe { self.gl.bind_buffer(buffer_target(target), Some(buffer)) };
        Ok(())
    }

    fn bind_storage_buffer(&mut self, index: u32, buffer: BufferHandle) -> Result<()> {
        let buffer = self.buffer(buffer)?;
        unsafe { self.gl.bind_buffer_base(glow::SHADER_STORAGE_BUFFER, index, Some(buffer)) };
        Ok(())
    }

    fn vertex_attribute(&mut self, attribute: &VertexAttribute) {
        unsafe {
            self.gl.enable_vertex_attrib_array(attribute.location);
            self.gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components,
                glow::FLOAT,
                false,
                attribute.stride,
                attribute.offset,
            );
            self.gl.vertex_attrib_divisor(attribute.location, attribute.divisor);
        }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle> {
        let vertex_array = unsafe { self.gl.create_vertex_array() }.map_err(Error::BackendError)?;
        Ok(self.vertex_arrays.insert(vertex_array))
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<()> {
        let native = match vertex_array {
            Some(handle) => Some(self.vertex_arrays.get(handle).copied().ok_or_else(|| {
                Error::BackendError(format!("unknown vertex array {:?}", handle))
            })?),
            None => None,
        };
        unsafe { self.gl.bind_vertex_array(native) };
        Ok(())
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if let Some(vertex_array) = self.vertex_arrays.remove(vertex_array) {
            unsafe { self.gl.delete_vertex_array(vertex_array) };
        }
    }

    fn memory_barrier(&mut self, barriers: BarrierFlags) {
        unsafe { self.gl.memory_barrier(barrier_bits(barriers)) };
    }

    // ===== PROGRAMS =====

    fn create_program(&mut self, sources: &[ShaderSource<'_>]) -> Result<ProgramHandle> {
        if sources.is_empty() {
            return Err(Error::ShaderCompilation("no shader stages".to_string()));
        }

        let mut shaders = Vec::with_capacity(sources.len());
        for source in sources {
            match self.compile_shader(source) {
                Ok(shader) => shaders.push(shader),
                Err(error) => {
                    for shader in shaders {
                        unsafe { self.gl.delete_shader(shader) };
                    }
                    return Err(error);
                }
            }
        }

        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(message) => {
                    for shader in shaders {
                        self.gl.delete_shader(shader);
                    }
                    return Err(Error::BackendError(message));
                }
            };
            for shader in &shaders {
                self.gl.attach_shader(program, *shader);
            }
            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);
            for shader in shaders {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }
            if !linked {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(Error::ShaderCompilation(format!("link: {}", log)));
            }
            Ok(self.programs.insert(program))
        }
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        let program = self.program(program)?;
        unsafe { self.gl.use_program(Some(program)) };
        Ok(())
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Result<Option<UniformLocation>> {
        let gl_program = self.program(program)?;
        let Some(location) = (unsafe { self.gl.get_uniform_location(gl_program, name) }) else {
            return Ok(None);
        };
        let index = self.next_uniform_location;
        self.next_uniform_location += 1;
        self.uniform_locations.insert(index, (program, location));
        Ok(Some(UniformLocation(index)))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if let Some(gl_program) = self.programs.remove(program) {
            self.uniform_locations.retain(|_, (owner, _)| *owner != program);
            unsafe { self.gl.delete_program(gl_program) };
        }
    }

    fn uniform_f32(&mut self, location: UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(self.location(location), value) };
    }

    fn uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]) {
        unsafe { self.gl.uniform_3_f32(self.location(location), value[0], value[1], value[2]) };
    }

    fn uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(self.location(location), false, value) };
    }

    fn uniform_i32(&mut self, location: UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(self.location(location), value) };
    }

    fn uniform_ivec3(&mut self, location: UniformLocation, value: [i32; 3]) {
        unsafe { self.gl.uniform_3_i32(self.location(location), value[0], value[1], value[2]) };
    }

    // ===== EXECUTION =====

    fn dispatch_compute(&mut self, x: u32, y: u32, z: u32) {
        unsafe { self.gl.dispatch_compute(x, y, z) };
    }

    fn apply_draw_state(&mut self, state: &DrawState) {
        unsafe {
            match state.blending {
                Some(blending) => {
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_func(blend_factor(blending.src), blend_factor(blending.dst));
                    self.gl.blend_equation_separate(
                        blend_equation(blending.equation_rgb),
                        blend_equation(blending.equation_alpha),
                    );
                }
                None => self.gl.disable(glow::BLEND),
            }
            if state.depth_test {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
            if let Some(width) = state.line_width {
                self.gl.line_width(width);
            }
            if let Some(size) = state.point_size {
                self.gl.point_size(size);
            }
        }
    }

    fn draw(&mut self, command: &DrawCommand) {
        unsafe {
            match *command {
                DrawCommand::Arrays { primitive: mode, count } => {
                    self.gl.draw_arrays(primitive(mode), 0, count as i32);
                }
                DrawCommand::ArraysInstanced { primitive: mode, vertices, instance_count } => {
                    self.gl.draw_arrays_instanced(primitive(mode), 0, vertices as i32, instance_count as i32);
                }
                DrawCommand::Elements { primitive: mode, count } => {
                    self.gl.draw_elements(primitive(mode), count as i32, glow::UNSIGNED_INT, 0);
                }
            }
        }
    }
}

impl Drop for GlowDevice {
    fn drop(&mut self) {
        unsafe {
            for (_, program) in self.programs.drain() {
                self.gl.delete_program(program);
            }
            for (_, vertex_array) in self.vertex_arrays.drain() {
                self.gl.delete_vertex_array(vertex_array);
            }
            for (_, buffer) in self.buffers.drain() {
                self.gl.delete_buffer(buffer);
            }
        }
    }
}
