/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Buffers are plain byte vectors, programs keep their sources and expose the
/// uniforms declared as `uniform <type> <name>;` lines. Every call is appended
/// to `MockDeviceState::commands` so tests can check ordering.

use std::cell::RefCell;
use std::rc::Rc;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, DeviceLimits, BufferHandle, VertexArrayHandle, ProgramHandle,
    UniformLocation, BufferTarget, BarrierFlags, VertexAttribute,
    ShaderStage, ShaderSource, DrawState, DrawCommand,
};

// ============================================================================
// Recorded State
// ============================================================================

/// Uniform value as last written by the program under test
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordedUniform {
    F32(f32),
    Vec3([f32; 3]),
    Mat4([f32; 16]),
    I32(i32),
    IVec3([i32; 3]),
}

/// Program created through the mock device
#[derive(Debug, Clone)]
pub struct MockProgram {
    pub stages: Vec<(ShaderStage, String)>,
    /// Declared uniform names, the index is the location
    pub uniforms: Vec<String>,
}

impl MockProgram {
    fn from_sources(sources: &[ShaderSource<'_>]) -> Self {
        let mut uniforms = Vec::new();
        for source in sources {
            for line in source.code.lines() {
                let mut words = line.split_whitespace();
                if words.next() != Some("uniform") {
                    continue;
                }
                let _uniform_type = words.next();
                if let Some(name) = words.next() {
                    let name = name.trim_end_matches(';');
                    let name = name.split('[').next().unwrap_or(name);
                    if !uniforms.iter().any(|known| known == name) {
                        uniforms.push(name.to_string());
                    }
                }
            }
        }

        Self {
            stages: sources.iter().map(|s| (s.stage, s.code.to_string())).collect(),
            uniforms,
        }
    }
}

/// Everything the mock device has been asked to do
#[derive(Debug, Default)]
pub struct MockDeviceState {
    pub buffers: SlotMap<BufferHandle, Vec<u8>>,
    pub deleted_buffers: Vec<BufferHandle>,
    pub bound_targets: FxHashMap<BufferTarget, BufferHandle>,
    pub storage_bindings: FxHashMap<u32, BufferHandle>,
    pub attributes: FxHashMap<u32, VertexAttribute>,
    pub vertex_arrays: SlotMap<VertexArrayHandle, ()>,
    pub deleted_vertex_arrays: Vec<VertexArrayHandle>,
    pub bound_vertex_array: Option<VertexArrayHandle>,
    pub programs: SlotMap<ProgramHandle, MockProgram>,
    pub deleted_programs: Vec<ProgramHandle>,
    pub active_program: Option<ProgramHandle>,
    pub use_program_calls: usize,
    pub uniform_lookups: Vec<String>,
    pub uniform_values: FxHashMap<(ProgramHandle, u32), RecordedUniform>,
    pub barriers: Vec<BarrierFlags>,
    pub dispatches: Vec<(u32, u32, u32)>,
    pub draw_states: Vec<DrawState>,
    pub draws: Vec<DrawCommand>,
    pub query_limits_calls: usize,
    /// Ordered call log
    pub commands: Vec<String>,
}

impl MockDeviceState {
    /// Content of a live buffer
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(buffer).map(|data| data.as_slice())
    }

    /// Value last written to a named uniform of a program
    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<RecordedUniform> {
        let location = self.programs.get(program)?
            .uniforms.iter().position(|known| known == name)?;
        self.uniform_values.get(&(program, location as u32)).copied()
    }

    /// Number of logged commands equal to `command`
    pub fn count(&self, command: &str) -> usize {
        self.commands.iter().filter(|c| c.as_str() == command).count()
    }

    /// Number of logged commands starting with `prefix`
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.commands.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

// ============================================================================
// Mock Graphics Device
// ============================================================================

/// Mock device, cheap to clone the state handle out of before boxing
pub struct MockGraphicsDevice {
    state: Rc<RefCell<MockDeviceState>>,
    limits: DeviceLimits,
}

impl MockGraphicsDevice {
    /// Create a mock device reporting the default limits
    pub fn new() -> Self {
        Self::with_limits(DeviceLimits::default())
    }

    /// Create a mock device reporting custom limits
    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockDeviceState::default())),
            limits,
        }
    }

    /// Shared handle on the recorded state
    pub fn state(&self) -> Rc<RefCell<MockDeviceState>> {
        Rc::clone(&self.state)
    }

    fn record(&self, command: String) {
        self.state.borrow_mut().commands.push(command);
    }

    fn write_uniform(&mut self, location: UniformLocation, value: RecordedUniform, command: String) {
        let mut state = self.state.borrow_mut();
        state.commands.push(command);
        if let Some(program) = state.active_program {
            state.uniform_values.insert((program, location.0), value);
        }
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn query_limits(&mut self) -> DeviceLimits {
        self.state.borrow_mut().query_limits_calls += 1;
        self.limits
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self) -> Result<BufferHandle> {
        self.record("create_buffer".to_string());
        Ok(self.state.borrow_mut().buffers.insert(Vec::new()))
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.record("delete_buffer".to_string());
        let mut state = self.state.borrow_mut();
        if state.buffers.remove(buffer).is_some() {
            state.deleted_buffers.push(buffer);
        }
        state.bound_targets.retain(|_, bound| *bound != buffer);
        state.storage_bindings.retain(|_, bound| *bound != buffer);
    }

    fn upload_buffer(&mut self, target: BufferTarget, buffer: BufferHandle, data: &[u8]) -> Result<()> {
        self.record(format!("upload_buffer({:?}, {})", target, data.len()));
        let mut state = self.state.borrow_mut();
        let storage = state.buffers.get_mut(buffer)
            .ok_or_else(|| Error::BackendError("upload to unknown buffer".to_string()))?;
        *storage = data.to_vec();
        state.bound_targets.insert(target, buffer);
        Ok(())
    }

    fn read_buffer(&mut self, target: BufferTarget, buffer: BufferHandle, size: usize) -> Result<Vec<u8>> {
        self.record(format!("read_buffer({:?}, {})", target, size));
        let state = self.state.borrow();
        let storage = state.buffers.get(buffer)
            .ok_or_else(|| Error::BackendError("read from unknown buffer".to_string()))?;
        if size > storage.len() {
            return Err(Error::BackendError(format!(
                "read of {} bytes from a {} byte buffer", size, storage.len()
            )));
        }
        Ok(storage[..size].to_vec())
    }

    fn clear_buffer(&mut self, buffer: BufferHandle, size: usize) -> Result<()> {
        self.record(format!("clear_buffer({})", size));
        let mut state = self.state.borrow_mut();
        let storage = state.buffers.get_mut(buffer)
            .ok_or_else(|| Error::BackendError("clear of unknown buffer".to_string()))?;
        let end = size.min(storage.len());
        storage[..end].fill(0);
        Ok(())
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle) -> Result<()> {
        self.record(format!("bind_buffer({:?})", target));
        let mut state = self.state.borrow_mut();
        if !state.buffers.contains_key(buffer) {
            return Err(Error::BackendError("bind of unknown buffer".to_string()));
        }
        state.bound_targets.insert(target, buffer);
        Ok(())
    }

    fn bind_storage_buffer(&mut self, index: u32, buffer: BufferHandle) -> Result<()> {
        self.record(format!("bind_storage_buffer({})", index));
        let mut state = self.state.borrow_mut();
        if !state.buffers.contains_key(buffer) {
            return Err(Error::BackendError("bind of unknown buffer".to_string()));
        }
        state.storage_bindings.insert(index, buffer);
        Ok(())
    }

    fn vertex_attribute(&mut self, attribute: &VertexAttribute) {
        self.record(format!("vertex_attribute({})", attribute.location));
        self.state.borrow_mut().attributes.insert(attribute.location, *attribute);
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle> {
        self.record("create_vertex_array".to_string());
        Ok(self.state.borrow_mut().vertex_arrays.insert(()))
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<()> {
        let label = if vertex_array.is_some() { "vao" } else { "none" };
        self.record(format!("bind_vertex_array({})", label));
        let mut state = self.state.borrow_mut();
        if let Some(vao) = vertex_array {
            if !state.vertex_arrays.contains_key(vao) {
                return Err(Error::BackendError("bind of unknown vertex array".to_string()));
            }
        }
        state.bound_vertex_array = vertex_array;
        Ok(())
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.record("delete_vertex_array".to_string());
        let mut state = self.state.borrow_mut();
        if state.vertex_arrays.remove(vertex_array).is_some() {
            state.deleted_vertex_arrays.push(vertex_array);
        }
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    fn memory_barrier(&mut self, barriers: BarrierFlags) {
        self.record("memory_barrier".to_string());
        self.state.borrow_mut().barriers.push(barriers);
    }

    // ===== PROGRAMS =====

    fn create_program(&mut self, sources: &[ShaderSource<'_>]) -> Result<ProgramHandle> {
        self.record("create_program".to_string());
        if sources.is_empty() {
            return Err(Error::ShaderCompilation("no shader stages".to_string()));
        }
        if let Some(failing) = sources.iter().find(|s| s.code.contains("#error")) {
            return Err(Error::ShaderCompilation(format!(
                "{:?} stage: #error directive", failing.stage
            )));
        }
        let program = MockProgram::from_sources(sources);
        Ok(self.state.borrow_mut().programs.insert(program))
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        self.record("use_program".to_string());
        let mut state = self.state.borrow_mut();
        if !state.programs.contains_key(program) {
            return Err(Error::BackendError("use of unknown program".to_string()));
        }
        state.active_program = Some(program);
        state.use_program_calls += 1;
        Ok(())
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Result<Option<UniformLocation>> {
        self.record(format!("uniform_location({})", name));
        let mut state = self.state.borrow_mut();
        state.uniform_lookups.push(name.to_string());
        let mock_program = state.programs.get(program)
            .ok_or_else(|| Error::BackendError("lookup in unknown program".to_string()))?;
        Ok(mock_program.uniforms.iter()
            .position(|known| known == name)
            .map(|index| UniformLocation(index as u32)))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.record("delete_program".to_string());
        let mut state = self.state.borrow_mut();
        if state.programs.remove(program).is_some() {
            state.deleted_programs.push(program);
        }
        if state.active_program == Some(program) {
            state.active_program = None;
        }
    }

    fn uniform_f32(&mut self, location: UniformLocation, value: f32) {
        self.write_uniform(location, RecordedUniform::F32(value), format!("uniform_f32({})", location.0));
    }

    fn uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]) {
        self.write_uniform(location, RecordedUniform::Vec3(value), format!("uniform_vec3({})", location.0));
    }

    fn uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        self.write_uniform(location, RecordedUniform::Mat4(*value), format!("uniform_mat4({})", location.0));
    }

    fn uniform_i32(&mut self, location: UniformLocation, value: i32) {
        self.write_uniform(location, RecordedUniform::I32(value), format!("uniform_i32({})", location.0));
    }

    fn uniform_ivec3(&mut self, location: UniformLocation, value: [i32; 3]) {
        self.write_uniform(location, RecordedUniform::IVec3(value), format!("uniform_ivec3({})", location.0));
    }

    // ===== EXECUTION =====

    fn dispatch_compute(&mut self, x: u32, y: u32, z: u32) {
        self.record(format!("dispatch_compute({}, {}, {})", x, y, z));
        self.state.borrow_mut().dispatches.push((x, y, z));
    }

    fn apply_draw_state(&mut self, state: &DrawState) {
        self.record("apply_draw_state".to_string());
        self.state.borrow_mut().draw_states.push(*state);
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.record("draw".to_string());
        self.state.borrow_mut().draws.push(*command);
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
