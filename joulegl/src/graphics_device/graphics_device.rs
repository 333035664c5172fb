/// GraphicsDevice trait - every driver call made by JouleGL goes through here

use crate::error::Result;
use crate::graphics_device::{
    BarrierFlags, BufferTarget, VertexAttribute,
    ShaderSource, DrawState, DrawCommand,
};

slotmap::new_key_type! {
    /// Opaque handle of one hardware buffer
    pub struct BufferHandle;

    /// Opaque handle of one vertex array object
    pub struct VertexArrayHandle;

    /// Opaque handle of one linked program
    pub struct ProgramHandle;
}

/// Location of an active uniform inside a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Hardware limits queried once when the context is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Maximum size of one storage block in bytes
    pub max_storage_block_size: usize,
    /// Maximum number of storage buffers bound at the same time
    pub max_storage_buffer_bindings: usize,
    /// Maximum work group count on the x axis of one dispatch
    pub max_work_group_count: usize,
}

impl Default for DeviceLimits {
    /// Minimums guaranteed by OpenGL 4.3
    fn default() -> Self {
        Self {
            max_storage_block_size: 1 << 24,
            max_storage_buffer_bindings: 8,
            max_work_group_count: 65535,
        }
    }
}

/// Driver interface
///
/// Implemented by backend devices (e.g., GlowDevice) and by the mock device
/// used in tests. The owning context must be current on the calling thread.
pub trait GraphicsDevice {
    /// Query the hardware limits
    fn query_limits(&mut self) -> DeviceLimits;

    // ===== BUFFERS =====

    /// Allocate a new buffer handle with no storage
    fn create_buffer(&mut self) -> Result<BufferHandle>;

    /// Release a buffer handle (unknown handles are ignored)
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Replace the whole content of a buffer
    ///
    /// # Arguments
    ///
    /// * `target` - Target the buffer is bound to for the upload
    /// * `buffer` - Buffer to fill
    /// * `data` - New content
    fn upload_buffer(&mut self, target: BufferTarget, buffer: BufferHandle, data: &[u8]) -> Result<()>;

    /// Download the first `size` bytes of a buffer
    fn read_buffer(&mut self, target: BufferTarget, buffer: BufferHandle, size: usize) -> Result<Vec<u8>>;

    /// Zero the first `size` bytes of a buffer in place
    fn clear_buffer(&mut self, buffer: BufferHandle, size: usize) -> Result<()>;

    /// Bind a buffer to a target
    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle) -> Result<()>;

    /// Bind a whole buffer to an indexed storage binding point
    fn bind_storage_buffer(&mut self, index: u32, buffer: BufferHandle) -> Result<()>;

    /// Enable and describe one vertex attribute sourced from the bound array buffer
    fn vertex_attribute(&mut self, attribute: &VertexAttribute);

    // ===== VERTEX ARRAYS =====

    /// Allocate a vertex array object
    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle>;

    /// Bind a vertex array object (None unbinds)
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<()>;

    /// Release a vertex array object
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Order prior shader writes before the commands that follow
    fn memory_barrier(&mut self, barriers: BarrierFlags);

    // ===== PROGRAMS =====

    /// Compile every stage and link them into one program
    fn create_program(&mut self, sources: &[ShaderSource<'_>]) -> Result<ProgramHandle>;

    /// Make a program current
    fn use_program(&mut self, program: ProgramHandle) -> Result<()>;

    /// Look up an active uniform, None when the program has no such uniform
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Result<Option<UniformLocation>>;

    /// Release a program
    fn delete_program(&mut self, program: ProgramHandle);

    // Uniform writes apply to the current program

    fn uniform_f32(&mut self, location: UniformLocation, value: f32);
    fn uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]);
    fn uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]);
    fn uniform_i32(&mut self, location: UniformLocation, value: i32);
    fn uniform_ivec3(&mut self, location: UniformLocation, value: [i32; 3]);

    // ===== EXECUTION =====

    /// Launch compute work groups with the current program
    fn dispatch_compute(&mut self, x: u32, y: u32, z: u32);

    /// Set blending, depth test and rasterization state for following draws
    fn apply_draw_state(&mut self, state: &DrawState);

    /// Issue a draw call with the current program and vertex array
    fn draw(&mut self, command: &DrawCommand);
}
