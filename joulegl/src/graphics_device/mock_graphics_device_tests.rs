/// Unit tests for MockGraphicsDevice
///
/// The rest of the crate relies on the mock for its recorded state, so its
/// bookkeeping is checked here first.

use crate::graphics_device::mock_graphics_device::*;
use crate::graphics_device::{
    GraphicsDevice, DeviceLimits, BufferTarget, BarrierFlags, VertexAttribute,
    ShaderStage, ShaderSource, DrawCommand, DrawState, Primitive, UniformLocation,
};
use crate::error::Error;

// ============================================================================
// Limits
// ============================================================================

#[test]
fn test_mock_default_limits() {
    let mut device = MockGraphicsDevice::new();
    assert_eq!(device.query_limits(), DeviceLimits::default());
    assert_eq!(device.state().borrow().query_limits_calls, 1);
}

#[test]
fn test_mock_custom_limits() {
    let limits = DeviceLimits {
        max_storage_block_size: 64,
        max_storage_buffer_bindings: 4,
        max_work_group_count: 10,
    };
    let mut device = MockGraphicsDevice::with_limits(limits);
    assert_eq!(device.query_limits(), limits);
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn test_mock_buffer_upload_and_read() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();

    let buffer = device.create_buffer().unwrap();
    device.upload_buffer(BufferTarget::Array, buffer, &[1, 2, 3, 4]).unwrap();

    assert_eq!(state.borrow().buffer_data(buffer), Some(&[1u8, 2, 3, 4][..]));
    assert_eq!(device.read_buffer(BufferTarget::Array, buffer, 2).unwrap(), vec![1, 2]);
    assert_eq!(state.borrow().bound_targets.get(&BufferTarget::Array), Some(&buffer));
}

#[test]
fn test_mock_buffer_read_past_end_fails() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device.create_buffer().unwrap();
    device.upload_buffer(BufferTarget::ShaderStorage, buffer, &[0; 8]).unwrap();

    let result = device.read_buffer(BufferTarget::ShaderStorage, buffer, 16);
    assert!(matches!(result, Err(Error::BackendError(_))));
}

#[test]
fn test_mock_buffer_clear_zeroes_in_place() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();
    let buffer = device.create_buffer().unwrap();
    device.upload_buffer(BufferTarget::ShaderStorage, buffer, &[7; 8]).unwrap();

    device.clear_buffer(buffer, 8).unwrap();

    assert_eq!(state.borrow().buffer_data(buffer), Some(&[0u8; 8][..]));
}

#[test]
fn test_mock_buffer_delete() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();
    let buffer = device.create_buffer().unwrap();
    device.bind_storage_buffer(2, buffer).unwrap();

    device.delete_buffer(buffer);

    let state = state.borrow();
    assert!(state.buffer_data(buffer).is_none());
    assert_eq!(state.deleted_buffers, vec![buffer]);
    assert!(state.storage_bindings.is_empty());
}

#[test]
fn test_mock_upload_to_deleted_buffer_fails() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device.create_buffer().unwrap();
    device.delete_buffer(buffer);

    let result = device.upload_buffer(BufferTarget::Array, buffer, &[1]);
    assert!(result.is_err());
}

#[test]
fn test_mock_storage_bindings_and_attributes() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();
    let a = device.create_buffer().unwrap();
    let b = device.create_buffer().unwrap();

    device.bind_storage_buffer(0, a).unwrap();
    device.bind_storage_buffer(1, b).unwrap();
    device.vertex_attribute(&VertexAttribute {
        location: 3, components: 4, stride: 16, offset: 0, divisor: 1,
    });

    let state = state.borrow();
    assert_eq!(state.storage_bindings.get(&0), Some(&a));
    assert_eq!(state.storage_bindings.get(&1), Some(&b));
    assert_eq!(state.attributes.get(&3).map(|a| a.divisor), Some(1));
}

// ============================================================================
// Vertex Arrays and Barriers
// ============================================================================

#[test]
fn test_mock_vertex_array_lifecycle() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();

    let vao = device.create_vertex_array().unwrap();
    device.bind_vertex_array(Some(vao)).unwrap();
    assert_eq!(state.borrow().bound_vertex_array, Some(vao));

    device.delete_vertex_array(vao);
    assert_eq!(state.borrow().bound_vertex_array, None);
    assert_eq!(state.borrow().deleted_vertex_arrays.len(), 1);
    assert!(device.bind_vertex_array(Some(vao)).is_err());
}

#[test]
fn test_mock_memory_barrier() {
    let mut device = MockGraphicsDevice::new();
    device.memory_barrier(BarrierFlags::ALL);
    device.memory_barrier(BarrierFlags::SHADER_STORAGE);

    let state = device.state();
    let state = state.borrow();
    assert_eq!(state.barriers, vec![BarrierFlags::ALL, BarrierFlags::SHADER_STORAGE]);
    assert!(BarrierFlags::ALL.contains(BarrierFlags::VERTEX_ATTRIB_ARRAY | BarrierFlags::UNIFORM));
}

// ============================================================================
// Programs and Uniforms
// ============================================================================

const COMPUTE_SOURCE: &str = "#version 430\n\
    uniform float scale;\n\
    uniform int work_group_offset;\n\
    uniform mat4 transforms[4];\n\
    void main() {}\n";

#[test]
fn test_mock_program_parses_uniforms() {
    let mut device = MockGraphicsDevice::new();
    let program = device
        .create_program(&[ShaderSource::new(ShaderStage::Compute, COMPUTE_SOURCE)])
        .unwrap();

    assert_eq!(device.uniform_location(program, "scale").unwrap(), Some(UniformLocation(0)));
    assert_eq!(device.uniform_location(program, "work_group_offset").unwrap(), Some(UniformLocation(1)));
    assert_eq!(device.uniform_location(program, "transforms").unwrap(), Some(UniformLocation(2)));
    assert_eq!(device.uniform_location(program, "missing").unwrap(), None);
    assert_eq!(device.state().borrow().uniform_lookups.len(), 4);
}

#[test]
fn test_mock_program_error_directive_fails() {
    let mut device = MockGraphicsDevice::new();
    let result = device.create_program(&[ShaderSource::new(ShaderStage::Vertex, "#error broken")]);
    assert!(matches!(result, Err(Error::ShaderCompilation(_))));
}

#[test]
fn test_mock_uniform_writes_target_active_program() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();
    let program = device
        .create_program(&[ShaderSource::new(ShaderStage::Compute, COMPUTE_SOURCE)])
        .unwrap();

    device.use_program(program).unwrap();
    device.uniform_f32(UniformLocation(0), 2.5);
    device.uniform_i32(UniformLocation(1), 7);

    let state = state.borrow();
    assert_eq!(state.use_program_calls, 1);
    assert_eq!(state.uniform_value(program, "scale"), Some(RecordedUniform::F32(2.5)));
    assert_eq!(state.uniform_value(program, "work_group_offset"), Some(RecordedUniform::I32(7)));
}

#[test]
fn test_mock_delete_program() {
    let mut device = MockGraphicsDevice::new();
    let program = device
        .create_program(&[ShaderSource::new(ShaderStage::Compute, COMPUTE_SOURCE)])
        .unwrap();
    device.use_program(program).unwrap();
    device.delete_program(program);

    let state = device.state();
    assert_eq!(state.borrow().active_program, None);
    assert!(device.use_program(program).is_err());
}

// ============================================================================
// Execution
// ============================================================================

#[test]
fn test_mock_dispatch_and_draw_are_recorded_in_order() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();

    device.dispatch_compute(4, 1, 1);
    device.apply_draw_state(&DrawState::default());
    device.draw(&DrawCommand::Arrays { primitive: Primitive::Points, count: 9 });

    let state = state.borrow();
    assert_eq!(state.dispatches, vec![(4, 1, 1)]);
    assert_eq!(state.draws.len(), 1);
    assert_eq!(state.commands, vec![
        "dispatch_compute(4, 1, 1)".to_string(),
        "apply_draw_state".to_string(),
        "draw".to_string(),
    ]);
    assert_eq!(state.count_prefix("dispatch"), 1);
}
