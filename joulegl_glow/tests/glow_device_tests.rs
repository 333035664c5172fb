//! GPU tests for GlowDevice
//!
//! These tests need an OpenGL 4.3 driver and a display, so they are marked
//! with #[ignore]. A process may only create one winit event loop, so every
//! check shares one hidden window and GL context and runs from a single test.
//!
//! Run with: cargo test -p joulegl_glow --test glow_device_tests -- --ignored

use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version};
use glutin::display::{Display, GetGlDisplay, GlDisplay};
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::event_loop::EventLoop;
use winit::window::Window;

use joulegl::jgl::buffer::{BindMode, BufferKind, BufferObject, GpuBuffer};
use joulegl::jgl::device::{BufferTarget, GraphicsDevice, ShaderSource, ShaderStage};
use joulegl::jgl::shader::ShaderProgram;
use joulegl::jgl::{ContextConfig, GraphicsContext};
use joulegl_glow::GlowDevice;

const DOUBLE_COMPUTE: &str = "#version 430
layout(local_size_x = 1) in;
layout(std430, binding = 0) buffer Values { float values[]; };
uniform int work_group_offset;
uniform float factor;
void main() {
    uint index = gl_WorkGroupID.x + uint(work_group_offset);
    values[index] *= factor;
}
";

/// Hidden window with a current GL 4.3 context
///
/// Field order is drop order: the context goes before its surface and window.
struct TestGl {
    display: Display,
    _context: PossiblyCurrentContext,
    _surface: Surface<WindowSurface>,
    _window: Window,
    _event_loop: EventLoop<()>,
}

impl TestGl {
    /// Fresh device over the shared context
    fn device(&self) -> GlowDevice {
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| self.display.get_proc_address(symbol))
        };
        GlowDevice::new(gl)
    }
}

#[allow(deprecated)]
fn create_test_gl() -> TestGl {
    let event_loop = build_event_loop();
    let window_attrs = Window::default_attributes()
        .with_title("JouleGL GlowDevice Test")
        .with_inner_size(winit::dpi::LogicalSize::new(64, 64))
        .with_visible(false); // Hidden window for tests

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_attributes(Some(window_attrs))
        .build(&event_loop, ConfigTemplateBuilder::new(), pick_config)
        .unwrap();
    let window = window.unwrap();

    let raw_window_handle = window.window_handle().ok().map(|handle| handle.as_raw());
    let display = gl_config.display();
    let context_attrs = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 3))))
        .build(raw_window_handle);
    let not_current = unsafe { display.create_context(&gl_config, &context_attrs).unwrap() };

    let surface_attrs = window.build_surface_attributes(SurfaceAttributesBuilder::default()).unwrap();
    let surface = unsafe { display.create_window_surface(&gl_config, &surface_attrs).unwrap() };
    let context = not_current.make_current(&surface).unwrap();

    TestGl {
        display,
        _context: context,
        _surface: surface,
        _window: window,
        _event_loop: event_loop,
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| if config.num_samples() < best.num_samples() { config } else { best })
        .unwrap()
}

/// Test threads are not the main thread
fn build_event_loop() -> EventLoop<()> {
    let mut builder = EventLoop::builder();
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        builder.with_any_thread(true);
    }
    #[cfg(target_os = "windows")]
    {
        use winit::platform::windows::EventLoopBuilderExtWindows;
        builder.with_any_thread(true);
    }
    builder.build().unwrap()
}

// ============================================================================
// GPU TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_glow_device_on_gpu() {
    let gl = create_test_gl();

    check_limits(&gl);
    check_buffer_round_trip(&gl);
    check_buffer_clear(&gl);
    check_uniform_lookup(&gl);
    check_storage_bind_and_dispatch(&gl);
}

fn check_limits(gl: &TestGl) {
    let mut device = gl.device();
    let limits = device.query_limits();

    assert!(limits.max_storage_block_size >= 1 << 24);
    assert!(limits.max_storage_buffer_bindings >= 8);
    assert!(limits.max_work_group_count >= 65535);
}

fn check_buffer_round_trip(gl: &TestGl) {
    let mut device = gl.device();
    let buffer = device.create_buffer().unwrap();
    let data: Vec<u8> = (0..64).collect();

    device.upload_buffer(BufferTarget::ShaderStorage, buffer, &data).unwrap();

    assert_eq!(device.read_buffer(BufferTarget::ShaderStorage, buffer, 64).unwrap(), data);
    assert_eq!(device.read_buffer(BufferTarget::ShaderStorage, buffer, 16).unwrap(), data[..16].to_vec());
    device.delete_buffer(buffer);
}

fn check_buffer_clear(gl: &TestGl) {
    let mut device = gl.device();
    let buffer = device.create_buffer().unwrap();
    device.upload_buffer(BufferTarget::Array, buffer, &[7u8; 32]).unwrap();

    device.clear_buffer(buffer, 32).unwrap();

    assert_eq!(device.read_buffer(BufferTarget::Array, buffer, 32).unwrap(), vec![0u8; 32]);
}

fn check_uniform_lookup(gl: &TestGl) {
    let mut device = gl.device();
    let program = device
        .create_program(&[ShaderSource::new(ShaderStage::Compute, DOUBLE_COMPUTE)])
        .unwrap();

    let factor = device.uniform_location(program, "factor").unwrap();
    let offset = device.uniform_location(program, "work_group_offset").unwrap();
    assert!(factor.is_some());
    assert!(offset.is_some());
    assert_ne!(factor, offset);
    assert_eq!(device.uniform_location(program, "missing").unwrap(), None);

    device.delete_program(program);
    assert!(device.uniform_location(program, "factor").is_err());
    assert!(device.use_program(program).is_err());
}

fn check_storage_bind_and_dispatch(gl: &TestGl) {
    let config = ContextConfig { max_work_group_count: Some(3), ..ContextConfig::default() };
    let ctx = GraphicsContext::new(Box::new(gl.device()), config).unwrap();
    let mut values = GpuBuffer::new(&ctx, "values", BufferKind::Storage).unwrap();
    values.load(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
    let mut program = ShaderProgram::new_compute(&ctx, "double", DOUBLE_COMPUTE).unwrap();

    values.bind(0, BindMode::Storage, 0).unwrap();
    program.set_uniform("factor", 2.0f32, "float").unwrap();
    program.compute(8, true).unwrap();

    assert_eq!(
        values.read::<f32>().unwrap(),
        vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0]
    );
}
