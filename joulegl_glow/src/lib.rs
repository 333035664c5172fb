/*!
# JouleGL - glow backend

OpenGL implementation of the JouleGL `GraphicsDevice` trait, built on the
`glow` bindings. Requires an OpenGL 4.3 core context (storage buffers and
compute shaders) made current by the application.

```no_run
use joulegl::jgl::{ContextConfig, GraphicsContext};
use joulegl_glow::GlowDevice;

# fn run(gl: glow::Context) -> joulegl::jgl::Result<()> {
let _ctx = GraphicsContext::new(Box::new(GlowDevice::new(gl)), ContextConfig::default())?;
# Ok(())
# }
```
*/

mod glow_mapping;
mod glow_device;

pub use glow_device::GlowDevice;
