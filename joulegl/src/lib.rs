/*!
# JouleGL

GPU resource and shader-set binding helpers for small OpenGL-style compute
and rendering demos.

Every driver call goes through the `GraphicsDevice` trait. Backends (the
`joulegl_glow` crate) provide the implementation, and a `GraphicsContext`
ties a device to its hardware limits and logger.

## Architecture

- **GpuBuffer / SwappingBuffer / OverflowBuffer / BufferView**: buffer
  wrappers (plain, ping-pong pair, split across storage blocks, alias)
- **VertexDataHandler / OverflowingVertexDataHandler**: vertex array plus the
  buffers bound at fixed slots
- **ShaderProgram**: linked program with a uniform cache fed by a `ShaderConfig`
- **ShaderSet**: program + data handler + draw or compute execution
- **Processor**: named programs and sets run against a config
*/

// Internal modules
mod error;
mod context;
pub mod log;
pub mod graphics_device;
pub mod buffer;
pub mod data_handler;
pub mod shader;
pub mod shader_set;
pub mod processor;

#[cfg(test)]
mod test_support;

// Main jgl namespace module
pub mod jgl {
    // Error types
    pub use crate::error::{Error, Result};

    // Context
    pub use crate::context::{ContextConfig, ContextRef, GraphicsContext};

    // Logging sub-module (types only, the gl_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Device trait and descriptors
    pub mod device {
        pub use crate::graphics_device::*;
    }

    pub mod buffer {
        pub use crate::buffer::*;
    }

    pub mod data_handler {
        pub use crate::data_handler::*;
    }

    pub mod shader {
        pub use crate::shader::*;
        pub use crate::shader_set::*;
    }

    pub use crate::processor::Processor;
}

// Re-export math library at crate root
pub use glam;
