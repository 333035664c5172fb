//! Error types for JouleGL
//!
//! Every error here is a precondition violation reported synchronously to the
//! caller: wrong buffer size, buffer used before load, bad configuration.
//! None of them are transient, so nothing is retried.

use std::fmt;

/// Result type for JouleGL operations
pub type Result<T> = std::result::Result<T, Error>;

/// JouleGL errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Payload larger than a hardware limit, with no splitting strategy
    CapacityExceeded {
        /// Requested size in bytes
        size: usize,
        /// Hardware maximum in bytes
        max: usize,
    },

    /// Bind or read attempted on a buffer that was never loaded
    NotLoaded(String),

    /// A data handler references a buffer that was never loaded
    BufferNotLoaded {
        /// Binding slot of the offending buffer (None for untargeted buffers)
        slot: Option<u32>,
    },

    /// Overflow split needs more simultaneous bindings than the hardware allows
    TooManySegments {
        /// Segments required by the payload
        required: usize,
        /// Maximum bindable storage buffers
        max: usize,
    },

    /// Overflow segment index outside of the loaded segments
    SegmentOutOfRange {
        index: usize,
        count: usize,
    },

    /// Uniform setter requested for an unregistered type tag
    UnknownUniformType(String),

    /// Uniform value shape does not match the setter of its cached entry
    UniformValueMismatch {
        name: String,
        expected: &'static str,
    },

    /// The data handler variant does not support the requested operation
    UnsupportedHandlerType(String),

    /// Shader setting with the wrong number of source files
    InvalidShaderSetting(String),

    /// Shader compilation or program linking failed
    ShaderCompilation(String),

    /// Shader source templating failed
    ShaderParse(String),

    /// File system error (message of the underlying io::Error)
    Io(String),

    /// Backend-specific error (OpenGL, mock, ...)
    BackendError(String),

    /// Invalid resource (deleted handle, wrong program kind, unknown name...)
    InvalidResource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityExceeded { size, max } => {
                write!(f, "Capacity exceeded: {} bytes, max {} bytes", size, max)
            }
            Error::NotLoaded(what) => write!(f, "Buffer not loaded: {}", what),
            Error::BufferNotLoaded { slot: Some(slot) } => {
                write!(f, "Buffer at slot {} was not initialized with data", slot)
            }
            Error::BufferNotLoaded { slot: None } => {
                write!(f, "Untargeted buffer was not initialized with data")
            }
            Error::TooManySegments { required, max } => write!(
                f,
                "Too many segments: {} required, {} bindable storage buffers",
                required, max
            ),
            Error::SegmentOutOfRange { index, count } => {
                write!(f, "Segment {} out of range ({} segments)", index, count)
            }
            Error::UnknownUniformType(tag) => {
                write!(f, "Uniform setter function for '{}' not defined", tag)
            }
            Error::UniformValueMismatch { name, expected } => {
                write!(f, "Uniform '{}' expects a {} value", name, expected)
            }
            Error::UnsupportedHandlerType(msg) => write!(f, "Unsupported handler type: {}", msg),
            Error::InvalidShaderSetting(msg) => write!(f, "Invalid shader setting: {}", msg),
            Error::ShaderCompilation(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::ShaderParse(msg) => write!(f, "Shader parse error: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
