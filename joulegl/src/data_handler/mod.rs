/// Data handler module - vertex arrays and the buffers bound with them

pub mod vertex_data_handler;
pub mod overflowing_vertex_data_handler;

pub use vertex_data_handler::*;
pub use overflowing_vertex_data_handler::*;

use crate::buffer::BindMode;
use crate::error::Result;

/// Handler driving a shader set
pub enum DataHandler {
    /// Buffers bound once per use
    Default(VertexDataHandler),
    /// Buffers bound once per overflow segment
    Overflowing(OverflowingVertexDataHandler),
}

impl DataHandler {
    /// Bind the vertex array and the buffers (selected segment for overflowing handlers)
    pub fn bind(&self, mode: BindMode) -> Result<()> {
        match self {
            DataHandler::Default(handler) => handler.bind(mode),
            DataHandler::Overflowing(handler) => handler.bind(mode),
        }
    }

    /// Variant name for logs and errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataHandler::Default(_) => "Default",
            DataHandler::Overflowing(_) => "Overflowing",
        }
    }

    /// Release the vertex array
    pub fn delete(&mut self) -> Result<()> {
        match self {
            DataHandler::Default(handler) => handler.delete(),
            DataHandler::Overflowing(handler) => handler.delete(),
        }
    }
}

impl From<VertexDataHandler> for DataHandler {
    fn from(handler: VertexDataHandler) -> Self {
        DataHandler::Default(handler)
    }
}

impl From<OverflowingVertexDataHandler> for DataHandler {
    fn from(handler: OverflowingVertexDataHandler) -> Self {
        DataHandler::Overflowing(handler)
    }
}
