//! Shader programs: uniform values and cache, shared uniform config,
//! source templating and program construction from files

pub mod uniform;
pub mod config;
pub mod shader_program;
pub mod shader_setting;
pub mod shader_parser;
pub mod shader_handler;

pub use uniform::*;
pub use config::*;
pub use shader_program::*;
pub use shader_setting::*;
pub use shader_parser::*;
pub use shader_handler::*;
