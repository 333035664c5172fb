//! Shader sets - a program, the data handler it reads, and how it executes

pub mod draw_function;
pub mod shader_set;

pub use draw_function::*;
pub use shader_set::*;
