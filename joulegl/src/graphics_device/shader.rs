/// Shader stage and source descriptors

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    Compute,
}

/// Source code of one stage, handed to `GraphicsDevice::create_program`
#[derive(Debug, Clone, Copy)]
pub struct ShaderSource<'a> {
    pub stage: ShaderStage,
    pub code: &'a str,
}

impl<'a> ShaderSource<'a> {
    pub fn new(stage: ShaderStage, code: &'a str) -> Self {
        Self { stage, code }
    }
}
