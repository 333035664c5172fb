/// Buffer targets, barrier flags and vertex attribute descriptors

use bitflags::bitflags;

/// Target a buffer is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute source
    Array,
    /// Shader storage block
    ShaderStorage,
    /// Index buffer
    ElementArray,
}

bitflags! {
    /// Memory barrier bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BarrierFlags: u32 {
        const VERTEX_ATTRIB_ARRAY = 1 << 0;
        const ELEMENT_ARRAY = 1 << 1;
        const UNIFORM = 1 << 2;
        const COMMAND = 1 << 3;
        const BUFFER_UPDATE = 1 << 4;
        const SHADER_STORAGE = 1 << 5;
        /// Every barrier bit
        const ALL = Self::VERTEX_ATTRIB_ARRAY.bits()
            | Self::ELEMENT_ARRAY.bits()
            | Self::UNIFORM.bits()
            | Self::COMMAND.bits()
            | Self::BUFFER_UPDATE.bits()
            | Self::SHADER_STORAGE.bits();
    }
}

/// One float vertex attribute read from the bound array buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute location
    pub location: u32,
    /// Components per vertex (1 to 4)
    pub components: i32,
    /// Distance between two vertices in bytes
    pub stride: i32,
    /// Offset of the first component in bytes
    pub offset: i32,
    /// Instances per attribute advance (0 = per vertex)
    pub divisor: u32,
}
