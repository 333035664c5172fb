/// Draw call and fixed-function state descriptors

/// Primitive assembly mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Points,
    LineStrip,
    LineLoop,
    Lines,
    LineStripAdjacency,
    LinesAdjacency,
    TriangleStrip,
    TriangleFan,
    Triangles,
    TriangleStripAdjacency,
    TrianglesAdjacency,
}

/// Blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

/// Blend equation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendEquation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Blending configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blending {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub equation_rgb: BlendEquation,
    pub equation_alpha: BlendEquation,
}

impl Blending {
    /// Additive blending (src + dst)
    pub fn additive() -> Self {
        Self {
            src: BlendFactor::One,
            dst: BlendFactor::One,
            equation_rgb: BlendEquation::Add,
            equation_alpha: BlendEquation::Add,
        }
    }
}

/// Fixed-function state applied before a draw
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawState {
    /// None disables blending
    pub blending: Option<Blending>,
    pub depth_test: bool,
    pub line_width: Option<f32>,
    /// Point diameter in pixels (None keeps the current size)
    pub point_size: Option<f32>,
}

/// One draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    /// Non-indexed draw of `count` vertices
    Arrays { primitive: Primitive, count: u32 },
    /// `instance_count` instances of `vertices` vertices each
    ArraysInstanced { primitive: Primitive, vertices: u32, instance_count: u32 },
    /// Indexed draw of `count` u32 indices from the bound element buffer
    Elements { primitive: Primitive, count: u32 },
}
