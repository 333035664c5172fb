/// Conversions from JouleGL descriptors to OpenGL enums

use joulegl::jgl::device::{
    BarrierFlags, BlendEquation, BlendFactor, BufferTarget, Primitive, ShaderStage,
};

pub(crate) fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ShaderStorage => glow::SHADER_STORAGE_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

pub(crate) fn barrier_bits(barriers: BarrierFlags) -> u32 {
    if barriers.contains(BarrierFlags::ALL) {
        return glow::ALL_BARRIER_BITS;
    }

    let table = [
        (BarrierFlags::VERTEX_ATTRIB_ARRAY, glow::VERTEX_ATTRIB_ARRAY_BARRIER_BIT),
        (BarrierFlags::ELEMENT_ARRAY, glow::ELEMENT_ARRAY_BARRIER_BIT),
        (BarrierFlags::UNIFORM, glow::UNIFORM_BARRIER_BIT),
        (BarrierFlags::COMMAND, glow::COMMAND_BARRIER_BIT),
        (BarrierFlags::BUFFER_UPDATE, glow::BUFFER_UPDATE_BARRIER_BIT),
        (BarrierFlags::SHADER_STORAGE, glow::SHADER_STORAGE_BARRIER_BIT),
    ];
    table.iter()
        .filter(|(flag, _)| barriers.contains(*flag))
        .fold(0, |bits, (_, gl_bit)| bits | gl_bit)
}

pub(crate) fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::Compute => glow::COMPUTE_SHADER,
    }
}

pub(crate) fn primitive(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Points => glow::POINTS,
        Primitive::LineStrip => glow::LINE_STRIP,
        Primitive::LineLoop => glow::LINE_LOOP,
        Primitive::Lines => glow::LINES,
        Primitive::LineStripAdjacency => glow::LINE_STRIP_ADJACENCY,
        Primitive::LinesAdjacency => glow::LINES_ADJACENCY,
        Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
        Primitive::TriangleFan => glow::TRIANGLE_FAN,
        Primitive::Triangles => glow::TRIANGLES,
        Primitive::TriangleStripAdjacency => glow::TRIANGLE_STRIP_ADJACENCY,
        Primitive::TrianglesAdjacency => glow::TRIANGLES_ADJACENCY,
    }
}

pub(crate) fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => glow::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => glow::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => glow::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => glow::ONE_MINUS_CONSTANT_ALPHA,
    }
}

pub(crate) fn blend_equation(equation: BlendEquation) -> u32 {
    match equation {
        BlendEquation::Add => glow::FUNC_ADD,
        BlendEquation::Subtract => glow::FUNC_SUBTRACT,
        BlendEquation::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
        BlendEquation::Min => glow::MIN,
        BlendEquation::Max => glow::MAX,
    }
}

/// Limit reported through a 32-bit query
///
/// Negative values come from 64-bit limits that do not fit and are
/// clamped to `i32::MAX`.
pub(crate) fn queried_limit(value: i32) -> usize {
    if value < 0 {
        i32::MAX as usize
    } else {
        value as usize
    }
}

#[cfg(test)]
#[path = "glow_mapping_tests.rs"]
mod tests;
