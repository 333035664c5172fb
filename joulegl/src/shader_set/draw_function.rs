/// DrawFunction - draw call issued by render shader sets
///
/// The element count given to `execute` becomes the vertex count (arrays),
/// the index count (elements) or the instance count (instanced arrays).

use crate::context::ContextRef;
use crate::error::Result;
use crate::graphics_device::{BarrierFlags, Blending, DrawCommand, DrawState, Primitive};

/// Shape of the draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Arrays,
    /// Each instance draws `instance_vertices` vertices
    ArraysInstanced { instance_vertices: u32 },
    Elements,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawFunction {
    pub kind: DrawKind,
    pub primitive: Primitive,
    pub state: DrawState,
}

impl DrawFunction {
    pub fn arrays(primitive: Primitive) -> Self {
        Self { kind: DrawKind::Arrays, primitive, state: DrawState::default() }
    }

    pub fn instanced(primitive: Primitive, instance_vertices: u32) -> Self {
        Self {
            kind: DrawKind::ArraysInstanced { instance_vertices },
            primitive,
            state: DrawState::default(),
        }
    }

    pub fn elements(primitive: Primitive) -> Self {
        Self { kind: DrawKind::Elements, primitive, state: DrawState::default() }
    }

    pub fn with_blending(mut self, blending: Blending) -> Self {
        self.state.blending = Some(blending);
        self
    }

    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.state.depth_test = enabled;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.state.line_width = Some(width);
        self
    }

    pub fn with_point_size(mut self, size: f32) -> Self {
        self.state.point_size = Some(size);
        self
    }

    /// Device command for `count` elements
    pub fn command(&self, count: usize) -> DrawCommand {
        let count = count as u32;
        match self.kind {
            DrawKind::Arrays => DrawCommand::Arrays { primitive: self.primitive, count },
            DrawKind::ArraysInstanced { instance_vertices } => DrawCommand::ArraysInstanced {
                primitive: self.primitive,
                vertices: instance_vertices,
                instance_count: count,
            },
            DrawKind::Elements => DrawCommand::Elements { primitive: self.primitive, count },
        }
    }

    /// Apply the draw state, draw, then wait for every write to land
    pub fn execute(&self, ctx: &ContextRef, count: usize) -> Result<()> {
        let mut device = ctx.device()?;
        device.apply_draw_state(&self.state);
        device.draw(&self.command(count));
        device.memory_barrier(BarrierFlags::ALL);
        Ok(())
    }
}

#[cfg(test)]
#[path = "draw_function_tests.rs"]
mod tests;
