/// OverflowingVertexDataHandler - vertex data handler that also routes
/// overflow buffer segments to fixed slots
///
/// One segment per overflow buffer is bound by `bind`, selected with
/// `set_buffer`. `set_range` and `set_consecutive` bind several segments at
/// consecutive slots instead, as storage.

use std::cell::RefCell;
use std::rc::Rc;

use crate::buffer::{BindMode, BufferObject, OverflowBuffer, SharedBuffer};
use crate::context::ContextRef;
use crate::data_handler::VertexDataHandler;
use crate::error::{Error, Result};
use crate::graphics_device::VertexArrayHandle;
use crate::gl_bail;

const SOURCE: &str = "joulegl::OverflowingVertexDataHandler";

pub struct OverflowingVertexDataHandler {
    base: VertexDataHandler,
    overflow: Vec<(Rc<RefCell<OverflowBuffer>>, u32)>,
    current_segment: usize,
}

impl OverflowingVertexDataHandler {
    pub fn new(
        ctx: &ContextRef,
        targeted: Vec<(SharedBuffer, u32)>,
        overflow: Vec<(Rc<RefCell<OverflowBuffer>>, u32)>,
    ) -> Result<Self> {
        Ok(Self {
            base: VertexDataHandler::new(ctx, targeted)?,
            overflow,
            current_segment: 0,
        })
    }

    /// Register divisor overrides as (targeted buffer index, divisor)
    pub fn with_divisors(mut self, divisors: Vec<(usize, u32)>) -> Self {
        self.base = self.base.with_divisors(divisors);
        self
    }

    pub fn vertex_array(&self) -> Option<VertexArrayHandle> { self.base.vertex_array() }

    /// Select the segment `bind` exposes
    pub fn set_buffer(&mut self, segment: usize) {
        self.current_segment = segment;
    }

    pub fn current_segment(&self) -> usize { self.current_segment }

    /// Active segment count of the first overflow buffer (0 without one)
    pub fn segment_count(&self) -> usize {
        self.overflow.first()
            .map(|(buffer, _)| buffer.borrow().segment_count())
            .unwrap_or(0)
    }

    /// Segments a shader set iterates over
    ///
    /// Fails when a buffer was never loaded or when there is no overflow
    /// buffer to iterate.
    pub(crate) fn active_segments(&self) -> Result<usize> {
        self.check_loaded()?;
        if self.overflow.is_empty() {
            gl_bail!(self.base.context(), SOURCE, Error::UnsupportedHandlerType(
                "overflowing handler without overflow buffer".to_string()
            ));
        }
        Ok(self.segment_count())
    }

    fn check_loaded(&self) -> Result<()> {
        self.base.check_loaded()?;
        for (buffer, slot) in &self.overflow {
            if !buffer.borrow().is_loaded() {
                gl_bail!(self.base.context(), SOURCE, Error::BufferNotLoaded { slot: Some(*slot) });
            }
        }
        Ok(())
    }

    /// Bind the vertex array, every buffer, and the selected segment of each
    /// overflow buffer
    pub fn bind(&self, mode: BindMode) -> Result<()> {
        self.check_loaded()?;
        self.base.activate()?;
        self.base.bind_buffers(mode)?;
        for (buffer, slot) in &self.overflow {
            buffer.borrow().bind_single(self.current_segment, *slot, mode, 0)?;
        }
        Ok(())
    }

    /// Bind `count` segments from the selected one at consecutive slots,
    /// wrapping around the active segments
    pub fn set_range(&self, count: usize) -> Result<()> {
        self.check_loaded()?;
        for (buffer, slot) in &self.overflow {
            buffer.borrow().check_slots(*slot, count)?;
        }
        self.base.activate()?;
        self.base.bind_targeted_storage()?;
        for (buffer, slot) in &self.overflow {
            let buffer = buffer.borrow();
            let segments = buffer.segment_count();
            for offset in 0..count {
                let segment = (self.current_segment + offset) % segments;
                buffer.bind_single(segment, *slot + offset as u32, BindMode::Storage, 0)?;
            }
        }
        Ok(())
    }

    /// Bind every active segment at consecutive slots
    pub fn set_consecutive(&self) -> Result<()> {
        self.check_loaded()?;
        for (buffer, slot) in &self.overflow {
            let buffer = buffer.borrow();
            buffer.check_slots(*slot, buffer.segment_count())?;
        }
        self.base.activate()?;
        self.base.bind_targeted_storage()?;
        for (buffer, slot) in &self.overflow {
            buffer.borrow().bind_consecutive(*slot)?;
        }
        Ok(())
    }

    /// Release the vertex array (the buffers stay alive)
    pub fn delete(&mut self) -> Result<()> {
        self.base.delete()
    }
}

#[cfg(test)]
#[path = "overflowing_vertex_data_handler_tests.rs"]
mod tests;
