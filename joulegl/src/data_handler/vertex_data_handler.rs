/// VertexDataHandler - one vertex array plus the buffers bound with it
///
/// Targeted buffers are bound at their own slot, untargeted buffers at slot 0.
/// Divisor rule for targeted buffer `i`: the override registered for `i`,
/// otherwise 0 when no override exists at all, otherwise 1.
///
/// The handler owns only its vertex array; buffers are shared and are never
/// deleted through it.

use crate::buffer::{BindMode, SharedBuffer};
use crate::context::ContextRef;
use crate::error::{Error, Result};
use crate::graphics_device::{BarrierFlags, VertexArrayHandle};
use crate::{gl_bail, gl_warn};

const SOURCE: &str = "joulegl::VertexDataHandler";

pub struct VertexDataHandler {
    ctx: ContextRef,
    vertex_array: Option<VertexArrayHandle>,
    targeted: Vec<(SharedBuffer, u32)>,
    untargeted: Vec<SharedBuffer>,
    /// (targeted buffer index, divisor)
    divisors: Vec<(usize, u32)>,
}

impl VertexDataHandler {
    /// Allocate a vertex array for `targeted` (buffer, slot) pairs
    pub fn new(ctx: &ContextRef, targeted: Vec<(SharedBuffer, u32)>) -> Result<Self> {
        let vertex_array = ctx.device()?.create_vertex_array()?;
        Ok(Self {
            ctx: ContextRef::clone(ctx),
            vertex_array: Some(vertex_array),
            targeted,
            untargeted: Vec::new(),
            divisors: Vec::new(),
        })
    }

    /// Register divisor overrides as (targeted buffer index, divisor)
    pub fn with_divisors(mut self, divisors: Vec<(usize, u32)>) -> Self {
        self.divisors = divisors;
        self
    }

    /// Add buffers bound at slot 0
    pub fn with_untargeted(mut self, untargeted: Vec<SharedBuffer>) -> Self {
        self.untargeted = untargeted;
        self
    }

    pub fn vertex_array(&self) -> Option<VertexArrayHandle> { self.vertex_array }

    pub fn targeted(&self) -> &[(SharedBuffer, u32)] { &self.targeted }

    pub(crate) fn context(&self) -> &ContextRef { &self.ctx }

    /// Divisor applied to targeted buffer `index`
    pub fn divisor_for(&self, index: usize) -> u32 {
        match self.divisors.iter().find(|(target, _)| *target == index) {
            Some(&(_, divisor)) => divisor,
            None if self.divisors.is_empty() => 0,
            None => 1,
        }
    }

    /// Fail if any referenced buffer has no data yet
    pub(crate) fn check_loaded(&self) -> Result<()> {
        for (buffer, slot) in &self.targeted {
            if !buffer.borrow().is_loaded() {
                gl_bail!(self.ctx, SOURCE, Error::BufferNotLoaded { slot: Some(*slot) });
            }
        }
        for buffer in &self.untargeted {
            if !buffer.borrow().is_loaded() {
                gl_bail!(self.ctx, SOURCE, Error::BufferNotLoaded { slot: None });
            }
        }
        Ok(())
    }

    /// Full barrier, then make the vertex array current
    pub(crate) fn activate(&self) -> Result<()> {
        let Some(vertex_array) = self.vertex_array else {
            gl_bail!(self.ctx, SOURCE, Error::InvalidResource(
                "vertex data handler was deleted".to_string()
            ));
        };
        let mut device = self.ctx.device()?;
        device.memory_barrier(BarrierFlags::ALL);
        device.bind_vertex_array(Some(vertex_array))
    }

    /// Bind the vertex array and every buffer
    pub fn bind(&self, mode: BindMode) -> Result<()> {
        self.check_loaded()?;
        self.activate()?;
        self.bind_buffers(mode)
    }

    /// Bind every buffer, assuming the vertex array is current
    pub(crate) fn bind_buffers(&self, mode: BindMode) -> Result<()> {
        for (index, (buffer, slot)) in self.targeted.iter().enumerate() {
            buffer.borrow().bind(*slot, mode, self.divisor_for(index))?;
        }
        for buffer in &self.untargeted {
            buffer.borrow().bind(0, mode, 0)?;
        }
        Ok(())
    }

    /// Bind targeted buffers as storage at their slots, ignoring divisors
    pub(crate) fn bind_targeted_storage(&self) -> Result<()> {
        for (buffer, slot) in &self.targeted {
            buffer.borrow().bind(*slot, BindMode::Storage, 0)?;
        }
        Ok(())
    }

    /// Release the vertex array (the buffers stay alive)
    pub fn delete(&mut self) -> Result<()> {
        if let Some(vertex_array) = self.vertex_array {
            self.ctx.device()?.delete_vertex_array(vertex_array);
            self.vertex_array = None;
        }
        Ok(())
    }
}

impl Drop for VertexDataHandler {
    fn drop(&mut self) {
        if let Some(vertex_array) = self.vertex_array.take() {
            match self.ctx.device() {
                Ok(mut device) => device.delete_vertex_array(vertex_array),
                Err(_) => {
                    gl_warn!(self.ctx, SOURCE, "Device busy, vertex array leaked on drop");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "vertex_data_handler_tests.rs"]
mod tests;
