/// SwappingBuffer - ping-pong pair for compute passes reading last frame's state
///
/// A storage bind exposes the primary at `slot` and the secondary at
/// `slot + 1`: shaders read the primary and write the secondary, then the
/// application calls `swap()`. `load` writes the same data to both sides and
/// leaves the orientation unchanged.

use std::mem;
use bytemuck::Pod;

use crate::buffer::{BindMode, BufferDesc, BufferKind, BufferObject, GpuBuffer};
use crate::context::ContextRef;
use crate::error::Result;
use crate::graphics_device::BufferHandle;
use crate::gl_trace;

const SOURCE: &str = "joulegl::SwappingBuffer";

pub struct SwappingBuffer {
    primary: GpuBuffer,
    secondary: GpuBuffer,
}

impl SwappingBuffer {
    /// Allocate both handles
    pub fn from_desc(ctx: &ContextRef, desc: BufferDesc) -> Result<Self> {
        let primary = GpuBuffer::from_desc(ctx, desc.clone())?;
        let secondary = GpuBuffer::from_desc(ctx, desc)?;
        Ok(Self { primary, secondary })
    }

    pub fn new(ctx: &ContextRef, label: impl Into<String>, kind: BufferKind) -> Result<Self> {
        Self::from_desc(ctx, BufferDesc::new(label, kind))
    }

    /// Side read by shaders and by `read()`
    pub fn primary(&self) -> &GpuBuffer { &self.primary }

    /// Side written by shaders
    pub fn secondary(&self) -> &GpuBuffer { &self.secondary }

    pub fn object_size(&self) -> usize { self.primary.object_size() }

    /// Exchange primary and secondary
    pub fn swap(&mut self) {
        mem::swap(&mut self.primary, &mut self.secondary);
    }

    /// Upload `data` to both sides
    pub fn load<T: Pod>(&mut self, data: &[T]) -> Result<()> {
        self.primary.load(data)?;
        self.secondary.load(data)?;
        gl_trace!(self.primary.context(), SOURCE, "Loaded both sides of '{}'", self.primary.label());
        Ok(())
    }

    /// Content of the primary side
    pub fn read<T: Pod>(&self) -> Result<Vec<T>> {
        self.primary.read()
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        self.primary.read_bytes()
    }

    /// Zero both sides
    pub fn clear(&mut self) -> Result<()> {
        self.primary.clear()?;
        self.secondary.clear()
    }

    /// Release both handles
    pub fn delete(&mut self) -> Result<()> {
        self.primary.delete()?;
        self.secondary.delete()
    }
}

impl BufferObject for SwappingBuffer {
    fn label(&self) -> &str { self.primary.label() }

    fn is_loaded(&self) -> bool { self.primary.is_loaded() && self.secondary.is_loaded() }

    fn size(&self) -> usize { self.primary.size() }

    fn current_handle(&self) -> Option<BufferHandle> { self.primary.handle() }

    fn bind(&self, slot: u32, mode: BindMode, divisor: u32) -> Result<()> {
        match mode {
            BindMode::VertexAttributes => self.primary.bind(slot, mode, divisor),
            BindMode::Storage => {
                self.primary.bind(slot, mode, divisor)?;
                self.secondary.bind(slot + 1, mode, divisor)
            }
        }
    }
}

#[cfg(test)]
#[path = "swapping_buffer_tests.rs"]
mod tests;
