/// GpuBuffer - one hardware buffer handle with typed uploads and readbacks
///
/// The handle is allocated at construction and released exactly once, by
/// `delete()` or on drop. Storage buffers refuse payloads larger than the
/// device's maximum storage block size.

use std::mem;
use bytemuck::Pod;

use crate::buffer::{bind_handle, BindMode, BufferDesc, BufferKind, BufferObject, VertexLayout};
use crate::context::ContextRef;
use crate::error::{Error, Result};
use crate::graphics_device::BufferHandle;
use crate::{gl_bail, gl_err, gl_trace, gl_warn};

const SOURCE: &str = "joulegl::GpuBuffer";

pub struct GpuBuffer {
    ctx: ContextRef,
    label: String,
    handle: Option<BufferHandle>,
    kind: BufferKind,
    layout: VertexLayout,
    loaded: bool,
    size: usize,
    element_size: usize,
}

impl GpuBuffer {
    /// Allocate a buffer handle
    pub fn from_desc(ctx: &ContextRef, desc: BufferDesc) -> Result<Self> {
        // ========== VALIDATION ==========
        if desc.layout.object_size == 0 {
            gl_bail!(ctx, SOURCE, Error::InvalidResource(format!(
                "buffer '{}' has a zero object size", desc.label
            )));
        }
        if let Some(attribute) = desc.layout.attributes.iter()
            .find(|a| a.components == 0 || a.components > 4 || a.offset + a.components > desc.layout.object_size)
        {
            gl_bail!(ctx, SOURCE, Error::InvalidResource(format!(
                "buffer '{}': attribute at offset {} with {} components does not fit an object of {}",
                desc.label, attribute.offset, attribute.components, desc.layout.object_size
            )));
        }

        // ========== CREATE HANDLE ==========
        let handle = ctx.device()?.create_buffer()?;

        Ok(Self {
            ctx: ContextRef::clone(ctx),
            label: desc.label,
            handle: Some(handle),
            kind: desc.kind,
            layout: desc.layout,
            loaded: false,
            size: 0,
            element_size: 4,
        })
    }

    /// Allocate a buffer with the default layout (one vec4 per object)
    pub fn new(ctx: &ContextRef, label: impl Into<String>, kind: BufferKind) -> Result<Self> {
        Self::from_desc(ctx, BufferDesc::new(label, kind))
    }

    // ===== ACCESSORS =====

    pub fn kind(&self) -> BufferKind { self.kind }

    pub fn layout(&self) -> &VertexLayout { &self.layout }

    /// Stride of one object in 4-byte components
    pub fn object_size(&self) -> usize { self.layout.object_size }

    /// Byte width of the element type of the last upload
    pub fn element_size(&self) -> usize { self.element_size }

    pub fn handle(&self) -> Option<BufferHandle> { self.handle }

    pub fn is_deleted(&self) -> bool { self.handle.is_none() }

    pub(crate) fn context(&self) -> &ContextRef { &self.ctx }

    fn live_handle(&self) -> Result<BufferHandle> {
        match self.handle {
            Some(handle) => Ok(handle),
            None => Err(gl_err!(self.ctx, SOURCE, Error::InvalidResource(format!(
                "buffer '{}' was deleted", self.label
            )))),
        }
    }

    // ===== DATA =====

    /// Upload `data`, replacing the previous content
    ///
    /// Unbinds the current vertex array first so the upload never alters
    /// a handler's recorded state.
    pub fn load<T: Pod>(&mut self, data: &[T]) -> Result<()> {
        self.load_bytes(bytemuck::cast_slice(data), mem::size_of::<T>())
    }

    pub(crate) fn load_bytes(&mut self, bytes: &[u8], element_size: usize) -> Result<()> {
        let handle = self.live_handle()?;

        if self.kind == BufferKind::Storage {
            let max = self.ctx.limits().max_storage_block_size;
            if bytes.len() > max {
                gl_bail!(self.ctx, SOURCE, Error::CapacityExceeded {
                    size: bytes.len(),
                    max,
                });
            }
        }

        {
            let mut device = self.ctx.device()?;
            device.bind_vertex_array(None)?;
            device.upload_buffer(self.kind.target(), handle, bytes)?;
        }

        self.size = bytes.len();
        self.element_size = element_size.max(1);
        self.loaded = true;
        gl_trace!(self.ctx, SOURCE, "Loaded {} bytes into '{}'", bytes.len(), self.label);
        Ok(())
    }

    /// Download the whole content as raw bytes
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        if !self.loaded {
            gl_bail!(self.ctx, SOURCE, Error::NotLoaded(self.label.clone()));
        }
        let handle = self.live_handle()?;
        let bytes = self.ctx.device()?.read_buffer(self.kind.target(), handle, self.size)?;
        Ok(bytes)
    }

    /// Download the whole content as `T` elements
    pub fn read<T: Pod>(&self) -> Result<Vec<T>> {
        let bytes = self.read_bytes()?;
        cast_bytes(&self.ctx, &self.label, &bytes)
    }

    /// Zero the content in place, keeping the size
    pub fn clear(&mut self) -> Result<()> {
        if !self.loaded {
            gl_bail!(self.ctx, SOURCE, Error::NotLoaded(self.label.clone()));
        }
        let handle = self.live_handle()?;
        self.ctx.device()?.clear_buffer(handle, self.size)
    }

    /// Release the handle (a second call does nothing)
    pub fn delete(&mut self) -> Result<()> {
        if let Some(handle) = self.handle {
            self.ctx.device()?.delete_buffer(handle);
            self.handle = None;
            self.loaded = false;
        }
        Ok(())
    }
}

impl BufferObject for GpuBuffer {
    fn label(&self) -> &str { &self.label }

    fn is_loaded(&self) -> bool { self.loaded }

    fn size(&self) -> usize { self.size }

    fn current_handle(&self) -> Option<BufferHandle> { self.handle }

    fn bind(&self, slot: u32, mode: BindMode, divisor: u32) -> Result<()> {
        if !self.loaded {
            gl_bail!(self.ctx, SOURCE, Error::NotLoaded(self.label.clone()));
        }
        let handle = self.live_handle()?;
        bind_handle(&self.ctx, handle, self.kind, &self.layout, slot, mode, divisor)
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            match self.ctx.device() {
                Ok(mut device) => device.delete_buffer(handle),
                Err(_) => {
                    gl_warn!(self.ctx, SOURCE, "Device busy, buffer '{}' leaked on drop", self.label);
                }
            }
        }
    }
}

/// Reinterpret downloaded bytes as `T` elements
pub(crate) fn cast_bytes<T: Pod>(ctx: &ContextRef, label: &str, bytes: &[u8]) -> Result<Vec<T>> {
    let width = mem::size_of::<T>();
    if width == 0 || bytes.len() % width != 0 {
        gl_bail!(ctx, SOURCE, Error::InvalidResource(format!(
            "{} bytes read from '{}' are not a whole number of {}-byte elements",
            bytes.len(), label, width
        )));
    }
    Ok(bytemuck::allocation::pod_collect_to_vec(bytes))
}

#[cfg(test)]
#[path = "gpu_buffer_tests.rs"]
mod tests;
