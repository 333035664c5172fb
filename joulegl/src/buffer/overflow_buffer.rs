/// OverflowBuffer - payload split across as many storage buffers as needed
///
/// Architecture:
/// - Segment capacity: largest multiple of the object size that fits in the
///   device's maximum storage block size
/// - Segment `i` holds what the split function returns for index `i`
///   (bytes `[i * capacity, (i + 1) * capacity)` with the default split)
/// - Segments are allocated on demand and never freed before `delete()`;
///   a smaller load only shrinks the active segment count
/// - The active segment count may not exceed the number of storage buffers
///   the device can bind at once

use std::mem;
use bytemuck::Pod;

use crate::buffer::{cast_bytes, BindMode, BufferDesc, BufferKind, BufferObject, GpuBuffer, VertexLayout};
use crate::context::ContextRef;
use crate::error::{Error, Result};
use crate::graphics_device::BufferHandle;
use crate::{gl_bail, gl_debug};

const SOURCE: &str = "joulegl::OverflowBuffer";

/// Produces the bytes of one segment
///
/// Arguments are the whole payload, the segment index, the segment capacity
/// in bytes and the object size in 4-byte components.
pub type SplitFn = Box<dyn Fn(&[u8], usize, usize, usize) -> Vec<u8>>;

/// Default split: consecutive `capacity`-byte slices of the payload
pub fn contiguous_split(data: &[u8], index: usize, capacity: usize, _object_size: usize) -> Vec<u8> {
    let start = (index * capacity).min(data.len());
    let end = (start + capacity).min(data.len());
    data[start..end].to_vec()
}

pub struct OverflowBuffer {
    ctx: ContextRef,
    label: String,
    layout: VertexLayout,
    split: SplitFn,
    segments: Vec<GpuBuffer>,
    /// Byte size of each active segment
    sizes: Vec<usize>,
    total_size: usize,
    element_size: usize,
    loaded: bool,
}

impl OverflowBuffer {
    /// Create with the contiguous split
    pub fn new(ctx: &ContextRef, label: impl Into<String>, layout: VertexLayout) -> Result<Self> {
        Self::with_split(ctx, label, layout, Box::new(contiguous_split))
    }

    /// Create with a custom split function
    ///
    /// The first segment is allocated immediately.
    pub fn with_split(
        ctx: &ContextRef,
        label: impl Into<String>,
        layout: VertexLayout,
        split: SplitFn,
    ) -> Result<Self> {
        let mut buffer = Self {
            ctx: ContextRef::clone(ctx),
            label: label.into(),
            layout,
            split,
            segments: Vec::new(),
            sizes: Vec::new(),
            total_size: 0,
            element_size: 4,
            loaded: false,
        };
        buffer.capacity()?;
        buffer.allocate_segments(1)?;
        Ok(buffer)
    }

    // ===== ACCESSORS =====

    /// Bytes one segment can hold
    pub fn capacity(&self) -> Result<usize> {
        let max = self.ctx.limits().max_storage_block_size;
        let object_bytes = self.layout.object_bytes();
        if object_bytes == 0 || object_bytes > max {
            gl_bail!(self.ctx, SOURCE, Error::CapacityExceeded {
                size: object_bytes,
                max,
            });
        }
        Ok(max / object_bytes * object_bytes)
    }

    pub fn object_size(&self) -> usize { self.layout.object_size }

    pub fn layout(&self) -> &VertexLayout { &self.layout }

    /// Number of segments holding data from the last load
    pub fn segment_count(&self) -> usize { self.sizes.len() }

    /// Byte size of each active segment
    pub fn segment_sizes(&self) -> &[usize] { &self.sizes }

    /// Number of allocated handles, active or not
    pub fn allocated_segments(&self) -> usize { self.segments.len() }

    pub fn segment(&self, index: usize) -> Option<&GpuBuffer> {
        self.segments.get(index)
    }

    /// Byte size of the whole payload
    pub fn total_size(&self) -> usize { self.total_size }

    pub fn element_size(&self) -> usize { self.element_size }

    /// Number of objects stored in one segment
    pub fn get_objects(&self, index: usize) -> Result<usize> {
        let size = self.active_size(index)?;
        Ok(size / (self.layout.object_size * self.element_size))
    }

    fn active_size(&self, index: usize) -> Result<usize> {
        match self.sizes.get(index) {
            Some(&size) => Ok(size),
            None => {
                gl_bail!(self.ctx, SOURCE, Error::SegmentOutOfRange {
                    index,
                    count: self.sizes.len(),
                });
            }
        }
    }

    fn allocate_segments(&mut self, count: usize) -> Result<()> {
        while self.segments.len() < count {
            let desc = BufferDesc::new(
                format!("{}[{}]", self.label, self.segments.len()),
                BufferKind::Storage,
            )
            .with_layout(self.layout.clone());
            self.segments.push(GpuBuffer::from_desc(&self.ctx, desc)?);
        }
        Ok(())
    }

    // ===== DATA =====

    /// Upload `data`, splitting it when it exceeds one segment
    pub fn load<T: Pod>(&mut self, data: &[T]) -> Result<()> {
        self.load_bytes(bytemuck::cast_slice(data), mem::size_of::<T>())
    }

    /// Upload `count` zeroed elements of `T`
    pub fn load_empty<T: Pod>(&mut self, count: usize) -> Result<()> {
        let zeros = vec![0u8; count * mem::size_of::<T>()];
        self.load_bytes(&zeros, mem::size_of::<T>())
    }

    fn load_bytes(&mut self, bytes: &[u8], element_size: usize) -> Result<()> {
        let capacity = self.capacity()?;
        let count = if bytes.len() <= capacity {
            1
        } else {
            bytes.len().div_ceil(capacity)
        };

        let max_bindings = self.ctx.limits().max_storage_buffer_bindings;
        if count > max_bindings {
            gl_bail!(self.ctx, SOURCE, Error::TooManySegments {
                required: count,
                max: max_bindings,
            });
        }

        // Nothing is uploaded until every chunk fits; a failed load keeps
        // the previous payload
        let max = self.ctx.limits().max_storage_block_size;
        let chunks: Vec<Vec<u8>> = if count == 1 {
            vec![bytes.to_vec()]
        } else {
            (0..count)
                .map(|index| (self.split)(bytes, index, capacity, self.layout.object_size))
                .collect()
        };
        if let Some(chunk) = chunks.iter().find(|chunk| chunk.len() > max) {
            gl_bail!(self.ctx, SOURCE, Error::CapacityExceeded {
                size: chunk.len(),
                max,
            });
        }

        let allocated = self.segments.len();
        self.allocate_segments(count)?;
        if self.segments.len() > allocated {
            gl_debug!(self.ctx, SOURCE, "'{}' grew to {} segments", self.label, self.segments.len());
        }

        let mut sizes = Vec::with_capacity(count);
        for (segment, chunk) in self.segments.iter_mut().zip(&chunks) {
            segment.load_bytes(chunk, element_size)?;
            sizes.push(chunk.len());
        }

        self.sizes = sizes;
        self.total_size = bytes.len();
        self.element_size = element_size.max(1);
        self.loaded = true;
        Ok(())
    }

    /// Active segments downloaded and concatenated in order
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        if !self.loaded {
            gl_bail!(self.ctx, SOURCE, Error::NotLoaded(self.label.clone()));
        }
        let mut bytes = Vec::with_capacity(self.total_size);
        for segment in &self.segments[..self.sizes.len()] {
            bytes.extend(segment.read_bytes()?);
        }
        Ok(bytes)
    }

    pub fn read<T: Pod>(&self) -> Result<Vec<T>> {
        let bytes = self.read_bytes()?;
        cast_bytes(&self.ctx, &self.label, &bytes)
    }

    /// Zero every active segment, keeping the sizes
    pub fn clear(&mut self) -> Result<()> {
        if !self.loaded {
            gl_bail!(self.ctx, SOURCE, Error::NotLoaded(self.label.clone()));
        }
        let active = self.sizes.len();
        for segment in &mut self.segments[..active] {
            segment.clear()?;
        }
        Ok(())
    }

    /// Release every allocated handle
    pub fn delete(&mut self) -> Result<()> {
        for segment in &mut self.segments {
            segment.delete()?;
        }
        self.sizes.clear();
        self.loaded = false;
        Ok(())
    }

    // ===== BINDING =====

    /// Bind one active segment
    pub fn bind_single(&self, index: usize, slot: u32, mode: BindMode, divisor: u32) -> Result<()> {
        if !self.loaded {
            gl_bail!(self.ctx, SOURCE, Error::NotLoaded(self.label.clone()));
        }
        self.active_size(index)?;
        self.segments[index].bind(slot, mode, divisor)
    }

    /// Bind every active segment as storage at `start_slot`, `start_slot + 1`, ...
    pub fn bind_consecutive(&self, start_slot: u32) -> Result<()> {
        if !self.loaded {
            gl_bail!(self.ctx, SOURCE, Error::NotLoaded(self.label.clone()));
        }
        self.check_slots(start_slot, self.sizes.len())?;
        for (index, segment) in self.segments[..self.sizes.len()].iter().enumerate() {
            segment.bind(start_slot + index as u32, BindMode::Storage, 0)?;
        }
        Ok(())
    }

    /// Fails unless slots `start_slot .. start_slot + count` are all bindable
    pub(crate) fn check_slots(&self, start_slot: u32, count: usize) -> Result<()> {
        let max = self.ctx.limits().max_storage_buffer_bindings;
        let required = start_slot as usize + count;
        if required > max {
            gl_bail!(self.ctx, SOURCE, Error::TooManySegments { required, max });
        }
        Ok(())
    }
}

/// As a plain buffer object an overflow buffer exposes its first segment
impl BufferObject for OverflowBuffer {
    fn label(&self) -> &str { &self.label }

    fn is_loaded(&self) -> bool { self.loaded }

    fn size(&self) -> usize {
        self.sizes.first().copied().unwrap_or(0)
    }

    fn current_handle(&self) -> Option<BufferHandle> {
        self.segments.first().and_then(|segment| segment.handle())
    }

    fn bind(&self, slot: u32, mode: BindMode, divisor: u32) -> Result<()> {
        self.bind_single(0, slot, mode, divisor)
    }
}

#[cfg(test)]
#[path = "overflow_buffer_tests.rs"]
mod tests;
