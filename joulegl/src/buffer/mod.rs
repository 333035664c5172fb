/// Buffer module - hardware buffer wrappers
///
/// Architecture:
/// - GpuBuffer: one handle, typed uploads and readbacks
/// - BufferView: non-owning alias of another buffer with its own layout
/// - SwappingBuffer: primary/secondary ping-pong pair
/// - OverflowBuffer: payload split across as many storage buffers as needed
///
/// Every wrapper implements `BufferObject`, which is all a data handler needs.

pub mod gpu_buffer;
pub mod buffer_view;
pub mod swapping_buffer;
pub mod overflow_buffer;

pub use gpu_buffer::*;
pub use buffer_view::*;
pub use swapping_buffer::*;
pub use overflow_buffer::*;

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::GraphicsContext;
use crate::error::Result;
use crate::graphics_device::{BufferHandle, BufferTarget, VertexAttribute};

// ===== BUFFER KIND =====

/// What a buffer is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Vertex attribute source
    Array,
    /// Shader storage block, may also be read as vertex attributes
    Storage,
    /// Element indices
    Index,
}

impl BufferKind {
    /// Target used for uploads and readbacks
    pub fn target(&self) -> BufferTarget {
        match self {
            BufferKind::Array => BufferTarget::Array,
            BufferKind::Storage => BufferTarget::ShaderStorage,
            BufferKind::Index => BufferTarget::ElementArray,
        }
    }
}

// ===== BIND MODE =====

/// How a buffer is exposed to shaders when bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Indexed storage binding (compute passes)
    Storage,
    /// Vertex attribute arrays (render passes)
    VertexAttributes,
}

// ===== VERTEX LAYOUT =====

/// One attribute inside an object, in 4-byte components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    pub offset: usize,
    pub components: usize,
}

/// Layout of one object when a buffer is read as vertex attributes
///
/// `object_size` is the stride in 4-byte components. Attribute `i` is
/// bound at `slot + i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub object_size: usize,
    pub attributes: Vec<AttributeLayout>,
}

impl VertexLayout {
    /// Layout from parallel offset and component lists
    pub fn new(object_size: usize, offsets: &[usize], components: &[usize]) -> Self {
        Self {
            object_size,
            attributes: offsets.iter().zip(components)
                .map(|(&offset, &components)| AttributeLayout { offset, components })
                .collect(),
        }
    }

    /// Objects made of a single attribute of `components` floats
    pub fn packed(components: usize) -> Self {
        Self::new(components, &[0], &[components])
    }

    /// Object size in bytes
    pub fn object_bytes(&self) -> usize {
        self.object_size * 4
    }
}

impl Default for VertexLayout {
    /// One vec4 per object
    fn default() -> Self {
        Self::packed(4)
    }
}

// ===== BUFFER DESC =====

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Name used in logs and errors
    pub label: String,
    pub kind: BufferKind,
    pub layout: VertexLayout,
}

impl BufferDesc {
    pub fn new(label: impl Into<String>, kind: BufferKind) -> Self {
        Self {
            label: label.into(),
            kind,
            layout: VertexLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: VertexLayout) -> Self {
        self.layout = layout;
        self
    }
}

// ===== BUFFER OBJECT TRAIT =====

/// Anything a data handler can bind at a slot
pub trait BufferObject {
    /// Name used in logs and errors
    fn label(&self) -> &str;

    /// True once data has been uploaded
    fn is_loaded(&self) -> bool;

    /// Byte size of the data behind `current_handle`
    fn size(&self) -> usize;

    /// Handle `bind` uses, None once deleted
    fn current_handle(&self) -> Option<BufferHandle>;

    /// Bind for shader access
    ///
    /// # Arguments
    ///
    /// * `slot` - Storage binding index, or first attribute location
    /// * `mode` - Storage block or vertex attributes
    /// * `divisor` - Instancing divisor, applied when nonzero
    fn bind(&self, slot: u32, mode: BindMode, divisor: u32) -> Result<()>;
}

/// Buffer shared between its owner and the handlers that bind it
pub type SharedBuffer = Rc<RefCell<dyn BufferObject>>;

/// Wrap a buffer for sharing with handlers
pub fn shared<B: BufferObject + 'static>(buffer: B) -> Rc<RefCell<B>> {
    Rc::new(RefCell::new(buffer))
}

/// Issue the driver calls binding `handle` with the given kind and layout
pub(crate) fn bind_handle(
    ctx: &GraphicsContext,
    handle: BufferHandle,
    kind: BufferKind,
    layout: &VertexLayout,
    slot: u32,
    mode: BindMode,
    divisor: u32,
) -> Result<()> {
    let mut device = ctx.device()?;
    match (kind, mode) {
        (BufferKind::Index, _) => device.bind_buffer(BufferTarget::ElementArray, handle),
        (BufferKind::Storage, BindMode::Storage) => device.bind_storage_buffer(slot, handle),
        (BufferKind::Array, _) | (BufferKind::Storage, BindMode::VertexAttributes) => {
            device.bind_buffer(BufferTarget::Array, handle)?;
            let stride = layout.object_bytes() as i32;
            for (i, attribute) in layout.attributes.iter().enumerate() {
                device.vertex_attribute(&VertexAttribute {
                    location: slot + i as u32,
                    components: attribute.components as i32,
                    stride,
                    offset: (attribute.offset * 4) as i32,
                    divisor,
                });
            }
            Ok(())
        }
    }
}
