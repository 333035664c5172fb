/// BufferView - another buffer's storage seen through a different layout
///
/// A view never owns the handle: it reports the source's loaded state and
/// size, binds whatever handle the source currently exposes (the primary of
/// a swapping buffer), and deleting it does nothing.

use crate::buffer::{bind_handle, BindMode, BufferKind, BufferObject, SharedBuffer, VertexLayout};
use crate::context::ContextRef;
use crate::error::{Error, Result};
use crate::graphics_device::BufferHandle;
use crate::gl_bail;

const SOURCE: &str = "joulegl::BufferView";

pub struct BufferView {
    ctx: ContextRef,
    source: SharedBuffer,
    label: String,
    kind: BufferKind,
    layout: VertexLayout,
}

impl BufferView {
    pub fn new(ctx: &ContextRef, source: SharedBuffer, kind: BufferKind, layout: VertexLayout) -> Self {
        let label = format!("{} (view)", source.borrow().label());
        Self {
            ctx: ContextRef::clone(ctx),
            source,
            label,
            kind,
            layout,
        }
    }

    pub fn kind(&self) -> BufferKind { self.kind }

    pub fn layout(&self) -> &VertexLayout { &self.layout }

    /// Buffer the view aliases
    pub fn source(&self) -> &SharedBuffer { &self.source }

    /// Views do not own their handle
    pub fn delete(&mut self) {}
}

impl BufferObject for BufferView {
    fn label(&self) -> &str { &self.label }

    fn is_loaded(&self) -> bool {
        self.source.borrow().is_loaded()
    }

    fn size(&self) -> usize {
        self.source.borrow().size()
    }

    fn current_handle(&self) -> Option<BufferHandle> {
        self.source.borrow().current_handle()
    }

    fn bind(&self, slot: u32, mode: BindMode, divisor: u32) -> Result<()> {
        let (loaded, handle) = {
            let source = self.source.borrow();
            (source.is_loaded(), source.current_handle())
        };
        if !loaded {
            gl_bail!(self.ctx, SOURCE, Error::NotLoaded(self.label.clone()));
        }
        let Some(handle) = handle else {
            gl_bail!(self.ctx, SOURCE, Error::InvalidResource(format!(
                "source of '{}' was deleted", self.label
            )));
        };
        bind_handle(&self.ctx, handle, self.kind, &self.layout, slot, mode, divisor)
    }
}

#[cfg(test)]
#[path = "buffer_view_tests.rs"]
mod tests;
