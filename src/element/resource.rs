use std::fmt::Debug;

use crate::engine::{
    DrawingEngine, FontContextHandle, ImageHandle, PaintHandle, ParagraphHandle, SurfaceHandle,
};
use crate::foundation::error::CanopyResult;

/// A native handle that can be returned to the engine that produced it.
pub(crate) trait NativeHandle: Copy + Debug {
    const KIND: &'static str;

    fn delete(self, engine: &mut dyn DrawingEngine);
}

impl NativeHandle for SurfaceHandle {
    const KIND: &'static str = "surface";

    fn delete(self, engine: &mut dyn DrawingEngine) {
        engine.delete_surface(self);
    }
}

impl NativeHandle for PaintHandle {
    const KIND: &'static str = "paint";

    fn delete(self, engine: &mut dyn DrawingEngine) {
        engine.delete_paint(self);
    }
}

impl NativeHandle for ImageHandle {
    const KIND: &'static str = "image";

    fn delete(self, engine: &mut dyn DrawingEngine) {
        engine.delete_image(self);
    }
}

impl NativeHandle for ParagraphHandle {
    const KIND: &'static str = "paragraph";

    fn delete(self, engine: &mut dyn DrawingEngine) {
        engine.delete_paragraph(self);
    }
}

impl NativeHandle for FontContextHandle {
    const KIND: &'static str = "font context";

    fn delete(self, engine: &mut dyn DrawingEngine) {
        engine.delete_font_context(self);
    }
}

/// Exclusive owner of at most one native handle.
///
/// The handle is returned to the engine by [`Owned::release`] or [`Owned::recreate`]; both take
/// the engine explicitly, so an `Owned` dropped while still holding a handle can only report the
/// leak.
#[derive(Debug)]
pub(crate) struct Owned<H: NativeHandle> {
    handle: Option<H>,
}

impl<H: NativeHandle> Default for Owned<H> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<H: NativeHandle> Owned<H> {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self) -> Option<H> {
        self.handle
    }

    /// Release the current handle (if any), then store the one produced by `create`.
    ///
    /// When `create` fails the owner is left empty.
    pub(crate) fn recreate(
        &mut self,
        engine: &mut dyn DrawingEngine,
        create: impl FnOnce(&mut dyn DrawingEngine) -> CanopyResult<H>,
    ) -> CanopyResult<H> {
        self.release(engine);
        let handle = create(engine)?;
        self.handle = Some(handle);
        Ok(handle)
    }

    /// Store the handle produced by `create` unless one is already held.
    pub(crate) fn get_or_create(
        &mut self,
        engine: &mut dyn DrawingEngine,
        create: impl FnOnce(&mut dyn DrawingEngine) -> CanopyResult<H>,
    ) -> CanopyResult<H> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }
        let handle = create(engine)?;
        self.handle = Some(handle);
        Ok(handle)
    }

    /// Return the handle to the engine. Returns `false` when nothing was held.
    pub(crate) fn release(&mut self, engine: &mut dyn DrawingEngine) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.delete(engine);
                true
            }
            None => false,
        }
    }
}

impl<H: NativeHandle> Drop for Owned<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::warn!(kind = H::KIND, ?handle, "native handle dropped without release");
        }
    }
}

/// Run `f` with `handle`, then release `handle` whatever `f` returned.
pub(crate) fn with_transient<H: NativeHandle, R>(
    engine: &mut dyn DrawingEngine,
    handle: H,
    f: impl FnOnce(&mut dyn DrawingEngine, H) -> CanopyResult<R>,
) -> CanopyResult<R> {
    let out = f(engine, handle);
    handle.delete(engine);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/element/resource.rs"]
mod tests;
