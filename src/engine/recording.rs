//! A drawing engine that performs no rasterization and records every call it receives.
//!
//! Useful for asserting call order, counting constructions/deletions per handle kind, and
//! catching lifetime bugs: any use or deletion of a handle that is not alive is recorded as a
//! [`Violation`] instead of panicking, so a test can assert that none occurred.

use std::collections::{BTreeMap, HashSet};

use crate::engine::{
    CanvasHandle, DrawingEngine, FontContextHandle, FrameRGBA, ImageHandle, PaintDesc,
    PaintHandle, ParagraphHandle, ParagraphStyle, SurfaceHandle,
};
use crate::foundation::color::Color;
use crate::foundation::core::{Point, Rotation};
use crate::foundation::error::{CanopyError, CanopyResult};

/// Kinds of native objects tracked by [`RecordingEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandleKind {
    /// Surfaces.
    Surface,
    /// Paints.
    Paint,
    /// Images (decoded or snapshots).
    Image,
    /// Paragraphs.
    Paragraph,
    /// Font contexts.
    FontContext,
}

/// One recorded engine call. Field names mirror the [`DrawingEngine`] parameters.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    MakeSurface { surface: SurfaceHandle, width: u32, height: u32 },
    DrawTarget { surface: SurfaceHandle, canvas: CanvasHandle },
    Snapshot { surface: SurfaceHandle, image: ImageHandle },
    Flush { surface: SurfaceHandle },
    ReadPixels { surface: SurfaceHandle },
    DeleteSurface { surface: SurfaceHandle },
    Clear { canvas: CanvasHandle, color: Color },
    PushTransform { canvas: CanvasHandle, rotation: Rotation },
    PopTransform { canvas: CanvasHandle },
    DrawLine { canvas: CanvasHandle, from: Point, to: Point, paint: PaintHandle },
    DrawImage { canvas: CanvasHandle, image: ImageHandle, at: Point, paint: PaintHandle },
    DrawParagraph { canvas: CanvasHandle, paragraph: ParagraphHandle, at: Point },
    MakePaint { paint: PaintHandle, desc: PaintDesc },
    DeletePaint { paint: PaintHandle },
    DecodeImage { image: ImageHandle, len: usize },
    DeleteImage { image: ImageHandle },
    MakeFontContext { fonts: FontContextHandle, files: usize },
    DeleteFontContext { fonts: FontContextHandle },
    LayoutParagraph { paragraph: ParagraphHandle, text: String, max_width: f32 },
    DeleteParagraph { paragraph: ParagraphHandle },
}

impl EngineCall {
    /// Whether the call draws into a target (clear, line, image, paragraph).
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::Clear { .. }
                | Self::DrawLine { .. }
                | Self::DrawImage { .. }
                | Self::DrawParagraph { .. }
        )
    }
}

/// Use of a handle that was never created or already deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Operation that received the handle.
    pub op: &'static str,
    /// Kind of the offending handle.
    pub kind: HandleKind,
    /// Raw handle value.
    pub raw: u64,
}

/// Call-recording engine with handle-lifetime validation.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    next_id: u64,
    max_surface_dim: Option<u32>,
    fail_decode: bool,
    calls: Vec<EngineCall>,
    live: HashSet<(HandleKind, u64)>,
    canvases: HashSet<u64>,
    transform_depth: BTreeMap<u64, usize>,
    created: BTreeMap<HandleKind, usize>,
    deleted: BTreeMap<HandleKind, usize>,
    violations: Vec<Violation>,
}

impl RecordingEngine {
    /// Engine with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse surfaces wider or taller than `max`.
    pub fn with_max_surface_dim(mut self, max: u32) -> Self {
        self.max_surface_dim = Some(max);
        self
    }

    /// Make every `decode_image` call fail.
    pub fn with_failing_decode(mut self) -> Self {
        self.fail_decode = true;
        self
    }

    /// Every call, in order.
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Only the drawing calls, in order.
    pub fn draw_calls(&self) -> Vec<&EngineCall> {
        self.calls.iter().filter(|c| c.is_draw()).collect()
    }

    /// Forget recorded calls; live handles and counters are kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Objects of `kind` constructed so far.
    pub fn created(&self, kind: HandleKind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    /// Objects of `kind` deleted so far.
    pub fn deleted(&self, kind: HandleKind) -> usize {
        self.deleted.get(&kind).copied().unwrap_or(0)
    }

    /// Objects of `kind` currently alive.
    pub fn live(&self, kind: HandleKind) -> usize {
        self.live.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Lifetime violations observed so far.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    fn alloc(&mut self, kind: HandleKind) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert((kind, id));
        *self.created.entry(kind).or_default() += 1;
        id
    }

    fn check(&mut self, op: &'static str, kind: HandleKind, raw: u64) -> bool {
        let ok = self.live.contains(&(kind, raw));
        if !ok {
            self.violations.push(Violation { op, kind, raw });
        }
        ok
    }

    fn check_canvas(&mut self, op: &'static str, canvas: CanvasHandle) -> bool {
        let ok = self.canvases.contains(&canvas.0)
            && self.live.contains(&(HandleKind::Surface, canvas.0));
        if !ok {
            self.violations.push(Violation {
                op,
                kind: HandleKind::Surface,
                raw: canvas.0,
            });
        }
        ok
    }

    fn delete(&mut self, op: &'static str, kind: HandleKind, raw: u64) {
        if self.check(op, kind, raw) {
            self.live.remove(&(kind, raw));
            *self.deleted.entry(kind).or_default() += 1;
        }
    }

    fn dead(op: &str) -> CanopyError {
        CanopyError::resource(format!("{op}: handle is not alive"))
    }
}

impl DrawingEngine for RecordingEngine {
    fn make_surface(&mut self, width: u32, height: u32) -> CanopyResult<SurfaceHandle> {
        let too_big = self
            .max_surface_dim
            .is_some_and(|max| width > max || height > max);
        if width == 0 || height == 0 || too_big {
            return Err(CanopyError::resource(format!(
                "cannot allocate {width}x{height} surface"
            )));
        }
        let surface = SurfaceHandle(self.alloc(HandleKind::Surface));
        self.calls.push(EngineCall::MakeSurface {
            surface,
            width,
            height,
        });
        Ok(surface)
    }

    fn draw_target(&mut self, surface: SurfaceHandle) -> CanopyResult<CanvasHandle> {
        if !self.check("draw_target", HandleKind::Surface, surface.0) {
            return Err(Self::dead("draw_target"));
        }
        self.canvases.insert(surface.0);
        let canvas = CanvasHandle(surface.0);
        self.calls.push(EngineCall::DrawTarget { surface, canvas });
        Ok(canvas)
    }

    fn snapshot(&mut self, surface: SurfaceHandle) -> CanopyResult<ImageHandle> {
        if !self.check("snapshot", HandleKind::Surface, surface.0) {
            return Err(Self::dead("snapshot"));
        }
        let image = ImageHandle(self.alloc(HandleKind::Image));
        self.calls.push(EngineCall::Snapshot { surface, image });
        Ok(image)
    }

    fn flush(&mut self, surface: SurfaceHandle) -> CanopyResult<()> {
        if !self.check("flush", HandleKind::Surface, surface.0) {
            return Err(Self::dead("flush"));
        }
        self.calls.push(EngineCall::Flush { surface });
        Ok(())
    }

    fn read_pixels(&mut self, surface: SurfaceHandle) -> CanopyResult<FrameRGBA> {
        if !self.check("read_pixels", HandleKind::Surface, surface.0) {
            return Err(Self::dead("read_pixels"));
        }
        self.calls.push(EngineCall::ReadPixels { surface });
        Ok(FrameRGBA {
            width: 0,
            height: 0,
            data: Vec::new(),
            premultiplied: true,
        })
    }

    fn delete_surface(&mut self, surface: SurfaceHandle) {
        self.delete("delete_surface", HandleKind::Surface, surface.0);
        self.canvases.remove(&surface.0);
        self.transform_depth.remove(&surface.0);
        self.calls.push(EngineCall::DeleteSurface { surface });
    }

    fn clear(&mut self, canvas: CanvasHandle, color: Color) -> CanopyResult<()> {
        if !self.check_canvas("clear", canvas) {
            return Err(Self::dead("clear"));
        }
        self.calls.push(EngineCall::Clear { canvas, color });
        Ok(())
    }

    fn push_transform(&mut self, canvas: CanvasHandle, rotation: Rotation) -> CanopyResult<()> {
        if !self.check_canvas("push_transform", canvas) {
            return Err(Self::dead("push_transform"));
        }
        *self.transform_depth.entry(canvas.0).or_default() += 1;
        self.calls
            .push(EngineCall::PushTransform { canvas, rotation });
        Ok(())
    }

    fn pop_transform(&mut self, canvas: CanvasHandle) -> CanopyResult<()> {
        if !self.check_canvas("pop_transform", canvas) {
            return Err(Self::dead("pop_transform"));
        }
        let depth = self.transform_depth.entry(canvas.0).or_default();
        if *depth == 0 {
            return Err(CanopyError::structural(
                "pop_transform on an empty transform stack",
            ));
        }
        *depth -= 1;
        self.calls.push(EngineCall::PopTransform { canvas });
        Ok(())
    }

    fn draw_line(
        &mut self,
        canvas: CanvasHandle,
        from: Point,
        to: Point,
        paint: PaintHandle,
    ) -> CanopyResult<()> {
        let ok = self.check_canvas("draw_line", canvas)
            & self.check("draw_line", HandleKind::Paint, paint.0);
        if !ok {
            return Err(Self::dead("draw_line"));
        }
        self.calls.push(EngineCall::DrawLine {
            canvas,
            from,
            to,
            paint,
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        canvas: CanvasHandle,
        image: ImageHandle,
        at: Point,
        paint: PaintHandle,
    ) -> CanopyResult<()> {
        let ok = self.check_canvas("draw_image", canvas)
            & self.check("draw_image", HandleKind::Image, image.0)
            & self.check("draw_image", HandleKind::Paint, paint.0);
        if !ok {
            return Err(Self::dead("draw_image"));
        }
        self.calls.push(EngineCall::DrawImage {
            canvas,
            image,
            at,
            paint,
        });
        Ok(())
    }

    fn draw_paragraph(
        &mut self,
        canvas: CanvasHandle,
        paragraph: ParagraphHandle,
        at: Point,
    ) -> CanopyResult<()> {
        let ok = self.check_canvas("draw_paragraph", canvas)
            & self.check("draw_paragraph", HandleKind::Paragraph, paragraph.0);
        if !ok {
            return Err(Self::dead("draw_paragraph"));
        }
        self.calls.push(EngineCall::DrawParagraph {
            canvas,
            paragraph,
            at,
        });
        Ok(())
    }

    fn make_paint(&mut self, desc: &PaintDesc) -> PaintHandle {
        let paint = PaintHandle(self.alloc(HandleKind::Paint));
        self.calls.push(EngineCall::MakePaint { paint, desc: *desc });
        paint
    }

    fn delete_paint(&mut self, paint: PaintHandle) {
        self.delete("delete_paint", HandleKind::Paint, paint.0);
        self.calls.push(EngineCall::DeletePaint { paint });
    }

    fn decode_image(&mut self, bytes: &[u8]) -> CanopyResult<ImageHandle> {
        if self.fail_decode || bytes.is_empty() {
            return Err(CanopyError::resource("decode image from memory: unsupported data"));
        }
        let image = ImageHandle(self.alloc(HandleKind::Image));
        self.calls.push(EngineCall::DecodeImage {
            image,
            len: bytes.len(),
        });
        Ok(image)
    }

    fn delete_image(&mut self, image: ImageHandle) {
        self.delete("delete_image", HandleKind::Image, image.0);
        self.calls.push(EngineCall::DeleteImage { image });
    }

    fn make_font_context(&mut self, fonts: &[&[u8]]) -> CanopyResult<FontContextHandle> {
        let handle = FontContextHandle(self.alloc(HandleKind::FontContext));
        self.calls.push(EngineCall::MakeFontContext {
            fonts: handle,
            files: fonts.len(),
        });
        Ok(handle)
    }

    fn delete_font_context(&mut self, fonts: FontContextHandle) {
        self.delete("delete_font_context", HandleKind::FontContext, fonts.0);
        self.calls.push(EngineCall::DeleteFontContext { fonts });
    }

    fn layout_paragraph(
        &mut self,
        text: &str,
        _style: &ParagraphStyle,
        fonts: FontContextHandle,
        max_width: f32,
    ) -> CanopyResult<ParagraphHandle> {
        if !self.check("layout_paragraph", HandleKind::FontContext, fonts.0) {
            return Err(Self::dead("layout_paragraph"));
        }
        let paragraph = ParagraphHandle(self.alloc(HandleKind::Paragraph));
        self.calls.push(EngineCall::LayoutParagraph {
            paragraph,
            text: text.to_owned(),
            max_width,
        });
        Ok(paragraph)
    }

    fn delete_paragraph(&mut self, paragraph: ParagraphHandle) {
        self.delete("delete_paragraph", HandleKind::Paragraph, paragraph.0);
        self.calls.push(EngineCall::DeleteParagraph { paragraph });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/recording.rs"]
mod tests;
