//! The drawing-engine contract consumed by the element layer.
//!
//! Every native object the engine hands out is represented by a `Copy` handle. Handles carry no
//! ownership on their own: the element layer wraps each one in an owner that releases it exactly
//! once (see `element::resource`). After a `delete_*` call the handle must never be passed to the
//! engine again.

pub mod cpu;
pub(crate) mod decode;
pub mod recording;
pub(crate) mod text;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::{Point, Rotation};
use crate::foundation::error::CanopyResult;

macro_rules! native_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) u64);

        impl $name {
            /// Construct a handle from an engine-chosen raw value.
            pub fn from_u64(raw: u64) -> Self {
                Self(raw)
            }

            /// Access the raw value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }
    };
}

native_handle!(
    /// Drawing surface (on-screen or offscreen pixel storage).
    SurfaceHandle
);
native_handle!(
    /// Draw target bound 1:1 to a surface.
    CanvasHandle
);
native_handle!(
    /// Paint descriptor.
    PaintHandle
);
native_handle!(
    /// Decoded or snapshotted image.
    ImageHandle
);
native_handle!(
    /// Laid-out text block.
    ParagraphHandle
);
native_handle!(
    /// Font-resolution context built from font bytes.
    FontContextHandle
);

/// Paint style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaintStyle {
    /// Fill geometry interiors.
    #[default]
    Fill,
    /// Stroke geometry outlines.
    Stroke,
}

/// Fully resolved paint parameters passed to [`DrawingEngine::make_paint`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintDesc {
    /// Fill or stroke.
    pub style: PaintStyle,
    /// Anti-aliasing hint.
    pub anti_alias: bool,
    /// Straight-alpha color; its alpha also acts as the opacity of image draws.
    pub color: Color,
    /// Stroke width in pixels; `0` is a hairline.
    pub stroke_width: f32,
}

impl Default for PaintDesc {
    fn default() -> Self {
        Self {
            style: PaintStyle::Fill,
            anti_alias: true,
            color: Color::BLACK,
            stroke_width: 1.0,
        }
    }
}

/// Text styling passed to [`DrawingEngine::layout_paragraph`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParagraphStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Text color.
    pub color: Color,
    /// Preferred families in priority order; empty uses the context's first family.
    pub font_families: Vec<String>,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            color: Color::BLACK,
            font_families: Vec::new(),
        }
    }
}

/// A read-back frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Primitive operations of a stateful 2D drawing engine.
///
/// Implementations own the native objects behind the handles. Callers release every handle they
/// obtained exactly once through the matching `delete_*` method; a region's draw target is the
/// exception, it lives as long as its surface.
pub trait DrawingEngine {
    /// Allocate a surface. Refusal (size limits, zero size) is a resource error.
    fn make_surface(&mut self, width: u32, height: u32) -> CanopyResult<SurfaceHandle>;
    /// Draw target bound to `surface`; repeated calls return the same target.
    fn draw_target(&mut self, surface: SurfaceHandle) -> CanopyResult<CanvasHandle>;
    /// Immutable image of everything drawn into `surface` so far.
    fn snapshot(&mut self, surface: SurfaceHandle) -> CanopyResult<ImageHandle>;
    /// Finish pending drawing into `surface`.
    fn flush(&mut self, surface: SurfaceHandle) -> CanopyResult<()>;
    /// Copy the pixels of `surface` out of the engine.
    fn read_pixels(&mut self, surface: SurfaceHandle) -> CanopyResult<FrameRGBA>;
    /// Release a surface and its draw target.
    fn delete_surface(&mut self, surface: SurfaceHandle);

    /// Replace every pixel of the target with `color`.
    fn clear(&mut self, canvas: CanvasHandle, color: Color) -> CanopyResult<()>;
    /// Push a rotation onto the target's transform stack.
    fn push_transform(&mut self, canvas: CanvasHandle, rotation: Rotation) -> CanopyResult<()>;
    /// Pop the transform pushed last.
    fn pop_transform(&mut self, canvas: CanvasHandle) -> CanopyResult<()>;
    /// Stroke a line segment.
    fn draw_line(
        &mut self,
        canvas: CanvasHandle,
        from: Point,
        to: Point,
        paint: PaintHandle,
    ) -> CanopyResult<()>;
    /// Draw an image with its top-left corner at `at`.
    fn draw_image(
        &mut self,
        canvas: CanvasHandle,
        image: ImageHandle,
        at: Point,
        paint: PaintHandle,
    ) -> CanopyResult<()>;
    /// Draw a laid-out paragraph with its top-left corner at `at`.
    fn draw_paragraph(
        &mut self,
        canvas: CanvasHandle,
        paragraph: ParagraphHandle,
        at: Point,
    ) -> CanopyResult<()>;

    /// Construct a paint.
    fn make_paint(&mut self, desc: &PaintDesc) -> PaintHandle;
    /// Release a paint.
    fn delete_paint(&mut self, paint: PaintHandle);
    /// Decode encoded image bytes (PNG, JPEG, ...). Failure is a resource error.
    fn decode_image(&mut self, bytes: &[u8]) -> CanopyResult<ImageHandle>;
    /// Release an image.
    fn delete_image(&mut self, image: ImageHandle);
    /// Build a font-resolution context from font files.
    fn make_font_context(&mut self, fonts: &[&[u8]]) -> CanopyResult<FontContextHandle>;
    /// Release a font-resolution context.
    fn delete_font_context(&mut self, fonts: FontContextHandle);
    /// Shape and lay out `text`, wrapping at `max_width`.
    fn layout_paragraph(
        &mut self,
        text: &str,
        style: &ParagraphStyle,
        fonts: FontContextHandle,
        max_width: f32,
    ) -> CanopyResult<ParagraphHandle>;
    /// Release a paragraph.
    fn delete_paragraph(&mut self, paragraph: ParagraphHandle);
}

/// Engine chosen at runtime.
pub type DynEngine = Box<dyn DrawingEngine>;

impl<E: DrawingEngine + ?Sized> DrawingEngine for Box<E> {
    fn make_surface(&mut self, width: u32, height: u32) -> CanopyResult<SurfaceHandle> {
        (**self).make_surface(width, height)
    }

    fn draw_target(&mut self, surface: SurfaceHandle) -> CanopyResult<CanvasHandle> {
        (**self).draw_target(surface)
    }

    fn snapshot(&mut self, surface: SurfaceHandle) -> CanopyResult<ImageHandle> {
        (**self).snapshot(surface)
    }

    fn flush(&mut self, surface: SurfaceHandle) -> CanopyResult<()> {
        (**self).flush(surface)
    }

    fn read_pixels(&mut self, surface: SurfaceHandle) -> CanopyResult<FrameRGBA> {
        (**self).read_pixels(surface)
    }

    fn delete_surface(&mut self, surface: SurfaceHandle) {
        (**self).delete_surface(surface)
    }

    fn clear(&mut self, canvas: CanvasHandle, color: Color) -> CanopyResult<()> {
        (**self).clear(canvas, color)
    }

    fn push_transform(&mut self, canvas: CanvasHandle, rotation: Rotation) -> CanopyResult<()> {
        (**self).push_transform(canvas, rotation)
    }

    fn pop_transform(&mut self, canvas: CanvasHandle) -> CanopyResult<()> {
        (**self).pop_transform(canvas)
    }

    fn draw_line(
        &mut self,
        canvas: CanvasHandle,
        from: Point,
        to: Point,
        paint: PaintHandle,
    ) -> CanopyResult<()> {
        (**self).draw_line(canvas, from, to, paint)
    }

    fn draw_image(
        &mut self,
        canvas: CanvasHandle,
        image: ImageHandle,
        at: Point,
        paint: PaintHandle,
    ) -> CanopyResult<()> {
        (**self).draw_image(canvas, image, at, paint)
    }

    fn draw_paragraph(
        &mut self,
        canvas: CanvasHandle,
        paragraph: ParagraphHandle,
        at: Point,
    ) -> CanopyResult<()> {
        (**self).draw_paragraph(canvas, paragraph, at)
    }

    fn make_paint(&mut self, desc: &PaintDesc) -> PaintHandle {
        (**self).make_paint(desc)
    }

    fn delete_paint(&mut self, paint: PaintHandle) {
        (**self).delete_paint(paint)
    }

    fn decode_image(&mut self, bytes: &[u8]) -> CanopyResult<ImageHandle> {
        (**self).decode_image(bytes)
    }

    fn delete_image(&mut self, image: ImageHandle) {
        (**self).delete_image(image)
    }

    fn make_font_context(&mut self, fonts: &[&[u8]]) -> CanopyResult<FontContextHandle> {
        (**self).make_font_context(fonts)
    }

    fn delete_font_context(&mut self, fonts: FontContextHandle) {
        (**self).delete_font_context(fonts)
    }

    fn layout_paragraph(
        &mut self,
        text: &str,
        style: &ParagraphStyle,
        fonts: FontContextHandle,
        max_width: f32,
    ) -> CanopyResult<ParagraphHandle> {
        (**self).layout_paragraph(text, style, fonts, max_width)
    }

    fn delete_paragraph(&mut self, paragraph: ParagraphHandle) {
        (**self).delete_paragraph(paragraph)
    }
}
