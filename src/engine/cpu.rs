//! CPU drawing engine on `vello_cpu`, with `parley` text and `image` decoding.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::decode::decode_image;
use crate::engine::text::{FontSet, LaidOutParagraph, TextLayoutEngine};
use crate::engine::{
    CanvasHandle, DrawingEngine, FontContextHandle, FrameRGBA, ImageHandle, PaintDesc,
    PaintHandle, ParagraphHandle, ParagraphStyle, SurfaceHandle,
};
use crate::foundation::color::Color;
use crate::foundation::core::{Affine, Point, Rotation};
use crate::foundation::error::{CanopyError, CanopyResult};

/// Options for [`VelloCpuEngine`].
#[derive(Debug, Clone, Copy)]
pub struct CpuEngineOpts {
    /// Largest width or height accepted by `make_surface`.
    pub max_surface_dim: u32,
}

impl Default for CpuEngineOpts {
    fn default() -> Self {
        Self {
            max_surface_dim: 8192,
        }
    }
}

impl CpuEngineOpts {
    /// Return options with a different surface size limit.
    pub fn with_max_surface_dim(mut self, max: u32) -> Self {
        self.max_surface_dim = max;
        self
    }
}

struct CpuSurface {
    pixmap: vello_cpu::Pixmap,
    ctx: vello_cpu::RenderContext,
    transforms: Vec<Affine>,
    has_canvas: bool,
    dirty: bool,
}

impl CpuSurface {
    fn transform(&self) -> Affine {
        self.transforms
            .iter()
            .fold(Affine::IDENTITY, |acc, t| acc * *t)
    }

    /// Composite pending drawing over the stored pixels and start a fresh command list.
    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        let mut scratch = vello_cpu::Pixmap::new(self.pixmap.width(), self.pixmap.height());
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut scratch);
        premul_over_in_place(
            self.pixmap.data_as_u8_slice_mut(),
            scratch.data_as_u8_slice(),
        );
        self.ctx.reset();
        self.dirty = false;
    }
}

struct CpuImage {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// CPU raster engine built on `vello_cpu`, with `image` decoding and `parley` text layout.
///
/// Every surface owns a pixmap plus a command list; drawing calls record commands and
/// [`DrawingEngine::flush`] rasterizes them over the pixmap. A surface's draw target shares the
/// surface's raw id.
pub struct VelloCpuEngine {
    opts: CpuEngineOpts,
    next_id: u64,
    surfaces: HashMap<u64, CpuSurface>,
    paints: HashMap<u64, PaintDesc>,
    images: HashMap<u64, CpuImage>,
    paragraphs: HashMap<u64, LaidOutParagraph>,
    font_sets: HashMap<u64, FontSet>,
    text: TextLayoutEngine,
}

impl Default for VelloCpuEngine {
    fn default() -> Self {
        Self::new(CpuEngineOpts::default())
    }
}

impl VelloCpuEngine {
    /// Construct an engine with no live objects.
    pub fn new(opts: CpuEngineOpts) -> Self {
        Self {
            opts,
            next_id: 1,
            surfaces: HashMap::new(),
            paints: HashMap::new(),
            images: HashMap::new(),
            paragraphs: HashMap::new(),
            font_sets: HashMap::new(),
            text: TextLayoutEngine::new(),
        }
    }

    /// Number of native objects currently alive, across all kinds.
    pub fn live_objects(&self) -> usize {
        self.surfaces.len()
            + self.paints.len()
            + self.images.len()
            + self.paragraphs.len()
            + self.font_sets.len()
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn surface_mut(&mut self, raw: u64, what: &str) -> CanopyResult<&mut CpuSurface> {
        self.surfaces
            .get_mut(&raw)
            .ok_or_else(|| CanopyError::resource(format!("{what}: unknown surface #{raw}")))
    }

    fn canvas_mut(&mut self, canvas: CanvasHandle, what: &str) -> CanopyResult<&mut CpuSurface> {
        match self.surfaces.get_mut(&canvas.0) {
            Some(s) if s.has_canvas => Ok(s),
            _ => Err(CanopyError::resource(format!(
                "{what}: unknown draw target #{}",
                canvas.0
            ))),
        }
    }

    fn paint(&self, paint: PaintHandle, what: &str) -> CanopyResult<PaintDesc> {
        self.paints
            .get(&paint.0)
            .copied()
            .ok_or_else(|| CanopyError::resource(format!("{what}: unknown paint #{}", paint.0)))
    }
}

impl DrawingEngine for VelloCpuEngine {
    fn make_surface(&mut self, width: u32, height: u32) -> CanopyResult<SurfaceHandle> {
        let max = self.opts.max_surface_dim.min(u32::from(u16::MAX));
        if width == 0 || height == 0 || width > max || height > max {
            return Err(CanopyError::resource(format!(
                "cannot allocate {width}x{height} surface (limit {max}x{max})"
            )));
        }
        // Bounded by u16::MAX above.
        let (w, h) = (width as u16, height as u16);
        let id = self.alloc_id();
        self.surfaces.insert(
            id,
            CpuSurface {
                pixmap: vello_cpu::Pixmap::new(w, h),
                ctx: vello_cpu::RenderContext::new(w, h),
                transforms: Vec::new(),
                has_canvas: false,
                dirty: false,
            },
        );
        Ok(SurfaceHandle(id))
    }

    fn draw_target(&mut self, surface: SurfaceHandle) -> CanopyResult<CanvasHandle> {
        let s = self.surface_mut(surface.0, "draw_target")?;
        s.has_canvas = true;
        Ok(CanvasHandle(surface.0))
    }

    fn snapshot(&mut self, surface: SurfaceHandle) -> CanopyResult<ImageHandle> {
        let s = self.surface_mut(surface.0, "snapshot")?;
        s.flush();
        let (w, h) = (u32::from(s.pixmap.width()), u32::from(s.pixmap.height()));
        let pixmap = pixmap_from_premul_bytes(s.pixmap.data_as_u8_slice(), w, h)?;
        let id = self.alloc_id();
        self.images.insert(
            id,
            CpuImage {
                paint: vello_cpu::Image {
                    image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                    sampler: vello_cpu::peniko::ImageSampler::default(),
                },
                w,
                h,
            },
        );
        Ok(ImageHandle(id))
    }

    fn flush(&mut self, surface: SurfaceHandle) -> CanopyResult<()> {
        self.surface_mut(surface.0, "flush")?.flush();
        Ok(())
    }

    fn read_pixels(&mut self, surface: SurfaceHandle) -> CanopyResult<FrameRGBA> {
        let s = self.surface_mut(surface.0, "read_pixels")?;
        s.flush();
        Ok(FrameRGBA {
            width: u32::from(s.pixmap.width()),
            height: u32::from(s.pixmap.height()),
            data: s.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn delete_surface(&mut self, surface: SurfaceHandle) {
        if self.surfaces.remove(&surface.0).is_none() {
            tracing::warn!(surface = surface.0, "delete of unknown surface");
        }
    }

    fn clear(&mut self, canvas: CanvasHandle, color: Color) -> CanopyResult<()> {
        let s = self.canvas_mut(canvas, "clear")?;
        // Clearing discards pending commands.
        s.ctx.reset();
        s.dirty = false;
        clear_pixmap(&mut s.pixmap, color.to_premul().to_array());
        Ok(())
    }

    fn push_transform(&mut self, canvas: CanvasHandle, rotation: Rotation) -> CanopyResult<()> {
        let s = self.canvas_mut(canvas, "push_transform")?;
        s.transforms.push(rotation.to_affine());
        Ok(())
    }

    fn pop_transform(&mut self, canvas: CanvasHandle) -> CanopyResult<()> {
        let s = self.canvas_mut(canvas, "pop_transform")?;
        s.transforms
            .pop()
            .map(|_| ())
            .ok_or_else(|| CanopyError::structural("pop_transform on an empty transform stack"))
    }

    fn draw_line(
        &mut self,
        canvas: CanvasHandle,
        from: Point,
        to: Point,
        paint: PaintHandle,
    ) -> CanopyResult<()> {
        let desc = self.paint(paint, "draw_line")?;
        let s = self.canvas_mut(canvas, "draw_line")?;

        // Lines are always stroked; a zero width is a one pixel hairline.
        let width = if desc.stroke_width > 0.0 {
            f64::from(desc.stroke_width)
        } else {
            1.0
        };
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(from));
        path.line_to(point_to_cpu(to));

        let c = desc.color;
        let transform = affine_to_cpu(s.transform());
        s.ctx.set_transform(transform);
        s.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        s.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        s.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        s.ctx.stroke_path(&path);
        s.dirty = true;
        Ok(())
    }

    fn draw_image(
        &mut self,
        canvas: CanvasHandle,
        image: ImageHandle,
        at: Point,
        paint: PaintHandle,
    ) -> CanopyResult<()> {
        let desc = self.paint(paint, "draw_image")?;
        let img = self.images.get(&image.0).ok_or_else(|| {
            CanopyError::resource(format!("draw_image: unknown image #{}", image.0))
        })?;
        let s = self
            .surfaces
            .get_mut(&canvas.0)
            .filter(|s| s.has_canvas)
            .ok_or_else(|| {
                CanopyError::resource(format!("draw_image: unknown draw target #{}", canvas.0))
            })?;

        let opacity = f32::from(desc.color.a) / 255.0;
        let transform = affine_to_cpu(s.transform() * Affine::translate(at.to_vec2()));
        s.ctx.set_transform(transform);
        s.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        s.ctx.set_paint(img.paint.clone());
        if opacity < 1.0 {
            s.ctx.push_opacity_layer(opacity);
        }
        s.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(img.w),
            f64::from(img.h),
        ));
        if opacity < 1.0 {
            s.ctx.pop_layer();
        }
        s.dirty = true;
        Ok(())
    }

    fn draw_paragraph(
        &mut self,
        canvas: CanvasHandle,
        paragraph: ParagraphHandle,
        at: Point,
    ) -> CanopyResult<()> {
        let para = self.paragraphs.get(&paragraph.0).ok_or_else(|| {
            CanopyError::resource(format!(
                "draw_paragraph: unknown paragraph #{}",
                paragraph.0
            ))
        })?;
        let s = self
            .surfaces
            .get_mut(&canvas.0)
            .filter(|s| s.has_canvas)
            .ok_or_else(|| {
                CanopyError::resource(format!(
                    "draw_paragraph: unknown draw target #{}",
                    canvas.0
                ))
            })?;
        let Some(layout) = &para.shaped else {
            return Ok(());
        };

        let transform = affine_to_cpu(s.transform() * Affine::translate(at.to_vec2()));
        s.ctx.set_transform(transform);
        s.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                s.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                s.ctx
                    .glyph_run(run.run().font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        s.dirty = true;
        Ok(())
    }

    fn make_paint(&mut self, desc: &PaintDesc) -> PaintHandle {
        let id = self.alloc_id();
        self.paints.insert(id, *desc);
        PaintHandle(id)
    }

    fn delete_paint(&mut self, paint: PaintHandle) {
        if self.paints.remove(&paint.0).is_none() {
            tracing::warn!(paint = paint.0, "delete of unknown paint");
        }
    }

    fn decode_image(&mut self, bytes: &[u8]) -> CanopyResult<ImageHandle> {
        let decoded = decode_image(bytes)?;
        let pixmap =
            pixmap_from_premul_bytes(&decoded.rgba8_premul, decoded.width, decoded.height)?;
        let id = self.alloc_id();
        self.images.insert(
            id,
            CpuImage {
                paint: vello_cpu::Image {
                    image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                    sampler: vello_cpu::peniko::ImageSampler::default(),
                },
                w: decoded.width,
                h: decoded.height,
            },
        );
        Ok(ImageHandle(id))
    }

    fn delete_image(&mut self, image: ImageHandle) {
        if self.images.remove(&image.0).is_none() {
            tracing::warn!(image = image.0, "delete of unknown image");
        }
    }

    fn make_font_context(&mut self, fonts: &[&[u8]]) -> CanopyResult<FontContextHandle> {
        let set = self.text.register(fonts)?;
        let id = self.alloc_id();
        self.font_sets.insert(id, set);
        Ok(FontContextHandle(id))
    }

    fn delete_font_context(&mut self, fonts: FontContextHandle) {
        if self.font_sets.remove(&fonts.0).is_none() {
            tracing::warn!(font_context = fonts.0, "delete of unknown font context");
        }
    }

    fn layout_paragraph(
        &mut self,
        text: &str,
        style: &ParagraphStyle,
        fonts: FontContextHandle,
        max_width: f32,
    ) -> CanopyResult<ParagraphHandle> {
        let set = self.font_sets.get(&fonts.0).ok_or_else(|| {
            CanopyError::resource(format!(
                "layout_paragraph: unknown font context #{}",
                fonts.0
            ))
        })?;
        let laid = self.text.layout(text, style, set, max_width)?;
        let id = self.alloc_id();
        self.paragraphs.insert(id, laid);
        Ok(ParagraphHandle(id))
    }

    fn delete_paragraph(&mut self, paragraph: ParagraphHandle) {
        if self.paragraphs.remove(&paragraph.0).is_none() {
            tracing::warn!(paragraph = paragraph.0, "delete of unknown paragraph");
        }
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CanopyResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CanopyError::resource("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CanopyError::resource("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CanopyError::resource("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

/// Source-over of two equal-length premultiplied RGBA8 buffers.
fn premul_over_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3];
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - u16::from(sa);
        for c in 0..4 {
            d[c] = s[c].saturating_add(mul_div255(u16::from(d[c]), inv));
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/engine/cpu.rs"]
mod tests;
