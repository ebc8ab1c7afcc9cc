use crate::element::props::LayerProps;
use crate::element::resource::{Owned, with_transient};
use crate::element::{ChildList, ElementTag, RenderCx, RenderParent, render_children};
use crate::engine::{DrawingEngine, PaintDesc, PaintHandle, SurfaceHandle};
use crate::foundation::core::Point;
use crate::foundation::error::CanopyResult;

/// Offscreen layer: children draw into its own surface, which is then snapshotted and drawn into
/// the parent region at `(dx, dy)`.
pub(crate) struct LayerElement {
    pub(crate) props: LayerProps,
    default_paint: PaintDesc,
    surface: Owned<SurfaceHandle>,
    paint: Owned<PaintHandle>,
}

impl LayerElement {
    pub(crate) fn new(props: LayerProps, default_paint: PaintDesc) -> Self {
        Self {
            props,
            default_paint,
            surface: Owned::empty(),
            paint: Owned::empty(),
        }
    }

    pub(crate) fn render(
        &mut self,
        parent: &RenderParent,
        children: &ChildList,
        cx: &mut RenderCx<'_>,
    ) -> CanopyResult<()> {
        let canvas = parent.canvas_for(ElementTag::Layer)?;
        let (width, height) = (self.props.width, self.props.height);
        let surface = self
            .surface
            .get_or_create(cx.engine, |e| e.make_surface(width, height))?;

        render_children(children, &RenderParent::layer(surface), cx)?;

        let snapshot = cx.engine.snapshot(surface)?;
        let desc = self
            .props
            .paint
            .map_or(self.default_paint, |p| p.resolve(&self.default_paint));
        let at = Point::new(self.props.dx, self.props.dy);
        let paint = &mut self.paint;
        with_transient(cx.engine, snapshot, |engine, image| {
            let paint = paint.recreate(engine, |e| Ok(e.make_paint(&desc)))?;
            engine.draw_image(canvas, image, at, paint)
        })
    }

    pub(crate) fn release(&mut self, engine: &mut dyn DrawingEngine) {
        self.paint.release(engine);
        self.surface.release(engine);
    }
}
