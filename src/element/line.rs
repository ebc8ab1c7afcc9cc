use crate::element::props::LineProps;
use crate::element::resource::Owned;
use crate::element::{ElementTag, RenderCx, RenderParent};
use crate::engine::{DrawingEngine, PaintDesc, PaintHandle};
use crate::foundation::core::Point;
use crate::foundation::error::CanopyResult;

pub(crate) struct LineElement {
    pub(crate) props: LineProps,
    default_paint: PaintDesc,
    paint: Owned<PaintHandle>,
}

impl LineElement {
    pub(crate) fn new(props: LineProps, default_paint: PaintDesc) -> Self {
        Self {
            props,
            default_paint,
            paint: Owned::empty(),
        }
    }

    pub(crate) fn render(&mut self, parent: &RenderParent, cx: &mut RenderCx<'_>) -> CanopyResult<()> {
        let canvas = parent.canvas_for(ElementTag::Line)?;
        let desc = self
            .props
            .paint
            .map_or(self.default_paint, |p| p.resolve(&self.default_paint));
        let paint = self
            .paint
            .recreate(cx.engine, |e| Ok(e.make_paint(&desc)))?;

        let LineProps { x1, y1, x2, y2, .. } = self.props;
        cx.engine
            .draw_line(canvas, Point::new(x1, y1), Point::new(x2, y2), paint)
    }

    pub(crate) fn release(&mut self, engine: &mut dyn DrawingEngine) {
        self.paint.release(engine);
    }
}
