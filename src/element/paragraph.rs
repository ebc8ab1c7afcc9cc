use crate::element::props::ParagraphProps;
use crate::element::resource::Owned;
use crate::element::{ElementTag, RenderCx, RenderParent};
use crate::engine::{DrawingEngine, ParagraphHandle};
use crate::foundation::core::Point;
use crate::foundation::error::{CanopyError, CanopyResult};

pub(crate) struct ParagraphElement {
    pub(crate) props: ParagraphProps,
    paragraph: Owned<ParagraphHandle>,
}

impl ParagraphElement {
    pub(crate) fn new(props: ParagraphProps) -> Self {
        Self {
            props,
            paragraph: Owned::empty(),
        }
    }

    pub(crate) fn render(&mut self, parent: &RenderParent, cx: &mut RenderCx<'_>) -> CanopyResult<()> {
        let canvas = parent.canvas_for(ElementTag::Paragraph)?;
        let fonts = self.props.font_context.or(cx.fonts).ok_or_else(|| {
            CanopyError::not_initialized("paragraph has no font context and no default is loaded")
        })?;

        let ParagraphProps {
            text, layout, style, ..
        } = &self.props;
        let paragraph = self
            .paragraph
            .recreate(cx.engine, |e| e.layout_paragraph(text, style, fonts, *layout))?;

        cx.engine
            .draw_paragraph(canvas, paragraph, Point::new(self.props.x, self.props.y))
    }

    pub(crate) fn release(&mut self, engine: &mut dyn DrawingEngine) {
        self.paragraph.release(engine);
    }
}
