use crate::element::props::EncodedImageProps;
use crate::element::resource::Owned;
use crate::element::{ElementTag, RenderCx, RenderParent};
use crate::engine::{DrawingEngine, ImageHandle, PaintDesc, PaintHandle};
use crate::foundation::core::Point;
use crate::foundation::error::{CanopyError, CanopyResult};

pub(crate) struct ImageElement {
    pub(crate) props: EncodedImageProps,
    default_paint: PaintDesc,
    image: Owned<ImageHandle>,
    paint: Owned<PaintHandle>,
}

impl ImageElement {
    pub(crate) fn new(props: EncodedImageProps, default_paint: PaintDesc) -> Self {
        Self {
            props,
            default_paint,
            image: Owned::empty(),
            paint: Owned::empty(),
        }
    }

    pub(crate) fn render(&mut self, parent: &RenderParent, cx: &mut RenderCx<'_>) -> CanopyResult<()> {
        let canvas = parent.canvas_for(ElementTag::EncodedImage)?;
        if self.props.bytes.is_empty() {
            return Err(CanopyError::resource(match &self.props.source {
                Some(source) => format!("encoded-image source \"{source}\" was never loaded"),
                None => "encoded-image has no bytes".to_owned(),
            }));
        }

        let bytes = &self.props.bytes;
        let image = self.image.recreate(cx.engine, |e| e.decode_image(bytes))?;
        let desc = self
            .props
            .paint
            .map_or(self.default_paint, |p| p.resolve(&self.default_paint));
        let paint = self
            .paint
            .recreate(cx.engine, |e| Ok(e.make_paint(&desc)))?;

        let at = Point::new(self.props.left, self.props.top);
        cx.engine.draw_image(canvas, image, at, paint)
    }

    pub(crate) fn release(&mut self, engine: &mut dyn DrawingEngine) {
        self.paint.release(engine);
        self.image.release(engine);
    }
}
