use crate::element::props::RegionProps;
use crate::element::{ChildList, ElementTag, RenderCx, RenderParent, render_children};
use crate::engine::{CanvasHandle, SurfaceHandle};
use crate::foundation::error::CanopyResult;

pub(crate) struct RegionElement {
    pub(crate) props: RegionProps,
    /// Draw target and the surface it belongs to. Owned by that surface, never released here.
    target: Option<(SurfaceHandle, CanvasHandle)>,
}

impl RegionElement {
    pub(crate) fn new(props: RegionProps) -> Self {
        Self {
            props,
            target: None,
        }
    }

    pub(crate) fn render(
        &mut self,
        parent: &RenderParent,
        children: &ChildList,
        cx: &mut RenderCx<'_>,
    ) -> CanopyResult<()> {
        let surface = parent.surface_for(ElementTag::Region)?;
        // The draw target is bound to the parent surface; a reused region under a replaced layer
        // must fetch the new one.
        let canvas = match self.target {
            Some((bound, canvas)) if bound == surface => canvas,
            _ => {
                let canvas = cx.engine.draw_target(surface)?;
                self.target = Some((surface, canvas));
                canvas
            }
        };

        if let Some(color) = self.props.clear {
            cx.engine.clear(canvas, color)?;
        }

        let inner = RenderParent::region(surface, canvas);
        match self.props.rotate {
            Some(rotate) => {
                cx.engine.push_transform(canvas, rotate.into())?;
                let drawn = render_children(children, &inner, cx);
                let restored = cx.engine.pop_transform(canvas);
                drawn?;
                restored?;
            }
            None => render_children(children, &inner, cx)?,
        }

        cx.engine.flush(surface)
    }

    pub(crate) fn release(&mut self) {
        self.target = None;
    }
}
