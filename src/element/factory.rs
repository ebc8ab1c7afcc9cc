//! Element construction from a type tag and a property bag.
//!
//! Construction never touches the drawing engine: the default paint is a plain [`PaintDesc`] and
//! every native handle is materialized at first render. A tree that is built and then discarded
//! without ever being committed therefore owns nothing that needs releasing.

use crate::element::image::ImageElement;
use crate::element::layer::LayerElement;
use crate::element::line::LineElement;
use crate::element::paragraph::ParagraphElement;
use crate::element::props::Props;
use crate::element::region::RegionElement;
use crate::element::{ElementKind, ElementTag, Node};
use crate::engine::PaintDesc;
use crate::foundation::error::{CanopyError, CanopyResult};

/// Build an element from its string tag (`region`, `layer`, `line`, `encoded-image`,
/// `paragraph`).
pub fn create_element(tag: &str, props: Props) -> CanopyResult<Node> {
    create_from_tag(tag.parse()?, props)
}

/// Build an element of `tag`. `props` must belong to the same tag.
pub fn create_from_tag(tag: ElementTag, props: Props) -> CanopyResult<Node> {
    if props.tag() != tag {
        return Err(CanopyError::structural(format!(
            "cannot create {tag} from {} props",
            props.tag()
        )));
    }

    let default_paint = PaintDesc::default();
    let kind = match props {
        Props::Region(p) => ElementKind::Region(RegionElement::new(p)),
        Props::Layer(p) => ElementKind::Layer(LayerElement::new(p, default_paint)),
        Props::Line(p) => ElementKind::Line(LineElement::new(p, default_paint)),
        Props::EncodedImage(p) => ElementKind::EncodedImage(ImageElement::new(p, default_paint)),
        Props::Paragraph(p) => ElementKind::Paragraph(ParagraphElement::new(p)),
    };
    let node = Node::new(kind);
    tracing::trace!(element = ?node, "created");
    Ok(node)
}

#[cfg(test)]
#[path = "../../tests/unit/element/factory.rs"]
mod tests;
