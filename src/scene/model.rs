//! The [`SceneNode`] description and its validation.

use serde::{Deserialize, Serialize};

use crate::element::ElementTag;
use crate::element::props::Props;
use crate::foundation::error::{CanopyError, CanopyResult};

/// One element of a scene description.
///
/// Serialized as the element's props (tagged by `"type"`) plus an optional `"children"` array:
///
/// ```json
/// { "type": "region", "clear": "#ffffff", "children": [
///     { "type": "line", "x1": 0, "y1": 0, "x2": 10, "y2": 10 }
/// ] }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Element props; their variant names the element type.
    #[serde(flatten)]
    pub props: Props,
    /// Child nodes in paint order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Node without children.
    pub fn new(props: impl Into<Props>) -> Self {
        Self {
            props: props.into(),
            children: Vec::new(),
        }
    }

    /// Append a child.
    pub fn child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Element type of this node.
    pub fn tag(&self) -> ElementTag {
        self.props.tag()
    }

    /// Parse a JSON array of top-level nodes.
    pub fn list_from_json(json: &str) -> CanopyResult<Vec<SceneNode>> {
        serde_json::from_str(json)
            .map_err(|e| CanopyError::validation(format!("invalid scene JSON: {e}")))
    }

    /// Check the description for shapes that can never render.
    ///
    /// Parent/child alternation is left to the render walk, which reports it with the offending
    /// element.
    pub fn validate(&self) -> CanopyResult<()> {
        let tag = self.tag();
        if !tag.is_container() && !self.children.is_empty() {
            return Err(CanopyError::validation(format!(
                "{tag} cannot have children ({} given)",
                self.children.len()
            )));
        }
        match &self.props {
            Props::Layer(p) if p.width == 0 || p.height == 0 => {
                return Err(CanopyError::validation(format!(
                    "layer size must be non-zero (got {}x{})",
                    p.width, p.height
                )));
            }
            Props::Paragraph(p) if !p.layout.is_finite() || p.layout < 0.0 => {
                return Err(CanopyError::validation(
                    "paragraph layout width must be finite and >= 0",
                ));
            }
            Props::EncodedImage(p) if p.bytes.is_empty() && p.source.is_none() => {
                return Err(CanopyError::validation(
                    "encoded-image needs either bytes or a source",
                ));
            }
            _ => {}
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count).sum::<usize>()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
