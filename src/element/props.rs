//! Property bags, one per element tag.
//!
//! Props are immutable per commit: an update replaces the element instead of mutating these.

use serde::{Deserialize, Serialize};

use crate::element::ElementTag;
use crate::engine::{FontContextHandle, PaintDesc, PaintStyle, ParagraphStyle};
use crate::foundation::color::Color;
use crate::foundation::core::Rotation;

/// Optional paint overrides; unset fields fall back to the default paint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Paint {
    /// Straight-alpha color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Fill or stroke.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<PaintStyle>,
    /// Anti-aliasing hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_alias: Option<bool>,
    /// Stroke width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
}

impl Paint {
    /// Apply the overrides on top of `base`.
    pub fn resolve(&self, base: &PaintDesc) -> PaintDesc {
        PaintDesc {
            style: self.style.unwrap_or(base.style),
            anti_alias: self.anti_alias.unwrap_or(base.anti_alias),
            color: self.color.unwrap_or(base.color),
            stroke_width: self.stroke_width.unwrap_or(base.stroke_width),
        }
    }
}

/// Rotation about a pivot, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rotate {
    /// Angle in degrees.
    pub degree: f64,
    /// Pivot x.
    #[serde(default)]
    pub px: f64,
    /// Pivot y.
    #[serde(default)]
    pub py: f64,
}

impl From<Rotate> for Rotation {
    fn from(r: Rotate) -> Self {
        Rotation::new(r.degree, r.px, r.py)
    }
}

/// Props of a region: background clear and rotation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionProps {
    /// Color every pixel of the draw target is replaced with before children draw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear: Option<Color>,
    /// Rotation in effect while children draw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Rotate>,
}

/// Props of an offscreen layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerProps {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Horizontal offset in the parent region.
    #[serde(default)]
    pub dx: f64,
    /// Vertical offset in the parent region.
    #[serde(default)]
    pub dy: f64,
    /// Paint used to composite the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paint: Option<Paint>,
}

/// Props of a line segment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineProps {
    /// Start x.
    pub x1: f64,
    /// Start y.
    pub y1: f64,
    /// End x.
    pub x2: f64,
    /// End y.
    pub y2: f64,
    /// Stroke paint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paint: Option<Paint>,
}

/// Props of an encoded image.
///
/// `bytes` holds the encoded file. Scene descriptions may instead name a `source` path which is
/// loaded into `bytes` before the tree is built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedImageProps {
    /// Left edge in the parent region.
    #[serde(default)]
    pub left: f64,
    /// Top edge in the parent region.
    #[serde(default)]
    pub top: f64,
    /// Encoded image file (PNG, JPEG, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bytes: Vec<u8>,
    /// Scene-relative path the bytes are loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Paint used to draw the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paint: Option<Paint>,
}

/// Props of a paragraph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProps {
    /// Text content.
    pub text: String,
    /// Maximum line width used for wrapping.
    pub layout: f32,
    /// Left edge in the parent region.
    #[serde(default)]
    pub x: f64,
    /// Top edge in the parent region.
    #[serde(default)]
    pub y: f64,
    /// Text style.
    #[serde(default)]
    pub style: ParagraphStyle,
    /// Font context used for layout; the default context when unset.
    #[serde(skip)]
    pub font_context: Option<FontContextHandle>,
}

/// Tagged union of every element's props.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Props {
    /// Region props.
    Region(RegionProps),
    /// Layer props.
    Layer(LayerProps),
    /// Line props.
    Line(LineProps),
    /// Encoded image props.
    EncodedImage(EncodedImageProps),
    /// Paragraph props.
    Paragraph(ParagraphProps),
}

impl Props {
    /// Tag the props belong to.
    pub fn tag(&self) -> ElementTag {
        match self {
            Self::Region(_) => ElementTag::Region,
            Self::Layer(_) => ElementTag::Layer,
            Self::Line(_) => ElementTag::Line,
            Self::EncodedImage(_) => ElementTag::EncodedImage,
            Self::Paragraph(_) => ElementTag::Paragraph,
        }
    }
}

impl From<RegionProps> for Props {
    fn from(p: RegionProps) -> Self {
        Self::Region(p)
    }
}

impl From<LayerProps> for Props {
    fn from(p: LayerProps) -> Self {
        Self::Layer(p)
    }
}

impl From<LineProps> for Props {
    fn from(p: LineProps) -> Self {
        Self::Line(p)
    }
}

impl From<EncodedImageProps> for Props {
    fn from(p: EncodedImageProps) -> Self {
        Self::EncodedImage(p)
    }
}

impl From<ParagraphProps> for Props {
    fn from(p: ParagraphProps) -> Self {
        Self::Paragraph(p)
    }
}
