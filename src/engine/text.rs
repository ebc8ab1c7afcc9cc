use crate::engine::ParagraphStyle;
use crate::foundation::error::{CanopyError, CanopyResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Family names registered for one font context, in registration order.
#[derive(Clone, Default)]
pub(crate) struct FontSet {
    pub(crate) families: Vec<String>,
}

impl FontSet {
    /// Fallback order for `wanted`: the requested families this set has, then the rest of the
    /// set in registration order.
    fn stack(&self, wanted: &[String]) -> Vec<parley::style::FontFamily<'static>> {
        let mut order: Vec<&String> = Vec::with_capacity(self.families.len());
        for want in wanted {
            if let Some(have) = self
                .families
                .iter()
                .find(|f| f.eq_ignore_ascii_case(want))
                && !order.contains(&have)
            {
                order.push(have);
            }
        }
        for have in &self.families {
            if !order.contains(&have) {
                order.push(have);
            }
        }
        order
            .into_iter()
            .map(|f| parley::style::FontFamily::Named(std::borrow::Cow::Owned(f.clone())))
            .collect()
    }
}

/// A shaped paragraph ready to draw. Each glyph run carries the font parley resolved for it.
pub(crate) struct LaidOutParagraph {
    /// `None` when the font context had no fonts; such paragraphs draw nothing.
    pub(crate) shaped: Option<parley::Layout<TextBrushRgba8>>,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register font files into the shared collection and return the families they define.
    pub(crate) fn register(&mut self, fonts: &[&[u8]]) -> CanopyResult<FontSet> {
        let mut set = FontSet::default();
        for (idx, bytes) in fonts.iter().enumerate() {
            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
            let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
                CanopyError::resource(format!("font #{idx}: no font families registered"))
            })?;
            let family = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| {
                    CanopyError::resource(format!("font #{idx}: registered family has no name"))
                })?
                .to_string();

            if !set.families.contains(&family) {
                set.families.push(family);
            }
        }
        Ok(set)
    }

    /// Shape and lay out `text`, wrapping at `max_width` when it is positive.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        style: &ParagraphStyle,
        fonts: &FontSet,
        max_width: f32,
    ) -> CanopyResult<LaidOutParagraph> {
        if !style.font_size.is_finite() || style.font_size <= 0.0 {
            return Err(CanopyError::validation(
                "paragraph font size must be finite and > 0",
            ));
        }
        let stack = fonts.stack(&style.font_families);
        if stack.is_empty() {
            tracing::debug!("font context has no fonts, paragraph draws nothing");
            return Ok(LaidOutParagraph { shaped: None });
        }

        let c = style.color;
        let brush = TextBrushRgba8 {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::List(std::borrow::Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.font_size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        let wrap = (max_width.is_finite() && max_width > 0.0).then_some(max_width);
        layout.break_all_lines(wrap);
        if let Some(w) = wrap {
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        }

        Ok(LaidOutParagraph {
            shaped: Some(layout),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/text.rs"]
mod tests;
