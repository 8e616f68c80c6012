use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{ReelError, ReelResult};

/// Brush type carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Average advance of a bold sans-serif glyph, as a fraction of the font size.
const APPROX_ADVANCE_EM: f32 = 0.6;
/// Advance of a space, as a fraction of the font size.
const APPROX_SPACE_EM: f32 = 0.28;

/// Deterministic text width estimate used when no font is available.
pub fn approx_text_width(text: &str, size_px: f32) -> f32 {
    text.chars()
        .map(|c| {
            if c.is_whitespace() {
                APPROX_SPACE_EM
            } else {
                APPROX_ADVANCE_EM
            }
        })
        .sum::<f32>()
        * size_px
}

/// Greedy word wrap.
///
/// Words are accumulated on a line until appending the next one would make the line wider than
/// `max_width`. A single word wider than `max_width` is emitted on its own line unbroken.
/// Joining the returned lines with single spaces yields the input's words in order.
pub fn wrap_words(text: &str, max_width: f32, mut measure: impl FnMut(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Shareable font bytes. Cheap to clone into render workers.
#[derive(Clone, Debug, Default)]
pub struct FontSource {
    bytes: Option<Arc<Vec<u8>>>,
}

impl FontSource {
    /// Load a font file.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| ReelError::io_at("read font", path, e))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Wrap in-memory font bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(Arc::new(bytes)),
        }
    }

    /// A source without glyphs: text is measured approximately and not drawn.
    pub fn layout_only() -> Self {
        Self { bytes: None }
    }

    /// Whether glyphs can be drawn.
    pub fn has_font(&self) -> bool {
        self.bytes.is_some()
    }

    /// Build a per-worker [`FontBook`].
    pub fn book(&self) -> ReelResult<FontBook> {
        match &self.bytes {
            Some(bytes) => FontBook::with_font(bytes),
            None => Ok(FontBook { shaped: None }),
        }
    }
}

struct ShapedFont {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

/// Text shaping state owned by one render worker.
pub struct FontBook {
    shaped: Option<ShapedFont>,
}

impl FontBook {
    fn with_font(font_bytes: &[u8]) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ReelError::render("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::render("registered font family has no name"))?
            .to_string();

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes.to_vec()), 0);

        Ok(Self {
            shaped: Some(ShapedFont {
                font_ctx,
                layout_ctx: parley::LayoutContext::new(),
                family,
                font,
            }),
        })
    }

    /// Width of `text` at `size_px`.
    pub fn measure(&mut self, text: &str, size_px: f32) -> f32 {
        match self.layout(text, size_px, TextBrushRgba8::default()) {
            Some(layout) => layout.width(),
            None => approx_text_width(text, size_px),
        }
    }

    /// Shape `text` on a single line. `None` when no font is loaded.
    pub fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> Option<parley::Layout<TextBrushRgba8>> {
        let shaped = self.shaped.as_mut()?;
        let mut builder = shaped
            .layout_ctx
            .ranged_builder(&mut shaped.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(shaped.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Some(layout)
    }

    /// Font handle for glyph drawing.
    pub(crate) fn font(&self) -> Option<&vello_cpu::peniko::FontData> {
        self.shaped.as_ref().map(|s| &s.font)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
