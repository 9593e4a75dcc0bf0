//! Text metrics and glyph outlines.
//!
//! Hit-testing only needs advance widths, so it talks to the [`TextMeasure`]
//! trait. The renderer additionally needs outlines, which [`Typeface`]
//! provides when a font has been loaded.

use std::path::Path;

use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, ScaleFont};
use font_kit::family_name::FamilyName;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use tiny_skia::PathBuilder;

use crate::error::{Result, StickerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" | "regular" | "400" => Some(Self::Normal),
            "bold" | "700" | "900" => Some(Self::Bold),
            _ => None,
        }
    }
}

/// Advance-width measurement for a single line of text.
pub trait TextMeasure {
    fn measure(&self, content: &str, font_size: f32, weight: FontWeight) -> f32;
}

/// Approximate average advance, as a fraction of the font size.
const FALLBACK_ADVANCE: f32 = 0.55;
const FALLBACK_ADVANCE_BOLD: f32 = 0.6;

/// Stroke width, relative to font size, used to fake a bold weight.
pub const FAUX_BOLD_RATIO: f32 = 0.04;

/// Monochrome-outline emoji faces tried for effect symbols, in order.
const EMOJI_FAMILIES: [&str; 4] = ["Noto Emoji", "Segoe UI Emoji", "Segoe UI Symbol", "Symbola"];

/// The fonts used for text and effect glyphs.
///
/// Without a loaded text font, widths come from a fixed per-character
/// estimate and nothing can be outlined. The optional emoji face is only
/// consulted for effect symbols.
#[derive(Clone, Default)]
pub struct Typeface {
    font: Option<FontArc>,
    emoji: Option<FontArc>,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("loaded", &self.font.is_some())
            .field("emoji", &self.emoji.is_some())
            .finish()
    }
}

impl Typeface {
    /// Typeface with estimated metrics only.
    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn from_font(font: FontArc) -> Self {
        Self {
            font: Some(font),
            emoji: None,
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self::from_font(parse_font(bytes)?))
    }

    /// Replace the text font, keeping any emoji face.
    pub fn with_font_bytes(mut self, bytes: Vec<u8>) -> Result<Self> {
        self.font = Some(parse_font(bytes)?);
        Ok(self)
    }

    pub fn with_emoji(mut self, emoji: FontArc) -> Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn with_emoji_bytes(self, bytes: Vec<u8>) -> Result<Self> {
        Ok(self.with_emoji(parse_font(bytes)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let face = Self::from_bytes(bytes)?;
        tracing::info!(path = %path.as_ref().display(), "font loaded");
        Ok(face)
    }

    /// The system's default sans-serif face, if one is installed.
    pub fn system() -> Option<Self> {
        let font = load_system_font(&[FamilyName::SansSerif])?;
        tracing::info!("system sans-serif font loaded");
        Some(Self::from_font(font))
    }

    /// Resolve the typeface for a session: the configured font, else the
    /// system sans-serif, else estimated metrics. A system emoji face is
    /// attached when one is installed.
    pub fn load_or_fallback(path: Option<&Path>) -> Self {
        let configured = path.and_then(|p| {
            Self::load(p)
                .inspect_err(|e| {
                    tracing::warn!(path = %p.display(), error = %e, "configured font unavailable");
                })
                .ok()
        });
        let face = configured.or_else(Self::system).unwrap_or_else(|| {
            tracing::warn!("no usable font found, text will use estimated metrics");
            Self::fallback()
        });
        match load_emoji_font() {
            Some(emoji) => face.with_emoji(emoji),
            None => {
                tracing::debug!("no emoji font installed, effects fall back to badges");
                face
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.font.is_some()
    }

    pub fn has_emoji_font(&self) -> bool {
        self.emoji.is_some()
    }

    /// Whether the text font has a real glyph (not `.notdef`) for every char.
    pub fn has_glyphs(&self, content: &str) -> bool {
        self.font.as_ref().is_some_and(|font| covers(font, content))
    }

    /// Build a path for `content`, horizontally centered on x = 0 with its
    /// vertical middle on y = 0.
    pub fn outline(&self, content: &str, font_size: f32) -> Option<tiny_skia::Path> {
        outline_with(self.font.as_ref()?, content, font_size)
    }

    /// Outline of an effect symbol from the emoji face, or the text face when
    /// the emoji face lacks it. `None` when neither can draw it.
    pub fn symbol_outline(&self, glyph: &str, size: f32) -> Option<tiny_skia::Path> {
        [self.emoji.as_ref(), self.font.as_ref()]
            .into_iter()
            .flatten()
            .filter(|font| covers(font, glyph))
            .find_map(|font| outline_with(font, glyph, size))
    }
}

impl TextMeasure for Typeface {
    fn measure(&self, content: &str, font_size: f32, weight: FontWeight) -> f32 {
        let Some(font) = &self.font else {
            let advance = match weight {
                FontWeight::Normal => FALLBACK_ADVANCE,
                FontWeight::Bold => FALLBACK_ADVANCE_BOLD,
            };
            return content.chars().count() as f32 * font_size * advance;
        };

        let width = advance_width(font, content, font_size);
        if weight == FontWeight::Bold && width > 0.0 {
            width + font_size * FAUX_BOLD_RATIO
        } else {
            width
        }
    }
}

fn parse_font(bytes: Vec<u8>) -> Result<FontArc> {
    FontArc::try_from_vec(bytes).map_err(|e| StickerError::Decode(format!("invalid font data: {e}")))
}

fn load_system_font(families: &[FamilyName]) -> Option<FontArc> {
    let handle = SystemSource::new()
        .select_best_match(families, &Properties::new())
        .ok()?;
    let data = handle.load().ok()?.copy_font_data()?;
    FontArc::try_from_vec((*data).clone()).ok()
}

fn load_emoji_font() -> Option<FontArc> {
    let families: Vec<FamilyName> = EMOJI_FAMILIES
        .iter()
        .map(|name| FamilyName::Title(name.to_string()))
        .collect();
    load_system_font(&families)
}

fn covers(font: &FontArc, content: &str) -> bool {
    content
        .chars()
        .filter(|c| !is_variation_selector(*c))
        .all(|c| font.glyph_id(c) != GlyphId(0))
}

fn advance_width(font: &FontArc, content: &str, font_size: f32) -> f32 {
    let scaled = font.as_scaled(font_size);
    let mut width = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;
    for ch in content.chars().filter(|c| !is_variation_selector(*c)) {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }
    width
}

fn outline_with(font: &FontArc, content: &str, font_size: f32) -> Option<tiny_skia::Path> {
    let scaled = font.as_scaled(font_size);
    let factor = scaled.scale_factor();

    let width = advance_width(font, content, font_size);
    let baseline = (scaled.ascent() + scaled.descent()) / 2.0;

    let mut builder = PathBuilder::new();
    let mut cursor_x = -width / 2.0;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in content.chars().filter(|c| !is_variation_selector(*c)) {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }

        if let Some(outline) = font.outline(glyph_id) {
            let map = |p: ab_glyph::Point| {
                (
                    cursor_x + p.x * factor.horizontal,
                    baseline - p.y * factor.vertical,
                )
            };
            let mut current: Option<(f32, f32)> = None;
            for curve in &outline.curves {
                let start = match curve {
                    OutlineCurve::Line(a, _)
                    | OutlineCurve::Quad(a, _, _)
                    | OutlineCurve::Cubic(a, _, _, _) => map(*a),
                };
                if current.is_none_or(|c| !same_point(c, start)) {
                    if current.is_some() {
                        builder.close();
                    }
                    builder.move_to(start.0, start.1);
                }
                let end = match curve {
                    OutlineCurve::Line(_, b) => {
                        let b = map(*b);
                        builder.line_to(b.0, b.1);
                        b
                    }
                    OutlineCurve::Quad(_, c, b) => {
                        let (c, b) = (map(*c), map(*b));
                        builder.quad_to(c.0, c.1, b.0, b.1);
                        b
                    }
                    OutlineCurve::Cubic(_, c1, c2, b) => {
                        let (c1, c2, b) = (map(*c1), map(*c2), map(*b));
                        builder.cubic_to(c1.0, c1.1, c2.0, c2.1, b.0, b.1);
                        b
                    }
                };
                current = Some(end);
            }
            if current.is_some() {
                builder.close();
            }
        }

        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    builder.finish()
}

fn same_point(a: (f32, f32), b: (f32, f32)) -> bool {
    (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
}

fn is_variation_selector(c: char) -> bool {
    matches!(c, '\u{FE00}'..='\u{FE0F}')
}

/// egui's bundled text and emoji faces, so font tests do not depend on what
/// the machine has installed.
#[cfg(test)]
pub(crate) fn bundled_face() -> Typeface {
    let fonts = egui::FontDefinitions::default();
    let bytes = |name: &str| fonts.font_data[name].font.to_vec();
    Typeface::from_bytes(bytes("Ubuntu-Light"))
        .and_then(|face| face.with_emoji_bytes(bytes("NotoEmoji-Regular")))
        .unwrap()
}
