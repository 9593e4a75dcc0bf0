//! Scene model: the image layer, text and effect layers, background and
//! selection of one sticker being edited.
//!
//! Layers are addressed by stable [`LayerId`]s so that a selection or drag
//! target can never point at the wrong element after a deletion shifts the
//! ordered buckets.

use std::str::FromStr;

use image::RgbaImage;
use rand::Rng;
use uuid::Uuid;

use crate::consts::{
    CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_EFFECT_SIZE, DEFAULT_FONT_SIZE, EFFECT_EDGE_INSET,
    EFFECT_SIZE_RANGE, IMAGE_SCALE_PERCENT_RANGE, TEXT_BOTTOM_OFFSET, TEXT_SIZE_RANGE,
};
use crate::error::{Result, StickerError};
use crate::geometry::{Point, Transform, normalize_degrees};
use crate::text::FontWeight;

/// Unique identifier for a layer.
pub type LayerId = Uuid;

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb`, `#rrggbbaa` or `#rgb`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || StickerError::validation(format!("invalid color: {hex}"));
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        if !digits.is_ascii() {
            return Err(invalid());
        }
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(digits[i..=i].repeat(2).as_str());
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Ok(Self::rgba(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_skia(&self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = StickerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Transparent,
    Solid(Color),
}

impl FromStr for Background {
    type Err = StickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transparent" | "none" => Ok(Self::Transparent),
            "white" => Ok(Self::Solid(Color::WHITE)),
            other => Ok(Self::Solid(Color::from_hex(other)?)),
        }
    }
}

/// Emoji-style marks that can be scattered over a sticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectSymbol {
    Sweat,
    Tears,
    Heart,
    Star,
    Anger,
    Zzz,
    Sparkle,
    Note,
    Exclam,
    Question,
    Laugh,
    ThumbsUp,
    Fire,
    Skull,
    Bulb,
    Ok,
    Ng,
    Thinking,
}

impl EffectSymbol {
    pub const ALL: [EffectSymbol; 18] = [
        Self::Sweat,
        Self::Tears,
        Self::Heart,
        Self::Star,
        Self::Anger,
        Self::Zzz,
        Self::Sparkle,
        Self::Note,
        Self::Exclam,
        Self::Question,
        Self::Laugh,
        Self::ThumbsUp,
        Self::Fire,
        Self::Skull,
        Self::Bulb,
        Self::Ok,
        Self::Ng,
        Self::Thinking,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sweat => "sweat",
            Self::Tears => "tears",
            Self::Heart => "heart",
            Self::Star => "star",
            Self::Anger => "anger",
            Self::Zzz => "zzz",
            Self::Sparkle => "sparkle",
            Self::Note => "note",
            Self::Exclam => "exclam",
            Self::Question => "question",
            Self::Laugh => "laugh",
            Self::ThumbsUp => "thumbsup",
            Self::Fire => "fire",
            Self::Skull => "skull",
            Self::Bulb => "bulb",
            Self::Ok => "ok",
            Self::Ng => "ng",
            Self::Thinking => "thinking",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Sweat => "💦",
            Self::Tears => "😢",
            Self::Heart => "❤️",
            Self::Star => "⭐",
            Self::Anger => "💢",
            Self::Zzz => "💤",
            Self::Sparkle => "✨",
            Self::Note => "🎵",
            Self::Exclam => "❗",
            Self::Question => "❓",
            Self::Laugh => "😆",
            Self::ThumbsUp => "👍",
            Self::Fire => "🔥",
            Self::Skull => "💀",
            Self::Bulb => "💡",
            Self::Ok => "⭕",
            Self::Ng => "❌",
            Self::Thinking => "🤔",
        }
    }

    /// Badge color used when the typeface has no glyph for the symbol.
    pub fn badge_color(self) -> Color {
        match self {
            Self::Sweat | Self::Tears | Self::Zzz => Color::rgb(0x4f, 0xa3, 0xf7),
            Self::Heart | Self::Anger | Self::Ng | Self::Exclam | Self::Question => {
                Color::rgb(0xe5, 0x39, 0x35)
            }
            Self::Star | Self::Sparkle | Self::Bulb | Self::Laugh | Self::Thinking => {
                Color::rgb(0xfd, 0xd8, 0x35)
            }
            Self::ThumbsUp => Color::rgb(0xff, 0xb7, 0x4d),
            Self::Fire | Self::Ok => Color::rgb(0xfb, 0x8c, 0x00),
            Self::Note => Color::rgb(0x7e, 0x57, 0xc2),
            Self::Skull => Color::rgb(0x9e, 0x9e, 0x9e),
        }
    }
}

impl FromStr for EffectSymbol {
    type Err = StickerError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|sym| sym.name() == wanted)
            .ok_or_else(|| StickerError::validation(format!("unknown effect: {s}")))
    }
}

#[derive(Debug, Clone)]
pub struct ImageLayer {
    pub id: LayerId,
    pub bitmap: RgbaImage,
    pub transform: Transform,
}

impl ImageLayer {
    /// Radius of the circle used to pick the image.
    pub fn hit_radius(&self) -> f32 {
        self.bitmap.width().max(self.bitmap.height()) as f32 * self.transform.scale() / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub weight: FontWeight,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            weight: FontWeight::Normal,
            color: Color::BLACK,
        }
    }
}

/// A text label. Texts have no scale of their own; size is the font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub id: LayerId,
    pub content: String,
    pub position: Point,
    rotation: f32,
    pub style: TextStyle,
}

impl TextLayer {
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position.x, self.position.y, 1.0, self.rotation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectLayer {
    pub id: LayerId,
    pub symbol: EffectSymbol,
    pub position: Point,
    pub size: f32,
    rotation: f32,
}

impl EffectLayer {
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position.x, self.position.y, 1.0, self.rotation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Image,
    Text,
    Effect,
}

/// Stable reference to one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerRef {
    pub kind: LayerKind,
    pub id: LayerId,
}

impl LayerRef {
    pub fn new(kind: LayerKind, id: LayerId) -> Self {
        Self { kind, id }
    }
}

/// How an image replacement treats the existing transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refit {
    /// Center, fit to the canvas, zero rotation.
    Full,
    /// Only re-fit the scale; keep position and rotation.
    ScaleOnly,
    /// Keep the transform untouched.
    Keep,
}

/// Scale that fits a `width × height` bitmap inside the canvas.
pub fn fit_scale(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    (CANVAS_WIDTH as f32 / width as f32).min(CANVAS_HEIGHT as f32 / height as f32)
}

pub fn canvas_center() -> Point {
    Point::new(CANVAS_WIDTH as f32 / 2.0, CANVAS_HEIGHT as f32 / 2.0)
}

/// Everything that makes up the sticker being edited.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    image: Option<ImageLayer>,
    /// Bottom to top.
    texts: Vec<TextLayer>,
    /// Bottom to top; always drawn above every text.
    effects: Vec<EffectLayer>,
    pub background: Background,
    selection: Option<LayerRef>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries ---

    pub fn image(&self) -> Option<&ImageLayer> {
        self.image.as_ref()
    }

    pub fn texts(&self) -> &[TextLayer] {
        &self.texts
    }

    pub fn effects(&self) -> &[EffectLayer] {
        &self.effects
    }

    pub fn text(&self, id: LayerId) -> Option<&TextLayer> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn text_mut(&mut self, id: LayerId) -> Option<&mut TextLayer> {
        self.texts.iter_mut().find(|t| t.id == id)
    }

    pub fn effect(&self, id: LayerId) -> Option<&EffectLayer> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn effect_mut(&mut self, id: LayerId) -> Option<&mut EffectLayer> {
        self.effects.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, target: LayerRef) -> bool {
        match target.kind {
            LayerKind::Image => self.image.as_ref().is_some_and(|i| i.id == target.id),
            LayerKind::Text => self.text(target.id).is_some(),
            LayerKind::Effect => self.effect(target.id).is_some(),
        }
    }

    /// The current selection, or `None` if it refers to a layer that no
    /// longer exists.
    pub fn selection(&self) -> Option<LayerRef> {
        self.selection.filter(|s| self.contains(*s))
    }

    pub fn is_selected(&self, target: LayerRef) -> bool {
        self.selection() == Some(target)
    }

    pub fn has_content(&self) -> bool {
        self.image.is_some() || !self.texts.is_empty() || !self.effects.is_empty()
    }

    // --- Selection ---

    /// Select a layer; dangling references clear the selection instead.
    pub fn select(&mut self, target: Option<LayerRef>) {
        self.selection = target.filter(|t| self.contains(*t));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // --- Image layer ---

    /// Install a freshly uploaded bitmap, centered and fit to the canvas.
    pub fn set_image(&mut self, bitmap: RgbaImage) -> LayerId {
        let scale = fit_scale(bitmap.width(), bitmap.height());
        let center = canvas_center();
        let layer = ImageLayer {
            id: Uuid::new_v4(),
            transform: Transform::new(center.x, center.y, scale, 0.0),
            bitmap,
        };
        let id = layer.id;
        self.image = Some(layer);
        id
    }

    /// Swap the image bitmap for a processed version of it.
    pub fn replace_image(&mut self, bitmap: RgbaImage, refit: Refit) -> Result<()> {
        let layer = self.image.as_mut().ok_or(StickerError::NoImage)?;
        match refit {
            Refit::Full => {
                let center = canvas_center();
                layer.transform =
                    Transform::new(center.x, center.y, fit_scale(bitmap.width(), bitmap.height()), 0.0);
            }
            Refit::ScaleOnly => {
                layer
                    .transform
                    .set_scale(fit_scale(bitmap.width(), bitmap.height()));
            }
            Refit::Keep => {}
        }
        layer.bitmap = bitmap;
        Ok(())
    }

    // --- Text layers ---

    /// Add a text label and select it. Blank content is rejected.
    pub fn add_text(&mut self, content: &str, style: TextStyle) -> Result<LayerId> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StickerError::validation("text is empty"));
        }
        let y = if self.image.is_some() {
            CANVAS_HEIGHT as f32 - TEXT_BOTTOM_OFFSET
        } else {
            CANVAS_HEIGHT as f32 / 2.0
        };
        let layer = TextLayer {
            id: Uuid::new_v4(),
            content: content.to_string(),
            position: Point::new(CANVAS_WIDTH as f32 / 2.0, y),
            rotation: 0.0,
            style: TextStyle {
                font_size: clamp_or(style.font_size, TEXT_SIZE_RANGE, DEFAULT_FONT_SIZE),
                ..style
            },
        };
        let id = layer.id;
        self.texts.push(layer);
        self.selection = Some(LayerRef::new(LayerKind::Text, id));
        Ok(id)
    }

    // --- Effect layers ---

    /// Add an effect at a random spot away from the edges and select it.
    pub fn add_effect(&mut self, symbol: EffectSymbol) -> LayerId {
        let mut rng = rand::rng();
        let x = rng.random_range(EFFECT_EDGE_INSET..CANVAS_WIDTH as f32 - EFFECT_EDGE_INSET);
        let y = rng.random_range(EFFECT_EDGE_INSET..CANVAS_HEIGHT as f32 - EFFECT_EDGE_INSET);
        self.add_effect_at(symbol, Point::new(x, y))
    }

    pub fn add_effect_at(&mut self, symbol: EffectSymbol, position: Point) -> LayerId {
        let layer = EffectLayer {
            id: Uuid::new_v4(),
            symbol,
            position,
            size: DEFAULT_EFFECT_SIZE,
            rotation: 0.0,
        };
        let id = layer.id;
        self.effects.push(layer);
        self.selection = Some(LayerRef::new(LayerKind::Effect, id));
        id
    }

    // --- Mutations ---

    /// Remove a text or effect layer. Always clears the selection when
    /// something was removed.
    pub fn remove(&mut self, target: LayerRef) -> bool {
        let removed = match target.kind {
            LayerKind::Text => remove_by_id(&mut self.texts, |t| t.id == target.id),
            LayerKind::Effect => remove_by_id(&mut self.effects, |e| e.id == target.id),
            LayerKind::Image => {
                let hit = self.image.as_ref().is_some_and(|i| i.id == target.id);
                if hit {
                    self.image = None;
                }
                hit
            }
        };
        if removed {
            self.selection = None;
        }
        removed
    }

    /// Move a layer by `delta` in canvas space.
    pub fn translate(&mut self, target: LayerRef, delta: Point) -> bool {
        match target.kind {
            LayerKind::Image => match self.image.as_mut() {
                Some(img) if img.id == target.id => {
                    img.transform.translate(delta);
                    true
                }
                _ => false,
            },
            LayerKind::Text => self.text_mut(target.id).map(|t| t.position += delta).is_some(),
            LayerKind::Effect => self
                .effect_mut(target.id)
                .map(|e| e.position += delta)
                .is_some(),
        }
    }

    /// Apply the unified size control: font size of the selected text, size
    /// of the selected effect, or the image scale (in percent) otherwise.
    /// Non-finite values are ignored.
    pub fn set_size(&mut self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self.selection() {
            Some(LayerRef {
                kind: LayerKind::Text,
                id,
            }) => self
                .text_mut(id)
                .map(|t| t.style.font_size = value.clamp(TEXT_SIZE_RANGE.0, TEXT_SIZE_RANGE.1))
                .is_some(),
            Some(LayerRef {
                kind: LayerKind::Effect,
                id,
            }) => self
                .effect_mut(id)
                .map(|e| e.size = value.clamp(EFFECT_SIZE_RANGE.0, EFFECT_SIZE_RANGE.1))
                .is_some(),
            _ => match self.image.as_mut() {
                Some(img) => {
                    let percent =
                        value.clamp(IMAGE_SCALE_PERCENT_RANGE.0, IMAGE_SCALE_PERCENT_RANGE.1);
                    img.transform.set_scale(percent / 100.0);
                    true
                }
                None => false,
            },
        }
    }

    /// Apply the unified rotation control to the selection, or the image.
    pub fn set_rotation(&mut self, degrees: f32) -> bool {
        match self.selection() {
            Some(LayerRef {
                kind: LayerKind::Text,
                id,
            }) => self.text_mut(id).map(|t| t.set_rotation(degrees)).is_some(),
            Some(LayerRef {
                kind: LayerKind::Effect,
                id,
            }) => self.effect_mut(id).map(|e| e.set_rotation(degrees)).is_some(),
            _ => match self.image.as_mut() {
                Some(img) => {
                    img.transform.set_rotation(degrees);
                    true
                }
                None => false,
            },
        }
    }

    /// Value the size control shows for the current selection.
    pub fn size_value(&self) -> f32 {
        match self.selection() {
            Some(LayerRef {
                kind: LayerKind::Text,
                id,
            }) => self.text(id).map_or(DEFAULT_FONT_SIZE, |t| t.style.font_size),
            Some(LayerRef {
                kind: LayerKind::Effect,
                id,
            }) => self.effect(id).map_or(DEFAULT_EFFECT_SIZE, |e| e.size),
            _ => self
                .image
                .as_ref()
                .map_or(100.0, |i| (i.transform.scale() * 100.0).round()),
        }
    }

    /// Value the rotation control shows for the current selection.
    pub fn rotation_value(&self) -> f32 {
        match self.selection() {
            Some(LayerRef {
                kind: LayerKind::Text,
                id,
            }) => self.text(id).map_or(0.0, TextLayer::rotation),
            Some(LayerRef {
                kind: LayerKind::Effect,
                id,
            }) => self.effect(id).map_or(0.0, EffectLayer::rotation),
            _ => self.image.as_ref().map_or(0.0, |i| i.transform.rotation()),
        }
    }

    fn selected_text_mut(&mut self) -> Option<&mut TextLayer> {
        match self.selection() {
            Some(LayerRef {
                kind: LayerKind::Text,
                id,
            }) => self.text_mut(id),
            _ => None,
        }
    }

    /// Recolor the selected text. Returns false when no text is selected.
    pub fn set_text_color(&mut self, color: Color) -> bool {
        self.selected_text_mut()
            .map(|t| t.style.color = color)
            .is_some()
    }

    pub fn set_text_weight(&mut self, weight: FontWeight) -> bool {
        self.selected_text_mut()
            .map(|t| t.style.weight = weight)
            .is_some()
    }

    /// Drop everything and start over.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replace the scene with a previously flattened sticker. Texts and
    /// effects were baked into the bitmap and cannot be recovered.
    pub fn load_flattened(&mut self, bitmap: RgbaImage) -> LayerId {
        self.reset();
        self.set_image(bitmap)
    }
}

/// Clamp into `range`; NaN and infinities map to `default`.
fn clamp_or(value: f32, range: (f32, f32), default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(range.0, range.1)
    } else {
        default
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    match items.iter().position(matches) {
        Some(idx) => {
            items.remove(idx);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::from_hex("#ff8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(Color::from_hex("fff").unwrap(), Color::WHITE);
        assert_eq!(Color::from_hex("#00000080").unwrap().a, 0x80);
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert_eq!(Color::rgb(99, 102, 241).to_hex(), "#6366f1");
    }

    #[test]
    fn test_background_parse() {
        assert_eq!("transparent".parse::<Background>().unwrap(), Background::Transparent);
        assert_eq!(
            "white".parse::<Background>().unwrap(),
            Background::Solid(Color::WHITE)
        );
        assert!("nope".parse::<Background>().is_err());
    }

    #[test]
    fn test_effect_symbol_names_round_trip() {
        for sym in EffectSymbol::ALL {
            assert_eq!(sym.name().parse::<EffectSymbol>().unwrap(), sym);
        }
        assert!("unicorn".parse::<EffectSymbol>().is_err());
    }

    #[test]
    fn test_set_image_fits_canvas() {
        let mut scene = Scene::new();
        scene.set_image(image(740, 320));
        let t = scene.image().unwrap().transform;
        assert_eq!(t.scale(), 0.5);
        assert_eq!(t.position(), canvas_center());
        assert_eq!(t.rotation(), 0.0);
    }

    #[test]
    fn test_text_position_depends_on_image() {
        let mut scene = Scene::new();
        let id = scene.add_text("hi", TextStyle::default()).unwrap();
        assert_eq!(scene.text(id).unwrap().position, canvas_center());

        scene.set_image(image(10, 10));
        let id = scene.add_text("there", TextStyle::default()).unwrap();
        assert_eq!(scene.text(id).unwrap().position, Point::new(185.0, 280.0));
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut scene = Scene::new();
        let err = scene.add_text("   ", TextStyle::default()).unwrap_err();
        assert!(matches!(err, StickerError::Validation(_)));
        assert!(scene.texts().is_empty());
    }

    #[test]
    fn test_random_effect_inside_inset() {
        let mut scene = Scene::new();
        for _ in 0..50 {
            let id = scene.add_effect(EffectSymbol::Heart);
            let p = scene.effect(id).unwrap().position;
            assert!((30.0..=340.0).contains(&p.x));
            assert!((30.0..=290.0).contains(&p.y));
        }
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut scene = Scene::new();
        let a = scene.add_text("a", TextStyle::default()).unwrap();
        let b = scene.add_text("b", TextStyle::default()).unwrap();
        scene.select(Some(LayerRef::new(LayerKind::Text, b)));
        assert!(scene.remove(LayerRef::new(LayerKind::Text, a)));
        assert_eq!(scene.selection(), None);
        assert_eq!(scene.texts().len(), 1);
        assert_eq!(scene.texts()[0].id, b);
    }

    #[test]
    fn test_dangling_selection_reads_as_none() {
        let mut scene = Scene::new();
        scene.select(Some(LayerRef::new(LayerKind::Text, Uuid::new_v4())));
        assert_eq!(scene.selection(), None);
    }

    #[test]
    fn test_size_control_targets() {
        let mut scene = Scene::new();
        scene.set_image(image(370, 320));
        assert!(scene.set_size(150.0));
        assert_eq!(scene.image().unwrap().transform.scale(), 1.5);

        let text = scene.add_text("x", TextStyle::default()).unwrap();
        assert!(scene.set_size(500.0));
        assert_eq!(scene.text(text).unwrap().style.font_size, 100.0);

        let fx = scene.add_effect_at(EffectSymbol::Star, Point::new(50.0, 50.0));
        assert!(scene.set_size(5.0));
        assert_eq!(scene.effect(fx).unwrap().size, 10.0);
        assert_eq!(scene.size_value(), 10.0);
    }

    #[test]
    fn test_non_finite_sizes_rejected() {
        let mut scene = Scene::new();
        let style = TextStyle {
            font_size: f32::NAN,
            ..TextStyle::default()
        };
        let id = scene.add_text("x", style).unwrap();
        assert_eq!(scene.text(id).unwrap().style.font_size, DEFAULT_FONT_SIZE);

        assert!(!scene.set_size(f32::NAN));
        assert!(!scene.set_size(f32::INFINITY));
        assert_eq!(scene.text(id).unwrap().style.font_size, DEFAULT_FONT_SIZE);

        let big = TextStyle {
            font_size: f32::INFINITY,
            ..TextStyle::default()
        };
        let id = scene.add_text("y", big).unwrap();
        assert_eq!(scene.text(id).unwrap().style.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_rotation_control_normalizes() {
        let mut scene = Scene::new();
        let id = scene.add_text("x", TextStyle::default()).unwrap();
        scene.set_rotation(-45.0);
        assert_eq!(scene.text(id).unwrap().rotation(), 315.0);
        assert_eq!(scene.rotation_value(), 315.0);
    }

    #[test]
    fn test_color_only_applies_to_text() {
        let mut scene = Scene::new();
        scene.add_effect_at(EffectSymbol::Fire, Point::new(40.0, 40.0));
        assert!(!scene.set_text_color(Color::WHITE));
        let id = scene.add_text("x", TextStyle::default()).unwrap();
        assert!(scene.set_text_color(Color::WHITE));
        assert!(scene.set_text_weight(FontWeight::Bold));
        let style = scene.text(id).unwrap().style;
        assert_eq!(style.color, Color::WHITE);
        assert_eq!(style.weight, FontWeight::Bold);
    }

    #[test]
    fn test_replace_image_refit_modes() {
        let mut scene = Scene::new();
        assert!(matches!(
            scene.replace_image(image(1, 1), Refit::Full),
            Err(StickerError::NoImage)
        ));

        scene.set_image(image(370, 320));
        scene.translate(
            LayerRef::new(LayerKind::Image, scene.image().unwrap().id),
            Point::new(10.0, 0.0),
        );
        scene.set_rotation(30.0);

        scene.replace_image(image(185, 160), Refit::ScaleOnly).unwrap();
        let t = scene.image().unwrap().transform;
        assert_eq!(t.scale(), 2.0);
        assert_eq!(t.rotation(), 30.0);
        assert_eq!(t.x, 195.0);

        scene.replace_image(image(370, 320), Refit::Full).unwrap();
        let t = scene.image().unwrap().transform;
        assert_eq!(t.scale(), 1.0);
        assert_eq!(t.rotation(), 0.0);
        assert_eq!(t.x, 185.0);
    }

    #[test]
    fn test_load_flattened_discards_layers() {
        let mut scene = Scene::new();
        scene.add_text("gone", TextStyle::default()).unwrap();
        scene.add_effect(EffectSymbol::Zzz);
        scene.background = Background::Solid(Color::WHITE);
        scene.load_flattened(image(370, 320));
        assert!(scene.texts().is_empty());
        assert!(scene.effects().is_empty());
        assert_eq!(scene.background, Background::Transparent);
        assert!(scene.image().is_some());
        assert_eq!(scene.selection(), None);
    }
}
