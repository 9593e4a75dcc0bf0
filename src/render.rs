//! Paints a [`Scene`] onto a fixed-size `tiny_skia` surface.
//!
//! Draw order, back to front: background, image, texts, effects. Every
//! element is drawn in its own local frame; the selection outline is stroked in
//! that same frame so it rotates with the element.

use image::RgbaImage;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    StrokeDash, Transform,
};

use crate::consts::{
    CANVAS_HEIGHT, CANVAS_WIDTH, SELECTION_COLOR, SELECTION_DASH, SELECTION_LINE_WIDTH,
    TEXT_STROKE_WIDTH,
};
use crate::error::{Result, StickerError};
use crate::geometry::LocalBox;
use crate::hit::{effect_bounds, text_bounds};
use crate::imaging::{from_pixmap, to_pixmap};
use crate::scene::{
    Background, Color, EffectLayer, ImageLayer, LayerKind, LayerRef, Scene, TextLayer,
};
use crate::text::{FAUX_BOLD_RATIO, FontWeight, Typeface};

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    typeface: Typeface,
}

impl Renderer {
    pub fn new(typeface: Typeface) -> Self {
        Self { typeface }
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Render the scene for on-screen editing, selection outline included.
    pub fn render(&self, scene: &Scene) -> Result<Pixmap> {
        self.render_with(scene, true)
    }

    /// Render the final sticker: no selection outline, straight-alpha RGBA.
    pub fn flatten(&self, scene: &Scene) -> Result<RgbaImage> {
        let pixmap = self.render_with(scene, false)?;
        Ok(from_pixmap(&pixmap))
    }

    fn render_with(&self, scene: &Scene, show_selection: bool) -> Result<Pixmap> {
        let mut pixmap = Pixmap::new(CANVAS_WIDTH, CANVAS_HEIGHT).ok_or(StickerError::EmptyImage)?;
        let selection = if show_selection {
            scene.selection()
        } else {
            None
        };

        if let Background::Solid(color) = scene.background {
            pixmap.fill(color.to_skia());
        }

        if let Some(image) = scene.image() {
            let selected = selection == Some(LayerRef::new(LayerKind::Image, image.id));
            draw_image(&mut pixmap, image, selected)?;
        }

        for text in scene.texts() {
            let selected = selection == Some(LayerRef::new(LayerKind::Text, text.id));
            self.draw_text(&mut pixmap, text, selected);
        }

        for effect in scene.effects() {
            let selected = selection == Some(LayerRef::new(LayerKind::Effect, effect.id));
            self.draw_effect(&mut pixmap, effect, selected);
        }

        Ok(pixmap)
    }

    fn draw_text(&self, pixmap: &mut Pixmap, text: &TextLayer, selected: bool) {
        let transform = text.transform().to_skia(false);

        match self.typeface.outline(&text.content, text.style.font_size) {
            Some(path) => {
                let halo = stroke(TEXT_STROKE_WIDTH);
                pixmap.stroke_path(&path, &paint(Color::WHITE), &halo, transform, None);

                let fill = paint(text.style.color);
                pixmap.fill_path(&path, &fill, FillRule::Winding, transform, None);
                if text.style.weight == FontWeight::Bold {
                    let bold = stroke(text.style.font_size * FAUX_BOLD_RATIO);
                    pixmap.stroke_path(&path, &fill, &bold, transform, None);
                }
            }
            None => {
                tracing::debug!(content = %text.content, "no outline available for text");
            }
        }

        if selected {
            draw_selection(pixmap, text_bounds(text, &self.typeface), transform);
        }
    }

    fn draw_effect(&self, pixmap: &mut Pixmap, effect: &EffectLayer, selected: bool) {
        let transform = effect.transform().to_skia(false);
        let color = effect.symbol.badge_color();
        match self.typeface.symbol_outline(effect.symbol.glyph(), effect.size) {
            Some(path) => {
                pixmap.fill_path(&path, &paint(color), FillRule::Winding, transform, None);
            }
            None => {
                if let Some(disc) = PathBuilder::from_circle(0.0, 0.0, effect.size / 2.0) {
                    pixmap.fill_path(&disc, &paint(color), FillRule::Winding, transform, None);
                    pixmap.stroke_path(&disc, &paint(Color::WHITE), &stroke(2.0), transform, None);
                }
            }
        }

        if selected {
            draw_selection(pixmap, effect_bounds(effect), transform);
        }
    }
}

fn draw_image(pixmap: &mut Pixmap, image: &ImageLayer, selected: bool) -> Result<()> {
    let (w, h) = image.bitmap.dimensions();
    if w == 0 || h == 0 {
        return Ok(());
    }
    let source = to_pixmap(&image.bitmap)?;
    let transform = image
        .transform
        .to_skia(true)
        .pre_translate(-(w as f32) / 2.0, -(h as f32) / 2.0);
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);

    if selected {
        // Outline in the rotated frame, at display size so the dash stays even.
        let scale = image.transform.scale();
        let bounds = LocalBox::new(w as f32 * scale, h as f32 * scale);
        draw_selection(pixmap, bounds, image.transform.to_skia(false));
    }
    Ok(())
}

fn draw_selection(pixmap: &mut Pixmap, bounds: LocalBox, transform: Transform) {
    let Some(rect) = bounds.to_rect() else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    let mut outline = Stroke {
        width: SELECTION_LINE_WIDTH,
        ..Stroke::default()
    };
    outline.dash = StrokeDash::new(SELECTION_DASH.to_vec(), 0.0);
    let [r, g, b] = SELECTION_COLOR;
    pixmap.stroke_path(&path, &paint(Color::rgb(r, g, b)), &outline, transform, None);
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}
