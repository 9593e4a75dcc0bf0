//! Hit-testing against scene layers.
//!
//! Every check maps the pointer into the layer's local frame with
//! [`Transform::to_local`](crate::geometry::Transform::to_local), so press,
//! hover and double-click all agree on where an element is.

use crate::consts::{EFFECT_HIT_MARGIN, TEXT_HIT_PADDING};
use crate::geometry::{LocalBox, Point};
use crate::scene::{EffectLayer, ImageLayer, LayerKind, LayerRef, Scene, TextLayer};
use crate::text::TextMeasure;

/// Which layers a hit test may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitScope {
    /// Texts, then effects, then the image.
    All,
    /// Texts, then effects. The image is never deletable.
    Deletable,
}

/// Local bounds of a text layer: measured width × font size plus padding.
pub fn text_bounds(text: &TextLayer, measure: &impl TextMeasure) -> LocalBox {
    let width = measure.measure(&text.content, text.style.font_size, text.style.weight);
    LocalBox::new(width, text.style.font_size).padded(TEXT_HIT_PADDING)
}

/// Local bounds of an effect: its square plus a margin.
pub fn effect_bounds(effect: &EffectLayer) -> LocalBox {
    LocalBox::new(effect.size, effect.size).padded(EFFECT_HIT_MARGIN)
}

pub fn text_contains(text: &TextLayer, point: Point, measure: &impl TextMeasure) -> bool {
    text_bounds(text, measure).contains(text.transform().to_local(point))
}

pub fn effect_contains(effect: &EffectLayer, point: Point) -> bool {
    effect_bounds(effect).contains(effect.transform().to_local(point))
}

/// Circular, rotation-invariant approximation of the image footprint.
pub fn image_contains(image: &ImageLayer, point: Point) -> bool {
    image.transform.to_local(point).length() < image.hit_radius()
}

/// Find the topmost layer under `point`.
///
/// Category order is fixed (text above effects above the image) and within a
/// category the most recently added layer wins.
pub fn hit_test(
    scene: &Scene,
    point: Point,
    measure: &impl TextMeasure,
    scope: HitScope,
) -> Option<LayerRef> {
    if let Some(text) = scene
        .texts()
        .iter()
        .rev()
        .find(|t| text_contains(t, point, measure))
    {
        return Some(LayerRef::new(LayerKind::Text, text.id));
    }

    if let Some(effect) = scene
        .effects()
        .iter()
        .rev()
        .find(|e| effect_contains(e, point))
    {
        return Some(LayerRef::new(LayerKind::Effect, effect.id));
    }

    if scope == HitScope::All
        && let Some(image) = scene.image()
        && image_contains(image, point)
    {
        return Some(LayerRef::new(LayerKind::Image, image.id));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EffectSymbol, TextStyle};
    use crate::text::Typeface;
    use image::RgbaImage;

    fn face() -> Typeface {
        Typeface::fallback()
    }

    #[test]
    fn test_text_bounds_padding() {
        let mut scene = Scene::new();
        let id = scene.add_text("abcd", TextStyle::default()).unwrap();
        let bounds = text_bounds(scene.text(id).unwrap(), &face());
        // 4 chars * 40 * 0.55 = 88 wide, 40 tall, 10 padding each side
        assert!((bounds.width() - 108.0).abs() < 1e-3);
        assert!((bounds.height() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_effect_margin() {
        let mut scene = Scene::new();
        let id = scene.add_effect_at(EffectSymbol::Star, Point::new(100.0, 100.0));
        let effect = scene.effect(id).unwrap();
        assert!(effect_contains(effect, Point::new(124.0, 100.0)));
        assert!(!effect_contains(effect, Point::new(125.0, 100.0)));
    }

    #[test]
    fn test_image_circle() {
        let mut scene = Scene::new();
        scene.set_image(RgbaImage::new(370, 320));
        let image = scene.image().unwrap();
        // radius = 370 / 2
        assert!(image_contains(image, Point::new(185.0 + 184.0, 160.0)));
        assert!(!image_contains(image, Point::new(185.0 + 185.0, 160.0)));
        // corners of the rendered rectangle fall outside the circle
        assert!(!image_contains(image, Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_priority_text_over_effect_over_image() {
        let mut scene = Scene::new();
        scene.set_image(RgbaImage::new(370, 320));
        let center = crate::scene::canvas_center();
        let fx = scene.add_effect_at(EffectSymbol::Heart, center);
        let p = center;

        assert_eq!(
            hit_test(&scene, p, &face(), HitScope::All),
            Some(LayerRef::new(LayerKind::Effect, fx))
        );

        let text = scene.add_text("top", TextStyle::default()).unwrap();
        // Added with an image present, so it starts near the bottom edge.
        assert_eq!(
            hit_test(&scene, p, &face(), HitScope::All),
            Some(LayerRef::new(LayerKind::Effect, fx))
        );
        scene.text_mut(text).unwrap().position = center;
        assert_eq!(
            hit_test(&scene, p, &face(), HitScope::All),
            Some(LayerRef::new(LayerKind::Text, text))
        );
    }

    #[test]
    fn test_topmost_in_category_wins() {
        let mut scene = Scene::new();
        let p = Point::new(60.0, 60.0);
        scene.add_effect_at(EffectSymbol::Note, p);
        let top = scene.add_effect_at(EffectSymbol::Fire, p);
        assert_eq!(
            hit_test(&scene, p, &face(), HitScope::All),
            Some(LayerRef::new(LayerKind::Effect, top))
        );
    }

    #[test]
    fn test_deletable_scope_skips_image() {
        let mut scene = Scene::new();
        scene.set_image(RgbaImage::new(100, 100));
        let p = crate::scene::canvas_center();
        assert!(hit_test(&scene, p, &face(), HitScope::All).is_some());
        assert_eq!(hit_test(&scene, p, &face(), HitScope::Deletable), None);
    }

    #[test]
    fn test_rotated_effect_hit() {
        let mut scene = Scene::new();
        let id = scene.add_effect_at(EffectSymbol::Skull, Point::new(100.0, 100.0));
        let fx = scene.effect_mut(id).unwrap();
        fx.size = 40.0;
        fx.set_rotation(45.0);
        let effect = scene.effect(id).unwrap();
        // Half-diagonal of the rotated 50x50 box lies along the axes now.
        assert!(effect_contains(effect, Point::new(100.0, 134.0)));
        // The unrotated corner region is no longer inside.
        assert!(!effect_contains(effect, Point::new(123.0, 123.0)));
    }
}
