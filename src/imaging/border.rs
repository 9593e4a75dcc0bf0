//! Silhouette border: a solid outline that follows the opaque pixels.
//!
//! The source is stamped around a circle of radius `thickness`, the union is
//! recolored with source-in, and the original is drawn back on top at
//! `(thickness, thickness)`.

use image::RgbaImage;
use tiny_skia::{BlendMode, FilterQuality, Paint, Pixmap, PixmapPaint, Rect, Transform};

use super::{ensure_not_empty, from_pixmap, to_pixmap};
use crate::consts::{BORDER_SAMPLES, BORDER_THICKNESS};
use crate::error::{Result, StickerError};
use crate::scene::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderOptions {
    pub thickness: u32,
    /// Number of offsets around the circle.
    pub samples: u32,
    pub color: Color,
}

impl Default for BorderOptions {
    fn default() -> Self {
        Self {
            thickness: BORDER_THICKNESS,
            samples: BORDER_SAMPLES,
            color: Color::WHITE,
        }
    }
}

/// Return a new image, `2 * thickness` larger in each dimension, with the
/// border behind the original.
pub fn add_border(image: &RgbaImage, options: &BorderOptions) -> Result<RgbaImage> {
    ensure_not_empty(image)?;
    let k = options.thickness;
    let (w, h) = image.dimensions();
    let (out_w, out_h) = (w + 2 * k, h + 2 * k);

    let source = to_pixmap(image)?;
    let mut canvas = Pixmap::new(out_w, out_h).ok_or(StickerError::EmptyImage)?;

    let stamp = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    let radius = k as f32;
    let samples = options.samples.max(1);
    for i in 0..samples {
        let angle = 2.0 * std::f32::consts::PI * i as f32 / samples as f32;
        let (sin, cos) = angle.sin_cos();
        let offset = Transform::from_translate(radius + radius * cos, radius + radius * sin);
        canvas.draw_pixmap(0, 0, source.as_ref(), &stamp, offset, None);
    }

    // Recolor the stamped silhouette, keeping its coverage.
    let mut fill = Paint::default();
    fill.set_color(options.color.to_skia());
    fill.blend_mode = BlendMode::SourceIn;
    if let Some(rect) = Rect::from_xywh(0.0, 0.0, out_w as f32, out_h as f32) {
        canvas.fill_rect(rect, &fill, Transform::identity(), None);
    }

    canvas.draw_pixmap(
        k as i32,
        k as i32,
        source.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    tracing::info!(width = out_w, height = out_h, thickness = k, "border added");
    Ok(from_pixmap(&canvas))
}
