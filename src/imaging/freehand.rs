//! Freehand mask: keep or erase the inside of a hand-drawn polygon.
//!
//! Points are captured in display coordinates of a scaled-down preview and
//! mapped back to image pixels with `1 / display_scale` when applied.

use image::RgbaImage;
use tiny_skia::{
    BlendMode, Color as SkiaColor, FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, Path,
    PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use super::{ensure_not_empty, from_pixmap, to_pixmap};
use crate::consts::MIN_POLYGON_POINTS;
use crate::error::{Result, StickerError};
use crate::geometry::Point;

const PREVIEW_STROKE_WIDTH: f32 = 3.0;
const PREVIEW_FILL_ALPHA: f32 = 0.3;

/// What to do with the inside of the polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskMode {
    /// Keep only the inside.
    Keep,
    /// Erase the inside.
    Remove,
}

impl std::str::FromStr for MaskMode {
    type Err = StickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "remove" | "erase" => Ok(Self::Remove),
            _ => Err(StickerError::validation(format!("unknown mask mode: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreehandTool {
    capturing: bool,
    points: Vec<Point>,
    display_scale: f32,
}

impl FreehandTool {
    /// Prepare the tool for `image` shown inside a `max_width × max_height`
    /// viewport.
    pub fn open(image: &RgbaImage, max_width: f32, max_height: f32) -> Result<Self> {
        ensure_not_empty(image)?;
        let scale = (max_width / image.width() as f32).min(max_height / image.height() as f32);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(StickerError::validation("viewport is empty"));
        }
        Ok(Self::with_scale(scale))
    }

    /// Tool whose display coordinates are `display_scale` times image pixels.
    pub fn with_scale(display_scale: f32) -> Self {
        Self {
            capturing: false,
            points: Vec::new(),
            display_scale,
        }
    }

    pub fn display_scale(&self) -> f32 {
        self.display_scale
    }

    /// Preview size for `image` at the tool's display scale.
    pub fn display_size(&self, image: &RgbaImage) -> (u32, u32) {
        let scaled = |v: u32| ((v as f32 * self.display_scale).round() as u32).max(1);
        (scaled(image.width()), scaled(image.height()))
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// A finished stroke with enough points to form a polygon.
    pub fn is_closed(&self) -> bool {
        !self.capturing && self.points.len() >= MIN_POLYGON_POINTS
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.capturing = true;
        self.points.clear();
        self.points.push(p);
    }

    pub fn pointer_move(&mut self, p: Point) -> bool {
        if self.capturing {
            self.points.push(p);
        }
        self.capturing
    }

    /// End the stroke. Returns whether it closed into a polygon.
    pub fn pointer_up(&mut self) -> bool {
        if !self.capturing {
            return false;
        }
        self.capturing = false;
        self.is_closed()
    }

    pub fn reset(&mut self) {
        self.capturing = false;
        self.points.clear();
    }

    /// Set the polygon directly, in display coordinates.
    pub fn set_points(&mut self, points: Vec<Point>) {
        self.capturing = false;
        self.points = points;
    }

    /// Produce a new image of the same size with the polygon applied.
    pub fn apply(&self, image: &RgbaImage, mode: MaskMode) -> Result<RgbaImage> {
        if self.points.len() < MIN_POLYGON_POINTS {
            return Err(StickerError::validation(
                "draw around the area first (at least 3 points)",
            ));
        }
        ensure_not_empty(image)?;

        let inv = 1.0 / self.display_scale;
        let polygon = polygon_path(self.points.iter().map(|p| p.scaled(inv)))
            .ok_or_else(|| StickerError::validation("selection has no area"))?;

        let source = to_pixmap(image)?;
        let (w, h) = image.dimensions();

        let result = match mode {
            MaskMode::Keep => {
                let mut clip = Mask::new(w, h).ok_or(StickerError::EmptyImage)?;
                clip.fill_path(&polygon, FillRule::Winding, true, Transform::identity());
                let mut canvas = Pixmap::new(w, h).ok_or(StickerError::EmptyImage)?;
                canvas.draw_pixmap(
                    0,
                    0,
                    source.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    Some(&clip),
                );
                canvas
            }
            MaskMode::Remove => {
                let mut canvas = source;
                let mut punch = Paint::default();
                punch.set_color(SkiaColor::BLACK);
                punch.blend_mode = BlendMode::DestinationOut;
                punch.anti_alias = true;
                canvas.fill_path(
                    &polygon,
                    &punch,
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
                canvas
            }
        };

        tracing::info!(?mode, points = self.points.len(), "freehand mask applied");
        Ok(from_pixmap(&result))
    }

    /// Scaled-down image with the stroke drawn over it; once closed, the
    /// polygon is shaded translucent green.
    pub fn preview(&self, image: &RgbaImage) -> Result<RgbaImage> {
        ensure_not_empty(image)?;
        let (w, h) = self.display_size(image);
        let mut canvas = Pixmap::new(w, h).ok_or(StickerError::EmptyImage)?;
        let source = to_pixmap(image)?;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        canvas.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            Transform::from_scale(self.display_scale, self.display_scale),
            None,
        );

        let closed = self.is_closed();
        let path = if closed {
            polygon_path(self.points.iter().copied())
        } else {
            polyline_path(&self.points)
        };
        if let Some(path) = path {
            let mut green = Paint::default();
            green.anti_alias = true;
            if closed {
                green.set_color_rgba8(0, 255, 0, (PREVIEW_FILL_ALPHA * 255.0).round() as u8);
                canvas.fill_path(&path, &green, FillRule::Winding, Transform::identity(), None);
            }
            green.set_color_rgba8(0, 255, 0, 255);
            let stroke = Stroke {
                width: PREVIEW_STROKE_WIDTH,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            canvas.stroke_path(&path, &green, &stroke, Transform::identity(), None);
        }

        Ok(from_pixmap(&canvas))
    }
}

fn polygon_path(mut points: impl Iterator<Item = Point>) -> Option<Path> {
    let first = points.next()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in points {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

fn polyline_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}
