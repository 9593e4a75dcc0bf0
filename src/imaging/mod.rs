//! Pixel-level image tools
//!
//! Everything here works on decoded straight-alpha `RgbaImage`s:
//! - codec: decode an upload, encode the flattened sticker as PNG
//! - crop: apply a rectangle chosen by an external cropping widget
//! - [`cutout`]: flood-fill background removal from the top-left corner
//! - [`border`]: silhouette border around the opaque pixels
//! - [`freehand`]: keep or erase a hand-drawn polygon
//!
//! The `tiny_skia` surfaces used for compositing store premultiplied pixels;
//! [`to_pixmap`] and [`from_pixmap`] convert at the boundary.

pub mod border;
pub mod cutout;
pub mod freehand;

use std::io::Cursor;

use image::{ImageFormat, ImageReader, Rgba, RgbaImage};
use tiny_skia::{ColorU8, Pixmap};

use crate::error::{Result, StickerError};

pub use border::{BorderOptions, add_border};
pub use cutout::{CutoutOptions, remove_background};
pub use freehand::{FreehandTool, MaskMode};

/// Decode an uploaded image (PNG or JPEG) into RGBA.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StickerError::Decode(format!("failed to guess image format: {e}")))?
        .decode()
        .map_err(|e| StickerError::Decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    tracing::debug!(width = rgba.width(), height = rgba.height(), "image decoded");
    Ok(rgba)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| StickerError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Crop rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect with a `width × height` image; `None` if nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<CropRect> {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        (x1 > x0 && y1 > y0).then(|| CropRect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

impl std::str::FromStr for CropRect {
    type Err = StickerError;

    /// Parse `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| StickerError::validation(format!("invalid crop rectangle: {s}")))?;
        match parts.as_slice() {
            [x, y, w, h] => Ok(CropRect::new(*x, *y, *w, *h)),
            _ => Err(StickerError::validation(format!(
                "crop rectangle needs x,y,width,height: {s}"
            ))),
        }
    }
}

/// Cut `rect` out of `image`. The rectangle is clamped to the image bounds.
pub fn crop(image: &RgbaImage, rect: CropRect) -> Result<RgbaImage> {
    let (w, h) = image.dimensions();
    let r = rect
        .clamp_to(w, h)
        .ok_or_else(|| StickerError::validation("crop rectangle is empty"))?;
    Ok(image::imageops::crop_imm(image, r.x, r.y, r.width, r.height).to_image())
}

/// Copy straight-alpha pixels into a premultiplied pixmap.
pub fn to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or(StickerError::EmptyImage)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let Rgba([r, g, b, a]) = *src;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

pub fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

pub(crate) fn ensure_not_empty(image: &RgbaImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(StickerError::EmptyImage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, StickerError::Decode(_)));
    }

    #[test]
    fn test_png_round_trip_keeps_alpha() {
        let mut img = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(decode(&bytes).unwrap(), img);
    }

    #[test]
    fn test_crop_clamps_to_image() {
        let img = RgbaImage::from_fn(10, 10, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let out = crop(&img, CropRect::new(6, 7, 100, 100)).unwrap();
        assert_eq!(out.dimensions(), (4, 3));
        assert_eq!(*out.get_pixel(0, 0), Rgba([6, 7, 0, 255]));
    }

    #[test]
    fn test_empty_crop_rejected() {
        let img = RgbaImage::new(10, 10);
        assert!(matches!(
            crop(&img, CropRect::new(10, 0, 5, 5)),
            Err(StickerError::Validation(_))
        ));
        assert!(crop(&img, CropRect::new(0, 0, 0, 5)).is_err());
    }

    #[test]
    fn test_crop_rect_parse() {
        assert_eq!(
            "1, 2,30,40".parse::<CropRect>().unwrap(),
            CropRect::new(1, 2, 30, 40)
        );
        assert!("1,2,3".parse::<CropRect>().is_err());
        assert!("a,b,c,d".parse::<CropRect>().is_err());
    }

    #[test]
    fn test_pixmap_conversion_preserves_opaque_and_clear() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([200, 100, 50, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        let back = from_pixmap(&to_pixmap(&img).unwrap());
        assert_eq!(back, img);
        assert!(matches!(
            to_pixmap(&RgbaImage::new(0, 4)),
            Err(StickerError::EmptyImage)
        ));
    }
}
