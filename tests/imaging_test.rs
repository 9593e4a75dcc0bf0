//! Integration tests for the pixel tools
//!
//! These tests create deterministic test images with known patterns
//! and verify cutout, border, freehand mask and crop results.

use image::{Rgba, RgbaImage};
use sticker_studio::StickerError;
use sticker_studio::geometry::Point;
use sticker_studio::imaging::{
    BorderOptions, CropRect, CutoutOptions, FreehandTool, MaskMode, add_border, crop, decode,
    encode_png, remove_background,
};

// Helper to create a test image with specific dimensions filled with a color
fn create_solid_image(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
    img
}

// Helper to draw a filled rectangle on an image
fn draw_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

fn opaque_count(img: &RgbaImage) -> usize {
    img.pixels().filter(|p| p[3] != 0).count()
}

// Color constants
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OFF_WHITE: Rgba<u8> = Rgba([230, 235, 240, 255]); // Within tolerance of white
const BLUE: Rgba<u8> = Rgba([0, 0, 200, 255]);
const RED: Rgba<u8> = Rgba([220, 30, 30, 255]);

// ============================================================================
// Flood-Fill Cutout Tests
// ============================================================================

#[test]
fn test_cutout_single_color_image_fully_removed() {
    for color in [WHITE, BLUE, RED] {
        let mut img = create_solid_image(23, 17, color);
        let cleared = remove_background(&mut img, &CutoutOptions::default()).unwrap();
        assert_eq!(cleared, 23 * 17);
        assert_eq!(opaque_count(&img), 0, "every pixel should be transparent");
    }
}

#[test]
fn test_cutout_is_idempotent() {
    let mut img = create_solid_image(40, 30, WHITE);
    draw_rect(&mut img, 10, 8, 20, 14, BLUE);
    draw_rect(&mut img, 0, 25, 40, 5, OFF_WHITE);

    let mut once = img.clone();
    remove_background(&mut once, &CutoutOptions::default()).unwrap();
    let mut twice = once.clone();
    let cleared = remove_background(&mut twice, &CutoutOptions::default()).unwrap();

    assert_eq!(cleared, 0);
    assert_eq!(once, twice);
}

#[test]
fn test_cutout_removes_near_colors_connected_to_corner() {
    let mut img = create_solid_image(30, 30, WHITE);
    draw_rect(&mut img, 0, 20, 30, 10, OFF_WHITE);
    draw_rect(&mut img, 10, 5, 10, 10, BLUE);

    remove_background(&mut img, &CutoutOptions::default()).unwrap();

    assert_eq!(img.get_pixel(0, 29)[3], 0, "near-white strip should be removed");
    assert_eq!(opaque_count(&img), 100, "only the subject should remain");
    assert_eq!(*img.get_pixel(15, 10), BLUE);
}

#[test]
fn test_cutout_preserves_enclosed_island() {
    // Blue ring with a white hole: the hole has the background color but is
    // not connected to the corner.
    let mut img = create_solid_image(30, 30, WHITE);
    draw_rect(&mut img, 5, 5, 20, 20, BLUE);
    draw_rect(&mut img, 10, 10, 10, 10, WHITE);

    remove_background(&mut img, &CutoutOptions::default()).unwrap();

    assert_eq!(img.get_pixel(0, 0)[3], 0);
    assert_eq!(img.get_pixel(29, 29)[3], 0);
    assert_eq!(*img.get_pixel(15, 15), WHITE, "island must be preserved");
    assert_eq!(opaque_count(&img), 20 * 20);
}

#[test]
fn test_cutout_zero_tolerance_is_exact() {
    let mut img = create_solid_image(10, 10, WHITE);
    draw_rect(&mut img, 5, 0, 5, 10, OFF_WHITE);
    let cleared = remove_background(&mut img, &CutoutOptions { tolerance: 0 }).unwrap();
    assert_eq!(cleared, 50);
    assert_eq!(img.get_pixel(7, 7)[3], 255);
}

// ============================================================================
// Border Tests
// ============================================================================

#[test]
fn test_border_output_size_and_placement() {
    let mut img = create_solid_image(30, 20, Rgba([0, 0, 0, 0]));
    draw_rect(&mut img, 5, 5, 20, 10, BLUE);

    let out = add_border(&img, &BorderOptions::default()).unwrap();

    assert_eq!(out.dimensions(), (30 + 16, 20 + 16));
    // The original sits unchanged at (8, 8).
    for y in 5..15 {
        for x in 5..25 {
            assert_eq!(*out.get_pixel(x + 8, y + 8), BLUE);
        }
    }
    // Border pixels directly above and left of the subject are white.
    assert_eq!(*out.get_pixel(5 + 8, 5 + 8 - 4), WHITE);
    assert_eq!(*out.get_pixel(5 + 8 - 4, 10 + 8), WHITE);
    // Far corner stays transparent.
    assert_eq!(out.get_pixel(0, 0)[3], 0);
}

#[test]
fn test_border_on_empty_image_rejected() {
    let img = RgbaImage::new(0, 10);
    assert!(matches!(
        add_border(&img, &BorderOptions::default()),
        Err(StickerError::EmptyImage)
    ));
}

// ============================================================================
// Freehand Mask Tests
// ============================================================================

#[test]
fn test_freehand_fewer_than_three_points_rejected() {
    let img = create_solid_image(20, 20, RED);
    let mut tool = FreehandTool::open(&img, 20.0, 20.0).unwrap();
    tool.pointer_down(Point::new(2.0, 2.0));
    tool.pointer_move(Point::new(18.0, 18.0));
    assert!(!tool.pointer_up());

    let err = tool.apply(&img, MaskMode::Keep).unwrap_err();
    assert!(matches!(err, StickerError::Validation(_)));
    assert_eq!(opaque_count(&img), 400, "source must be untouched");
}

#[test]
fn test_freehand_keep_triangle() {
    let img = create_solid_image(20, 20, RED);
    let mut tool = FreehandTool::open(&img, 20.0, 20.0).unwrap();
    tool.set_points(vec![
        Point::new(0.0, 0.0),
        Point::new(20.0, 0.0),
        Point::new(0.0, 20.0),
    ]);

    let out = tool.apply(&img, MaskMode::Keep).unwrap();

    assert_eq!(out.dimensions(), (20, 20));
    assert_eq!(*out.get_pixel(3, 3), RED);
    assert_eq!(out.get_pixel(17, 17)[3], 0);
}

// ============================================================================
// Codec & Crop Tests
// ============================================================================

#[test]
fn test_crop_then_encode() {
    let mut img = create_solid_image(50, 40, WHITE);
    draw_rect(&mut img, 10, 10, 5, 5, BLUE);
    let cropped = crop(&img, CropRect::new(10, 10, 5, 5)).unwrap();
    assert_eq!(cropped, create_solid_image(5, 5, BLUE));

    let decoded = decode(&encode_png(&cropped).unwrap()).unwrap();
    assert_eq!(decoded, cropped);
}
