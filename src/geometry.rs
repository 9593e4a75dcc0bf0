//! Points, placement transforms and the inverse mapping used for hit-testing.

use crate::consts::MIN_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn length(&self) -> f32 {
        self.distance(&Point::ZERO)
    }

    /// Rotate around the origin by `degrees` (clockwise on a y-down canvas).
    pub fn rotated(self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn scaled(self, factor: f32) -> Self {
        Point::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Fold any angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if r >= 360.0 { 0.0 } else { r }
}

/// Placement of an element: its center position, uniform scale and rotation.
///
/// Elements are drawn around their natural center, so the position is where
/// that center lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    scale: f32,
    rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 0.0)
    }
}

impl Transform {
    pub fn new(x: f32, y: f32, scale: f32, rotation: f32) -> Self {
        let mut t = Self {
            x,
            y,
            scale: 1.0,
            rotation: 0.0,
        };
        t.set_scale(scale);
        t.set_rotation(rotation);
        t
    }

    pub fn at(position: Point) -> Self {
        Self::new(position.x, position.y, 1.0, 0.0)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_finite() {
            scale.max(MIN_SCALE)
        } else {
            1.0
        };
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    pub fn translate(&mut self, delta: Point) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Map a canvas point into the element's local, unrotated frame.
    ///
    /// Scale is deliberately ignored: local bounds are expressed in canvas
    /// units already.
    pub fn to_local(&self, point: Point) -> Point {
        (point - self.position()).rotated(-self.rotation)
    }

    /// Inverse of [`Transform::to_local`].
    pub fn to_canvas(&self, local: Point) -> Point {
        local.rotated(self.rotation) + self.position()
    }

    /// Equivalent `tiny_skia` transform: translate, rotate, then scale.
    pub fn to_skia(&self, with_scale: bool) -> tiny_skia::Transform {
        let t = tiny_skia::Transform::from_translate(self.x, self.y).pre_rotate(self.rotation);
        if with_scale {
            t.pre_scale(self.scale, self.scale)
        } else {
            t
        }
    }
}

/// Axis-aligned box centered on a local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalBox {
    pub half_width: f32,
    pub half_height: f32,
}

impl LocalBox {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    pub fn padded(self, padding: f32) -> Self {
        Self {
            half_width: self.half_width + padding,
            half_height: self.half_height + padding,
        }
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_height * 2.0
    }

    /// Strict containment; points on the border are outside.
    pub fn contains(&self, local: Point) -> bool {
        local.x > -self.half_width
            && local.x < self.half_width
            && local.y > -self.half_height
            && local.y < self.half_height
    }

    pub fn to_rect(&self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(
            -self.half_width,
            -self.half_height,
            self.width(),
            self.height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_origin_maps_to_local_origin() {
        for rotation in [0.0, 33.0, 90.0, 181.5, 359.0] {
            let t = Transform::new(120.0, -40.0, 2.5, rotation);
            assert!(approx(t.to_local(t.position()), Point::ZERO));
        }
    }

    #[test]
    fn test_to_local_inverts_rotation() {
        let t = Transform::new(10.0, 10.0, 1.0, 90.0);
        // Clockwise quarter turn on a y-down canvas: local +x points down.
        let local = t.to_local(Point::new(10.0, 20.0));
        assert!(approx(local, Point::new(10.0, 0.0)), "{local:?}");
    }

    #[test]
    fn test_to_canvas_round_trip() {
        let t = Transform::new(50.0, 70.0, 1.0, 217.0);
        let p = Point::new(-12.0, 31.0);
        assert!(approx(t.to_local(t.to_canvas(p)), p));
    }

    #[test]
    fn test_rotation_normalized() {
        let mut t = Transform::default();
        t.set_rotation(-90.0);
        assert_eq!(t.rotation(), 270.0);
        t.set_rotation(720.0);
        assert_eq!(t.rotation(), 0.0);
        t.set_rotation(f32::NAN);
        assert_eq!(t.rotation(), 0.0);
    }

    #[test]
    fn test_scale_stays_positive() {
        let mut t = Transform::default();
        t.set_scale(-3.0);
        assert!(t.scale() > 0.0);
        t.set_scale(0.0);
        assert!(t.scale() > 0.0);
    }

    #[test]
    fn test_local_box_is_strict() {
        let b = LocalBox::new(20.0, 10.0);
        assert!(b.contains(Point::new(9.9, 4.9)));
        assert!(!b.contains(Point::new(10.0, 0.0)));
        assert!(b.padded(1.0).contains(Point::new(10.0, 0.0)));
    }
}
