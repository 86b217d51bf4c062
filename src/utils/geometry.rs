// src/utils/geometry.rs
// Geometry primitives shared by the map model, the BSP and the blockmaps.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }

    /// Vector from `other` to `self`.
    pub fn minus(&self, other: &Point2D) -> Vector2D {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3-D cross product.
    pub fn cross(&self, other: &Vector2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// A directed line segment. The "front" of a line is its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2D {
    pub start: Point2D,
    pub end: Point2D,
}

impl Line2D {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Line2D { start, end }
    }

    pub fn direction(&self) -> Vector2D {
        self.end.minus(&self.start)
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn classify_point(&self, point: &Point2D) -> f64 {
        // Returns positive if point is on front side
        // Returns negative if point is on back side
        // Returns near zero if point is on the line
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dy * (point.x - self.start.x)) - (dx * (point.y - self.start.y))
    }

    /// Perpendicular distance from `point` to the supporting line, positive
    /// on the front side. Zero-length lines yield zero.
    pub fn signed_distance(&self, point: &Point2D) -> f64 {
        let length = self.length();
        if length == 0.0 {
            return 0.0;
        }
        self.classify_point(point) / length
    }

    pub fn bbox(&self) -> BoundingBox {
        let mut bbox = BoundingBox::new_empty();
        bbox.expand_point(self.start.x, self.start.y);
        bbox.expand_point(self.end.x, self.end.y);
        bbox
    }
}

/// Axis-aligned box in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new_empty() -> Self {
        BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox { min_x, min_y, max_x, max_y }
    }

    pub fn around(center: &Point2D, radius: f64) -> Self {
        BoundingBox::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        )
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Self {
        let mut bbox = BoundingBox::new_empty();
        for p in points {
            bbox.expand_point(p.x, p.y);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn expand_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn combine(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Returns a copy grown by `amount` on every side.
    pub fn expanded(&self, amount: f64) -> Self {
        BoundingBox::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }

    // Check if the bounding box contains a point
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    // Checks if two Bounding Boxes intersects (touching counts)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.max_x >= other.min_x && self.min_x <= other.max_x &&
        self.max_y >= other.min_y && self.min_y <= other.max_y
    }

    /// Like [`intersects`](Self::intersects) but boxes that merely touch do
    /// not overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.max_x > other.min_x && self.min_x < other.max_x &&
        self.max_y > other.min_y && self.min_y < other.max_y
    }
}

/// Twice the signed area of a polygon; positive for counter-clockwise winding.
pub fn signed_area2(points: &[Point2D]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_classify_front_is_right_hand_side() {
        let line = Line2D::new(Point2D::new(0.0, 0.0), Point2D::new(0.0, 10.0));
        assert!(line.classify_point(&Point2D::new(5.0, 5.0)) > 0.0);
        assert!(line.classify_point(&Point2D::new(-5.0, 5.0)) < 0.0);
        assert_eq!(line.classify_point(&Point2D::new(0.0, 42.0)), 0.0);
    }

    #[test]
    fn test_signed_distance_is_normalized() {
        let line = Line2D::new(Point2D::new(128.0, 128.0), Point2D::new(128.0, 0.0));
        assert_approx_eq!(line.signed_distance(&Point2D::new(100.0, 64.0)), 28.0);
        assert_approx_eq!(line.signed_distance(&Point2D::new(150.0, 3.0)), -22.0);
    }

    #[test]
    fn test_zero_length_line_distance() {
        let p = Point2D::new(3.0, 3.0);
        let line = Line2D::new(p, p);
        assert_eq!(line.signed_distance(&Point2D::new(10.0, 10.0)), 0.0);
    }

    #[test]
    fn test_overlap_excludes_touching() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.overlaps(&b));
        assert!(a.expanded(0.5).overlaps(&b));
    }

    #[test]
    fn test_signed_area_winding() {
        let ccw = [
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        assert_approx_eq!(signed_area2(&ccw), 2.0);
        let cw: Vec<Point2D> = ccw.iter().rev().copied().collect();
        assert_approx_eq!(signed_area2(&cw), -2.0);
    }

    #[test]
    fn test_empty_box() {
        assert!(BoundingBox::new_empty().is_empty());
        let bbox = BoundingBox::from_points(&[Point2D::new(1.0, 2.0), Point2D::new(-3.0, 4.0)]);
        assert!(!bbox.is_empty());
        assert_approx_eq!(bbox.width(), 4.0);
        assert_approx_eq!(bbox.height(), 2.0);
    }
}
