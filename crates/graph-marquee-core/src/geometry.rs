//! Screen/canvas points and the selection rectangle.

use serde::{Deserialize, Serialize};

/// A 2D point. Whether it is in page, container or canvas space depends on context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub fn offset_by(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Order a pair so the smaller value comes first.
pub fn correct_range(start: f32, end: f32) -> (f32, f32) {
    if start < end {
        (start, end)
    } else {
        (end, start)
    }
}

/// Raw drag rectangle in container-local pixels.
///
/// `start` is always the press position and `end` the latest tracked position.
/// Corners are never reordered in storage; use [`Bounds::from_corners`] to normalize.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
}

impl SelectionRect {
    /// A zero-area rectangle anchored at `p`.
    pub fn anchored(p: Point) -> Self {
        Self {
            start_x: p.x,
            start_y: p.y,
            end_x: p.x,
            end_y: p.y,
        }
    }

    /// Move the end corner, leaving the anchor in place.
    pub fn extend_to(&mut self, p: Point) {
        self.end_x = p.x;
        self.end_y = p.y;
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    /// True when the rectangle has zero extent on either axis.
    pub fn is_empty(&self) -> bool {
        self.start_x == self.end_x || self.start_y == self.end_y
    }
}

/// Axis-aligned rectangle with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Normalize two arbitrary corners, each axis independently.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let (min_x, max_x) = correct_range(a.x, b.x);
        let (min_y, max_y) = correct_range(a.y, b.y);
        Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    /// Closed-interval containment on both axes.
    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_range_orders_pairs() {
        assert_eq!(correct_range(1.0, 3.0), (1.0, 3.0));
        assert_eq!(correct_range(3.0, 1.0), (1.0, 3.0));
        assert_eq!(correct_range(2.0, 2.0), (2.0, 2.0));
    }

    #[test]
    fn rect_keeps_anchor_when_extended() {
        let mut rect = SelectionRect::anchored(Point::new(50.0, 40.0));
        assert!(rect.is_empty());

        rect.extend_to(Point::new(10.0, 90.0));
        assert_eq!(rect.start(), Point::new(50.0, 40.0));
        assert_eq!(rect.end(), Point::new(10.0, 90.0));
        assert!(!rect.is_empty());
    }

    #[test]
    fn bounds_are_direction_independent() {
        let a = Point::new(10.0, 20.0);
        let b = Point::new(30.0, 60.0);
        let expected = Bounds::from_corners(a, b);

        for (p, q) in [
            (b, a),
            (Point::new(10.0, 60.0), Point::new(30.0, 20.0)),
            (Point::new(30.0, 20.0), Point::new(10.0, 60.0)),
        ] {
            assert_eq!(Bounds::from_corners(p, q), expected);
        }
        assert_eq!(expected.width(), 20.0);
        assert_eq!(expected.height(), 40.0);
    }

    #[test]
    fn bounds_are_closed_intervals() {
        let bounds = Bounds::from_corners(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(bounds.contains(Point::new(0.0, 10.0)));
        assert!(bounds.contains(Point::new(10.0, 0.0)));
        assert!(!bounds.contains(Point::new(10.01, 5.0)));
        assert!(!bounds.contains(Point::new(5.0, -0.01)));
    }
}
