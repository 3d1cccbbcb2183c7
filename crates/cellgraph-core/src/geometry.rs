//! Geometric primitives for the cell model.
//!
//! This module provides the value types used to describe where cells are and
//! how large they are, together with the rotation helpers needed by the
//! connection resolver and the region queries.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate
//! - [`Size`] - Width and height dimensions
//! - [`Rect`] - An axis-aligned rectangle stored as origin plus size
//! - [`Insets`] - Padding values for four sides
//! - [`Geometry`] - The positional state of a single cell
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Angles are expressed in degrees and grow clockwise on screen, matching the
//! `rotation` style key.

mod cell_geometry;

pub use cell_geometry::Geometry;

use serde::{Deserialize, Serialize};

/// A 2D point.
///
/// # Examples
///
/// ```
/// # use cellgraph_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f64) -> Self {
        self.y = y;
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Shifts the point by the given deltas
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Calculates the Euclidean distance from the origin
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Calculates the Euclidean distance to another point
    pub fn distance(self, other: Point) -> f64 {
        self.sub_point(other).hypot()
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Multiplies each coordinate by its own factor
    pub fn scale_xy(self, sx: f64, sy: f64) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
        }
    }

    /// Rounds both coordinates to the nearest integer
    pub fn round(self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
        }
    }

    /// Rotates this point around `center` by `angle` degrees.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cellgraph_core::geometry::Point;
    /// let p = Point::new(10.0, 0.0).rotate_around(Point::new(0.0, 0.0), 90.0);
    /// assert!((p.x() - 0.0).abs() < 1e-9);
    /// assert!((p.y() - 10.0).abs() < 1e-9);
    /// ```
    pub fn rotate_around(self, center: Point, angle: f64) -> Self {
        let rad = angle.to_radians();
        rotate_point(self, rad.cos(), rad.sin(), center)
    }
}

/// Applies a rotation matrix given by `cos`/`sin` to `point` around `center`.
pub fn rotate_point(point: Point, cos: f64, sin: f64, center: Point) -> Point {
    let x = point.x - center.x;
    let y = point.y - center.y;

    Point {
        x: x * cos - y * sin + center.x,
        y: y * cos + x * sin + center.y,
    }
}

/// Squared distance from `point` to the segment `a`-`b`.
pub fn segment_distance_squared(point: Point, a: Point, b: Point) -> f64 {
    let seg = b.sub_point(a);
    let len_sq = seg.x * seg.x + seg.y * seg.y;
    if len_sq == 0.0 {
        let d = point.sub_point(a);
        return d.x * d.x + d.y * d.y;
    }
    let t = (((point.x - a.x) * seg.x + (point.y - a.y) * seg.y) / len_sq).clamp(0.0, 1.0);
    let projection = a.add_point(seg.scale(t));
    let d = point.sub_point(projection);
    d.x * d.x + d.y * d.y
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }

}

/// An axis-aligned rectangle described by its top-left corner and its size.
///
/// Unlike a min/max bounding box, a `Rect` keeps the width and height as
/// stored values so that degenerate (zero or negative) sizes survive
/// transforms unchanged.
///
/// # Examples
///
/// ```
/// # use cellgraph_core::geometry::Rect;
/// let a = Rect::new(0.0, 0.0, 50.0, 50.0);
/// let b = Rect::new(100.0, 20.0, 10.0, 10.0);
///
/// let both = a.union(&b);
/// assert_eq!(both, Rect::new(0.0, 0.0, 110.0, 50.0));
/// assert_eq!(a.intersection(&b), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a top-left point and a size
    pub fn from_point_size(top_left: Point, size: Size) -> Self {
        Self::new(top_left.x, top_left.y, size.width, size.height)
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn width(self) -> f64 {
        self.width
    }

    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns the right edge (`x + width`)
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// Returns the bottom edge (`y + height`)
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    pub fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    pub fn with_y(mut self, y: f64) -> Self {
        self.y = y;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Returns the top-left corner
    pub fn top_left(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the size of the rectangle
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the center point of the rectangle
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns true if the rectangle has no area
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Moves the rectangle by the given deltas
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Multiplies origin and size by the given factor
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Grows the rectangle by `amount` on every side
    pub fn grow(self, amount: f64) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + 2.0 * amount,
            height: self.height + 2.0 * amount,
        }
    }

    /// Returns the smallest rectangle containing both rectangles
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Returns the overlapping area of both rectangles, if any.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > x && bottom > y {
            Some(Self::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Returns true if `other` lies completely inside this rectangle
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the axis-aligned bounds of this rectangle after rotating it by
    /// `angle` degrees around `center`.
    pub fn rotated_bounds(self, angle: f64, center: Point) -> Self {
        if angle == 0.0 {
            return self;
        }
        let rad = angle.to_radians();
        let (cos, sin) = (rad.cos(), rad.sin());
        let corners = [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
        .map(|corner| rotate_point(corner, cos, sin, center));

        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Returns this rectangle with width and height exchanged around its
    /// center, which is what a quarter turn does to its bounds.
    pub fn quarter_turn(self) -> Self {
        let center = self.center();
        Self::new(
            center.x - self.height / 2.0,
            center.y - self.width / 2.0,
            self.height,
            self.width,
        )
    }
}

/// Represents spacing around an element with a value for each side
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn top(self) -> f64 {
        self.top
    }

    pub fn right(self) -> f64 {
        self.right
    }

    pub fn bottom(self) -> f64 {
        self.bottom
    }

    pub fn left(self) -> f64 {
        self.left
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f64 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f64 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(1.0, 2.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.add_point(p2), Point::new(4.0, 6.0));
        assert_eq!(p2.sub_point(p1), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_point_rotate_around_half_turn() {
        let p = Point::new(20.0, 10.0).rotate_around(Point::new(10.0, 10.0), 180.0);
        assert_approx_eq!(f64, p.x(), 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, p.y(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_approx_eq!(f64, segment_distance_squared(Point::new(5.0, 3.0), a, b), 9.0);
        assert_approx_eq!(f64, segment_distance_squared(Point::new(-4.0, 3.0), a, b), 25.0);
        assert_approx_eq!(f64, segment_distance_squared(Point::new(1.0, 1.0), a, a), 2.0);
    }

    #[test]
    fn test_rect_edges_and_center() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.right(), 40.0);
        assert_eq!(rect.bottom(), 60.0);
        assert_eq!(rect.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 60.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 60.0, 50.0, 40.0)));

        let touching = Rect::new(100.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&touching), None);
    }

    #[test]
    fn test_rect_contains_rect() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains_rect(&Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(outer.contains_rect(&Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(!outer.contains_rect(&Rect::new(90.0, 90.0, 20.0, 5.0)));
    }

    #[test]
    fn test_rect_rotated_bounds_quarter_turn() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let rotated = rect.rotated_bounds(90.0, rect.center());
        assert_approx_eq!(f64, rotated.x(), 40.0, epsilon = 1e-9);
        assert_approx_eq!(f64, rotated.y(), -40.0, epsilon = 1e-9);
        assert_approx_eq!(f64, rotated.width(), 20.0, epsilon = 1e-9);
        assert_approx_eq!(f64, rotated.height(), 100.0, epsilon = 1e-9);

        assert_eq!(rect.quarter_turn(), Rect::new(40.0, -40.0, 20.0, 100.0));
    }

    #[test]
    fn test_insets_sums() {
        let insets = Insets::new(10.0, 3.0, 3.0, 3.0);
        assert_eq!(insets.vertical_sum(), 13.0);
        assert_eq!(insets.horizontal_sum(), 6.0);
    }

}
