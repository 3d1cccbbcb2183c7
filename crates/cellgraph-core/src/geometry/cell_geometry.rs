use serde::{Deserialize, Serialize};

use super::{Point, Rect};

/// Positional state of a single cell.
///
/// The bounds are expressed in the coordinate frame of the cell's parent. A
/// *relative* geometry uses its `x`/`y` as fractions of the parent (or as a
/// position along a parent edge) and carries its absolute displacement in
/// [`offset`](Geometry::offset). Edges additionally keep waypoints and fallback
/// terminal points for unconnected ends.
///
/// The value is treated as copy-on-write by the model: transforms return a
/// modified copy and the caller stores it back through the model setters.
///
/// # Examples
///
/// ```
/// # use cellgraph_core::geometry::{Geometry, Rect};
/// let geo = Geometry::new(Rect::new(10.0, 10.0, 80.0, 30.0));
/// let moved = geo.translate(5.0, -5.0);
///
/// assert_eq!(geo.bounds().x(), 10.0);
/// assert_eq!(moved.bounds().x(), 15.0);
/// assert_eq!(moved.bounds().y(), 5.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    bounds: Rect,
    relative: bool,
    offset: Option<Point>,
    points: Vec<Point>,
    source_point: Option<Point>,
    target_point: Option<Point>,
    alternate_bounds: Option<Rect>,
}

impl Geometry {
    /// Creates an absolute geometry with the given bounds.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Creates the default geometry of an edge: relative with empty bounds.
    pub fn edge() -> Self {
        Self {
            relative: true,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn x(&self) -> f64 {
        self.bounds.x()
    }

    pub fn y(&self) -> f64 {
        self.bounds.y()
    }

    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn offset(&self) -> Option<Point> {
        self.offset
    }

    /// Edge waypoints in routing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn source_point(&self) -> Option<Point> {
        self.source_point
    }

    pub fn target_point(&self) -> Option<Point> {
        self.target_point
    }

    /// Returns the fallback point for the source or target end.
    pub fn terminal_point(&self, is_source: bool) -> Option<Point> {
        if is_source {
            self.source_point
        } else {
            self.target_point
        }
    }

    /// Bounds to restore when the collapsed state of the cell is toggled.
    pub fn alternate_bounds(&self) -> Option<Rect> {
        self.alternate_bounds
    }

    pub fn with_relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    pub fn with_offset(mut self, offset: Option<Point>) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = points;
        self
    }

    pub fn with_terminal_point(mut self, point: Option<Point>, is_source: bool) -> Self {
        if is_source {
            self.source_point = point;
        } else {
            self.target_point = point;
        }
        self
    }

    pub fn with_alternate_bounds(mut self, alternate_bounds: Option<Rect>) -> Self {
        self.alternate_bounds = alternate_bounds;
        self
    }

    pub fn with_x(mut self, x: f64) -> Self {
        self.bounds = self.bounds.with_x(x);
        self
    }

    pub fn with_y(mut self, y: f64) -> Self {
        self.bounds = self.bounds.with_y(y);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.bounds = self.bounds.with_width(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.bounds = self.bounds.with_height(height);
        self
    }

    /// Center of the bounds.
    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Returns a copy shifted by `(dx, dy)`.
    ///
    /// Absolute geometries move their bounds; relative geometries move their
    /// offset instead, since their bounds are anchors in the parent frame.
    /// Waypoints and terminal points always move.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        let mut geo = self.translate_points(dx, dy);
        if geo.relative {
            geo.offset = Some(geo.offset.unwrap_or_default().translate(dx, dy));
        } else {
            geo.bounds = geo.bounds.translate(dx, dy);
        }
        geo
    }

    /// Returns a copy with only the waypoints and terminal points shifted.
    pub fn translate_points(&self, dx: f64, dy: f64) -> Self {
        let mut geo = self.clone();
        geo.source_point = geo.source_point.map(|p| p.translate(dx, dy));
        geo.target_point = geo.target_point.map(|p| p.translate(dx, dy));
        for point in &mut geo.points {
            *point = point.translate(dx, dy);
        }
        geo
    }

    /// Returns a copy scaled by `(sx, sy)`.
    ///
    /// With `preserve_aspect` both factors are replaced by the larger one.
    /// The bounds of relative geometries are anchors and are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cellgraph_core::geometry::{Geometry, Rect};
    /// let geo = Geometry::new(Rect::new(10.0, 10.0, 20.0, 10.0));
    /// let scaled = geo.scale(2.0, 3.0, true);
    /// assert_eq!(scaled.bounds(), Rect::new(30.0, 30.0, 60.0, 30.0));
    /// ```
    pub fn scale(&self, sx: f64, sy: f64, preserve_aspect: bool) -> Self {
        let (sx, sy) = if preserve_aspect {
            let factor = sx.max(sy);
            (factor, factor)
        } else {
            (sx, sy)
        };

        let mut geo = self.clone();
        geo.source_point = geo.source_point.map(|p| p.scale_xy(sx, sy));
        geo.target_point = geo.target_point.map(|p| p.scale_xy(sx, sy));
        for point in &mut geo.points {
            *point = point.scale_xy(sx, sy);
        }
        if !geo.relative {
            geo.bounds = Rect::new(
                geo.bounds.x() * sx,
                geo.bounds.y() * sy,
                geo.bounds.width() * sx,
                geo.bounds.height() * sy,
            );
        }
        geo
    }

    /// Exchanges bounds and alternate bounds in place.
    ///
    /// Does nothing when no alternate bounds are set, so no bound set is ever
    /// lost.
    pub fn swap(&mut self) {
        if let Some(alternate) = self.alternate_bounds {
            self.alternate_bounds = Some(self.bounds);
            self.bounds = alternate;
        }
    }
}
