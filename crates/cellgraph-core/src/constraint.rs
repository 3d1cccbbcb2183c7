//! Connection constraints for edge terminals.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A normalized anchor on a terminal's outline.
///
/// `point` is a fraction of the terminal bounds in `[0,1]×[0,1]`. When
/// `perimeter` is set the anchor is projected onto the actual outline of
/// the shape; `dx`/`dy` shift it by a fixed amount in model units. A
/// constraint without a point leaves the endpoint floating.
///
/// # Examples
///
/// ```
/// # use cellgraph_core::{constraint::ConnectionConstraint, geometry::Point};
/// let top_center = ConnectionConstraint::new(Some(Point::new(0.5, 0.0)));
/// assert!(top_center.perimeter());
/// assert_eq!(top_center.dx(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConstraint {
    point: Option<Point>,
    perimeter: bool,
    dx: f64,
    dy: f64,
}

impl Default for ConnectionConstraint {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ConnectionConstraint {
    /// Creates a perimeter-snapped constraint at `point` with no offset.
    pub fn new(point: Option<Point>) -> Self {
        Self {
            point,
            perimeter: true,
            dx: 0.0,
            dy: 0.0,
        }
    }

    pub fn point(&self) -> Option<Point> {
        self.point
    }

    pub fn perimeter(&self) -> bool {
        self.perimeter
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    pub fn with_perimeter(mut self, perimeter: bool) -> Self {
        self.perimeter = perimeter;
        self
    }

    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }
}
