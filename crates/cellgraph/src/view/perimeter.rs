use std::f64::consts::PI;

use cellgraph_core::{
    geometry::{Point, Rect},
    style::Style,
};

/// Outline used to project connection points onto a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Perimeter {
    #[default]
    Rectangle,
    Ellipse,
}

impl Perimeter {
    /// Picks the outline from the `perimeter` style, falling back to the
    /// shape name.
    pub fn from_style(style: &Style) -> Self {
        match style.perimeter().or(style.shape()) {
            Some("ellipsePerimeter") | Some("ellipse") => Perimeter::Ellipse,
            _ => Perimeter::Rectangle,
        }
    }

    /// Intersection of the outline with the ray from the center of `bounds`
    /// towards `next`.
    ///
    /// With `orthogonal` set, the point keeps the coordinate of `next` along
    /// the side it hits when `next` lies within the extent of that side.
    pub fn project(self, bounds: Rect, next: Point, orthogonal: bool) -> Point {
        match self {
            Perimeter::Rectangle => rectangle_point(bounds, next, orthogonal),
            Perimeter::Ellipse => ellipse_point(bounds, next, orthogonal),
        }
    }
}

fn rectangle_point(bounds: Rect, next: Point, orthogonal: bool) -> Point {
    let center = bounds.center();
    let (x, y, w, h) = (bounds.x(), bounds.y(), bounds.width(), bounds.height());
    let alpha = (next.y() - center.y()).atan2(next.x() - center.x());
    let beta = PI / 2.0 - alpha;
    let t = h.atan2(w);

    let mut point = if alpha < -PI + t || alpha > PI - t {
        Point::new(x, center.y() - w * alpha.tan() / 2.0)
    } else if alpha < -t {
        Point::new(center.x() - h * beta.tan() / 2.0, y)
    } else if alpha < t {
        Point::new(x + w, center.y() + w * alpha.tan() / 2.0)
    } else {
        Point::new(center.x() + h * beta.tan() / 2.0, y + h)
    };

    if orthogonal {
        if next.x() >= x && next.x() <= x + w {
            point = point.with_x(next.x());
        } else if next.y() >= y && next.y() <= y + h {
            point = point.with_y(next.y());
        }
        point = point.with_x(point.x().clamp(x, x + w.max(0.0)));
        point = point.with_y(point.y().clamp(y, y + h.max(0.0)));
    }
    point
}

fn ellipse_point(bounds: Rect, next: Point, orthogonal: bool) -> Point {
    let center = bounds.center();
    let a = bounds.width() / 2.0;
    let b = bounds.height() / 2.0;
    if a <= 0.0 || b <= 0.0 {
        return center;
    }

    if orthogonal && next.x() >= bounds.x() && next.x() <= bounds.right() {
        let dx = (next.x() - center.x()) / a;
        let dy = b * (1.0 - dx * dx).max(0.0).sqrt();
        let y = if next.y() < center.y() {
            center.y() - dy
        } else {
            center.y() + dy
        };
        return Point::new(next.x(), y);
    }

    let d = next.sub_point(center);
    if d.is_zero() {
        return center;
    }
    let t = 1.0 / ((d.x() / a).powi(2) + (d.y() / b).powi(2)).sqrt();
    center.add_point(d.scale(t))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_rectangle_sides() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let right = Perimeter::Rectangle.project(bounds, Point::new(500.0, 25.0), false);
        assert_approx_eq!(f64, right.x(), 100.0);
        assert_approx_eq!(f64, right.y(), 25.0);

        let top = Perimeter::Rectangle.project(bounds, Point::new(50.0, -100.0), false);
        assert_approx_eq!(f64, top.x(), 50.0, epsilon = 1e-9);
        assert_approx_eq!(f64, top.y(), 0.0);

        let left = Perimeter::Rectangle.project(bounds, Point::new(-100.0, 25.0), false);
        assert_approx_eq!(f64, left.x(), 0.0);
        assert_approx_eq!(f64, left.y(), 25.0, epsilon = 1e-9);

        let bottom = Perimeter::Rectangle.project(bounds, Point::new(50.0, 300.0), false);
        assert_approx_eq!(f64, bottom.y(), 50.0);
    }

    #[test]
    fn test_rectangle_orthogonal_keeps_coordinate() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let point = Perimeter::Rectangle.project(bounds, Point::new(30.0, -200.0), true);
        assert_approx_eq!(f64, point.x(), 30.0);
        assert_approx_eq!(f64, point.y(), 0.0);
    }

    #[test]
    fn test_ellipse_point_on_outline() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let point = Perimeter::Ellipse.project(bounds, Point::new(200.0, 125.0), false);
        let nx = (point.x() - 50.0) / 50.0;
        let ny = (point.y() - 25.0) / 25.0;
        assert_approx_eq!(f64, nx * nx + ny * ny, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_from_style() {
        let style: Style = "shape=ellipse".parse().unwrap();
        assert_eq!(Perimeter::from_style(&style), Perimeter::Ellipse);
        assert_eq!(Perimeter::from_style(&Style::new()), Perimeter::Rectangle);
    }
}
