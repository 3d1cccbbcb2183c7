//! Connection resolver.
//!
//! Translates between the exit/entry style keys of an edge and a
//! [`ConnectionConstraint`], and resolves a constraint to a point on a
//! terminal in screen units, taking the terminal's direction, flips and
//! rotation into account.

use cellgraph_core::{
    constraint::ConnectionConstraint,
    geometry::{Point, rotate_point},
    style::{Style, keys},
};

use crate::view::{ViewProvider, ViewState};

struct ConstraintKeys {
    x: &'static str,
    y: &'static str,
    dx: &'static str,
    dy: &'static str,
    perimeter: &'static str,
}

fn constraint_keys(is_source: bool) -> ConstraintKeys {
    if is_source {
        ConstraintKeys {
            x: keys::EXIT_X,
            y: keys::EXIT_Y,
            dx: keys::EXIT_DX,
            dy: keys::EXIT_DY,
            perimeter: keys::EXIT_PERIMETER,
        }
    } else {
        ConstraintKeys {
            x: keys::ENTRY_X,
            y: keys::ENTRY_Y,
            dx: keys::ENTRY_DX,
            dy: keys::ENTRY_DY,
            perimeter: keys::ENTRY_PERIMETER,
        }
    }
}

/// Points closer than this to the terminal center are not projected.
const CENTER_TOLERANCE: f64 = 1e-9;

/// Reads the constraint of one edge end from the edge style.
///
/// The point is only set when both fractional coordinates are present;
/// perimeter snapping defaults to on and offsets default to zero.
///
/// # Examples
///
/// ```
/// # use cellgraph::connection::constraint_from_style;
/// # use cellgraph_core::{geometry::Point, style::Style};
/// let style: Style = "exitX=1;exitY=0.5;exitPerimeter=0".parse().unwrap();
/// let constraint = constraint_from_style(&style, true);
/// assert_eq!(constraint.point(), Some(Point::new(1.0, 0.5)));
/// assert!(!constraint.perimeter());
/// assert_eq!(constraint_from_style(&style, false).point(), None);
/// ```
pub fn constraint_from_style(style: &Style, is_source: bool) -> ConnectionConstraint {
    let keys = constraint_keys(is_source);
    let point = match (style.number_opt(keys.x), style.number_opt(keys.y)) {
        (Some(x), Some(y)) => Some(Point::new(x, y)),
        _ => None,
    };
    ConnectionConstraint::new(point)
        .with_perimeter(style.flag(keys.perimeter, true))
        .with_offset(style.number(keys.dx, 0.0), style.number(keys.dy, 0.0))
}

/// Writes `constraint` into the style of an edge end, or clears the keys
/// when there is no constraint point.
pub fn write_constraint_to_style(
    style: &mut Style,
    constraint: Option<&ConnectionConstraint>,
    is_source: bool,
) {
    let keys = constraint_keys(is_source);
    match constraint.and_then(|c| c.point().map(|p| (c, p))) {
        Some((constraint, point)) => {
            style.set(keys.x, Some(point.x()));
            style.set(keys.y, Some(point.y()));
            style.set(keys.dx, (constraint.dx() != 0.0).then_some(constraint.dx()));
            style.set(keys.dy, (constraint.dy() != 0.0).then_some(constraint.dy()));
            style.set(keys.perimeter, (!constraint.perimeter()).then_some(0));
        }
        None => {
            for key in [keys.x, keys.y, keys.dx, keys.dy, keys.perimeter] {
                style.set(key, None::<&str>);
            }
        }
    }
}

/// Resolves `constraint` against the terminal `state`, in screen units.
///
/// Returns `None` when the constraint has no point.
pub fn connection_point<V: ViewProvider + ?Sized>(
    view: &V,
    state: &ViewState,
    constraint: &ConnectionConstraint,
    round: bool,
) -> Option<Point> {
    let fraction = constraint.point()?;
    let style = state.style();
    let mut bounds = view.perimeter_bounds(state, 0.0);
    let center = bounds.center();

    let direction = style.direction();
    let quarter_turns = direction.angle();
    if direction.is_vertical() {
        bounds = bounds.quarter_turn();
    }

    let scale = view.scale();
    let mut point = Point::new(
        bounds.x() + fraction.x() * bounds.width() + constraint.dx() * scale,
        bounds.y() + fraction.y() * bounds.height() + constraint.dy() * scale,
    );

    let mut rotation = style.rotation();
    if constraint.perimeter() {
        if quarter_turns != 0.0 {
            point = point.rotate_around(center, quarter_turns);
        }
        if point.distance(center) > CENTER_TOLERANCE {
            point = view.perimeter_point(state, point, false, 0.0);
        }
    } else {
        rotation += quarter_turns;
        if style.flip_h() {
            point = point.with_x(2.0 * bounds.center().x() - point.x());
        }
        if style.flip_v() {
            point = point.with_y(2.0 * bounds.center().y() - point.y());
        }
    }

    if rotation != 0.0 {
        let rad = rotation.to_radians();
        point = rotate_point(point, rad.cos(), rad.sin(), center);
    }

    Some(if round { point.round() } else { point })
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use cellgraph_core::{geometry::Rect, identifier::Id};

    use super::*;
    use crate::{model::CellKind, view::GeometryView};

    fn state(style: &str) -> ViewState {
        ViewState::node(
            Id::new("terminal"),
            CellKind::Node,
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Point::default(),
            style.parse().unwrap(),
        )
    }

    fn at(x: f64, y: f64) -> ConnectionConstraint {
        ConnectionConstraint::new(Some(Point::new(x, y)))
    }

    #[test]
    fn test_write_and_read_back() {
        let mut style = Style::new();
        let constraint = at(0.25, 1.0).with_offset(3.0, 0.0).with_perimeter(false);
        write_constraint_to_style(&mut style, Some(&constraint), false);

        assert_eq!(style.get(keys::ENTRY_DX), Some("3"));
        assert!(!style.contains(keys::ENTRY_DY));
        let read = constraint_from_style(&style, false);
        assert_eq!(read.point(), Some(Point::new(0.25, 1.0)));
        assert_eq!(read.dx(), 3.0);
        assert!(!read.perimeter());

        write_constraint_to_style(&mut style, None, false);
        assert!(style.is_empty());
    }

    #[test]
    fn test_no_point_no_connection() {
        let view = GeometryView::default();
        assert_eq!(
            connection_point(&view, &state(""), &ConnectionConstraint::default(), false),
            None
        );
    }

    #[test]
    fn test_plain_fraction() {
        let view = GeometryView::default();
        let point = connection_point(&view, &state(""), &at(1.0, 0.5), false).unwrap();
        assert_approx_eq!(f64, point.x(), 100.0);
        assert_approx_eq!(f64, point.y(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_is_scaled() {
        let view = GeometryView::new(2.0, Point::default());
        let point = connection_point(
            &view,
            &state(""),
            &at(0.0, 0.0).with_offset(5.0, 0.0).with_perimeter(false),
            false,
        )
        .unwrap();
        assert_eq!(point, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_flip_without_perimeter() {
        let view = GeometryView::default();
        let point =
            connection_point(&view, &state("flipH=1"), &at(0.0, 0.0).with_perimeter(false), false)
                .unwrap();
        assert_eq!(point, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_rotation_applied_after_projection() {
        let view = GeometryView::default();
        let point =
            connection_point(&view, &state("rotation=180"), &at(1.0, 0.5), true).unwrap();
        assert_eq!(point, Point::new(0.0, 25.0));
    }

    #[test]
    fn test_south_direction_quarter_turn() {
        let view = GeometryView::default();
        // East side of the unrotated box becomes the south side.
        let point = connection_point(
            &view,
            &state("direction=south"),
            &at(1.0, 0.5).with_perimeter(false),
            true,
        )
        .unwrap();
        assert_eq!(point, Point::new(50.0, 50.0));
    }
}
