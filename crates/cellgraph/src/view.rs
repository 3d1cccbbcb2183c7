//! The view seam consumed by the engine.
//!
//! The engine never draws anything, but several algorithms need to know
//! where a cell currently is on screen: alignment works in screen units,
//! disconnection freezes the last rendered route, and region queries test
//! rotated screen boxes. [`ViewProvider`] is the interface through which the
//! engine asks for that information. It is passed explicitly to every
//! [`Graph`](crate::graph::Graph), so tests and embedders can supply their own.
//!
//! [`GeometryView`] is a complete provider that derives states purely from
//! the model: absolute positions from the parent chain, edge routes from
//! terminals, waypoints and connection constraints.

mod perimeter;
mod state;

use log::trace;

use cellgraph_core::{
    geometry::{Geometry, Point, Rect, Size},
    identifier::Id,
};

pub use perimeter::Perimeter;
pub use state::ViewState;

use crate::{
    connection::{connection_point, constraint_from_style},
    model::{CellKind, Model},
};

/// Source of on-screen cell states.
pub trait ViewProvider {
    /// Current zoom factor.
    fn scale(&self) -> f64;

    /// Current pan, in model units.
    fn translate(&self) -> Point;

    /// Resolved state of `cell`, or `None` if the cell is not displayed.
    fn state(&self, model: &Model, cell: Id) -> Option<ViewState>;

    /// Size the cell would like to have, used for collapsed bounds.
    fn preferred_size(&self, _model: &Model, _cell: Id) -> Option<Size> {
        None
    }

    /// Bounds used for perimeter projection, grown by `border` and the
    /// `perimeterSpacing` style.
    fn perimeter_bounds(&self, state: &ViewState, border: f64) -> Rect {
        let border = border + state.style().perimeter_spacing();
        state.bounds().grow(border * self.scale())
    }

    /// Projects `next` onto the outline of `state`, honouring flips.
    fn perimeter_point(&self, state: &ViewState, next: Point, orthogonal: bool, border: f64) -> Point {
        let bounds = self.perimeter_bounds(state, border);
        if bounds.width() <= 0.0 && bounds.height() <= 0.0 {
            return bounds.center();
        }

        let center = bounds.center();
        let flip_h = state.style().flip_h();
        let flip_v = state.style().flip_v();
        let mirror = |p: Point| {
            let p = if flip_h { p.with_x(2.0 * center.x() - p.x()) } else { p };
            if flip_v { p.with_y(2.0 * center.y() - p.y()) } else { p }
        };

        let projected = Perimeter::from_style(state.style()).project(bounds, mirror(next), orthogonal);
        mirror(projected)
    }

    /// Union of the rotated screen bounds of every displayed cell in `cells`.
    fn bounding_box(&self, model: &Model, cells: &[Id]) -> Option<Rect> {
        cells
            .iter()
            .filter_map(|cell| self.state(model, *cell))
            .filter(|state| state.kind() != CellKind::Layer)
            .map(|state| state.rotated_bounds())
            .reduce(|acc, bounds| acc.union(&bounds))
    }
}

/// Returns the cell an edge end visibly attaches to.
///
/// Walks up from the stored terminal and hands the connection to the
/// outermost collapsed ancestor, or to the nearest visible ancestor when the
/// terminal is hidden. Layers and detached cells yield `None`.
pub fn visible_terminal(model: &Model, edge: Id, is_source: bool) -> Option<Id> {
    let terminal = model.terminal(edge, is_source)?;
    let mut best = terminal;
    let mut current = Some(terminal);
    let mut steps = 0;

    while let Some(cell) = current {
        if cell == model.root() || steps > model.len() {
            break;
        }
        if !model.is_visible(best) || (model.is_collapsed(cell) && cell != terminal) {
            best = cell;
        }
        current = model.parent(cell);
        steps += 1;
    }

    if best == model.root() || model.is_layer(best) || !model.is_attached(best) {
        None
    } else {
        Some(best)
    }
}

/// Returns true if `cell` is attached, it and all its ancestors are
/// visible, and no ancestor is collapsed.
pub fn is_showing(model: &Model, cell: Id) -> bool {
    if !model.is_attached(cell) || !model.is_visible(cell) {
        return false;
    }
    model
        .ancestors(cell)
        .iter()
        .all(|a| model.is_visible(*a) && !model.is_collapsed(*a))
}

/// View that computes states from the model on demand.
///
/// # Examples
///
/// ```
/// # use cellgraph::{model::{Cell, Model}, view::{GeometryView, ViewProvider}};
/// # use cellgraph_core::{geometry::{Geometry, Point, Rect}, identifier::Id};
/// let mut model = Model::new();
/// let layer = model.default_layer();
/// let a = model
///     .insert(Cell::node(Id::new("doc_a")).with_geometry(Geometry::new(Rect::new(10.0, 20.0, 30.0, 40.0))))
///     .unwrap();
/// model.add(layer, a, None).unwrap();
///
/// let view = GeometryView::new(2.0, Point::new(5.0, 0.0));
/// let state = view.state(&model, a).unwrap();
/// assert_eq!(state.bounds(), Rect::new(30.0, 40.0, 60.0, 80.0));
/// assert_eq!(state.origin(), Point::new(10.0, 20.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryView {
    scale: f64,
    translate: Point,
}

impl Default for GeometryView {
    fn default() -> Self {
        Self::new(1.0, Point::default())
    }
}

impl GeometryView {
    pub fn new(scale: f64, translate: Point) -> Self {
        Self { scale, translate }
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn set_translate(&mut self, translate: Point) {
        self.translate = translate;
    }

    fn to_screen(&self, point: Point) -> Point {
        point.add_point(self.translate).scale(self.scale)
    }

    fn to_model(&self, point: Point) -> Point {
        point.scale(1.0 / self.scale).sub_point(self.translate)
    }

    fn depth_exceeded(model: &Model, depth: usize) -> bool {
        depth > model.len() * 2
    }

    /// Absolute model-space origin of the coordinate frame of `cell`.
    fn origin(&self, model: &Model, cell: Id, depth: usize) -> Option<Point> {
        if Self::depth_exceeded(model, depth) {
            return None;
        }
        let current = model.cell(cell)?;
        if current.is_layer() {
            return Some(Point::default());
        }
        let parent = current.parent()?;
        let parent_origin = self.origin(model, parent, depth + 1)?;
        if current.is_edge() {
            return Some(parent_origin);
        }
        let Some(geo) = current.geometry() else {
            return Some(parent_origin);
        };
        let offset = geo.offset().unwrap_or_default();

        if !geo.is_relative() {
            return Some(parent_origin.translate(geo.x(), geo.y()));
        }

        if model.is_edge(parent) {
            let route = self.edge_route(model, parent, depth + 1)?;
            let anchor = self.to_model(point_along(&route, (geo.x() + 1.0) / 2.0));
            return Some(
                anchor
                    .add_point(offset)
                    .translate(-geo.width() / 2.0, -geo.height() / 2.0),
            );
        }

        let (pw, ph) = model
            .geometry(parent)
            .map(|g| (g.width(), g.height()))
            .unwrap_or_default();
        Some(
            parent_origin
                .translate(geo.x() * pw, geo.y() * ph)
                .add_point(offset),
        )
    }

    fn state_at(&self, model: &Model, cell: Id, depth: usize) -> Option<ViewState> {
        if Self::depth_exceeded(model, depth) || !is_showing(model, cell) {
            return None;
        }
        let current = model.cell(cell)?;
        let origin = self.origin(model, cell, depth)?;
        let style = current.style().clone();

        match current.kind() {
            CellKind::Layer => Some(ViewState::node(
                cell,
                CellKind::Layer,
                Rect::from_point_size(self.to_screen(Point::default()), Size::default()),
                origin,
                style,
            )),
            CellKind::Node => {
                let size = current.geometry().map(|g| g.bounds().size()).unwrap_or_default();
                let top_left = self.to_screen(origin);
                Some(ViewState::node(
                    cell,
                    CellKind::Node,
                    Rect::new(
                        top_left.x(),
                        top_left.y(),
                        size.width() * self.scale,
                        size.height() * self.scale,
                    ),
                    origin,
                    style,
                ))
            }
            CellKind::Edge => {
                let points = self.edge_route(model, cell, depth)?;
                Some(ViewState::edge(
                    cell,
                    points,
                    origin,
                    style,
                    visible_terminal(model, cell, true),
                    visible_terminal(model, cell, false),
                ))
            }
        }
    }

    /// Screen-space route of `edge` from source end to target end.
    fn edge_route(&self, model: &Model, edge: Id, depth: usize) -> Option<Vec<Point>> {
        let current = model.cell(edge)?;
        let origin = self.origin(model, edge, depth)?;
        let default_geometry = Geometry::edge();
        let geo = current.geometry().unwrap_or(&default_geometry);
        let local = |p: Point| self.to_screen(p.add_point(origin));

        let waypoints: Vec<Point> = geo.points().iter().map(|p| local(*p)).collect();
        let terminal_state = |is_source: bool| {
            visible_terminal(model, edge, is_source)
                .and_then(|t| self.state_at(model, t, depth + 1))
        };
        let source_state = terminal_state(true);
        let target_state = terminal_state(false);

        let fixed_end = |state: &Option<ViewState>, is_source: bool| match state {
            Some(state) => {
                let constraint = constraint_from_style(current.style(), is_source);
                constraint.point()?;
                connection_point(self, state, &constraint, false)
            }
            None => geo.terminal_point(is_source).map(local),
        };
        let source_fixed = fixed_end(&source_state, true);
        let target_fixed = fixed_end(&target_state, false);

        let source = match source_fixed {
            Some(point) => point,
            None => {
                let state = source_state.as_ref()?;
                let next = waypoints
                    .first()
                    .copied()
                    .or(target_fixed)
                    .or_else(|| target_state.as_ref().map(ViewState::center))
                    .unwrap_or_else(|| state.center());
                self.floating_point(state, next)
            }
        };
        let target = match target_fixed {
            Some(point) => point,
            None => {
                let state = target_state.as_ref()?;
                let next = waypoints.last().copied().unwrap_or(source);
                self.floating_point(state, next)
            }
        };

        trace!(edge = edge.to_string(), points = waypoints.len(); "Resolved edge route");

        let mut route = Vec::with_capacity(waypoints.len() + 2);
        route.push(source);
        route.extend(waypoints);
        route.push(target);
        Some(route)
    }

    /// Point where an unconstrained edge end meets the terminal outline.
    fn floating_point(&self, terminal: &ViewState, next: Point) -> Point {
        let rotation = terminal.rotation();
        let center = terminal.center();
        if rotation == 0.0 {
            return self.perimeter_point(terminal, next, false, 0.0);
        }
        let next = next.rotate_around(center, -rotation);
        self.perimeter_point(terminal, next, false, 0.0)
            .rotate_around(center, rotation)
    }
}

impl ViewProvider for GeometryView {
    fn scale(&self) -> f64 {
        self.scale
    }

    fn translate(&self) -> Point {
        self.translate
    }

    fn state(&self, model: &Model, cell: Id) -> Option<ViewState> {
        self.state_at(model, cell, 0)
    }
}

/// Point at fraction `t` of the total length of a polyline.
fn point_along(points: &[Point], t: f64) -> Point {
    let Some(first) = points.first().copied() else {
        return Point::default();
    };
    let lengths: Vec<f64> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
    let total: f64 = lengths.iter().sum();
    if total == 0.0 {
        return first;
    }

    let mut remaining = total * t.clamp(0.0, 1.0);
    for (segment, length) in points.windows(2).zip(&lengths) {
        if remaining <= *length && *length > 0.0 {
            let f = remaining / length;
            return segment[0].add_point(segment[1].sub_point(segment[0]).scale(f));
        }
        remaining -= length;
    }
    points.last().copied().unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use cellgraph_core::style::{Style, keys};

    use super::*;
    use crate::model::Cell;

    fn add_node(model: &mut Model, parent: Id, name: &str, geo: Geometry) -> Id {
        let id = model
            .insert(Cell::node(Id::new(name)).with_geometry(geo))
            .unwrap();
        model.add(parent, id, None).unwrap();
        id
    }

    fn add_edge(model: &mut Model, name: &str, source: Id, target: Id) -> Id {
        let id = model
            .insert(
                Cell::edge(Id::new(name))
                    .with_terminal(Some(source), true)
                    .with_terminal(Some(target), false),
            )
            .unwrap();
        let layer = model.default_layer();
        model.add(layer, id, None).unwrap();
        id
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Geometry {
        Geometry::new(Rect::new(x, y, w, h))
    }

    #[test]
    fn test_nested_origin() {
        let mut model = Model::new();
        let layer = model.default_layer();
        let outer = add_node(&mut model, layer, "vo_outer", rect(100.0, 100.0, 200.0, 200.0));
        let inner = add_node(&mut model, outer, "vo_inner", rect(10.0, 20.0, 50.0, 50.0));

        let state = GeometryView::default().state(&model, inner).unwrap();
        assert_eq!(state.origin(), Point::new(110.0, 120.0));
        assert_eq!(state.bounds(), Rect::new(110.0, 120.0, 50.0, 50.0));
    }

    #[test]
    fn test_relative_child_origin() {
        let mut model = Model::new();
        let layer = model.default_layer();
        let parent = add_node(&mut model, layer, "vr_parent", rect(100.0, 0.0, 200.0, 100.0));
        let port = add_node(
            &mut model,
            parent,
            "vr_port",
            rect(1.0, 0.5, 10.0, 10.0)
                .with_relative(true)
                .with_offset(Some(Point::new(-5.0, -5.0))),
        );

        let state = GeometryView::default().state(&model, port).unwrap();
        assert_eq!(state.origin(), Point::new(295.0, 45.0));
    }

    #[test]
    fn test_hidden_and_collapsed_ancestors_hide_state() {
        let mut model = Model::new();
        let layer = model.default_layer();
        let group = add_node(&mut model, layer, "vh_group", rect(0.0, 0.0, 100.0, 100.0));
        let child = add_node(&mut model, group, "vh_child", rect(0.0, 0.0, 10.0, 10.0));
        let view = GeometryView::default();

        model.set_collapsed(group, true).unwrap();
        assert!(view.state(&model, group).is_some());
        assert!(view.state(&model, child).is_none());

        model.set_collapsed(group, false).unwrap();
        model.set_visible(group, false).unwrap();
        assert!(view.state(&model, child).is_none());
    }

    #[test]
    fn test_floating_edge_route() {
        let mut model = Model::new();
        let layer = model.default_layer();
        let a = add_node(&mut model, layer, "vf_a", rect(0.0, 0.0, 100.0, 100.0));
        let b = add_node(&mut model, layer, "vf_b", rect(300.0, 0.0, 100.0, 100.0));
        let e = add_edge(&mut model, "vf_e", a, b);

        let state = GeometryView::default().state(&model, e).unwrap();
        let points = state.absolute_points();
        assert_eq!(points.len(), 2);
        assert_approx_eq!(f64, points[0].x(), 100.0);
        assert_approx_eq!(f64, points[0].y(), 50.0, epsilon = 1e-9);
        assert_approx_eq!(f64, points[1].x(), 300.0);
        assert_eq!(state.visible_terminal(true), Some(a));
    }

    #[test]
    fn test_fixed_edge_end_uses_constraint() {
        let mut model = Model::new();
        let layer = model.default_layer();
        let a = add_node(&mut model, layer, "vx_a", rect(0.0, 0.0, 100.0, 100.0));
        let b = add_node(&mut model, layer, "vx_b", rect(300.0, 0.0, 100.0, 100.0));
        let e = add_edge(&mut model, "vx_e", a, b);
        let style = Style::new().with(keys::EXIT_X, 0.5).with(keys::EXIT_Y, 1);
        model.set_style(e, style).unwrap();

        let state = GeometryView::default().state(&model, e).unwrap();
        assert_approx_eq!(f64, state.absolute_points()[0].x(), 50.0, epsilon = 1e-9);
        assert_approx_eq!(f64, state.absolute_points()[0].y(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dangling_edge_uses_terminal_points() {
        let mut model = Model::new();
        let layer = model.default_layer();
        let e = model
            .insert(
                Cell::edge(Id::new("vd_e")).with_geometry(
                    Geometry::edge()
                        .with_terminal_point(Some(Point::new(0.0, 0.0)), true)
                        .with_terminal_point(Some(Point::new(40.0, 30.0)), false),
                ),
            )
            .unwrap();
        model.add(layer, e, None).unwrap();

        let view = GeometryView::new(2.0, Point::default());
        let state = view.state(&model, e).unwrap();
        assert_eq!(
            state.absolute_points(),
            &[Point::new(0.0, 0.0), Point::new(80.0, 60.0)]
        );
        assert_eq!(state.bounds(), Rect::new(0.0, 0.0, 80.0, 60.0));

        let unresolved = model.insert(Cell::edge(Id::new("vd_none"))).unwrap();
        model.add(layer, unresolved, None).unwrap();
        assert!(view.state(&model, unresolved).is_none());
    }

    #[test]
    fn test_visible_terminal_prefers_collapsed_ancestor() {
        let mut model = Model::new();
        let layer = model.default_layer();
        let group = add_node(&mut model, layer, "vt_group", rect(0.0, 0.0, 100.0, 100.0));
        let inner = add_node(&mut model, group, "vt_inner", rect(0.0, 0.0, 10.0, 10.0));
        let other = add_node(&mut model, layer, "vt_other", rect(200.0, 0.0, 10.0, 10.0));
        let e = add_edge(&mut model, "vt_e", inner, other);

        assert_eq!(visible_terminal(&model, e, true), Some(inner));
        model.set_collapsed(group, true).unwrap();
        assert_eq!(visible_terminal(&model, e, true), Some(group));
        model.set_collapsed(group, false).unwrap();
        model.set_visible(inner, false).unwrap();
        assert_eq!(visible_terminal(&model, e, true), Some(group));
    }

    #[test]
    fn test_point_along() {
        let route = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        assert_eq!(point_along(&route, 0.5), Point::new(10.0, 0.0));
        assert_eq!(point_along(&route, 0.75), Point::new(10.0, 5.0));
        assert_eq!(point_along(&route, 1.0), Point::new(10.0, 10.0));
    }
}
