use cellgraph_core::{
    geometry::{Point, Rect},
    identifier::Id,
    style::Style,
};

use crate::model::CellKind;

/// On-screen state of a cell as resolved by a view.
///
/// `bounds` and `absolute_points` are in screen units (scaled and
/// translated). `origin` is the absolute position of the cell's coordinate
/// frame in model units: the top-left corner for nodes, the parent frame for
/// edges.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    cell: Id,
    kind: CellKind,
    bounds: Rect,
    origin: Point,
    style: Style,
    absolute_points: Vec<Point>,
    visible_source: Option<Id>,
    visible_target: Option<Id>,
}

impl ViewState {
    /// State of a node or layer.
    pub fn node(cell: Id, kind: CellKind, bounds: Rect, origin: Point, style: Style) -> Self {
        Self {
            cell,
            kind,
            bounds,
            origin,
            style,
            absolute_points: Vec::new(),
            visible_source: None,
            visible_target: None,
        }
    }

    /// State of an edge whose route runs through `absolute_points`.
    pub fn edge(
        cell: Id,
        absolute_points: Vec<Point>,
        origin: Point,
        style: Style,
        visible_source: Option<Id>,
        visible_target: Option<Id>,
    ) -> Self {
        let bounds = absolute_points
            .iter()
            .map(|p| Rect::new(p.x(), p.y(), 0.0, 0.0))
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or_default();
        Self {
            cell,
            kind: CellKind::Edge,
            bounds,
            origin,
            style,
            absolute_points,
            visible_source,
            visible_target,
        }
    }

    pub fn cell(&self) -> Id {
        self.cell
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn is_edge(&self) -> bool {
        self.kind == CellKind::Edge
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn rotation(&self) -> f64 {
        self.style.rotation()
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Route of an edge from source end to target end, in screen units.
    pub fn absolute_points(&self) -> &[Point] {
        &self.absolute_points
    }

    /// Terminal the edge visibly attaches to, after collapsed or hidden
    /// ancestors have been taken into account.
    pub fn visible_terminal(&self, is_source: bool) -> Option<Id> {
        if is_source {
            self.visible_source
        } else {
            self.visible_target
        }
    }

    /// Screen bounds after applying the style rotation.
    pub fn rotated_bounds(&self) -> Rect {
        self.bounds.rotated_bounds(self.rotation(), self.center())
    }
}
