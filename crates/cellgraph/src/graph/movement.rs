//! Moving cells, disconnecting edges and resetting edge routes.

use std::collections::HashSet;

use log::{debug, trace};

use cellgraph_core::{
    geometry::{Geometry, Point, rotate_point},
    identifier::Id,
};

use super::{Graph, GraphEvent, skip_stale};
use crate::view::{ViewProvider, visible_terminal};

impl<V: ViewProvider> Graph<V> {
    /// Moves `cells` by `(dx, dy)`, optionally cloning them first and
    /// dropping them into `target`.
    ///
    /// Only the topmost cells are moved; edge labels whose edge has a moved
    /// terminal follow that edge instead. Clones go to the default parent
    /// when no target is given. Returns the moved cells (the clones when
    /// cloning).
    pub fn move_cells(
        &mut self,
        cells: &[Id],
        dx: f64,
        dy: f64,
        clone: bool,
        target: Option<Id>,
    ) -> Vec<Id> {
        debug!(count = cells.len(), dx, dy, clone, target:?; "Moving cells");
        let known = self.known_cells(cells, "move_cells");
        let selected: HashSet<Id> = known.iter().copied().collect();
        let originals: Vec<Id> = self
            .model
            .topmost_cells(&known)
            .into_iter()
            .filter(|cell| !self.follows_moved_edge(*cell, &selected))
            .collect();

        self.batch(|graph| {
            let (cells, target) = if clone {
                let allow_invalid = graph.config.clone_invalid_edges();
                let pairs = graph.cells_cloned(&originals, allow_invalid, false);
                let target = target.or_else(|| Some(graph.default_parent()));
                (pairs, target)
            } else {
                (originals.iter().map(|cell| (*cell, *cell)).collect(), target)
            };
            let moved: Vec<Id> = cells.iter().map(|(_, cell)| *cell).collect();

            let previous = graph.config.allow_negative_coordinates();
            if target.is_some() {
                graph.config.set_allow_negative_coordinates(true);
            }
            let disconnect =
                !clone && graph.config.disconnect_on_move() && graph.config.allow_dangling_edges();
            let extend = graph.config.extend_parents_on_move() && target.is_none();
            graph.cells_moved(&moved, dx, dy, disconnect, target.is_none(), extend);
            graph.config.set_allow_negative_coordinates(previous);

            if let Some(target) = target {
                let index = graph.model.child_count(target);
                graph.cells_added(&moved, target, Some(index), None, None, true, true, true);
            }

            if clone {
                for (original, copy) in &cells {
                    let Some(edge) = graph.model.parent(*original).filter(|p| graph.model.is_edge(*p)) else {
                        continue;
                    };
                    if !graph.model.geometry(*copy).is_some_and(Geometry::is_relative) {
                        continue;
                    }
                    if graph.model.parent(*copy).is_some() {
                        skip_stale("move_cells", graph.model.remove(*copy));
                    }
                    skip_stale("move_cells", graph.model.add(edge, *copy, None));
                }
            }

            graph.fire(GraphEvent::CellsMoved {
                cells: moved.clone(),
                dx,
                dy,
                clone,
                target,
            });
            moved
        })
    }

    /// Returns true for a relative label of an edge whose terminal is part
    /// of `selected`.
    fn follows_moved_edge(&self, cell: Id, selected: &HashSet<Id>) -> bool {
        let Some(parent) = self.model.parent(cell).filter(|p| self.model.is_edge(*p)) else {
            return false;
        };
        self.model.geometry(cell).is_some_and(Geometry::is_relative)
            && [true, false]
                .into_iter()
                .filter_map(|is_source| self.model.terminal(parent, is_source))
                .any(|terminal| selected.contains(&terminal))
    }

    pub(super) fn cells_moved(
        &mut self,
        cells: &[Id],
        dx: f64,
        dy: f64,
        disconnect: bool,
        constrain: bool,
        extend: bool,
    ) {
        if cells.is_empty() || (dx == 0.0 && dy == 0.0) {
            return;
        }
        self.batch(|graph| {
            if disconnect {
                graph.cells_disconnected(cells);
            }
            for cell in cells {
                graph.translate_cell(*cell, dx, dy);
                if extend && graph.is_extend_parent(*cell) {
                    graph.extend_parent(*cell);
                } else if constrain {
                    graph.constrain_child(*cell);
                }
            }
            if graph.config.reset_edges_on_move() {
                graph.edges_reset(cells);
            }
        });
    }

    /// Shifts one cell by `(dx, dy)`.
    ///
    /// Edges move their waypoints. Relative nodes move only their offset,
    /// with the delta rotated back by the parent's rotation so the on-screen
    /// direction is kept.
    pub(super) fn translate_cell(&mut self, cell: Id, dx: f64, dy: f64) {
        let Some(geo) = self.model.geometry(cell) else {
            return;
        };
        let is_edge = self.model.is_edge(cell);
        let mut geo = if is_edge {
            geo.translate_points(dx, dy)
        } else if geo.is_relative() {
            let rotation = self
                .model
                .parent(cell)
                .filter(|p| self.model.is_node(*p))
                .map(|p| self.style_of(p).rotation())
                .unwrap_or_default();
            let delta = if rotation != 0.0 {
                let rad = (-rotation).to_radians();
                rotate_point(Point::new(dx, dy), rad.cos(), rad.sin(), Point::default())
            } else {
                Point::new(dx, dy)
            };
            let offset = geo.offset().unwrap_or_default().add_point(delta);
            geo.clone().with_offset(Some(offset))
        } else {
            geo.translate(dx, dy)
        };

        if !geo.is_relative() && self.model.is_node(cell) && !self.config.allow_negative_coordinates() {
            let (x, y) = (geo.x(), geo.y());
            geo = geo.with_x(x.max(0.0)).with_y(y.max(0.0));
        }
        skip_stale("translate_cell", self.model.set_geometry(cell, Some(geo)));
    }

    // ===================
    // Disconnection
    // ===================

    /// Disconnects every edge in `cells` from terminals outside the set.
    ///
    /// A terminal is kept if it or one of its ancestors is in `cells`.
    /// Otherwise the edge end is frozen at its last rendered position (the
    /// terminal center when the edge is not displayed) and the terminal is
    /// cleared.
    pub fn disconnect_graph(&mut self, cells: &[Id]) {
        self.batch(|graph| {
            graph.cells_disconnected(cells);
            graph.fire(GraphEvent::CellsDisconnected {
                cells: cells.to_vec(),
            });
        });
    }

    pub(super) fn cells_disconnected(&mut self, cells: &[Id]) {
        let set: HashSet<Id> = cells.iter().copied().collect();
        let mut frozen = Vec::new();
        for edge in cells.iter().filter(|cell| self.model.is_edge(**cell)) {
            for is_source in [true, false] {
                let Some(terminal) = self.model.terminal(*edge, is_source) else {
                    continue;
                };
                let kept = set.contains(&terminal)
                    || self.model.ancestors(terminal).iter().any(|a| set.contains(a));
                if !kept {
                    frozen.push((*edge, is_source, self.frozen_terminal_point(*edge, is_source)));
                }
            }
        }

        self.batch(|graph| {
            for (edge, is_source, point) in frozen {
                trace!(edge = edge.to_string(), is_source; "Disconnecting edge");
                graph.freeze_terminal(edge, is_source, point);
            }
        });
    }

    /// Disconnects one end of `edge`, freezing it where it is currently drawn.
    ///
    /// Does nothing when that end is not connected.
    pub fn disconnect_terminal(&mut self, edge: Id, is_source: bool) {
        if self.model.terminal(edge, is_source).is_none() {
            return;
        }
        let point = self.frozen_terminal_point(edge, is_source);
        debug!(edge = edge.to_string(), is_source; "Disconnecting terminal");
        self.batch(|graph| {
            graph.freeze_terminal(edge, is_source, point);
            graph.fire(GraphEvent::CellsDisconnected { cells: vec![edge] });
        });
    }

    /// Current end of `edge` in the model frame of the edge's parent.
    pub(super) fn frozen_terminal_point(&self, edge: Id, is_source: bool) -> Option<Point> {
        let route_end = self.view.state(&self.model, edge).and_then(|state| {
            let points = state.absolute_points();
            if is_source { points.first() } else { points.last() }.copied()
        });
        let screen = route_end.or_else(|| {
            let terminal = self.model.terminal(edge, is_source)?;
            self.view.state(&self.model, terminal).map(|state| state.center())
        })?;
        let origin = self.frame_origin(self.model.parent(edge));
        Some(self.to_model(screen).sub_point(origin))
    }

    /// Clears one terminal of `edge`, storing `point` as its terminal point.
    pub(super) fn freeze_terminal(&mut self, edge: Id, is_source: bool, point: Option<Point>) {
        let geo = self.model.geometry(edge).cloned().unwrap_or_else(Geometry::edge);
        let geo = match point {
            Some(point) => geo.with_terminal_point(Some(point), is_source),
            None => geo,
        };
        skip_stale("disconnect", self.model.set_geometry(edge, Some(geo)));
        skip_stale("disconnect", self.model.set_terminal(edge, None, is_source));
    }

    // ===================
    // Edge reset
    // ===================

    /// Clears the waypoints of edges attached to `cells` whose other end is
    /// not part of `cells`, recursing into children.
    pub fn reset_edges(&mut self, cells: &[Id]) {
        self.batch(|graph| {
            graph.edges_reset(cells);
            graph.fire(GraphEvent::EdgesReset {
                cells: cells.to_vec(),
            });
        });
    }

    pub(super) fn edges_reset(&mut self, cells: &[Id]) {
        let set: HashSet<Id> = cells.iter().copied().collect();
        self.batch(|graph| graph.reset_edges_within(cells, &set, 0));
    }

    fn reset_edges_within(&mut self, cells: &[Id], set: &HashSet<Id>, depth: usize) {
        if depth > self.model.len() {
            return;
        }
        for cell in cells {
            for edge in self.model.edges(*cell).to_vec() {
                let source = visible_terminal(&self.model, edge, true);
                let target = visible_terminal(&self.model, edge, false);
                let inside = |t: Option<Id>| t.is_some_and(|t| set.contains(&t));
                if !inside(source) || !inside(target) {
                    self.reset_edge(edge);
                }
            }
            let children = self.model.children(*cell).to_vec();
            self.reset_edges_within(&children, set, depth + 1);
        }
    }

    /// Removes all waypoints of `edge`.
    pub(super) fn reset_edge(&mut self, edge: Id) {
        let Some(geo) = self.model.geometry(edge) else {
            return;
        };
        if geo.points().is_empty() {
            return;
        }
        let geo = geo.clone().with_points(Vec::new());
        skip_stale("reset_edge", self.model.set_geometry(edge, Some(geo)));
    }
}
