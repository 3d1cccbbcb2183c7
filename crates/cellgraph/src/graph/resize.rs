//! Resize propagation, parent extension, child containment and alignment.
//!
//! A resize runs in a fixed order per cell: the geometry is replaced (and
//! the children scaled when resizing recursively), then the parent grows
//! to fit the cell, then the cell is clamped back into its containment
//! area. Extending first keeps the clamp from undoing legitimate growth.

use std::collections::HashSet;

use log::{debug, trace, warn};

use cellgraph_core::{
    geometry::{Geometry, Rect},
    identifier::Id,
    style::{Direction, keys},
};

use super::{Alignment, Graph, GraphEvent, skip_stale};
use crate::view::ViewProvider;

/// Shifts smaller than this are rounding noise and leave the cell alone.
const SHIFT_TOLERANCE: f64 = 1e-9;

impl<V: ViewProvider> Graph<V> {
    /// Resizes `cells` to `bounds`, pairwise.
    ///
    /// Mismatched lengths make this a no-op. With `recurse` the children are
    /// scaled along with their parent. Returns the resized cells.
    pub fn resize_cells(&mut self, cells: &[Id], bounds: &[Rect], recurse: bool) -> Vec<Id> {
        debug!(count = cells.len(), recurse; "Resizing cells");
        if cells.len() != bounds.len() {
            warn!(cells = cells.len(), bounds = bounds.len(); "Skipping resize with mismatched bounds");
            return Vec::new();
        }
        self.batch(|graph| {
            graph.cells_resized(cells, bounds, recurse);
            graph.fire(GraphEvent::CellsResized {
                cells: cells.to_vec(),
                bounds: bounds.to_vec(),
            });
        });
        cells.to_vec()
    }

    /// Resizes a single cell, scaling its children when the configuration
    /// asks for recursive resizing.
    pub fn resize_cell(&mut self, cell: Id, bounds: Rect) -> Vec<Id> {
        let recurse = self.config.recursive_resize();
        self.resize_cells(&[cell], &[bounds], recurse)
    }

    pub(super) fn cells_resized(&mut self, cells: &[Id], bounds: &[Rect], recurse: bool) {
        self.cells_resized_at(cells, bounds, recurse, 0);
    }

    fn cells_resized_at(&mut self, cells: &[Id], bounds: &[Rect], recurse: bool, depth: usize) {
        if cells.len() != bounds.len() {
            return;
        }
        if depth > self.model.len() {
            warn!(depth; "Resize recursion limit reached");
            return;
        }
        self.batch(|graph| {
            for (cell, bounds) in cells.iter().zip(bounds) {
                if !graph.model.contains(*cell) {
                    warn!(cell = cell.to_string(); "Skipping resize of unknown cell");
                    continue;
                }
                graph.cell_resized(*cell, *bounds, false, recurse, depth);
                if graph.is_extend_parent(*cell) {
                    graph.extend_parent_at(*cell, depth + 1);
                }
                graph.constrain_child(*cell);
            }
            if graph.config.reset_edges_on_resize() {
                graph.edges_reset(cells);
            }
        });
    }

    /// Replaces the bounds of one cell and returns its previous geometry.
    ///
    /// For relative geometries the position change is absorbed by the
    /// offset unless `ignore_relative` is set.
    fn cell_resized(
        &mut self,
        cell: Id,
        bounds: Rect,
        ignore_relative: bool,
        recurse: bool,
        depth: usize,
    ) -> Option<Geometry> {
        let previous = self.model.geometry(cell)?.clone();
        if previous.bounds() == bounds {
            return Some(previous);
        }

        let mut geo = if !ignore_relative && previous.is_relative() {
            let offset = previous
                .offset()
                .unwrap_or_default()
                .translate(bounds.x() - previous.x(), bounds.y() - previous.y());
            previous.clone().with_offset(Some(offset))
        } else {
            previous.clone().with_x(bounds.x()).with_y(bounds.y())
        };
        geo = geo.with_width(bounds.width()).with_height(bounds.height());
        if !geo.is_relative() && self.model.is_node(cell) && !self.config.allow_negative_coordinates() {
            let (x, y) = (geo.x(), geo.y());
            geo = geo.with_x(x.max(0.0)).with_y(y.max(0.0));
        }

        self.batch(|graph| {
            if recurse {
                graph.resize_child_cells(cell, &geo, depth);
            }
            skip_stale("cell_resized", graph.model.set_geometry(cell, Some(geo)));
            graph.constrain_child_cells(cell);
        });
        Some(previous)
    }

    fn resize_child_cells(&mut self, cell: Id, new_geo: &Geometry, depth: usize) {
        let Some(geo) = self.model.geometry(cell) else {
            return;
        };
        let sx = if geo.width() != 0.0 { new_geo.width() / geo.width() } else { 1.0 };
        let sy = if geo.height() != 0.0 { new_geo.height() / geo.height() } else { 1.0 };
        for child in self.model.children(cell).to_vec() {
            self.scale_cell(child, sx, sy, depth + 1);
        }
    }

    /// Scales one (child) cell by `(sx, sy)`, honouring the `aspect`,
    /// `resizeWidth` and `resizeHeight` styles.
    fn scale_cell(&mut self, cell: Id, sx: f64, sy: f64, depth: usize) {
        let Some(geo) = self.model.geometry(cell) else {
            return;
        };
        let style = self.style_of(cell);
        let (width, height) = (geo.width(), geo.height());
        let mut geo = geo.scale(sx, sy, style.is_aspect_fixed());

        match style.number_opt(keys::RESIZE_WIDTH) {
            Some(flag) if flag != 0.0 => geo = geo.with_width(width * sx),
            Some(_) => geo = geo.with_width(width),
            None => {}
        }
        match style.number_opt(keys::RESIZE_HEIGHT) {
            Some(flag) if flag != 0.0 => geo = geo.with_height(height * sy),
            Some(_) => geo = geo.with_height(height),
            None => {}
        }
        self.cell_resized(cell, geo.bounds(), true, true, depth);
    }

    fn constrain_child_cells(&mut self, cell: Id) {
        for child in self.model.children(cell).to_vec() {
            self.constrain_child(child);
        }
    }

    // ===================
    // Parent extension
    // ===================

    pub(super) fn is_extend_parent(&self, cell: Id) -> bool {
        !self.model.is_edge(cell) && self.config.extend_parents()
    }

    /// Grows the parent of `cell` so that the cell's far corner fits.
    ///
    /// Collapsed parents and relative geometries are left alone. The
    /// parent's own resize may in turn extend its parent.
    pub fn extend_parent(&mut self, cell: Id) {
        self.extend_parent_at(cell, 0);
    }

    fn extend_parent_at(&mut self, cell: Id, depth: usize) {
        let Some(parent) = self.model.parent(cell) else {
            return;
        };
        if self.model.is_collapsed(parent) {
            return;
        }
        let (Some(pgeo), Some(geo)) = (self.model.geometry(parent), self.model.geometry(cell)) else {
            return;
        };
        if geo.is_relative() {
            return;
        }

        let right = geo.x() + geo.width();
        let bottom = geo.y() + geo.height();
        if pgeo.width() < right || pgeo.height() < bottom {
            let bounds = pgeo
                .bounds()
                .with_width(pgeo.width().max(right))
                .with_height(pgeo.height().max(bottom));
            trace!(parent = parent.to_string(), bounds:?; "Extending parent");
            self.cells_resized_at(&[parent], &[bounds], false, depth + 1);
        }
    }

    // ===================
    // Containment
    // ===================

    /// Clamps `cell` into the intersection of the maximum graph bounds and
    /// its containment area.
    ///
    /// The cell together with its visible descendants must fit. An oversized
    /// cell is shrunk first, then translated; when both sides overflow, the
    /// left and top edges win. An empty intersection leaves the cell alone.
    /// Applying this twice has the same effect as applying it once.
    pub fn constrain_child(&mut self, cell: Id) {
        let Some(geo) = self.model.geometry(cell).cloned() else {
            return;
        };
        if geo.is_relative() && !self.config.constrain_relative_children() {
            return;
        }
        let parent = self.model.parent(cell);

        let max = self.config.maximum_graph_bounds().map(|max| {
            let origin = parent.map(|p| self.model_origin(p)).unwrap_or_default();
            max.translate(-origin.x(), -origin.y())
        });
        let area = if self.is_constrain_child(cell) {
            self.containment_area(cell)
        } else {
            None
        };
        let max = match (max, area) {
            (Some(max), Some(area)) => match max.intersection(&area) {
                Some(max) => max,
                None => {
                    trace!(cell = cell.to_string(); "Empty containment area, not clamping");
                    return;
                }
            },
            (Some(max), None) => max,
            (None, Some(area)) => area,
            (None, None) => return,
        };

        let mut shrunk = geo.clone();
        if shrunk.width() > max.width() {
            shrunk = shrunk.with_width(max.width());
        }
        if shrunk.height() > max.height() {
            shrunk = shrunk.with_height(max.height());
        }

        let cells = self.visible_subtree(cell);
        let Some(bbox) = self.geometry_extent(&cells, false, Some((cell, &shrunk))) else {
            return;
        };

        let mut dx = 0.0;
        if bbox.right() > max.right() {
            dx = max.right() - bbox.right();
        }
        if bbox.x() + dx < max.x() {
            dx = max.x() - bbox.x();
        }
        let mut dy = 0.0;
        if bbox.bottom() > max.bottom() {
            dy = max.bottom() - bbox.bottom();
        }
        if bbox.y() + dy < max.y() {
            dy = max.y() - bbox.y();
        }

        if dx.abs() < SHIFT_TOLERANCE {
            dx = 0.0;
        }
        if dy.abs() < SHIFT_TOLERANCE {
            dy = 0.0;
        }

        let mut result = shrunk;
        if dx != 0.0 || dy != 0.0 {
            result = if result.is_relative() {
                let offset = result.offset().unwrap_or_default().translate(dx, dy);
                result.with_offset(Some(offset))
            } else {
                let (x, y) = (result.x() + dx, result.y() + dy);
                result.with_x(x).with_y(y)
            };
        }
        if result != geo {
            trace!(cell = cell.to_string(), dx, dy; "Constraining child");
            skip_stale("constrain_child", self.model.set_geometry(cell, Some(result)));
        }
    }

    fn is_constrain_child(&self, cell: Id) -> bool {
        self.config.constrain_children()
            && !self
                .model
                .parent(cell)
                .is_some_and(|parent| self.model.is_edge(parent))
    }

    /// `cell` followed by its visible descendants, or just `cell` when it is
    /// collapsed. Descendants of hidden cells are skipped.
    fn visible_subtree(&self, cell: Id) -> Vec<Id> {
        if self.model.is_collapsed(cell) {
            return vec![cell];
        }
        let mut hidden = HashSet::new();
        self.model
            .descendants(cell)
            .into_iter()
            .filter(|id| {
                if *id == cell {
                    return true;
                }
                let parent_hidden = self.model.parent(*id).is_some_and(|p| hidden.contains(&p));
                if parent_hidden || !self.model.is_visible(*id) {
                    hidden.insert(*id);
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    /// Area of the parent that `cell` has to stay in, in the parent's frame.
    ///
    /// This is the parent's interior minus the swimlane header when the
    /// parent is a swimlane. Cells directly under the default parent have no
    /// containment area.
    pub fn containment_area(&self, cell: Id) -> Option<Rect> {
        if self.model.is_edge(cell) {
            return None;
        }
        let parent = self.model.parent(cell)?;
        if parent == self.default_parent() {
            return None;
        }
        let pgeo = self.model.geometry(parent)?;
        let style = self.style_of(parent);

        let (mut x, mut y) = (0.0, 0.0);
        let (mut width, mut height) = (pgeo.width(), pgeo.height());
        if style.is_swimlane() {
            let size = style.start_size();
            let (mut header_w, mut header_h) = if style.is_horizontal() { (0.0, size) } else { (size, 0.0) };
            let direction = style.direction();
            if direction.is_vertical() {
                std::mem::swap(&mut header_w, &mut header_h);
            }
            let leading = match direction {
                Direction::East => !style.flip_v(),
                Direction::North => !style.flip_h(),
                Direction::West => style.flip_v(),
                Direction::South => style.flip_h(),
            };
            if leading {
                x = header_w;
                y = header_h;
            }
            width -= header_w;
            height -= header_h;
        }
        Some(Rect::new(x, y, width.max(0.0), height.max(0.0)))
    }

    // ===================
    // Alignment
    // ===================

    /// Lines up `cells` on `align`.
    ///
    /// Without `param` the coordinate comes from the displayed cells: the
    /// first cell's center or middle, the largest right or bottom edge, or
    /// the smallest left or top edge. `param` is in screen units. Fewer than
    /// two cells leave the graph untouched. Returns the aligned cells.
    pub fn align_cells(&mut self, align: Alignment, cells: &[Id], param: Option<f64>) -> Vec<Id> {
        debug!(align = align.to_string(), count = cells.len(), param:?; "Aligning cells");
        let cells = self.known_cells(cells, "align_cells");
        if cells.len() < 2 {
            return cells;
        }

        let states: Vec<(Id, Rect)> = cells
            .iter()
            .filter(|cell| !self.model.is_edge(**cell))
            .filter_map(|cell| self.view.state(&self.model, *cell).map(|s| (*cell, s.bounds())))
            .collect();
        let Some(param) = param.or_else(|| alignment_coordinate(align, &states)) else {
            return cells;
        };

        let scale = self.view.scale();
        let mut targets = Vec::with_capacity(states.len());
        let mut bounds = Vec::with_capacity(states.len());
        for (cell, state) in &states {
            let Some(geo) = self.model.geometry(*cell) else {
                continue;
            };
            let shift = match align {
                Alignment::Left => param - state.x(),
                Alignment::Center => param - state.x() - state.width() / 2.0,
                Alignment::Right => param - state.right(),
                Alignment::Top => param - state.y(),
                Alignment::Middle => param - state.y() - state.height() / 2.0,
                Alignment::Bottom => param - state.bottom(),
            } / scale;
            let mut target = geo.bounds();
            target = if align.is_horizontal() {
                target.with_x(target.x() + shift)
            } else {
                target.with_y(target.y() + shift)
            };
            targets.push(*cell);
            bounds.push(target);
        }

        self.batch(|graph| {
            graph.cells_resized(&targets, &bounds, false);
            graph.fire(GraphEvent::CellsAligned {
                cells: targets.clone(),
                align,
                param: Some(param),
            });
        });
        targets
    }
}

fn alignment_coordinate(align: Alignment, states: &[(Id, Rect)]) -> Option<f64> {
    let (_, first) = states.first()?;
    let bounds = states.iter().map(|(_, b)| *b);
    match align {
        Alignment::Center => Some(first.center().x()),
        Alignment::Middle => Some(first.center().y()),
        Alignment::Right => bounds.map(Rect::right).reduce(f64::max),
        Alignment::Bottom => bounds.map(Rect::bottom).reduce(f64::max),
        Alignment::Left => bounds.map(Rect::x).reduce(f64::min),
        Alignment::Top => bounds.map(Rect::y).reduce(f64::min),
    }
}

#[cfg(test)]
mod tests {
    use cellgraph_core::style::Style;

    use super::*;
    use crate::{
        config::GraphConfig,
        graph::tests::{events, node},
    };

    fn bounds_of(graph: &Graph, cell: Id) -> Rect {
        graph.model().geometry(cell).unwrap().bounds()
    }

    #[test]
    fn test_extend_parent_on_add() {
        let mut graph = Graph::default();
        let parent = node(&mut graph, None, "rs_parent", Rect::new(0.0, 0.0, 100.0, 100.0));
        node(&mut graph, Some(parent), "rs_child", Rect::new(80.0, 80.0, 40.0, 40.0));

        assert_eq!(bounds_of(&graph, parent), Rect::new(0.0, 0.0, 120.0, 120.0));
    }

    #[test]
    fn test_extend_parent_cascades_upwards() {
        let mut graph = Graph::default();
        let outer = node(&mut graph, None, "rs_outer", Rect::new(0.0, 0.0, 100.0, 100.0));
        let inner = node(&mut graph, Some(outer), "rs_inner", Rect::new(10.0, 10.0, 50.0, 50.0));
        let leaf = node(&mut graph, Some(inner), "rs_leaf", Rect::new(0.0, 0.0, 10.0, 10.0));

        graph.resize_cells(&[leaf], &[Rect::new(0.0, 0.0, 150.0, 20.0)], false);

        assert_eq!(bounds_of(&graph, inner), Rect::new(10.0, 10.0, 150.0, 50.0));
        assert_eq!(bounds_of(&graph, outer), Rect::new(0.0, 0.0, 160.0, 100.0));
    }

    #[test]
    fn test_no_extension_into_collapsed_parent() {
        let mut graph = Graph::default();
        let parent = node(&mut graph, None, "rs_folded", Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = node(&mut graph, Some(parent), "rs_hidden", Rect::new(0.0, 0.0, 10.0, 10.0));
        graph.model_mut().set_collapsed(parent, true).unwrap();

        graph.extend_parent(child);
        let geo = graph.model().geometry(child).unwrap().clone().with_width(300.0);
        graph.model_mut().set_geometry(child, Some(geo)).unwrap();
        graph.extend_parent(child);

        assert_eq!(bounds_of(&graph, parent).width(), 100.0);
    }

    #[test]
    fn test_mismatched_resize_is_noop() {
        let mut graph = Graph::default();
        let a = node(&mut graph, None, "rs_mismatch", Rect::new(0.0, 0.0, 10.0, 10.0));
        let seen = events(&mut graph);

        assert!(graph.resize_cells(&[a], &[], false).is_empty());
        assert!(seen.borrow().is_empty());
        assert_eq!(bounds_of(&graph, a), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_relative_resize_moves_offset() {
        let mut graph = Graph::new(GraphConfig::default().with_constrain_children(false));
        let parent = node(&mut graph, None, "rs_rel_parent", Rect::new(0.0, 0.0, 100.0, 100.0));
        let label = node(&mut graph, Some(parent), "rs_label", Rect::new(0.5, 0.5, 10.0, 10.0));
        let geo = graph.model().geometry(label).unwrap().clone().with_relative(true);
        graph.model_mut().set_geometry(label, Some(geo)).unwrap();

        graph.resize_cells(&[label], &[Rect::new(3.5, 0.0, 20.0, 30.0)], false);

        let geo = graph.model().geometry(label).unwrap();
        assert_eq!(geo.x(), 0.5);
        assert_eq!(geo.width(), 20.0);
        assert_eq!(geo.height(), 30.0);
        assert_eq!(geo.offset().unwrap().x(), 3.0);
        assert_eq!(geo.offset().unwrap().y(), -0.5);
    }

    #[test]
    fn test_recursive_resize_scales_children() {
        let mut graph = Graph::default();
        let parent = node(&mut graph, None, "rs_scaled", Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = node(&mut graph, Some(parent), "rs_scaled_child", Rect::new(10.0, 20.0, 30.0, 40.0));
        let fixed = graph
            .insert_node(
                Some(parent),
                Some(Id::new("rs_fixed_width")),
                None,
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Style::new().with(keys::RESIZE_WIDTH, 0),
            )
            .unwrap();

        graph.resize_cells(&[parent], &[Rect::new(0.0, 0.0, 200.0, 50.0)], true);

        assert_eq!(bounds_of(&graph, child), Rect::new(20.0, 10.0, 60.0, 20.0));
        assert_eq!(bounds_of(&graph, fixed), Rect::new(0.0, 0.0, 10.0, 5.0));
    }

    #[test]
    fn test_constrain_into_parent() {
        let mut graph = Graph::new(GraphConfig::default().with_extend_parents(false));
        let parent = node(&mut graph, None, "rs_box", Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = node(&mut graph, Some(parent), "rs_overflow", Rect::new(90.0, -10.0, 30.0, 30.0));

        assert_eq!(bounds_of(&graph, child), Rect::new(70.0, 0.0, 30.0, 30.0));
        assert_eq!(bounds_of(&graph, parent), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_constrain_shrinks_oversized_child() {
        let mut graph = Graph::new(GraphConfig::default().with_extend_parents(false));
        let parent = node(&mut graph, None, "rs_small", Rect::new(0.0, 0.0, 50.0, 50.0));
        let child = node(&mut graph, Some(parent), "rs_large", Rect::new(10.0, 10.0, 80.0, 20.0));

        assert_eq!(bounds_of(&graph, child), Rect::new(0.0, 10.0, 50.0, 20.0));
    }

    #[test]
    fn test_constrain_below_swimlane_header() {
        let mut graph = Graph::new(GraphConfig::default().with_extend_parents(false));
        let lane = graph
            .insert_node(
                None,
                Some(Id::new("rs_lane")),
                None,
                Rect::new(0.0, 0.0, 200.0, 200.0),
                Style::new().with(keys::SHAPE, "swimlane").with(keys::START_SIZE, 30),
            )
            .unwrap();
        let child = node(&mut graph, Some(lane), "rs_lane_child", Rect::new(10.0, 0.0, 20.0, 20.0));

        assert_eq!(graph.containment_area(child), Some(Rect::new(0.0, 30.0, 200.0, 170.0)));
        assert_eq!(bounds_of(&graph, child), Rect::new(10.0, 30.0, 20.0, 20.0));
    }

    #[test]
    fn test_vertical_swimlane_header_on_the_left() {
        let mut graph = Graph::new(GraphConfig::default().with_extend_parents(false));
        let lane = graph
            .insert_node(
                None,
                Some(Id::new("rs_vlane")),
                None,
                Rect::new(0.0, 0.0, 200.0, 100.0),
                Style::new()
                    .with(keys::SHAPE, "swimlane")
                    .with(keys::HORIZONTAL, 0)
                    .with(keys::START_SIZE, 25),
            )
            .unwrap();
        let child = node(&mut graph, Some(lane), "rs_vlane_child", Rect::new(0.0, 0.0, 20.0, 20.0));

        assert_eq!(graph.containment_area(child), Some(Rect::new(25.0, 0.0, 175.0, 100.0)));
    }

    #[test]
    fn test_maximum_graph_bounds_clamp_top_level() {
        let config = GraphConfig::default().with_maximum_graph_bounds(Some(Rect::new(0.0, 0.0, 500.0, 500.0)));
        let mut graph = Graph::new(config);
        let a = node(&mut graph, None, "rs_far", Rect::new(490.0, 600.0, 20.0, 20.0));

        assert_eq!(bounds_of(&graph, a), Rect::new(480.0, 480.0, 20.0, 20.0));
    }

    #[test]
    fn test_disjoint_constraints_do_not_clamp() {
        let config = GraphConfig::default()
            .with_extend_parents(false)
            .with_maximum_graph_bounds(Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let mut graph = Graph::new(config);
        let parent = node(&mut graph, None, "rs_outside", Rect::new(0.0, 0.0, 40.0, 40.0));
        let geo = Geometry::new(Rect::new(100.0, 100.0, 40.0, 40.0));
        graph.model_mut().set_geometry(parent, Some(geo)).unwrap();
        let child = node(&mut graph, Some(parent), "rs_outside_child", Rect::new(5.0, 5.0, 10.0, 10.0));

        // Max bounds in the parent's frame end before the parent starts.
        assert_eq!(bounds_of(&graph, child), Rect::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_align_right_without_param() {
        let mut graph = Graph::default();
        let a = node(&mut graph, None, "al_a", Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = node(&mut graph, None, "al_b", Rect::new(200.0, 0.0, 50.0, 50.0));
        let seen = events(&mut graph);

        graph.align_cells(Alignment::Right, &[a, b], None);

        assert_eq!(bounds_of(&graph, a).right(), 250.0);
        assert_eq!(bounds_of(&graph, b).right(), 250.0);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].name(), "cells-aligned");
    }

    #[test]
    fn test_align_respects_view_scale() {
        let mut graph = Graph::default();
        graph.view_mut().set_scale(2.0);
        let a = node(&mut graph, None, "al_scaled_a", Rect::new(10.0, 0.0, 50.0, 50.0));
        let b = node(&mut graph, None, "al_scaled_b", Rect::new(40.0, 30.0, 50.0, 50.0));

        graph.align_cells(Alignment::Left, &[a, b], Some(0.0));
        assert_eq!(bounds_of(&graph, a).x(), 0.0);
        assert_eq!(bounds_of(&graph, b).x(), 0.0);

        graph.align_cells(Alignment::Middle, &[a, b], None);
        assert_eq!(bounds_of(&graph, b).y(), 0.0);
    }

    #[test]
    fn test_align_single_cell_is_noop() {
        let mut graph = Graph::default();
        let a = node(&mut graph, None, "al_single", Rect::new(10.0, 0.0, 50.0, 50.0));
        let seen = events(&mut graph);

        graph.align_cells(Alignment::Left, &[a], Some(0.0));
        assert_eq!(bounds_of(&graph, a).x(), 10.0);
        assert!(seen.borrow().is_empty());
    }
}
