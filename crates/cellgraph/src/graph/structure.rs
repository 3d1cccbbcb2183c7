//! Structural operations: adding, removing, grouping, cloning, ordering
//! and splitting cells.

use std::collections::HashSet;

use log::{debug, trace, warn};

use cellgraph_core::{
    geometry::{Geometry, Insets, Point, Rect, segment_distance_squared},
    identifier::Id,
    style::Style,
};

use super::{Graph, GraphEvent, skip_stale};
use crate::{
    error::{CellGraphError, ModelError},
    model::{Cell, Overlay},
    view::ViewProvider,
};

impl<V: ViewProvider> Graph<V> {
    // ===================
    // Factories
    // ===================

    /// Creates a node with absolute `bounds` and adds it under `parent`
    /// (the default parent when `None`).
    ///
    /// # Errors
    ///
    /// Fails if `id` is already used or `parent` is unknown.
    pub fn insert_node(
        &mut self,
        parent: Option<Id>,
        id: Option<Id>,
        value: Option<&str>,
        bounds: Rect,
        style: Style,
    ) -> Result<Id, CellGraphError> {
        let parent = parent.unwrap_or_else(|| self.default_parent());
        if !self.model.contains(parent) {
            return Err(ModelError::UnknownCell(parent).into());
        }
        let id = id.unwrap_or_else(|| self.model.create_id());
        let mut cell = Cell::node(id)
            .with_geometry(Geometry::new(bounds))
            .with_style(style);
        if let Some(value) = value {
            cell = cell.with_value(value);
        }
        self.model.insert(cell)?;
        self.add_cells(&[id], Some(parent), None, None, None);
        Ok(id)
    }

    /// Creates an edge between `source` and `target` and adds it under
    /// `parent` (the default parent when `None`).
    ///
    /// # Errors
    ///
    /// Fails if `id` is already used or any referenced cell is unknown.
    pub fn insert_edge(
        &mut self,
        parent: Option<Id>,
        id: Option<Id>,
        value: Option<&str>,
        source: Option<Id>,
        target: Option<Id>,
        style: Style,
    ) -> Result<Id, CellGraphError> {
        let parent = parent.unwrap_or_else(|| self.default_parent());
        for cell in std::iter::once(parent).chain(source).chain(target) {
            if !self.model.contains(cell) {
                return Err(ModelError::UnknownCell(cell).into());
            }
        }
        let id = id.unwrap_or_else(|| self.model.create_id());
        let mut cell = Cell::edge(id).with_style(style);
        if let Some(value) = value {
            cell = cell.with_value(value);
        }
        self.model.insert(cell)?;
        self.add_cells(&[id], Some(parent), None, source, target);
        Ok(id)
    }

    // ===================
    // Add and remove
    // ===================

    /// Adds `cells` under `parent` starting at `index`, connecting them to
    /// `source` and `target` when given.
    ///
    /// Returns the cells that were added.
    pub fn add_cells(
        &mut self,
        cells: &[Id],
        parent: Option<Id>,
        index: Option<usize>,
        source: Option<Id>,
        target: Option<Id>,
    ) -> Vec<Id> {
        let parent = parent.unwrap_or_else(|| self.default_parent());
        debug!(count = cells.len(), parent = parent.to_string(), index:?; "Adding cells");
        self.batch(|graph| {
            let added = graph.cells_added(cells, parent, index, source, target, false, true, true);
            graph.fire(GraphEvent::CellsAdded {
                cells: added.clone(),
                parent,
                index,
                source,
                target,
            });
            added
        })
    }

    /// Inserts `cells` as a contiguous run under `parent`.
    ///
    /// The run starts at `index` in the parent's current child order with
    /// the moved cells taken out, so reordering within one parent lands
    /// where the caller asked. With `absolute` the geometries are
    /// translated from the old parent's frame into the new one.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn cells_added(
        &mut self,
        cells: &[Id],
        parent: Id,
        index: Option<usize>,
        source: Option<Id>,
        target: Option<Id>,
        absolute: bool,
        constrain: bool,
        extend: bool,
    ) -> Vec<Id> {
        if !self.model.contains(parent) {
            warn!(parent = parent.to_string(); "Skipping add under unknown parent");
            return Vec::new();
        }
        let root = self.model.root();
        let cells: Vec<Id> = self
            .known_cells(cells, "cells_added")
            .into_iter()
            .filter(|cell| {
                let cyclic = *cell == root || self.model.is_ancestor(*cell, parent);
                if cyclic {
                    warn!(cell = cell.to_string(), parent = parent.to_string(); "Skipping cyclic add");
                }
                !cyclic
            })
            .collect();

        let children = self.model.children(parent);
        let split = index.unwrap_or(children.len()).min(children.len());
        let base = children[..split].iter().filter(|c| !cells.contains(c)).count();

        let parent_origin = if absolute {
            self.frame_origin(Some(parent))
        } else {
            Point::default()
        };
        let allow_negative = self.config.allow_negative_coordinates();

        let geometries: Vec<Option<Geometry>> = cells
            .iter()
            .map(|cell| {
                let previous = self.model.parent(*cell);
                if !absolute || previous == Some(parent) {
                    return None;
                }
                let old = self.frame_origin(previous);
                let geo = self.model.geometry(*cell)?;
                let (dx, dy) = (old.x() - parent_origin.x(), old.y() - parent_origin.y());
                let mut geo = if !geo.is_relative() {
                    geo.translate(dx, dy)
                } else if self.model.is_edge(*cell) {
                    geo.translate_points(dx, dy)
                } else {
                    return None;
                };
                if !geo.is_relative() && self.model.is_node(*cell) && !allow_negative {
                    let (x, y) = (geo.x(), geo.y());
                    geo = geo.with_x(x.max(0.0)).with_y(y.max(0.0));
                }
                Some(geo)
            })
            .collect();

        self.batch(|graph| {
            for cell in &cells {
                if graph.model.parent(*cell).is_some() {
                    skip_stale("cells_added", graph.model.remove(*cell));
                }
            }

            let mut added = Vec::with_capacity(cells.len());
            for (offset, (cell, geometry)) in cells.iter().zip(geometries).enumerate() {
                if skip_stale("cells_added", graph.model.add(parent, *cell, Some(base + offset))).is_none() {
                    continue;
                }
                if let Some(geometry) = geometry {
                    skip_stale("cells_added", graph.model.set_geometry(*cell, Some(geometry)));
                }
                if extend && graph.config.extend_parents_on_add() && graph.is_extend_parent(*cell) {
                    graph.extend_parent(*cell);
                }
                if constrain {
                    graph.constrain_child(*cell);
                }
                if source.is_some() {
                    graph.cell_connected(*cell, source, true, None);
                }
                if target.is_some() {
                    graph.cell_connected(*cell, target, false, None);
                }
                added.push(*cell);
            }
            added
        })
    }

    /// Removes `cells` (and, with `include_edges`, every edge attached to
    /// them or their descendants) from the model.
    ///
    /// Surviving edges that pointed into the removed subtrees are
    /// disconnected and keep their last rendered end as a terminal point.
    pub fn remove_cells(&mut self, cells: &[Id], include_edges: bool) -> Vec<Id> {
        debug!(count = cells.len(), include_edges; "Removing cells");
        let known = self.known_cells(cells, "remove_cells");
        let cells = if include_edges {
            self.add_all_edges(&known)
        } else {
            known
        };
        let cells = self.model.topmost_cells(&cells);

        self.batch(|graph| {
            let removed = graph.cells_removed(&cells);
            graph.fire(GraphEvent::CellsRemoved {
                cells: removed.clone(),
                include_edges,
            });
            removed
        })
    }

    pub(super) fn cells_removed(&mut self, cells: &[Id]) -> Vec<Id> {
        let cells: Vec<Id> = cells
            .iter()
            .copied()
            .filter(|cell| self.model.parent(*cell).is_some())
            .collect();
        let removed: HashSet<Id> = cells
            .iter()
            .flat_map(|cell| self.model.descendants(*cell))
            .collect();

        let mut frozen = Vec::new();
        for cell in &removed {
            for edge in self.model.edges(*cell) {
                if removed.contains(edge) {
                    continue;
                }
                for is_source in [true, false] {
                    if self.model.terminal(*edge, is_source) == Some(*cell) {
                        frozen.push((*edge, is_source, self.frozen_terminal_point(*edge, is_source)));
                    }
                }
            }
        }

        self.batch(|graph| {
            for (edge, is_source, point) in frozen {
                trace!(edge = edge.to_string(), is_source; "Disconnecting edge from removed terminal");
                graph.freeze_terminal(edge, is_source, point);
            }
            cells
                .into_iter()
                .filter(|cell| skip_stale("cells_removed", graph.model.remove(*cell)).is_some())
                .collect()
        })
    }

    /// Moves `cells` to the default parent, keeping their absolute position.
    pub fn remove_cells_from_parent(&mut self, cells: &[Id]) -> Vec<Id> {
        debug!(count = cells.len(); "Removing cells from parent");
        self.batch(|graph| {
            let parent = graph.default_parent();
            let index = graph.model.child_count(parent);
            let moved = graph.cells_added(cells, parent, Some(index), None, None, true, true, true);
            graph.fire(GraphEvent::CellsRemovedFromParent {
                cells: moved.clone(),
            });
            moved
        })
    }

    // ===================
    // Grouping
    // ===================

    /// Puts `cells` into `group`, creating a new group node when `None`.
    ///
    /// Only cells sharing the parent of the first cell are grouped. The
    /// group is sized to the children's bounding box grown by `border` (the
    /// configured border when `None`) and the swimlane header, and the
    /// children are shifted into its frame. Returns the group, or `None`
    /// when there was nothing to group.
    pub fn group_cells(&mut self, group: Option<Id>, border: Option<f64>, cells: &[Id]) -> Option<Id> {
        let border = border.unwrap_or_else(|| self.config.border());
        debug!(count = cells.len(), border; "Grouping cells");
        let known = self.known_cells(cells, "group_cells");
        let parent = self.model.parent(*known.first()?)?;
        let cells: Vec<Id> = known
            .into_iter()
            .filter(|cell| self.model.parent(*cell) == Some(parent))
            .collect();

        if let Some(group) = group {
            if !self.model.contains(group) {
                warn!(group = group.to_string(); "Skipping grouping into unknown cell");
                return None;
            }
            if cells.contains(&group) || cells.iter().any(|c| self.model.is_ancestor(*c, group)) {
                warn!(group = group.to_string(); "Skipping grouping a cell into itself");
                return None;
            }
        }
        let style = group.map(|group| self.style_of(group)).unwrap_or_default();
        let Some(bounds) = self.group_bounds(&style, &cells, border) else {
            trace!(count = cells.len(); "Nothing to group without bounds");
            return None;
        };

        let group = match group {
            Some(group) => group,
            None => {
                let id = self.model.create_id();
                skip_stale(
                    "group_cells",
                    self.model.insert(Cell::node(id).with_geometry(Geometry::default())),
                )?
            }
        };

        self.batch(|graph| {
            if graph.model.geometry(group).is_none() {
                skip_stale("group_cells", graph.model.set_geometry(group, Some(Geometry::default())));
            }
            if graph.model.parent(group) != Some(parent) {
                let index = graph.model.child_count(parent);
                graph.cells_added(&[group], parent, Some(index), None, None, false, false, false);
            }
            let index = graph.model.child_count(group);
            graph.cells_added(&cells, group, Some(index), None, None, false, false, false);
            graph.cells_moved(&cells, -bounds.x(), -bounds.y(), false, false, false);
            graph.cells_resized(&[group], &[bounds], false);
            graph.fire(GraphEvent::CellsGrouped {
                group,
                border,
                cells: cells.clone(),
            });
        });
        Some(group)
    }

    fn group_bounds(&self, style: &Style, cells: &[Id], border: f64) -> Option<Rect> {
        let mut bounds = self.bounding_box_from_geometry(cells, true)?;
        if style.is_swimlane() {
            let size = style.start_size();
            bounds = if style.is_horizontal() {
                Rect::new(bounds.x(), bounds.y() - size, bounds.width(), bounds.height() + size)
            } else {
                Rect::new(bounds.x() - size, bounds.y(), bounds.width() + size, bounds.height())
            };
        }
        Some(bounds.grow(border))
    }

    /// Moves the children of every group in `cells` to the group's parent
    /// and removes the emptied groups together with their edges.
    ///
    /// Relative children become absolute at their current position.
    /// Returns the children that were moved out.
    pub fn ungroup_cells(&mut self, cells: &[Id]) -> Vec<Id> {
        debug!(count = cells.len(); "Ungrouping cells");
        let groups: Vec<Id> = self
            .known_cells(cells, "ungroup_cells")
            .into_iter()
            .filter(|cell| self.model.child_count(*cell) > 0 && self.model.parent(*cell).is_some())
            .collect();

        self.batch(|graph| {
            let mut result = Vec::new();
            for group in &groups {
                let Some(parent) = graph.model.parent(*group) else {
                    continue;
                };
                let children = graph.model.children(*group).to_vec();
                let relative: Vec<(Id, Point)> = children
                    .iter()
                    .filter(|child| {
                        graph.model.is_node(**child)
                            && graph.model.geometry(**child).is_some_and(Geometry::is_relative)
                    })
                    .map(|child| (*child, graph.frame_origin(Some(*child))))
                    .collect();

                let index = graph.model.child_count(parent);
                let moved = graph.cells_added(&children, parent, Some(index), None, None, true, true, true);

                let parent_origin = graph.frame_origin(Some(parent));
                for (child, origin) in relative {
                    let Some(geo) = graph.model.geometry(child).cloned() else {
                        continue;
                    };
                    let geo = geo
                        .with_relative(false)
                        .with_offset(None)
                        .with_x(origin.x() - parent_origin.x())
                        .with_y(origin.y() - parent_origin.y());
                    skip_stale("ungroup_cells", graph.model.set_geometry(child, Some(geo)));
                }
                result.extend(moved);
            }

            let removed = graph.add_all_edges(&groups);
            graph.cells_removed(&removed);
            graph.fire(GraphEvent::CellsUngrouped {
                groups: groups.clone(),
                children: result.clone(),
            });
            result
        })
    }

    /// Fits each group in `cells` around its visible children.
    ///
    /// The group is grown by `border` (the configured border when `None`),
    /// the swimlane header and `insets`.
    /// With `move_group` the group's position follows the children;
    /// otherwise only its size changes. The children are shifted so that
    /// they keep their absolute position. Returns the updated groups.
    pub fn update_group_bounds(
        &mut self,
        cells: &[Id],
        border: Option<f64>,
        move_group: bool,
        insets: Insets,
    ) -> Vec<Id> {
        let border = border.unwrap_or_else(|| self.config.border());
        debug!(count = cells.len(), border, move_group; "Updating group bounds");
        let cells = self.known_cells(cells, "update_group_bounds");
        self.batch(|graph| {
            let mut updated = Vec::new();
            for cell in cells.iter().rev() {
                let Some(geo) = graph.model.geometry(*cell).cloned() else {
                    continue;
                };
                let children = graph.child_cells(Some(*cell), false, false);
                let Some(bounds) = graph.bounding_box_from_geometry(&children, true) else {
                    continue;
                };
                if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
                    continue;
                }

                let style = graph.style_of(*cell);
                let (left, top) = match (style.is_swimlane(), style.is_horizontal()) {
                    (true, true) => (0.0, style.start_size()),
                    (true, false) => (style.start_size(), 0.0),
                    _ => (0.0, 0.0),
                };

                let mut geo = geo;
                if move_group {
                    let (x, y) = (geo.x(), geo.y());
                    geo = geo
                        .with_x((x + bounds.x() - border - left - insets.left()).round())
                        .with_y((y + bounds.y() - border - top - insets.top()).round());
                }
                geo = geo
                    .with_width((bounds.width() + 2.0 * border + left + insets.horizontal_sum()).round())
                    .with_height((bounds.height() + 2.0 * border + top + insets.vertical_sum()).round());
                skip_stale("update_group_bounds", graph.model.set_geometry(*cell, Some(geo)));

                let disconnect = graph.config.disconnect_on_move() && graph.config.allow_dangling_edges();
                let extend = graph.config.extend_parents_on_move();
                graph.cells_moved(
                    &children,
                    border + left - bounds.x() + insets.left(),
                    border + top - bounds.y() + insets.top(),
                    disconnect,
                    true,
                    extend,
                );
                updated.push(*cell);
            }
            graph.fire(GraphEvent::GroupBoundsUpdated {
                cells: updated.clone(),
                border,
                move_group,
            });
            updated
        })
    }

    // ===================
    // Cloning
    // ===================

    /// Clones `cells` with their subtrees into detached copies.
    ///
    /// Clone positions are absolute unless `keep_position` is set. Edge ends
    /// whose terminal was not cloned keep their last rendered position as
    /// a terminal point. Without `allow_invalid_edges` such dangling edge
    /// clones are dropped when the configuration forbids dangling edges.
    pub fn clone_cells(&mut self, cells: &[Id], allow_invalid_edges: bool, keep_position: bool) -> Vec<Id> {
        debug!(count = cells.len(), allow_invalid_edges, keep_position; "Cloning cells");
        self.batch(|graph| {
            let pairs = graph.cells_cloned(cells, allow_invalid_edges, keep_position);
            let (cells, clones): (Vec<Id>, Vec<Id>) = pairs.into_iter().unzip();
            graph.fire(GraphEvent::CellsCloned {
                cells,
                clones: clones.clone(),
            });
            clones
        })
    }

    /// Clones `cells` and returns `(original, clone)` pairs.
    pub(super) fn cells_cloned(
        &mut self,
        cells: &[Id],
        allow_invalid_edges: bool,
        keep_position: bool,
    ) -> Vec<(Id, Id)> {
        let cells = self.known_cells(cells, "clone_cells");
        let Some((clones, _)) = skip_stale("clone_cells", self.model.clone_cells(&cells, true)) else {
            return Vec::new();
        };

        let mut pairs = Vec::with_capacity(cells.len());
        for (cell, clone) in cells.into_iter().zip(clones) {
            if let Some(geo) = self.model.geometry(clone).cloned() {
                let parent_origin = self.frame_origin(self.model.parent(cell));
                let delta = if keep_position { Point::default() } else { parent_origin };
                let geo = if self.model.is_edge(cell) {
                    let mut geo = geo.translate_points(delta.x(), delta.y());
                    if let Some(state) = self.view.state(&self.model, cell) {
                        for is_source in [true, false] {
                            if self.model.terminal(clone, is_source).is_some() {
                                continue;
                            }
                            let points = state.absolute_points();
                            let end = if is_source { points.first() } else { points.last() };
                            if let Some(end) = end {
                                let mut point = self.to_model(*end);
                                if keep_position {
                                    point = point.sub_point(parent_origin);
                                }
                                geo = geo.with_terminal_point(Some(point), is_source);
                            }
                        }
                    }
                    geo
                } else if geo.is_relative() {
                    geo
                } else {
                    geo.translate(delta.x(), delta.y())
                };
                skip_stale("clone_cells", self.model.set_geometry(clone, Some(geo)));
            }

            let dangling = self.model.is_edge(clone)
                && (self.model.terminal(clone, true).is_none() || self.model.terminal(clone, false).is_none());
            if dangling && !allow_invalid_edges && !self.config.allow_dangling_edges() {
                trace!(cell = cell.to_string(); "Dropping dangling edge clone");
                skip_stale("clone_cells", self.model.discard(clone));
                continue;
            }
            pairs.push((cell, clone));
        }
        pairs
    }

    // ===================
    // Order and visibility
    // ===================

    /// Moves `cells` to the back (start of the child order) or to the front.
    pub fn order_cells(&mut self, back: bool, cells: &[Id]) -> Vec<Id> {
        debug!(count = cells.len(), back; "Ordering cells");
        let mut cells = self.known_cells(cells, "order_cells");
        cells.sort_by_key(|cell| self.cell_path(*cell));

        self.batch(|graph| {
            let mut ordered = Vec::with_capacity(cells.len());
            for (i, cell) in cells.iter().enumerate() {
                let Some(parent) = graph.model.parent(*cell) else {
                    continue;
                };
                let index = if back { Some(i) } else { None };
                if skip_stale("order_cells", graph.model.remove(*cell)).is_some()
                    && skip_stale("order_cells", graph.model.add(parent, *cell, index)).is_some()
                {
                    ordered.push(*cell);
                }
            }
            graph.fire(GraphEvent::CellsOrdered {
                cells: ordered.clone(),
                back,
            });
            ordered
        })
    }

    /// Child indices from the outermost ancestor down to `cell`.
    fn cell_path(&self, cell: Id) -> Vec<usize> {
        let mut path: Vec<usize> = std::iter::once(cell)
            .chain(self.model.ancestors(cell))
            .filter_map(|c| self.model.child_index(c))
            .collect();
        path.reverse();
        path
    }

    /// Shows or hides `cells`, and with `include_edges` their edges too.
    pub fn toggle_cells(&mut self, show: bool, cells: &[Id], include_edges: bool) -> Vec<Id> {
        debug!(count = cells.len(), show, include_edges; "Toggling cells");
        let known = self.known_cells(cells, "toggle_cells");
        let cells = if include_edges {
            self.add_all_edges(&known)
        } else {
            known
        };

        self.batch(|graph| {
            for cell in &cells {
                skip_stale("toggle_cells", graph.model.set_visible(*cell, show));
            }
            graph.fire(GraphEvent::CellsToggled {
                cells: cells.clone(),
                show,
                include_edges,
            });
            cells
        })
    }

    // ===================
    // Splitting
    // ===================

    /// Splits `edge` at `cells`, which are moved by `(dx, dy)` and added to
    /// the edge's parent.
    ///
    /// A clone of the edge runs from the original source to the first cell
    /// and the original edge continues from that cell to its target. The
    /// waypoints are divided at the route segment nearest to the first
    /// cell. Returns the new edge.
    pub fn split_edge(&mut self, edge: Id, cells: &[Id], dx: f64, dy: f64) -> Option<Id> {
        debug!(edge = edge.to_string(), count = cells.len(), dx, dy; "Splitting edge");
        if !self.model.is_edge(edge) {
            warn!(edge = edge.to_string(); "Skipping split of a non-edge");
            return None;
        }
        let cells: Vec<Id> = self
            .known_cells(cells, "split_edge")
            .into_iter()
            .filter(|cell| *cell != edge)
            .collect();
        let first = *cells.first()?;
        let parent = self.model.parent(edge)?;
        let source = self.model.terminal(edge, true);
        let segment = self.nearest_segment(edge, first, dx, dy);
        let points = self
            .model
            .geometry(edge)
            .map(|geo| geo.points().to_vec())
            .unwrap_or_default();

        let (clones, _) = skip_stale("split_edge", self.model.clone_cells(&[edge], false))?;
        let new_edge = *clones.first()?;

        self.batch(|graph| {
            graph.cells_moved(&cells, dx, dy, false, false, false);
            graph.cells_added(&cells, parent, None, None, None, true, true, true);
            graph.cells_added(&[new_edge], parent, None, source, Some(first), false, true, true);
            graph.cell_connected(edge, Some(first), true, None);

            if let Some(segment) = segment.filter(|s| !points.is_empty() && *s <= points.len()) {
                let (head, tail) = points.split_at(segment);
                for (cell, part) in [(new_edge, head), (edge, tail)] {
                    if let Some(geo) = graph.model.geometry(cell).cloned() {
                        skip_stale("split_edge", graph.model.set_geometry(cell, Some(geo.with_points(part.to_vec()))));
                    }
                }
            }

            graph.fire(GraphEvent::EdgeSplit {
                edge,
                new_edge,
                cells: cells.clone(),
                dx,
                dy,
            });
        });
        Some(new_edge)
    }

    /// Index of the route segment of `edge` closest to the center of `cell`
    /// after it is moved by `(dx, dy)`. Segment `i` runs from route point
    /// `i` to `i + 1`.
    fn nearest_segment(&self, edge: Id, cell: Id, dx: f64, dy: f64) -> Option<usize> {
        let state = self.view.state(&self.model, edge)?;
        let center = self.model.geometry(cell)?.center().translate(dx, dy);
        let (scale, translate) = (self.view.scale(), self.view.translate());
        let anchor = center.add_point(translate).scale(scale);

        state
            .absolute_points()
            .windows(2)
            .enumerate()
            .map(|(i, pair)| (i, segment_distance_squared(anchor, pair[0], pair[1])))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    // ===================
    // Styles and overlays
    // ===================

    /// Replaces the style of every cell in `cells`.
    pub fn set_cell_style(&mut self, cells: &[Id], style: &Style) {
        let cells = self.known_cells(cells, "set_cell_style");
        self.batch(|graph| {
            for cell in &cells {
                skip_stale("set_cell_style", graph.model.set_style(*cell, style.clone()));
            }
            graph.fire(GraphEvent::CellsStyled {
                cells,
                key: None,
                value: None,
            });
        });
    }

    /// Sets (or with `None` removes) one style key on every cell in `cells`.
    pub fn set_cell_style_value(&mut self, cells: &[Id], key: &str, value: Option<&str>) {
        let cells = self.known_cells(cells, "set_cell_style_value");
        self.batch(|graph| {
            for cell in &cells {
                let mut style = graph.style_of(*cell);
                style.set(key, value);
                skip_stale("set_cell_style_value", graph.model.set_style(*cell, style));
            }
            graph.fire(GraphEvent::CellsStyled {
                cells,
                key: Some(key.to_string()),
                value: value.map(str::to_string),
            });
        });
    }

    pub fn add_overlay(&mut self, cell: Id, overlay: Overlay) -> bool {
        let name = overlay.name().to_string();
        let added = skip_stale("add_overlay", self.model.add_overlay(cell, overlay)).is_some();
        if added {
            self.fire(GraphEvent::OverlayAdded { cell, name });
        }
        added
    }

    pub fn remove_overlay(&mut self, cell: Id, name: &str) -> Option<Overlay> {
        let removed = skip_stale("remove_overlay", self.model.remove_overlay(cell, name)).flatten();
        if removed.is_some() {
            self.fire(GraphEvent::OverlayRemoved {
                cell,
                name: name.to_string(),
            });
        }
        removed
    }

    pub fn overlays(&self, cell: Id) -> &[Overlay] {
        self.model.cell(cell).map(Cell::overlays).unwrap_or_default()
    }
}
