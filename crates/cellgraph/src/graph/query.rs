//! Structural queries and graph traversal.
//!
//! # Overview
//!
//! Edge lookups here work on *visible* terminals: an edge whose terminal is
//! hidden inside a collapsed group counts as attached to that group. The
//! store-level lookups on [`crate::model::Model`] use the stored terminals.

use std::collections::HashSet;

use indexmap::IndexSet;
use log::debug;

use cellgraph_core::{geometry::Rect, identifier::Id};

use super::Graph;
use crate::view::{ViewProvider, visible_terminal};

impl<V: ViewProvider> Graph<V> {
    // ===================
    // Children
    // ===================

    /// Visible children of `parent` (the default parent when `None`).
    ///
    /// `nodes` and `edges` select the kinds to return; with both unset every
    /// kind is returned.
    pub fn child_cells(&self, parent: Option<Id>, nodes: bool, edges: bool) -> Vec<Id> {
        let parent = parent.unwrap_or_else(|| self.default_parent());
        self.model
            .children(parent)
            .iter()
            .copied()
            .filter(|child| {
                (!nodes && !edges)
                    || (nodes && self.model.is_node(*child))
                    || (edges && self.model.is_edge(*child))
            })
            .filter(|child| self.model.is_visible(*child))
            .collect()
    }

    pub fn child_nodes(&self, parent: Option<Id>) -> Vec<Id> {
        self.child_cells(parent, true, false)
    }

    pub fn child_edges(&self, parent: Option<Id>) -> Vec<Id> {
        self.child_cells(parent, false, true)
    }

    pub fn topmost_cells(&self, cells: &[Id]) -> Vec<Id> {
        self.model.topmost_cells(cells)
    }

    pub fn nearest_common_ancestor(&self, a: Id, b: Id) -> Option<Id> {
        self.model.nearest_common_ancestor(a, b)
    }

    // ===================
    // Edges
    // ===================

    /// Edges visibly attached to `cell`.
    ///
    /// Edges of hidden children, and of every descendant when `cell` is
    /// collapsed, count as edges of `cell`. With `parent` set, the other
    /// end must be a child of `parent` (with `recurse`, `parent` itself or
    /// any of its descendants).
    /// Self-loops are reported once, and only with `include_loops`.
    pub fn get_edges(
        &self,
        cell: Id,
        parent: Option<Id>,
        incoming: bool,
        outgoing: bool,
        include_loops: bool,
        recurse: bool,
    ) -> Vec<Id> {
        let mut candidates = IndexSet::new();
        let collapsed = self.model.is_collapsed(cell);
        for child in self.model.children(cell) {
            if collapsed {
                for id in self.model.descendants(*child) {
                    candidates.extend(self.model.edges(id).iter().copied());
                }
            } else if !self.model.is_visible(*child) {
                for id in self.model.descendants(*child) {
                    candidates.extend(self.model.edges(id).iter().copied());
                }
            }
        }
        candidates.extend(self.model.edges(cell).iter().copied());

        let valid_end = |other: Option<Id>| match (parent, other) {
            (None, _) => true,
            (Some(parent), Some(other)) if recurse => self.model.is_ancestor(parent, other),
            (Some(parent), Some(other)) => self.model.parent(other) == Some(parent),
            (Some(_), None) => false,
        };

        candidates
            .into_iter()
            .filter(|edge| {
                let source = visible_terminal(&self.model, *edge, true);
                let target = visible_terminal(&self.model, *edge, false);
                if source == target {
                    return include_loops && source == Some(cell);
                }
                (incoming && target == Some(cell) && valid_end(source))
                    || (outgoing && source == Some(cell) && valid_end(target))
            })
            .collect()
    }

    /// Edges connecting `cell` to other cells, without self-loops.
    pub fn connections(&self, cell: Id, parent: Option<Id>) -> Vec<Id> {
        self.get_edges(cell, parent, true, true, false, false)
    }

    pub fn incoming_edges(&self, cell: Id, parent: Option<Id>) -> Vec<Id> {
        self.get_edges(cell, parent, true, false, false, false)
    }

    pub fn outgoing_edges(&self, cell: Id, parent: Option<Id>) -> Vec<Id> {
        self.get_edges(cell, parent, false, true, false, false)
    }

    /// Edges visibly running from `source` to `target` (in either direction
    /// unless `directed`).
    pub fn edges_between(&self, source: Id, target: Id, directed: bool) -> Vec<Id> {
        self.get_edges(source, None, true, true, false, false)
            .into_iter()
            .filter(|edge| {
                let src = visible_terminal(&self.model, *edge, true);
                let trg = visible_terminal(&self.model, *edge, false);
                (src == Some(source) && trg == Some(target))
                    || (!directed && src == Some(target) && trg == Some(source))
            })
            .collect()
    }

    /// Cells at the far end of `edges` as seen from `terminal`.
    ///
    /// `sources` returns the sources of incoming edges, `targets` the
    /// targets of outgoing ones. Self-loops contribute nothing.
    pub fn opposites(&self, edges: &[Id], terminal: Id, sources: bool, targets: bool) -> Vec<Id> {
        let mut result = IndexSet::new();
        for edge in edges {
            let source = visible_terminal(&self.model, *edge, true);
            let target = visible_terminal(&self.model, *edge, false);
            match (source, target) {
                (Some(s), Some(t)) if s == terminal && t != terminal && targets => {
                    result.insert(t);
                }
                (Some(s), Some(t)) if t == terminal && s != terminal && sources => {
                    result.insert(s);
                }
                _ => {}
            }
        }
        result.into_iter().collect()
    }

    // ===================
    // Regions and bounds
    // ===================

    /// Displayed cells under `parent` whose rotated screen bounds lie
    /// completely inside `region`.
    ///
    /// A selected cell is returned instead of its descendants; the children
    /// of a cell that does not fit are tested in turn. A region without
    /// extent selects nothing.
    pub fn cells_in_region(&self, region: Rect, parent: Option<Id>) -> Vec<Id> {
        if region.width() <= 0.0 && region.height() <= 0.0 {
            return Vec::new();
        }
        let parent = parent.unwrap_or_else(|| self.default_parent());
        let mut result = Vec::new();
        self.collect_in_region(region, parent, &mut result, 0);
        debug!(count = result.len(), region:?; "Region query");
        result
    }

    fn collect_in_region(&self, region: Rect, parent: Id, result: &mut Vec<Id>, depth: usize) {
        if depth > self.model.len() {
            return;
        }
        for child in self.model.children(parent) {
            if self.model.is_layer(*child) {
                self.collect_in_region(region, *child, result, depth + 1);
                continue;
            }
            let Some(state) = self.view.state(&self.model, *child) else {
                continue;
            };
            if region.contains_rect(&state.rotated_bounds()) {
                result.push(*child);
            } else {
                self.collect_in_region(region, *child, result, depth + 1);
            }
        }
    }

    /// Screen bounding box of the displayed `cells`.
    pub fn bounding_box(&self, cells: &[Id]) -> Option<Rect> {
        self.view.bounding_box(&self.model, cells)
    }

    /// Screen bounds of `cell`, optionally including its attached edges and
    /// its descendants.
    pub fn cell_bounds(&self, cell: Id, include_edges: bool, include_descendants: bool) -> Option<Rect> {
        let roots = if include_descendants {
            self.model.descendants(cell)
        } else {
            vec![cell]
        };
        let mut cells: IndexSet<Id> = roots.iter().copied().collect();
        if include_edges {
            for id in &roots {
                cells.extend(self.model.edges(*id).iter().copied());
            }
        }
        let cells: Vec<Id> = cells.into_iter().collect();
        self.bounding_box(&cells)
    }

    // ===================
    // Traversal
    // ===================

    /// Picks the roots of the tree formed by the visible nodes under
    /// `parent`.
    ///
    /// A root has outgoing but no incoming connections (the reverse with
    /// `invert`). With `isolate` only edges whose other end is also under
    /// `parent` count. When no node qualifies, the node with the largest
    /// out-minus-in degree is returned on its own.
    pub fn find_tree_roots(&self, parent: Option<Id>, isolate: bool, invert: bool) -> Vec<Id> {
        let parent = parent.unwrap_or_else(|| self.default_parent());
        let mut roots = Vec::new();
        let mut best = None;
        let mut max_diff = 0i64;

        for cell in self.model.children(parent) {
            if !self.model.is_node(*cell) || !self.model.is_visible(*cell) {
                continue;
            }
            let (mut fan_out, mut fan_in) = (0i64, 0i64);
            for edge in self.connections(*cell, isolate.then_some(parent)) {
                if visible_terminal(&self.model, edge, true) == Some(*cell) {
                    fan_out += 1;
                } else {
                    fan_in += 1;
                }
            }
            if (invert && fan_out == 0 && fan_in > 0) || (!invert && fan_in == 0 && fan_out > 0) {
                roots.push(*cell);
            }
            let diff = if invert { fan_in - fan_out } else { fan_out - fan_in };
            if diff > max_diff {
                max_diff = diff;
                best = Some(*cell);
            }
        }

        if roots.is_empty() {
            roots.extend(best);
        }
        roots
    }

    /// Depth-first walk over the stored edges starting at `start`.
    ///
    /// `visitor` receives each cell once, with the edge it was reached by;
    /// returning false stops the walk below that cell. `directed` follows
    /// only outgoing edges (incoming ones with `inverse`).
    pub fn traverse(
        &self,
        start: Id,
        directed: bool,
        inverse: bool,
        mut visitor: impl FnMut(Id, Option<Id>) -> bool,
    ) {
        let mut visited = HashSet::new();
        let mut stack = vec![(start, None)];

        while let Some((cell, via)) = stack.pop() {
            if !visited.insert(cell) {
                continue;
            }
            if !visitor(cell, via) {
                continue;
            }
            let edges = self.model.edges(cell);
            for edge in edges.iter().rev() {
                let is_source = self.model.terminal(*edge, true) == Some(cell);
                if directed && inverse == is_source {
                    continue;
                }
                if let Some(next) = self.model.terminal(*edge, !is_source) {
                    if !visited.contains(&next) {
                        stack.push((next, Some(*edge)));
                    }
                }
            }
        }
    }
}
