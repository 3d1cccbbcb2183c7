//! Collapsing and expanding cells.
//!
//! A collapsed cell displays its alternate bounds. Folding swaps the two
//! bound sets, so expanding restores exactly what collapsing put aside.

use log::{debug, trace};

use cellgraph_core::{
    geometry::{Geometry, Rect, Size, rotate_point},
    identifier::Id,
    style::keys,
};

use super::{Graph, GraphEvent, skip_stale};
use crate::view::ViewProvider;

impl<V: ViewProvider> Graph<V> {
    /// Collapses or expands `cells`, recursing into their children when
    /// `recurse` is set.
    ///
    /// Cells already in the requested state are skipped. Use
    /// [`Graph::is_foldable`] to filter a selection first. Returns the
    /// cells passed in.
    pub fn fold_cells(&mut self, collapse: bool, recurse: bool, cells: &[Id]) -> Vec<Id> {
        debug!(collapse, recurse, count = cells.len(); "Folding cells");
        let cells = self.known_cells(cells, "fold_cells");
        self.batch(|graph| {
            graph.cells_folded(&cells, collapse, recurse, 0);
            graph.fire(GraphEvent::CellsFolded {
                cells: cells.clone(),
                collapse,
                recurse,
            });
        });
        cells
    }

    fn cells_folded(&mut self, cells: &[Id], collapse: bool, recurse: bool, depth: usize) {
        if depth > self.model.len() {
            return;
        }
        self.batch(|graph| {
            for cell in cells {
                if graph.model.is_collapsed(*cell) == collapse {
                    continue;
                }
                skip_stale("cells_folded", graph.model.set_collapsed(*cell, collapse));
                graph.swap_bounds(*cell, collapse);
                if graph.is_extend_parent(*cell) {
                    graph.extend_parent(*cell);
                }
                if recurse {
                    let children = graph.model.children(*cell).to_vec();
                    graph.cells_folded(&children, collapse, recurse, depth + 1);
                }
                graph.constrain_child(*cell);
            }
        });
    }

    /// Returns true if `cell` has children and its style does not turn
    /// folding off.
    pub fn is_foldable(&self, cell: Id) -> bool {
        self.model.child_count(cell) > 0 && self.style_of(cell).is_foldable()
    }

    /// Exchanges the bounds of `cell` with its alternate bounds, computing
    /// the alternate bounds first when they are missing.
    pub fn swap_bounds(&mut self, cell: Id, will_collapse: bool) {
        let Some(geo) = self.model.geometry(cell) else {
            return;
        };
        let mut geo = self.update_alternate_bounds(cell, geo.clone());
        geo.swap();
        trace!(cell = cell.to_string(), will_collapse, bounds:? = geo.bounds(); "Swapped bounds");
        skip_stale("swap_bounds", self.model.set_geometry(cell, Some(geo)));
    }

    /// Fills in and positions the alternate bounds of `geo`.
    ///
    /// Missing alternate bounds take the preferred size of the cell when
    /// configured (snapped to the grid and never shorter than a swimlane
    /// header), else the current size. The top-left corner is pinned to the current bounds. For a
    /// rotated cell the alternate center is rotated about the current center
    /// so the shape stays in place on screen.
    fn update_alternate_bounds(&self, cell: Id, geo: Geometry) -> Geometry {
        let style = self.style_of(cell);
        let size = match geo.alternate_bounds() {
            Some(alternate) => alternate.size(),
            None => {
                let preferred = if self.config.collapse_to_preferred_size() {
                    self.view.preferred_size(&self.model, cell)
                } else {
                    None
                };
                match preferred {
                    Some(size) => {
                        let size = Size::new(self.snap(size.width()), self.snap(size.height()));
                        let start = style.number_opt(keys::START_SIZE).filter(|s| *s > 0.0);
                        let height = start.map_or(size.height(), |s| size.height().max(s));
                        Size::new(size.width(), height)
                    }
                    None => geo.bounds().size(),
                }
            }
        };

        let mut alternate = Rect::new(geo.x(), geo.y(), size.width(), size.height());
        let rotation = style.rotation();
        if rotation != 0.0 {
            let rad = rotation.to_radians();
            let center = geo.bounds().center();
            let moved = rotate_point(alternate.center(), rad.cos(), rad.sin(), center);
            let (dx, dy) = (
                moved.x() - alternate.center().x(),
                moved.y() - alternate.center().y(),
            );
            alternate = alternate.translate(dx, dy);
        }
        geo.with_alternate_bounds(Some(alternate))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use cellgraph_core::{geometry::Point, style::Style};

    use super::*;
    use crate::{
        config::GraphConfig,
        graph::tests::{events, node},
        model::Model,
        view::{GeometryView, ViewState},
    };

    /// Geometry view that reports a fixed preferred size for every cell.
    #[derive(Debug)]
    struct SizedView {
        inner: GeometryView,
        size: Size,
    }

    impl Default for SizedView {
        fn default() -> Self {
            Self {
                inner: GeometryView::default(),
                size: Size::new(80.0, 20.0),
            }
        }
    }

    impl ViewProvider for SizedView {
        fn scale(&self) -> f64 {
            self.inner.scale()
        }

        fn translate(&self) -> Point {
            self.inner.translate()
        }

        fn state(&self, model: &Model, cell: Id) -> Option<ViewState> {
            self.inner.state(model, cell)
        }

        fn preferred_size(&self, _model: &Model, _cell: Id) -> Option<Size> {
            Some(self.size)
        }
    }

    #[test]
    fn test_collapse_round_trip_restores_bounds() {
        let mut graph = Graph::default();
        let group = node(&mut graph, None, "fold_group", Rect::new(10.0, 20.0, 200.0, 100.0));
        node(&mut graph, Some(group), "fold_child", Rect::new(5.0, 5.0, 20.0, 20.0));

        graph.swap_bounds(group, true);
        graph.swap_bounds(group, false);

        let geo = graph.model().geometry(group).unwrap();
        assert_eq!(geo.bounds(), Rect::new(10.0, 20.0, 200.0, 100.0));
        assert!(geo.alternate_bounds().is_some());
    }

    #[test]
    fn test_fold_uses_preferred_size() {
        let mut graph = Graph::with_view(Model::new(), SizedView::default(), GraphConfig::default());
        let group = graph
            .insert_node(None, Some(Id::new("fold_sized")), None, Rect::new(10.0, 10.0, 200.0, 200.0), Style::new())
            .unwrap();
        graph
            .insert_node(Some(group), None, None, Rect::new(0.0, 0.0, 50.0, 50.0), Style::new())
            .unwrap();

        graph.fold_cells(true, false, &[group]);
        assert!(graph.model().is_collapsed(group));
        assert_eq!(graph.model().geometry(group).unwrap().bounds(), Rect::new(10.0, 10.0, 80.0, 20.0));

        graph.fold_cells(false, false, &[group]);
        assert!(!graph.model().is_collapsed(group));
        assert_eq!(graph.model().geometry(group).unwrap().bounds(), Rect::new(10.0, 10.0, 200.0, 200.0));
    }

    #[test]
    fn test_preferred_size_snaps_to_grid() {
        let view = SizedView {
            size: Size::new(73.0, 18.0),
            ..SizedView::default()
        };
        let mut graph = Graph::with_view(Model::new(), view, GraphConfig::default());
        let group = graph
            .insert_node(None, Some(Id::new("fold_snap")), None, Rect::new(0.0, 0.0, 200.0, 200.0), Style::new())
            .unwrap();

        graph.fold_cells(true, false, &[group]);
        assert_eq!(graph.model().geometry(group).unwrap().bounds(), Rect::new(0.0, 0.0, 70.0, 20.0));

        let config = GraphConfig::default().with_grid_enabled(false);
        let view = SizedView {
            size: Size::new(73.0, 18.0),
            ..SizedView::default()
        };
        let mut graph = Graph::with_view(Model::new(), view, config);
        let group = graph
            .insert_node(None, Some(Id::new("fold_nosnap")), None, Rect::new(0.0, 0.0, 200.0, 200.0), Style::new())
            .unwrap();

        graph.fold_cells(true, false, &[group]);
        assert_eq!(graph.model().geometry(group).unwrap().bounds(), Rect::new(0.0, 0.0, 73.0, 18.0));
    }

    #[test]
    fn test_fold_swimlane_keeps_header_height() {
        let mut graph = Graph::with_view(Model::new(), SizedView::default(), GraphConfig::default());
        let lane = graph
            .insert_node(
                None,
                None,
                None,
                Rect::new(0.0, 0.0, 200.0, 200.0),
                Style::new().with(keys::SHAPE, "swimlane").with(keys::START_SIZE, 30),
            )
            .unwrap();

        graph.fold_cells(true, false, &[lane]);
        assert_eq!(graph.model().geometry(lane).unwrap().bounds(), Rect::new(0.0, 0.0, 80.0, 30.0));
    }

    #[test]
    fn test_fold_without_preferred_size_keeps_size() {
        let mut graph = Graph::default();
        let group = node(&mut graph, None, "fold_plain", Rect::new(0.0, 0.0, 60.0, 40.0));
        let seen = events(&mut graph);

        graph.fold_cells(true, false, &[group]);
        graph.fold_cells(true, false, &[group]);

        assert!(graph.model().is_collapsed(group));
        assert_eq!(graph.model().geometry(group).unwrap().bounds(), Rect::new(0.0, 0.0, 60.0, 40.0));
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0].name(), "cells-folded");
    }

    #[test]
    fn test_fold_recurses_into_children() {
        let mut graph = Graph::default();
        let outer = node(&mut graph, None, "fold_outer", Rect::new(0.0, 0.0, 100.0, 100.0));
        let inner = node(&mut graph, Some(outer), "fold_inner", Rect::new(0.0, 0.0, 50.0, 50.0));

        graph.fold_cells(true, true, &[outer]);
        assert!(graph.model().is_collapsed(inner));

        graph.fold_cells(false, false, &[outer]);
        assert!(!graph.model().is_collapsed(outer));
        assert!(graph.model().is_collapsed(inner));
    }

    #[test]
    fn test_is_foldable() {
        let mut graph = Graph::default();
        let group = node(&mut graph, None, "foldable_group", Rect::new(0.0, 0.0, 100.0, 100.0));
        let leaf = node(&mut graph, Some(group), "foldable_leaf", Rect::new(0.0, 0.0, 10.0, 10.0));

        assert!(graph.is_foldable(group));
        assert!(!graph.is_foldable(leaf));

        graph.set_cell_style_value(&[group], keys::FOLDABLE, Some("0"));
        assert!(!graph.is_foldable(group));
    }

    #[test]
    fn test_rotated_collapse_keeps_center_path() {
        let mut graph = Graph::with_view(Model::new(), SizedView::default(), GraphConfig::default());
        let group = graph
            .insert_node(
                None,
                None,
                None,
                Rect::new(100.0, 100.0, 200.0, 100.0),
                Style::new().with(keys::ROTATION, 90),
            )
            .unwrap();

        graph.swap_bounds(group, true);
        let collapsed = graph.model().geometry(group).unwrap().bounds();
        // The collapsed center is the pinned center turned a quarter about (200, 150).
        assert_approx_eq!(f64, collapsed.center().x(), 240.0, epsilon = 1e-9);
        assert_approx_eq!(f64, collapsed.center().y(), 90.0, epsilon = 1e-9);
        assert_approx_eq!(f64, collapsed.width(), 80.0, epsilon = 1e-9);

        graph.swap_bounds(group, false);
        let restored = graph.model().geometry(group).unwrap().bounds();
        assert_approx_eq!(f64, restored.x(), 100.0, epsilon = 1e-9);
        assert_approx_eq!(f64, restored.y(), 100.0, epsilon = 1e-9);
        assert_approx_eq!(f64, restored.width(), 200.0, epsilon = 1e-9);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use cellgraph_core::style::Style;

    use super::*;

    fn check_swap_round_trip(bounds: Rect, alternate: Option<Rect>) -> Result<(), TestCaseError> {
        let mut graph = Graph::default();
        let cell = graph.insert_node(None, None, None, bounds, Style::new()).unwrap();
        let geo = graph.model().geometry(cell).unwrap().clone().with_alternate_bounds(alternate);
        graph.model_mut().set_geometry(cell, Some(geo)).unwrap();
        let before = graph.model().geometry(cell).unwrap().bounds();

        graph.swap_bounds(cell, true);
        graph.swap_bounds(cell, false);

        prop_assert_eq!(graph.model().geometry(cell).unwrap().bounds(), before);
        Ok(())
    }

    proptest! {
        #[test]
        fn swap_round_trip(
            x in 0.0f64..500.0,
            y in 0.0f64..500.0,
            w in 0.0f64..300.0,
            h in 0.0f64..300.0,
            alternate in proptest::option::of((0.0f64..100.0, 0.0f64..100.0)),
        ) {
            let alternate = alternate.map(|(w, h)| Rect::new(0.0, 0.0, w, h));
            check_swap_round_trip(Rect::new(x, y, w, h), alternate)?;
        }
    }
}
