//! The graph facade and its structural operations.
//!
//! [`Graph`] ties a [`Model`] to a [`ViewProvider`] and a [`GraphConfig`] and
//! exposes the operations an editor performs on a diagram. Every public
//! mutating operation runs inside one model update and fires exactly one
//! [`GraphEvent`], so observers see one atomic change per user action no
//! matter how many cells the operation touched.
//!
//! # Overview
//!
//! - `structure`: add, remove, group, ungroup, clone, order, toggle, split
//! - `movement`: move and translate, disconnect, edge reset
//! - `resize`: resize propagation, parent extension, child containment,
//!   alignment
//! - `folding`: collapse and expand with alternate bounds
//! - `connection`: connecting edge ends, ports and constraints
//! - `query`: incident edges, region hit tests, tree roots, traversal
//!
//! Stale references passed to bulk operations are skipped and logged rather
//! than reported as errors.

mod connection;
mod events;
mod folding;
mod movement;
mod query;
mod resize;
mod structure;

use std::{collections::HashSet, fmt};

use log::warn;

use cellgraph_core::{
    geometry::{Geometry, Point, Rect},
    identifier::Id,
    style::Style,
};

pub use events::{Alignment, GraphEvent};

use crate::{
    config::GraphConfig,
    error::ModelError,
    model::Model,
    view::{GeometryView, ViewProvider},
};

type EventListener = Box<dyn FnMut(&GraphEvent)>;

/// A cell model together with the view and policy used to edit it.
pub struct Graph<V = GeometryView> {
    model: Model,
    view: V,
    config: GraphConfig,
    default_parent: Option<Id>,
    listeners: Vec<EventListener>,
}

impl<V: fmt::Debug> fmt::Debug for Graph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("model", &self.model)
            .field("view", &self.view)
            .field("config", &self.config)
            .field("default_parent", &self.default_parent)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Graph<GeometryView> {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl Graph<GeometryView> {
    /// Creates a graph over an empty model with a [`GeometryView`].
    pub fn new(config: GraphConfig) -> Self {
        Self::with_view(Model::new(), GeometryView::default(), config)
    }
}

impl<V: ViewProvider> Graph<V> {
    /// Creates a graph over an existing model and view provider.
    pub fn with_view(model: Model, view: V, config: GraphConfig) -> Self {
        Self {
            model,
            view,
            config,
            default_parent: None,
            listeners: Vec::new(),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Direct access to the store. Mutations made here bypass the
    /// constraint engine but still join the current update.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GraphConfig {
        &mut self.config
    }

    /// Rounds `value` to the nearest multiple of the grid size.
    ///
    /// Returns `value` unchanged when the grid is disabled or has no size.
    pub fn snap(&self, value: f64) -> f64 {
        let grid = self.config.grid_size();
        if self.config.grid_enabled() && grid > 0.0 {
            (value / grid).round() * grid
        } else {
            value
        }
    }

    /// Parent used when an operation is not given one. Defaults to the
    /// model's default layer.
    pub fn default_parent(&self) -> Id {
        self.default_parent
            .filter(|id| self.model.contains(*id))
            .unwrap_or_else(|| self.model.default_layer())
    }

    pub fn set_default_parent(&mut self, parent: Option<Id>) {
        self.default_parent = parent;
    }

    /// Registers an observer for operation events.
    pub fn add_listener(&mut self, listener: impl FnMut(&GraphEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs `f` inside one model update.
    ///
    /// Operations called from `f` coalesce into the same change set.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.model.begin_update();
        let result = f(self);
        self.model.end_update();
        result
    }

    fn fire(&mut self, event: GraphEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener(&event);
        }
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }

    // ===================
    // Shared helpers
    // ===================

    /// Cells from `cells` that exist in the model, without duplicates.
    fn known_cells(&self, cells: &[Id], operation: &'static str) -> Vec<Id> {
        let mut seen = HashSet::new();
        cells
            .iter()
            .copied()
            .filter(|cell| {
                if self.model.contains(*cell) {
                    seen.insert(*cell)
                } else {
                    warn!(operation, cell = cell.to_string(); "Skipping unknown cell");
                    false
                }
            })
            .collect()
    }

    fn style_of(&self, cell: Id) -> Style {
        self.model.style(cell).cloned().unwrap_or_default()
    }

    /// Converts a screen point to model coordinates.
    fn to_model(&self, point: Point) -> Point {
        point
            .scale(1.0 / self.view.scale())
            .sub_point(self.view.translate())
    }

    /// Absolute model-space origin of the coordinate frame of `cell`.
    ///
    /// Uses the view state when the cell is displayed and falls back to
    /// summing geometries up the parent chain otherwise.
    fn frame_origin(&self, cell: Option<Id>) -> Point {
        let Some(cell) = cell else {
            return Point::default();
        };
        if let Some(state) = self.view.state(&self.model, cell) {
            return state.origin();
        }
        self.model_origin(cell)
    }

    fn model_origin(&self, cell: Id) -> Point {
        let mut origin = Point::default();
        let mut current = Some(cell);
        for _ in 0..=self.model.len() {
            let Some(id) = current else {
                break;
            };
            if self.model.is_layer(id) || self.model.is_edge(id) {
                break;
            }
            let parent = self.model.parent(id);
            if let Some(geo) = self.model.geometry(id) {
                origin = origin.add_point(self.local_position(geo, parent));
            }
            current = parent;
        }
        origin
    }

    /// Top-left of `geo` in the frame of `parent`.
    fn local_position(&self, geo: &Geometry, parent: Option<Id>) -> Point {
        let offset = geo.offset().unwrap_or_default();
        if !geo.is_relative() {
            return geo.bounds().top_left().add_point(offset);
        }
        let parent_geo = parent
            .filter(|p| self.model.is_node(*p))
            .and_then(|p| self.model.geometry(p));
        match parent_geo {
            Some(pgeo) => Point::new(geo.x() * pgeo.width(), geo.y() * pgeo.height()).add_point(offset),
            None => offset,
        }
    }

    /// Bounding box of `cells` computed from their geometries alone.
    ///
    /// Cells are placed in the frame of their parent; a cell whose parent
    /// chain is part of `cells` is shifted into the frame of the outermost
    /// such ancestor's parent. Edges contribute their waypoints and the
    /// terminal points of unconnected ends, and only when `include_edges`
    /// is set.
    pub fn bounding_box_from_geometry(&self, cells: &[Id], include_edges: bool) -> Option<Rect> {
        self.geometry_extent(cells, include_edges, None)
    }

    fn geometry_extent(
        &self,
        cells: &[Id],
        include_edges: bool,
        replacement: Option<(Id, &Geometry)>,
    ) -> Option<Rect> {
        let set: HashSet<Id> = cells.iter().copied().collect();
        let geometry_of = |cell: Id| match replacement {
            Some((id, geo)) if id == cell => Some(geo),
            _ => self.model.geometry(cell),
        };

        cells
            .iter()
            .filter(|cell| include_edges || !self.model.is_edge(**cell))
            .filter_map(|cell| {
                let geo = geometry_of(*cell)?;
                let parent = self.model.parent(*cell);

                let mut shift = Point::default();
                let mut ancestor = parent;
                for _ in 0..=self.model.len() {
                    let Some(a) = ancestor.filter(|a| set.contains(a) && self.model.is_node(*a)) else {
                        break;
                    };
                    let Some(ageo) = geometry_of(a) else {
                        break;
                    };
                    let grand = self.model.parent(a);
                    shift = shift.add_point(self.local_position(ageo, grand));
                    ancestor = grand;
                }

                let bounds = if self.model.is_edge(*cell) {
                    let mut points: Vec<Point> = geo.points().to_vec();
                    for is_source in [true, false] {
                        if self.model.terminal(*cell, is_source).is_none() {
                            points.extend(geo.terminal_point(is_source));
                        }
                    }
                    points
                        .into_iter()
                        .map(|p| Rect::new(p.x(), p.y(), 0.0, 0.0))
                        .reduce(|acc, r| acc.union(&r))?
                } else {
                    if geo.is_relative() && !parent.is_some_and(|p| self.model.is_node(p)) {
                        return None;
                    }
                    let top_left = self.local_position(geo, parent);
                    let bounds = Rect::new(top_left.x(), top_left.y(), geo.width(), geo.height());
                    let rotation = self.style_of(*cell).rotation();
                    if rotation != 0.0 {
                        bounds.rotated_bounds(rotation, bounds.center())
                    } else {
                        bounds
                    }
                };
                Some(bounds.translate(shift.x(), shift.y()))
            })
            .reduce(|acc, r| acc.union(&r))
    }

    /// Model-level ids of all edges attached to `cells` or any of their
    /// descendants.
    fn all_edges(&self, cells: &[Id]) -> Vec<Id> {
        let mut result = indexmap::IndexSet::new();
        for cell in cells {
            for id in self.model.descendants(*cell) {
                result.extend(self.model.edges(id).iter().copied());
            }
        }
        result.into_iter().collect()
    }

    /// `cells` followed by every edge attached to them or their descendants.
    fn add_all_edges(&self, cells: &[Id]) -> Vec<Id> {
        let mut result: indexmap::IndexSet<Id> = cells.iter().copied().collect();
        result.extend(self.all_edges(cells));
        result.into_iter().collect()
    }
}

/// Logs and discards a store error from a bulk operation.
fn skip_stale<T>(operation: &'static str, result: Result<T, ModelError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(operation, err:err; "Skipping stale reference");
            None
        }
    }
}
