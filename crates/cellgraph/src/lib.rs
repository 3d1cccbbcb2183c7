//! Cellgraph - a hierarchical cell graph model with a geometry and
//! constraint engine for diagram editors.
//!
//! The crate keeps the authoritative model of a diagram: a tree of cells
//! (nodes and edges) with their geometry, style and terminals. The
//! [`Graph`] facade offers the structural operations (add, remove, move,
//! resize, group, fold, connect, align, traverse) that keep that model
//! consistent and batches each of them into a single notification.
//!
//! Rendering is out of scope. Whatever draws the diagram plugs in through
//! the [`ViewProvider`](view::ViewProvider) trait; [`GeometryView`](view::GeometryView)
//! is a provider that derives everything from the model alone.
//!
//! # Examples
//!
//! ```
//! use cellgraph::{Graph, config::GraphConfig};
//! use cellgraph_core::{geometry::Rect, style::Style};
//!
//! let mut graph = Graph::new(GraphConfig::default());
//! let group = graph
//!     .insert_node(None, None, Some("group"), Rect::new(0.0, 0.0, 100.0, 100.0), Style::new())
//!     .unwrap();
//! let child = graph
//!     .insert_node(Some(group), None, None, Rect::new(80.0, 80.0, 40.0, 40.0), Style::new())
//!     .unwrap();
//!
//! // Adding the child grew its parent.
//! let bounds = graph.model().geometry(group).unwrap().bounds();
//! assert_eq!(bounds, Rect::new(0.0, 0.0, 120.0, 120.0));
//! # let _ = child;
//! ```

pub mod config;
pub mod connection;
pub mod graph;
pub mod model;
pub mod view;

mod error;

pub use cellgraph_core::{constraint, geometry, identifier, style};

pub use error::{CellGraphError, ConfigError, ModelError};
pub use graph::{Alignment, Graph, GraphEvent};
