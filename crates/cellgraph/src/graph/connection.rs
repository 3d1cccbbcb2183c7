//! Connecting edges to terminals and ports.

use log::{debug, trace, warn};

use cellgraph_core::{
    constraint::ConnectionConstraint,
    geometry::Point,
    identifier::Id,
    style::keys,
};

use super::{Graph, GraphEvent, skip_stale};
use crate::{
    connection::{connection_point, constraint_from_style, write_constraint_to_style},
    view::ViewProvider,
};

impl<V: ViewProvider> Graph<V> {
    /// Connects one end of `edge` to `terminal`, or disconnects it when
    /// `terminal` is `None`.
    ///
    /// A given `constraint` is stored in the edge style; without one the
    /// stored constraint is left untouched. Returns the edge.
    pub fn connect_cell(
        &mut self,
        edge: Id,
        terminal: Option<Id>,
        is_source: bool,
        constraint: Option<&ConnectionConstraint>,
    ) -> Id {
        debug!(edge = edge.to_string(), terminal:?, is_source; "Connecting cell");
        self.batch(|graph| {
            let previous = graph.model.terminal(edge, is_source);
            graph.cell_connected(edge, terminal, is_source, constraint);
            graph.fire(GraphEvent::CellConnected {
                edge,
                terminal,
                previous,
                is_source,
                constraint: constraint.cloned(),
            });
        });
        edge
    }

    /// Sets the terminal of one edge end.
    ///
    /// With ports enabled, a port terminal is replaced by the cell owning it
    /// and the port id is recorded under `sourcePort`/`targetPort`; any other
    /// terminal clears that key.
    pub(super) fn cell_connected(
        &mut self,
        edge: Id,
        terminal: Option<Id>,
        is_source: bool,
        constraint: Option<&ConnectionConstraint>,
    ) {
        if !self.model.is_edge(edge) {
            warn!(edge = edge.to_string(); "Skipping connection of a non-edge");
            return;
        }

        let current = self.style_of(edge);
        let mut style = current.clone();
        if let Some(constraint) = constraint {
            write_constraint_to_style(&mut style, Some(constraint), is_source);
        }

        let mut terminal = terminal;
        if self.config.ports_enabled() {
            let key = if is_source { keys::SOURCE_PORT } else { keys::TARGET_PORT };
            let port = terminal.filter(|t| self.is_port(*t));
            if let Some(port) = port {
                trace!(edge = edge.to_string(), port = port.to_string(); "Connecting to port owner");
                terminal = self.model.parent(port);
            }
            style.set(key, port.map(|p| p.to_string()));
        }

        self.batch(|graph| {
            if style != current {
                skip_stale("cell_connected", graph.model.set_style(edge, style));
            }
            skip_stale("cell_connected", graph.model.set_terminal(edge, terminal, is_source));
            if graph.config.reset_edges_on_connect() {
                graph.reset_edge(edge);
            }
        });
    }

    /// Returns true if `cell` is a port: a node with a relative geometry
    /// placed on another node.
    pub fn is_port(&self, cell: Id) -> bool {
        self.model.is_node(cell)
            && self.model.geometry(cell).is_some_and(|geo| geo.is_relative())
            && self.model.parent(cell).is_some_and(|p| self.model.is_node(p))
    }

    /// The terminal an edge end is attached to, resolving a recorded port
    /// back to the port cell.
    pub fn port_terminal(&self, edge: Id, is_source: bool) -> Option<Id> {
        let terminal = self.model.terminal(edge, is_source)?;
        let key = if is_source { keys::SOURCE_PORT } else { keys::TARGET_PORT };
        let port = self
            .model
            .style(edge)
            .and_then(|style| style.get(key))
            .map(Id::from)
            .filter(|port| self.model.parent(*port) == Some(terminal));
        Some(port.unwrap_or(terminal))
    }

    /// Connection constraint stored for one end of `edge`.
    pub fn connection_constraint(&self, edge: Id, is_source: bool) -> ConnectionConstraint {
        constraint_from_style(&self.style_of(edge), is_source)
    }

    /// Stores `constraint` for one end of `edge`, or clears it with `None`.
    pub fn set_connection_constraint(
        &mut self,
        edge: Id,
        is_source: bool,
        constraint: Option<&ConnectionConstraint>,
    ) {
        let mut style = self.style_of(edge);
        write_constraint_to_style(&mut style, constraint, is_source);
        skip_stale("set_connection_constraint", self.model.set_style(edge, style));
    }

    /// Resolves `constraint` on the displayed `terminal`, in screen units.
    pub fn connection_point(
        &self,
        terminal: Id,
        constraint: &ConnectionConstraint,
        round: bool,
    ) -> Option<Point> {
        let state = self.view.state(&self.model, terminal)?;
        connection_point(&self.view, &state, constraint, round)
    }
}

#[cfg(test)]
mod tests {
    use cellgraph_core::{geometry::Rect, style::Style};

    use super::*;
    use crate::{
        config::GraphConfig,
        graph::tests::{events, node},
    };

    fn edge(graph: &mut Graph, name: &str, source: Id, target: Id) -> Id {
        graph
            .insert_edge(None, Some(Id::new(name)), None, Some(source), Some(target), Style::new())
            .unwrap()
    }

    #[test]
    fn test_connect_cell_fires_with_previous() {
        let mut graph = Graph::default();
        let a = node(&mut graph, None, "cc_a", Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = node(&mut graph, None, "cc_b", Rect::new(50.0, 0.0, 10.0, 10.0));
        let c = node(&mut graph, None, "cc_c", Rect::new(100.0, 0.0, 10.0, 10.0));
        let e = edge(&mut graph, "cc_edge", a, b);
        let seen = events(&mut graph);

        graph.connect_cell(e, Some(c), false, None);

        assert_eq!(graph.model().terminal(e, false), Some(c));
        assert!(graph.model().edges(b).is_empty());
        match &seen.borrow()[0] {
            GraphEvent::CellConnected { previous, terminal, .. } => {
                assert_eq!(*previous, Some(b));
                assert_eq!(*terminal, Some(c));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_connect_stores_constraint() {
        let mut graph = Graph::default();
        let a = node(&mut graph, None, "cs_a", Rect::new(0.0, 0.0, 100.0, 50.0));
        let b = node(&mut graph, None, "cs_b", Rect::new(200.0, 0.0, 10.0, 10.0));
        let e = edge(&mut graph, "cs_edge", a, b);
        let constraint = ConnectionConstraint::new(Some(Point::new(1.0, 0.5))).with_perimeter(false);

        graph.connect_cell(e, Some(a), true, Some(&constraint));
        assert_eq!(graph.connection_constraint(e, true).point(), Some(Point::new(1.0, 0.5)));
        assert_eq!(
            graph.connection_point(a, &graph.connection_constraint(e, true), true),
            Some(Point::new(100.0, 25.0))
        );

        // Reconnecting without a constraint keeps the stored one.
        graph.connect_cell(e, Some(a), true, None);
        assert!(!graph.connection_constraint(e, true).perimeter());

        graph.set_connection_constraint(e, true, None);
        assert_eq!(graph.connection_constraint(e, true).point(), None);
    }

    #[test]
    fn test_connect_to_port_uses_owner() {
        let mut graph = Graph::default();
        let owner = node(&mut graph, None, "port_owner", Rect::new(0.0, 0.0, 100.0, 100.0));
        let port = node(&mut graph, Some(owner), "port_east", Rect::new(1.0, 0.5, 10.0, 10.0));
        let geo = graph.model().geometry(port).unwrap().clone().with_relative(true);
        graph.model_mut().set_geometry(port, Some(geo)).unwrap();
        let other = node(&mut graph, None, "port_other", Rect::new(200.0, 0.0, 10.0, 10.0));
        let e = edge(&mut graph, "port_edge", other, other);

        assert!(graph.is_port(port));
        graph.connect_cell(e, Some(port), false, None);

        assert_eq!(graph.model().terminal(e, false), Some(owner));
        assert_eq!(graph.model().style(e).unwrap().get(keys::TARGET_PORT), Some("port_east"));
        assert_eq!(graph.port_terminal(e, false), Some(port));

        graph.connect_cell(e, Some(other), false, None);
        assert_eq!(graph.model().style(e).unwrap().get(keys::TARGET_PORT), None);
    }

    #[test]
    fn test_ports_disabled_connects_directly() {
        let mut graph = Graph::new(GraphConfig::default().with_ports_enabled(false));
        let owner = node(&mut graph, None, "np_owner", Rect::new(0.0, 0.0, 100.0, 100.0));
        let port = node(&mut graph, Some(owner), "np_port", Rect::new(1.0, 0.5, 10.0, 10.0));
        let geo = graph.model().geometry(port).unwrap().clone().with_relative(true);
        graph.model_mut().set_geometry(port, Some(geo)).unwrap();
        let e = edge(&mut graph, "np_edge", owner, owner);

        graph.connect_cell(e, Some(port), false, None);
        assert_eq!(graph.model().terminal(e, false), Some(port));
    }

    #[test]
    fn test_connect_resets_waypoints() {
        let mut graph = Graph::default();
        let a = node(&mut graph, None, "rw_a", Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = node(&mut graph, None, "rw_b", Rect::new(50.0, 0.0, 10.0, 10.0));
        let e = edge(&mut graph, "rw_edge", a, b);
        let geo = graph
            .model()
            .geometry(e)
            .unwrap()
            .clone()
            .with_points(vec![Point::new(30.0, 40.0)]);
        graph.model_mut().set_geometry(e, Some(geo)).unwrap();

        graph.connect_cell(e, Some(a), false, None);
        assert!(graph.model().geometry(e).unwrap().points().is_empty());
    }
}
