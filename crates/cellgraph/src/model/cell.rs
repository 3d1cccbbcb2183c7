use serde::{Deserialize, Serialize};

use cellgraph_core::{
    geometry::{Geometry, Point, Rect, Size},
    identifier::Id,
    style::Style,
};

/// What a cell represents in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// The root or one of its direct children. Layers have no geometry and
    /// only act as containers.
    Layer,
    Node,
    Edge,
}

/// A decoration attached to a cell, anchored at its bottom-right corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    name: String,
    size: Size,
    offset: Point,
}

impl Overlay {
    pub fn new(name: impl Into<String>, size: Size) -> Self {
        Self {
            name: name.into(),
            size,
            offset: Point::default(),
        }
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Screen bounds of the overlay for a cell drawn at `cell_bounds`.
    pub fn bounds(&self, cell_bounds: Rect, scale: f64) -> Rect {
        let anchor = Point::new(cell_bounds.right(), cell_bounds.bottom())
            .add_point(self.offset.scale(scale));
        let width = self.size.width() * scale;
        let height = self.size.height() * scale;
        Rect::new(
            anchor.x() - width / 2.0,
            anchor.y() - height / 2.0,
            width,
            height,
        )
    }
}

/// A node, edge or layer in the ownership tree.
///
/// Structural fields (`parent`, `children`, incident `edges`) are maintained
/// by [`Model`](super::Model) and cannot be set from outside the store. A
/// freshly built cell is detached until it is added under a parent.
///
/// # Examples
///
/// ```
/// # use cellgraph::model::{Cell, CellKind};
/// # use cellgraph_core::{geometry::{Geometry, Rect}, identifier::Id};
/// let cell = Cell::node(Id::new("a"))
///     .with_value("A")
///     .with_geometry(Geometry::new(Rect::new(0.0, 0.0, 80.0, 30.0)));
///
/// assert_eq!(cell.kind(), CellKind::Node);
/// assert_eq!(cell.value(), Some("A"));
/// assert!(cell.parent().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    id: Id,
    kind: CellKind,
    value: Option<String>,
    style: Style,
    geometry: Option<Geometry>,
    visible: bool,
    connectable: bool,
    collapsed: bool,
    source: Option<Id>,
    target: Option<Id>,
    overlays: Vec<Overlay>,
    parent: Option<Id>,
    children: Vec<Id>,
    edges: Vec<Id>,
}

impl Cell {
    fn new(id: Id, kind: CellKind) -> Self {
        Self {
            id,
            kind,
            value: None,
            style: Style::default(),
            geometry: None,
            visible: true,
            connectable: kind == CellKind::Node,
            collapsed: false,
            source: None,
            target: None,
            overlays: Vec::new(),
            parent: None,
            children: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Creates a detached node with no geometry.
    pub fn node(id: Id) -> Self {
        Self::new(id, CellKind::Node)
    }

    /// Creates a detached edge with the default relative edge geometry.
    pub fn edge(id: Id) -> Self {
        Self::new(id, CellKind::Edge).with_geometry(Geometry::edge())
    }

    /// Creates a detached layer.
    pub fn layer(id: Id) -> Self {
        Self::new(id, CellKind::Layer)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_connectable(mut self, connectable: bool) -> Self {
        self.connectable = connectable;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Sets a terminal before the cell is admitted to a model.
    pub fn with_terminal(mut self, terminal: Option<Id>, is_source: bool) -> Self {
        if is_source {
            self.source = terminal;
        } else {
            self.target = terminal;
        }
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn is_node(&self) -> bool {
        self.kind == CellKind::Node
    }

    pub fn is_edge(&self) -> bool {
        self.kind == CellKind::Edge
    }

    pub fn is_layer(&self) -> bool {
        self.kind == CellKind::Layer
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_connectable(&self) -> bool {
        self.connectable
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn source(&self) -> Option<Id> {
        self.source
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }

    pub fn terminal(&self, is_source: bool) -> Option<Id> {
        if is_source { self.source } else { self.target }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Children in z-order, back to front.
    pub fn children(&self) -> &[Id] {
        &self.children
    }

    /// Edges of the attached graph that use this cell as a terminal.
    pub fn edges(&self) -> &[Id] {
        &self.edges
    }

    pub(super) fn set_parent(&mut self, parent: Option<Id>) {
        self.parent = parent;
    }

    pub(super) fn children_mut(&mut self) -> &mut Vec<Id> {
        &mut self.children
    }

    pub(super) fn edges_mut(&mut self) -> &mut Vec<Id> {
        &mut self.edges
    }

    pub(super) fn overlays_mut(&mut self) -> &mut Vec<Overlay> {
        &mut self.overlays
    }

    pub(super) fn replace_geometry(&mut self, geometry: Option<Geometry>) -> Option<Geometry> {
        std::mem::replace(&mut self.geometry, geometry)
    }

    pub(super) fn replace_style(&mut self, style: Style) -> Style {
        std::mem::replace(&mut self.style, style)
    }

    pub(super) fn replace_value(&mut self, value: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.value, value)
    }

    pub(super) fn replace_terminal(&mut self, terminal: Option<Id>, is_source: bool) -> Option<Id> {
        let slot = if is_source {
            &mut self.source
        } else {
            &mut self.target
        };
        std::mem::replace(slot, terminal)
    }

    pub(super) fn replace_visible(&mut self, visible: bool) -> bool {
        std::mem::replace(&mut self.visible, visible)
    }

    pub(super) fn replace_collapsed(&mut self, collapsed: bool) -> bool {
        std::mem::replace(&mut self.collapsed, collapsed)
    }

    /// Copy of the cell's own attributes under a new id, without structure
    /// or terminals.
    pub(super) fn duplicate(&self, id: Id) -> Self {
        Self {
            id,
            kind: self.kind,
            value: self.value.clone(),
            style: self.style.clone(),
            geometry: self.geometry.clone(),
            visible: self.visible,
            connectable: self.connectable,
            collapsed: self.collapsed,
            source: None,
            target: None,
            overlays: self.overlays.clone(),
            parent: None,
            children: Vec::new(),
            edges: Vec::new(),
        }
    }
}
