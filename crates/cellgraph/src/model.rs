//! The cell store and its transaction coordinator.
//!
//! [`Model`] owns every [`Cell`] in an arena keyed by [`Id`]. The ownership
//! tree is expressed through parent/child links; edges additionally point at
//! their source and target terminals, and every terminal keeps the list of
//! attached edges that use it.
//!
//! # Overview
//!
//! - Structural primitives: [`Model::add`], [`Model::remove`]
//! - Attribute setters: [`Model::set_geometry`], [`Model::set_style`],
//!   [`Model::set_terminal`], [`Model::set_value`], [`Model::set_visible`],
//!   [`Model::set_collapsed`]
//! - Queries: ancestry, descendants, incident edges
//! - Transactions: [`Model::batch`] and the begin/end pair it wraps
//!
//! Setters only touch the named attribute; cascading geometry updates are
//! the job of [`Graph`](crate::graph::Graph).
//!
//! # Transactions
//!
//! Every mutation is applied immediately and recorded as a [`Change`].
//! Notification is deferred until the outermost update ends, at which point
//! all change listeners receive one [`ChangeSet`] with every change in
//! application order.
//!
//! ```
//! # use std::{cell::RefCell, rc::Rc};
//! # use cellgraph::model::{Cell, Model};
//! # use cellgraph_core::identifier::Id;
//! let mut model = Model::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! model.add_change_listener(move |changes| sink.borrow_mut().push(changes.len()));
//!
//! let layer = model.default_layer();
//! model.batch(|model| {
//!     let a = model.insert(Cell::node(Id::new("a"))).unwrap();
//!     model.add(layer, a, None).unwrap();
//!     model.set_value(a, Some("A".to_string())).unwrap();
//! });
//!
//! assert_eq!(*seen.borrow(), vec![2]);
//! ```

mod cell;
mod change;
mod transaction;

use std::{collections::HashMap, fmt};

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use cellgraph_core::{geometry::Geometry, identifier::Id, style::Style};

pub use cell::{Cell, CellKind, Overlay};
pub use change::{Change, ChangeSet};

use crate::error::ModelError;
use transaction::Transaction;

type ChangeListener = Box<dyn FnMut(&ChangeSet)>;
type CommitHook = Box<dyn FnMut(&mut Model)>;

/// The authoritative cell store.
pub struct Model {
    cells: IndexMap<Id, Cell>,
    root: Id,
    default_layer: Id,
    next_id: usize,
    transaction: Transaction,
    listeners: Vec<ChangeListener>,
    hooks: Vec<CommitHook>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("root", &self.root)
            .field("cells", &self.cells.len())
            .field("depth", &self.transaction.depth())
            .finish()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates a model with a root cell `0` holding a single layer `1`.
    pub fn new() -> Self {
        let root = Id::new("0");
        let layer = Id::new("1");

        let mut layer_cell = Cell::layer(layer);
        layer_cell.set_parent(Some(root));
        let mut root_cell = Cell::layer(root);
        root_cell.children_mut().push(layer);

        let mut cells = IndexMap::new();
        cells.insert(root, root_cell);
        cells.insert(layer, layer_cell);

        Self {
            cells,
            root,
            default_layer: layer,
            next_id: 2,
            transaction: Transaction::default(),
            listeners: Vec::new(),
            hooks: Vec::new(),
        }
    }

    pub fn root(&self) -> Id {
        self.root
    }

    /// The layer created together with the model.
    pub fn default_layer(&self) -> Id {
        self.default_layer
    }

    /// Returns a fresh identifier not used by any cell.
    pub fn create_id(&mut self) -> Id {
        loop {
            let id = Id::new(&self.next_id.to_string());
            self.next_id += 1;
            if !self.cells.contains_key(&id) {
                return id;
            }
        }
    }

    /// Admits a detached cell into the arena.
    pub fn insert(&mut self, cell: Cell) -> Result<Id, ModelError> {
        let id = cell.id();
        if self.cells.contains_key(&id) {
            return Err(ModelError::DuplicateId(id));
        }
        trace!(cell = id.to_string(); "Insert cell");
        self.cells.insert(id, cell);
        Ok(id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.cells.contains_key(&id)
    }

    pub fn cell(&self, id: Id) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    fn require(&self, id: Id) -> Result<&Cell, ModelError> {
        self.cells.get(&id).ok_or(ModelError::UnknownCell(id))
    }

    fn require_mut(&mut self, id: Id) -> Result<&mut Cell, ModelError> {
        self.cells.get_mut(&id).ok_or(ModelError::UnknownCell(id))
    }

    // ===================
    // Structure
    // ===================

    /// Inserts `child` under `parent` at `index`, shifting later siblings.
    ///
    /// A missing or out-of-range index appends. Returns the final index.
    ///
    /// # Errors
    ///
    /// Fails if either cell is unknown, if `child` still has a parent, or if
    /// the insertion would make `child` its own ancestor.
    pub fn add(&mut self, parent: Id, child: Id, index: Option<usize>) -> Result<usize, ModelError> {
        self.require(parent)?;
        if self.require(child)?.parent().is_some() {
            return Err(ModelError::AlreadyAttached(child));
        }
        if child == self.root || self.is_ancestor(child, parent) {
            return Err(ModelError::CyclicParent { parent, child });
        }

        let siblings = self.require_mut(parent)?.children_mut();
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, child);
        self.require_mut(child)?.set_parent(Some(parent));

        if self.is_attached(parent) {
            self.link_subtree_edges(child);
        }

        self.record(Change::Child {
            cell: child,
            previous_parent: None,
            previous_index: None,
            parent: Some(parent),
            index: Some(index),
        });
        Ok(index)
    }

    /// Detaches `child` from its parent and returns the previous parent and
    /// index.
    ///
    /// Descendants stay attached to `child`. Edges inside the removed subtree
    /// are dropped from the incident lists of their terminals but keep their
    /// own terminal references.
    pub fn remove(&mut self, child: Id) -> Result<(Id, usize), ModelError> {
        let parent = self
            .require(child)?
            .parent()
            .ok_or(ModelError::NotAttached(child))?;

        if self.is_attached(child) {
            self.unlink_subtree_edges(child);
        }

        let siblings = self.require_mut(parent)?.children_mut();
        let index = siblings
            .iter()
            .position(|c| *c == child)
            .ok_or(ModelError::NotAttached(child))?;
        siblings.remove(index);
        self.require_mut(child)?.set_parent(None);

        self.record(Change::Child {
            cell: child,
            previous_parent: Some(parent),
            previous_index: Some(index),
            parent: None,
            index: None,
        });
        Ok((parent, index))
    }

    /// Returns true if `id` is reachable from the root.
    pub fn is_attached(&self, id: Id) -> bool {
        let mut current = Some(id);
        for _ in 0..=self.cells.len() {
            match current {
                Some(cell) if cell == self.root => return true,
                Some(cell) => current = self.parent(cell),
                None => return false,
            }
        }
        false
    }

    fn link_subtree_edges(&mut self, cell: Id) {
        for id in self.descendants(cell) {
            let Some(edge) = self.cells.get(&id) else {
                continue;
            };
            if !edge.is_edge() {
                continue;
            }
            for terminal in [edge.source(), edge.target()].into_iter().flatten() {
                if let Some(term) = self.cells.get_mut(&terminal) {
                    if !term.edges().contains(&id) {
                        term.edges_mut().push(id);
                    }
                }
            }
        }
    }

    fn unlink_subtree_edges(&mut self, cell: Id) {
        for id in self.descendants(cell) {
            let Some(edge) = self.cells.get(&id) else {
                continue;
            };
            if !edge.is_edge() {
                continue;
            }
            for terminal in [edge.source(), edge.target()].into_iter().flatten() {
                if let Some(term) = self.cells.get_mut(&terminal) {
                    term.edges_mut().retain(|e| *e != id);
                }
            }
        }
    }

    // ===================
    // Attributes
    // ===================

    /// Replaces the geometry of `cell` and returns the previous one.
    pub fn set_geometry(
        &mut self,
        cell: Id,
        geometry: Option<Geometry>,
    ) -> Result<Option<Geometry>, ModelError> {
        let target = self.require_mut(cell)?;
        if target.geometry() == geometry.as_ref() {
            return Ok(geometry);
        }
        let previous = target.replace_geometry(geometry.clone());
        self.record(Change::Geometry {
            cell,
            previous: previous.clone(),
            geometry,
        });
        Ok(previous)
    }

    /// Replaces the style of `cell` and returns the previous one.
    pub fn set_style(&mut self, cell: Id, style: Style) -> Result<Style, ModelError> {
        let target = self.require_mut(cell)?;
        if *target.style() == style {
            return Ok(style);
        }
        let previous = target.replace_style(style.clone());
        self.record(Change::Style {
            cell,
            previous: previous.clone(),
            style,
        });
        Ok(previous)
    }

    /// Replaces the value of `cell` and returns the previous one.
    pub fn set_value(&mut self, cell: Id, value: Option<String>) -> Result<Option<String>, ModelError> {
        let target = self.require_mut(cell)?;
        if target.value() == value.as_deref() {
            return Ok(value);
        }
        let previous = target.replace_value(value.clone());
        self.record(Change::Value {
            cell,
            previous: previous.clone(),
            value,
        });
        Ok(previous)
    }

    /// Connects or disconnects one end of `edge`.
    ///
    /// Incident edge lists are updated when the edge is part of the attached
    /// graph.
    pub fn set_terminal(
        &mut self,
        edge: Id,
        terminal: Option<Id>,
        is_source: bool,
    ) -> Result<Option<Id>, ModelError> {
        if let Some(terminal) = terminal {
            self.require(terminal)?;
        }
        let current = self.require(edge)?;
        let previous = current.terminal(is_source);
        if previous == terminal {
            return Ok(previous);
        }
        let other = current.terminal(!is_source);
        let attached = self.is_attached(edge);

        self.require_mut(edge)?.replace_terminal(terminal, is_source);

        if attached {
            if let Some(previous) = previous {
                if other != Some(previous) {
                    if let Some(cell) = self.cells.get_mut(&previous) {
                        cell.edges_mut().retain(|e| *e != edge);
                    }
                }
            }
            if let Some(terminal) = terminal {
                let cell = self.require_mut(terminal)?;
                if !cell.edges().contains(&edge) {
                    cell.edges_mut().push(edge);
                }
            }
        }

        self.record(Change::Terminal {
            cell: edge,
            is_source,
            previous,
            terminal,
        });
        Ok(previous)
    }

    pub fn set_visible(&mut self, cell: Id, visible: bool) -> Result<bool, ModelError> {
        let previous = self.require_mut(cell)?.replace_visible(visible);
        if previous != visible {
            self.record(Change::Visible {
                cell,
                previous,
                visible,
            });
        }
        Ok(previous)
    }

    pub fn set_collapsed(&mut self, cell: Id, collapsed: bool) -> Result<bool, ModelError> {
        let previous = self.require_mut(cell)?.replace_collapsed(collapsed);
        if previous != collapsed {
            self.record(Change::Collapsed {
                cell,
                previous,
                collapsed,
            });
        }
        Ok(previous)
    }

    /// Attaches an overlay. Overlays are decorations and are not recorded in
    /// change sets.
    pub fn add_overlay(&mut self, cell: Id, overlay: Overlay) -> Result<(), ModelError> {
        self.require_mut(cell)?.overlays_mut().push(overlay);
        Ok(())
    }

    /// Removes the first overlay named `name`.
    pub fn remove_overlay(&mut self, cell: Id, name: &str) -> Result<Option<Overlay>, ModelError> {
        let overlays = self.require_mut(cell)?.overlays_mut();
        Ok(overlays
            .iter()
            .position(|o| o.name() == name)
            .map(|index| overlays.remove(index)))
    }

    pub fn clear_overlays(&mut self, cell: Id) -> Result<Vec<Overlay>, ModelError> {
        Ok(std::mem::take(self.require_mut(cell)?.overlays_mut()))
    }

    // ===================
    // Queries
    // ===================

    pub fn parent(&self, id: Id) -> Option<Id> {
        self.cells.get(&id).and_then(Cell::parent)
    }

    pub fn children(&self, id: Id) -> &[Id] {
        self.cells.get(&id).map(Cell::children).unwrap_or_default()
    }

    pub fn child_count(&self, id: Id) -> usize {
        self.children(id).len()
    }

    pub fn child_index(&self, id: Id) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn geometry(&self, id: Id) -> Option<&Geometry> {
        self.cells.get(&id).and_then(Cell::geometry)
    }

    pub fn style(&self, id: Id) -> Option<&Style> {
        self.cells.get(&id).map(Cell::style)
    }

    pub fn terminal(&self, edge: Id, is_source: bool) -> Option<Id> {
        self.cells.get(&edge).and_then(|c| c.terminal(is_source))
    }

    /// Attached edges using `id` as a terminal.
    pub fn edges(&self, id: Id) -> &[Id] {
        self.cells.get(&id).map(Cell::edges).unwrap_or_default()
    }

    pub fn is_node(&self, id: Id) -> bool {
        self.cells.get(&id).is_some_and(Cell::is_node)
    }

    pub fn is_edge(&self, id: Id) -> bool {
        self.cells.get(&id).is_some_and(Cell::is_edge)
    }

    pub fn is_layer(&self, id: Id) -> bool {
        self.cells.get(&id).is_some_and(Cell::is_layer)
    }

    pub fn is_visible(&self, id: Id) -> bool {
        self.cells.get(&id).is_some_and(Cell::is_visible)
    }

    pub fn is_collapsed(&self, id: Id) -> bool {
        self.cells.get(&id).is_some_and(Cell::is_collapsed)
    }

    /// Returns true if `ancestor` is `cell` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: Id, cell: Id) -> bool {
        let mut current = Some(cell);
        for _ in 0..=self.cells.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.parent(id),
                None => return false,
            }
        }
        false
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: Id) -> Vec<Id> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if result.len() > self.cells.len() {
                break;
            }
            result.push(parent);
            current = self.parent(parent);
        }
        result
    }

    /// The subtree rooted at `id` in pre-order, starting with `id`.
    pub fn descendants(&self, id: Id) -> Vec<Id> {
        let mut result = Vec::new();
        if !self.contains(id) {
            return result;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        result
    }

    /// Cells from `cells` that have no ancestor in `cells`, in input order.
    pub fn topmost_cells(&self, cells: &[Id]) -> Vec<Id> {
        let set: IndexSet<Id> = cells.iter().copied().collect();
        set.iter()
            .copied()
            .filter(|cell| !self.ancestors(*cell).iter().any(|a| set.contains(a)))
            .collect()
    }

    /// Closest cell that is an ancestor of both `a` and `b` (inclusive).
    pub fn nearest_common_ancestor(&self, a: Id, b: Id) -> Option<Id> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let mut chain: IndexSet<Id> = IndexSet::new();
        chain.insert(a);
        chain.extend(self.ancestors(a));
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|cell| chain.contains(cell))
    }

    /// Incident edges of `cell` filtered by direction.
    ///
    /// Self-loops are returned once, and only when `include_loops` is set.
    pub fn edges_filtered(
        &self,
        cell: Id,
        incoming: bool,
        outgoing: bool,
        include_loops: bool,
    ) -> Vec<Id> {
        self.edges(cell)
            .iter()
            .copied()
            .filter(|edge| {
                let source = self.terminal(*edge, true);
                let target = self.terminal(*edge, false);
                if source == target && source == Some(cell) {
                    include_loops
                } else {
                    (incoming && target == Some(cell)) || (outgoing && source == Some(cell))
                }
            })
            .collect()
    }

    pub fn incoming_edges(&self, cell: Id) -> Vec<Id> {
        self.edges_filtered(cell, true, false, false)
    }

    pub fn outgoing_edges(&self, cell: Id) -> Vec<Id> {
        self.edges_filtered(cell, false, true, false)
    }

    /// Edges connecting `source` and `target` by their stored terminals.
    pub fn edges_between(&self, source: Id, target: Id, directed: bool) -> Vec<Id> {
        self.edges(source)
            .iter()
            .copied()
            .filter(|edge| {
                let src = self.terminal(*edge, true);
                let trg = self.terminal(*edge, false);
                (src == Some(source) && trg == Some(target))
                    || (!directed && src == Some(target) && trg == Some(source))
            })
            .collect()
    }

    // ===================
    // Cloning and cleanup
    // ===================

    /// Clones `cells` (and their subtrees when `include_children` is set)
    /// into detached copies with fresh ids.
    ///
    /// Returns the clones in input order and the mapping from original to
    /// clone ids. A cloned edge keeps a terminal only if that terminal was
    /// cloned too.
    pub fn clone_cells(
        &mut self,
        cells: &[Id],
        include_children: bool,
    ) -> Result<(Vec<Id>, HashMap<Id, Id>), ModelError> {
        for cell in cells {
            self.require(*cell)?;
        }

        let mut mapping = HashMap::new();
        let mut clones = Vec::with_capacity(cells.len());
        for cell in cells {
            clones.push(self.clone_subtree(*cell, include_children, &mut mapping)?);
        }

        let pairs: Vec<(Id, Id)> = mapping.iter().map(|(a, b)| (*a, *b)).collect();
        for (original, clone) in pairs {
            for is_source in [true, false] {
                let mapped = self
                    .terminal(original, is_source)
                    .and_then(|t| mapping.get(&t).copied());
                if let Some(mapped) = mapped {
                    self.require_mut(clone)?.replace_terminal(Some(mapped), is_source);
                }
            }
        }

        debug!(count = clones.len(); "Cloned cells");
        Ok((clones, mapping))
    }

    fn clone_subtree(
        &mut self,
        cell: Id,
        include_children: bool,
        mapping: &mut HashMap<Id, Id>,
    ) -> Result<Id, ModelError> {
        let id = self.create_id();
        let copy = self.require(cell)?.duplicate(id);
        self.insert(copy)?;
        mapping.insert(cell, id);

        if include_children {
            for child in self.children(cell).to_vec() {
                let child_clone = self.clone_subtree(child, true, mapping)?;
                self.require_mut(child_clone)?.set_parent(Some(id));
                self.require_mut(id)?.children_mut().push(child_clone);
            }
        }
        Ok(id)
    }

    /// Frees the detached subtree rooted at `id` from the arena.
    ///
    /// Only for cells nothing else refers to yet, such as fresh clones.
    pub(crate) fn discard(&mut self, id: Id) -> Result<usize, ModelError> {
        if self.require(id)?.parent().is_some() || id == self.root {
            return Err(ModelError::AlreadyAttached(id));
        }
        let subtree = self.descendants(id);
        for cell in &subtree {
            self.cells.shift_remove(cell);
        }
        trace!(cell = id.to_string(), count = subtree.len(); "Discarded detached cells");
        Ok(subtree.len())
    }

    /// Drops detached subtrees from the arena and returns how many cells
    /// were freed.
    ///
    /// Subtrees still referenced as a terminal by an attached edge are kept.
    pub fn prune_detached(&mut self) -> usize {
        let detached_roots: Vec<Id> = self
            .cells
            .values()
            .filter(|c| c.parent().is_none() && c.id() != self.root)
            .map(Cell::id)
            .collect();

        let mut pruned = 0;
        for subtree_root in detached_roots {
            let subtree = self.descendants(subtree_root);
            let referenced = subtree.iter().any(|id| {
                self.edges(*id)
                    .iter()
                    .any(|edge| !subtree.contains(edge) && self.is_attached(*edge))
            });
            if referenced {
                continue;
            }
            for id in &subtree {
                self.cells.shift_remove(id);
            }
            pruned += subtree.len();
        }
        debug!(pruned; "Pruned detached cells");
        pruned
    }

    // ===================
    // Transactions
    // ===================

    /// Opens a (possibly nested) update.
    pub fn begin_update(&mut self) {
        self.transaction.begin();
    }

    /// Closes an update. Closing the outermost one runs the commit hooks and
    /// then notifies change listeners once with every recorded change.
    pub fn end_update(&mut self) {
        if !self.transaction.end() {
            return;
        }

        self.transaction.set_ending(true);

        let mut hooks = std::mem::take(&mut self.hooks);
        for hook in hooks.iter_mut() {
            hook(self);
        }
        hooks.append(&mut self.hooks);
        self.hooks = hooks;

        let changes = self.transaction.take_pending();
        if !changes.is_empty() {
            debug!(changes = changes.len(); "Committing change set");
            let mut listeners = std::mem::take(&mut self.listeners);
            for listener in listeners.iter_mut() {
                listener(&changes);
            }
            listeners.append(&mut self.listeners);
            self.listeners = listeners;
        }

        self.transaction.set_ending(false);
    }

    /// Current nesting depth of updates.
    pub fn update_depth(&self) -> usize {
        self.transaction.depth()
    }

    /// Runs `f` inside one update.
    ///
    /// The change set is flushed when `f` returns, including when it returns
    /// an error value; already applied mutations are not rolled back.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Model) -> R) -> R {
        self.begin_update();
        let result = f(self);
        self.end_update();
        result
    }

    /// Registers an observer for committed change sets.
    pub fn add_change_listener(&mut self, listener: impl FnMut(&ChangeSet) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Registers a hook that runs when the outermost update ends, before
    /// listeners are notified. Mutations made by the hook join the change
    /// set being committed.
    pub fn add_commit_hook(&mut self, hook: impl FnMut(&mut Model) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    fn record(&mut self, change: Change) {
        self.begin_update();
        self.transaction.record(change);
        self.end_update();
    }
}


#[cfg(test)]
mod proptest_tests {
    use std::{cell::RefCell, rc::Rc};

    use proptest::prelude::*;

    use super::*;

    /// Any nesting of batches around any number of mutations commits one
    /// change set holding every mutation in order.
    fn check_single_notification(depth: usize, mutations: usize) -> Result<(), TestCaseError> {
        let mut model = Model::new();
        let layer = model.default_layer();
        let cell = model.insert(Cell::node(Id::new("atomic"))).unwrap();
        model.add(layer, cell, None).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        model.add_change_listener(move |changes| sink.borrow_mut().push(changes.clone()));

        fn nest(model: &mut Model, cell: Id, depth: usize, mutations: usize) {
            if depth == 0 {
                for i in 0..mutations {
                    model.set_value(cell, Some(i.to_string())).unwrap();
                }
                return;
            }
            model.batch(|model| nest(model, cell, depth - 1, mutations));
        }

        model.batch(|model| nest(model, cell, depth, mutations));

        let seen = seen.borrow();
        prop_assert_eq!(seen.len(), 1);
        prop_assert_eq!(seen[0].len(), mutations);
        for (i, change) in seen[0].iter().enumerate() {
            match change {
                Change::Value { value, .. } => prop_assert_eq!(value.clone(), Some(i.to_string())),
                other => prop_assert!(false, "unexpected change {:?}", other),
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn single_notification(depth in 0usize..6, mutations in 1usize..20) {
            check_single_notification(depth, mutations)?;
        }
    }
}
