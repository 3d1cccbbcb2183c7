use indexmap::IndexSet;

use cellgraph_core::{geometry::Geometry, identifier::Id, style::Style};

/// A single attribute change recorded by the store.
///
/// Each variant carries the previous and the new value so observers such as
/// an undo history can invert it.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Child {
        cell: Id,
        previous_parent: Option<Id>,
        previous_index: Option<usize>,
        parent: Option<Id>,
        index: Option<usize>,
    },
    Geometry {
        cell: Id,
        previous: Option<Geometry>,
        geometry: Option<Geometry>,
    },
    Style {
        cell: Id,
        previous: Style,
        style: Style,
    },
    Terminal {
        cell: Id,
        is_source: bool,
        previous: Option<Id>,
        terminal: Option<Id>,
    },
    Value {
        cell: Id,
        previous: Option<String>,
        value: Option<String>,
    },
    Visible {
        cell: Id,
        previous: bool,
        visible: bool,
    },
    Collapsed {
        cell: Id,
        previous: bool,
        collapsed: bool,
    },
}

impl Change {
    /// The cell whose attribute changed.
    pub fn cell(&self) -> Id {
        match self {
            Change::Child { cell, .. }
            | Change::Geometry { cell, .. }
            | Change::Style { cell, .. }
            | Change::Terminal { cell, .. }
            | Change::Value { cell, .. }
            | Change::Visible { cell, .. }
            | Change::Collapsed { cell, .. } => *cell,
        }
    }
}

/// The ordered list of changes committed by one outermost transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Distinct cells touched by the changes, in first-touched order.
    pub fn cells(&self) -> Vec<Id> {
        self.changes
            .iter()
            .map(Change::cell)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    pub(super) fn push(&mut self, change: Change) {
        self.changes.push(change);
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
