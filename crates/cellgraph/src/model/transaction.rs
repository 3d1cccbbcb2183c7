use log::trace;

use super::change::{Change, ChangeSet};

/// Nesting state of the batched-update mechanism.
///
/// Mutations are applied immediately; only their notification is deferred
/// until the outermost update ends.
#[derive(Debug, Default)]
pub(super) struct Transaction {
    depth: usize,
    ending: bool,
    pending: ChangeSet,
}

impl Transaction {
    pub(super) fn begin(&mut self) {
        self.depth += 1;
        trace!(depth = self.depth; "Begin update");
    }

    /// Decrements the depth and reports whether the outermost update just
    /// ended and needs to be committed.
    pub(super) fn end(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        trace!(depth = self.depth, ending = self.ending; "End update");
        self.depth == 0 && !self.ending
    }

    pub(super) fn depth(&self) -> usize {
        self.depth
    }

    pub(super) fn set_ending(&mut self, ending: bool) {
        self.ending = ending;
    }

    pub(super) fn record(&mut self, change: Change) {
        self.pending.push(change);
    }

    pub(super) fn take_pending(&mut self) -> ChangeSet {
        std::mem::take(&mut self.pending)
    }
}
