//! Snapshot Selector (combine-latest)
//!
//! Holds the latest annotated snapshot and the latest predicate. Every input
//! replaces one side and yields exactly one filtered snapshot built from the
//! newest value of both sides. There is no coalescing: two inputs in a row
//! always mean two emissions, in the order the inputs were applied.
//!
//! The selector itself is not synchronized. The pipeline actor owns it and
//! feeds it one event at a time.

use corelib::Snapshot;

use crate::query::Predicate;

#[derive(Debug, Clone, Default)]
pub struct SnapshotSelector {
    snapshot: Snapshot,
    predicate: Predicate,
}

impl SnapshotSelector {
    /// Starts from an empty snapshot and the identity predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot side and emit.
    pub fn on_snapshot(&mut self, snapshot: Snapshot) -> Snapshot {
        self.snapshot = snapshot;
        self.current()
    }

    /// Replace the predicate side and emit.
    pub fn on_predicate(&mut self, predicate: Predicate) -> Snapshot {
        self.predicate = predicate;
        self.current()
    }

    /// Filtered view of the present state. Order of the snapshot is kept.
    pub fn current(&self) -> Snapshot {
        if self.predicate.is_identity() {
            return self.snapshot.clone();
        }

        self.snapshot
            .iter()
            .filter(|listing| self.predicate.matches(listing))
            .cloned()
            .collect()
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
