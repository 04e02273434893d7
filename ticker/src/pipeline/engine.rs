//! Synchronous heart of the pipeline.
//!
//! `TickerCore` owns every piece of retained state: the annotator's window, the
//! selector's two latest inputs and the last emitted filtered snapshot. It does
//! no I/O and can be driven directly, one event at a time.

use tracing::{Span, debug};

use crate::annotator::PriceDeltaAnnotator;
use crate::diff::diff;
use crate::query::compile;
use crate::selector::SnapshotSelector;
use crate::time::now_ms;
use crate::types::{PipelineEvent, TickerUpdate};
use corelib::Snapshot;

#[derive(Debug, Default)]
pub struct TickerCore {
    annotator: PriceDeltaAnnotator,
    selector: SnapshotSelector,
    /// Old side of the next diff.
    last: Snapshot,
    next_seq: u64,
}

impl TickerCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// View of the default inputs (empty snapshot, identity predicate),
    /// diffed against an empty list. Call once, before the first event.
    pub fn initial(&mut self) -> TickerUpdate {
        let filtered = self.selector.current();
        self.emit(filtered)
    }

    /// Apply one event and return the resulting update.
    pub fn handle(&mut self, event: PipelineEvent) -> TickerUpdate {
        let filtered = match event {
            PipelineEvent::Snapshot(raw) => {
                let annotated = self.annotator.annotate(raw);
                self.selector.on_snapshot(annotated)
            }
            PipelineEvent::Query(text) => {
                let predicate = compile(&text);
                Span::current().record("query", text.as_str());
                debug!(query = %text, %predicate, "query compiled");
                self.selector.on_predicate(predicate)
            }
        };
        self.emit(filtered)
    }

    fn emit(&mut self, filtered: Snapshot) -> TickerUpdate {
        let diff = diff(&self.last, &filtered);

        debug!(
            seq = self.next_seq,
            rows = filtered.len(),
            inserted = diff.inserted(),
            removed = diff.removed(),
            changed = diff.changed(),
            moved = diff.moved(),
            "view updated"
        );

        self.last = filtered.clone();
        let update = TickerUpdate {
            seq: self.next_seq,
            ts_ms: now_ms(),
            snapshot: filtered,
            diff,
        };
        self.next_seq += 1;
        update
    }

    pub fn last_snapshot(&self) -> &Snapshot {
        &self.last
    }

    /// Drop all retained state. The next update is an initial one again.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
