use serde::Serialize;

use crate::diff::DiffResult;
use corelib::Snapshot;

/// One input to the pipeline actor. Feed snapshots and query edits share a
/// single queue, so the order they are enqueued in is the order they are
/// applied in.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Raw snapshot from the feed, not yet annotated.
    Snapshot(Snapshot),
    /// Raw query text, not yet compiled.
    Query(String),
}

/// One pipeline output: the new filtered snapshot and how to get there from
/// the previous one.
#[derive(Debug, Clone, Serialize)]
pub struct TickerUpdate {
    /// Position in the run's output stream. The initial update is 0.
    pub seq: u64,
    pub ts_ms: u64,
    pub snapshot: Snapshot,
    pub diff: DiffResult,
}

impl TickerUpdate {
    /// The first update of a run is always diffed against an empty list.
    /// Consumers that only want incremental changes can skip it.
    pub fn is_initial(&self) -> bool {
        self.seq == 0
    }
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Capacity of the shared input queue (feed + query).
    ///
    /// Acts as backpressure on the feed when the consumer falls behind.
    pub event_queue_capacity: usize,

    /// Capacity of the feed → actor snapshot channel.
    pub feed_queue_capacity: usize,

    /// Capacity of the output channel. Updates are never dropped; the actor
    /// waits for room instead.
    pub update_queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: 256,
            feed_queue_capacity: 16,
            update_queue_capacity: 64,
        }
    }
}
