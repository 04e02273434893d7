use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use corelib::Snapshot;

/// Source of raw snapshots (the live ticker transport).
///
/// Implementations push full-replacement snapshots into `sender` in delivery
/// order until the receiving side is dropped, and own their reconnection
/// policy. Each snapshot must hold unique ids.
#[async_trait]
pub trait SnapshotFeed: Send + Sync + 'static {
    async fn stream_snapshots(&self, sender: Sender<Snapshot>) -> anyhow::Result<()>;
}
