use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use ticker::Snapshot;
use ticker::feed::SnapshotFeed;

/// Feed driven by the test: every snapshot pushed into the returned sender is
/// delivered to whichever pipeline run is currently streaming.
pub struct ChannelFeed {
    source: Mutex<mpsc::UnboundedReceiver<Snapshot>>,
}

impl ChannelFeed {
    pub fn new() -> (Self, mpsc::UnboundedSender<Snapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let feed = Self {
            source: Mutex::new(rx),
        };
        (feed, tx)
    }
}

#[async_trait]
impl SnapshotFeed for ChannelFeed {
    async fn stream_snapshots(&self, sender: mpsc::Sender<Snapshot>) -> anyhow::Result<()> {
        let mut source = self.source.lock().await;
        while let Some(snapshot) = source.recv().await {
            if sender.send(snapshot).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Feed that never delivers anything and counts how many of its streams are
/// still attached.
#[derive(Default)]
pub struct IdleFeed {
    attached: Arc<AtomicUsize>,
}

impl IdleFeed {
    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }
}

struct Attachment(Arc<AtomicUsize>);

impl Drop for Attachment {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotFeed for IdleFeed {
    async fn stream_snapshots(&self, _sender: mpsc::Sender<Snapshot>) -> anyhow::Result<()> {
        self.attached.fetch_add(1, Ordering::SeqCst);
        let _attachment = Attachment(Arc::clone(&self.attached));
        std::future::pending::<()>().await;
        Ok(())
    }
}
