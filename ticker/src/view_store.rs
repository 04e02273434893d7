use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::TickerUpdate;

/// Latest pipeline output, readable without going through the update channel.
#[derive(Clone, Default)]
pub struct TickerViewStore {
    inner: Arc<RwLock<Option<TickerUpdate>>>,
}

impl TickerViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins.
    pub fn set(&self, update: TickerUpdate) {
        *self.inner.write() = Some(update);
    }

    pub fn latest(&self) -> Option<TickerUpdate> {
        self.inner.read().clone()
    }

    pub fn clear(&self) {
        self.inner.write().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffResult;

    fn update(seq: u64) -> TickerUpdate {
        TickerUpdate {
            seq,
            ts_ms: 0,
            snapshot: Vec::new(),
            diff: DiffResult::default(),
        }
    }

    #[test]
    fn keeps_only_the_latest_update() {
        let store = TickerViewStore::new();
        assert!(store.latest().is_none());

        store.set(update(0));
        store.set(update(1));
        assert_eq!(store.latest().map(|u| u.seq), Some(1));
    }

    #[test]
    fn clones_share_state_and_clear_empties_it() {
        let store = TickerViewStore::new();
        let reader = store.clone();

        store.set(update(3));
        assert_eq!(reader.latest().map(|u| u.seq), Some(3));

        store.clear();
        assert!(reader.latest().is_none());
    }
}
