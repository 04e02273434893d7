//! On-demand detail lookups.
//!
//! Independent of the streaming pipeline: one id in, one [`DetailOutcome`]
//! out. [`DetailTracker`] turns those outcomes into a [`DetailStatus`] that a
//! front-end can watch.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use corelib::{DetailOutcome, StockDetail};

/// Request/response lookup of a single listing.
///
/// Failures are reported inside the outcome with a human readable message;
/// implementations must not panic or surface transport errors any other way.
#[async_trait]
pub trait DetailApi: Send + Sync + 'static {
    async fn fetch_detail(&self, id: &str) -> DetailOutcome;
}

/// What a detail view should currently show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailStatus {
    #[default]
    Loading,
    Loaded(StockDetail),
    Failed(String),
}

impl From<DetailOutcome> for DetailStatus {
    fn from(outcome: DetailOutcome) -> Self {
        match outcome {
            DetailOutcome::Found(detail) => Self::Loaded(detail),
            DetailOutcome::Failed { message } => Self::Failed(message),
        }
    }
}

pub struct DetailTracker<D> {
    api: Arc<D>,
    status_tx: watch::Sender<DetailStatus>,
}

impl<D: DetailApi> DetailTracker<D> {
    pub fn new(api: Arc<D>) -> Self {
        let (status_tx, _) = watch::channel(DetailStatus::Loading);
        Self { api, status_tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> DetailStatus {
        self.status_tx.borrow().clone()
    }

    /// Publish `Loading`, fetch, then publish and return the result.
    #[instrument(skip(self), level = "debug")]
    pub async fn load(&self, id: &str) -> DetailStatus {
        self.status_tx.send_replace(DetailStatus::Loading);

        let status = DetailStatus::from(self.api.fetch_detail(id).await);
        match &status {
            DetailStatus::Loaded(detail) => info!(id, price = detail.price, "detail loaded"),
            DetailStatus::Failed(message) => warn!(id, %message, "detail fetch failed"),
            DetailStatus::Loading => {}
        }

        self.status_tx.send_replace(status.clone());
        status
    }
}
