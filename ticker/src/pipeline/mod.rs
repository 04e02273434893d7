//! TickerPipeline
//!
//! Runs the derived-view pipeline as an explicitly owned async service:
//!   • a feed task pulls raw snapshots from the injected [`SnapshotFeed`]
//!   • a forwarder turns them into [`PipelineEvent::Snapshot`]s
//!   • query edits arrive through [`QuerySender`] on the same event queue
//!   • one actor task applies events to a [`TickerCore`] strictly in queue
//!     order and publishes every [`TickerUpdate`]
//!
//! Only the actor touches pipeline state, so no locking is needed around the
//! combine-latest step. When the actor ends (consumer gone or inputs closed)
//! it aborts the feed side and clears the view. `stop()` tears the tasks down
//! and drops that state; `start()` after a stop begins from defaults.

mod engine;

pub use engine::TickerCore;

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{Instrument, debug, error, info, warn};

use crate::error::PipelineError;
use crate::feed::SnapshotFeed;
use crate::types::{PipelineConfig, PipelineEvent, TickerUpdate};
use crate::view_store::TickerViewStore;
use common::logger::{TraceId, child_span, run_span};
use corelib::Snapshot;

/// Write side of the query input. Cheap to clone; every clone feeds the same
/// run. Sending after the run stopped fails with [`PipelineError::Closed`].
#[derive(Clone, Debug)]
pub struct QuerySender {
    tx: Sender<PipelineEvent>,
}

impl QuerySender {
    /// Enqueue raw query text. No debouncing: every call yields one update.
    pub async fn send(&self, text: impl Into<String>) -> Result<(), PipelineError> {
        self.tx
            .send(PipelineEvent::Query(text.into()))
            .await
            .map_err(|_| PipelineError::Closed)
    }
}

/// What a caller gets back from [`TickerPipeline::start`].
pub struct PipelineHandle {
    pub trace_id: TraceId,
    pub updates: Receiver<TickerUpdate>,
    pub queries: QuerySender,
}

struct RunningPipeline {
    trace_id: TraceId,
    actor: JoinHandle<()>,
    feed: JoinHandle<()>,
    forwarder: JoinHandle<()>,
}

impl RunningPipeline {
    fn is_live(&self) -> bool {
        !self.actor.is_finished()
    }
}

pub struct TickerPipeline<F> {
    feed: Arc<F>,
    config: PipelineConfig,
    view: TickerViewStore,
    /// Held across the whole of `start()` and `stop()`.
    running: Mutex<Option<RunningPipeline>>,
}

impl<F: SnapshotFeed> TickerPipeline<F> {
    pub fn new(feed: Arc<F>, config: PipelineConfig) -> Self {
        Self {
            feed,
            config,
            view: TickerViewStore::new(),
            running: Mutex::new(None),
        }
    }

    /// Shared handle to the latest published update.
    pub fn view(&self) -> TickerViewStore {
        self.view.clone()
    }

    pub async fn is_running(&self) -> bool {
        let running = self.running.lock().await;
        running.as_ref().is_some_and(RunningPipeline::is_live)
    }

    /// Spawn a fresh run.
    ///
    /// The first update on the returned channel is the initial one (defaults,
    /// diffed against an empty list); it is always sent. A previous run whose
    /// actor already ended is torn down first. Queue capacities of zero are
    /// treated as one.
    pub async fn start(&self) -> Result<PipelineHandle, PipelineError> {
        let mut running = self.running.lock().await;
        if let Some(previous) = running.take() {
            if previous.is_live() {
                *running = Some(previous);
                return Err(PipelineError::AlreadyRunning);
            }
            self.shutdown(previous).await;
        }

        let trace_id = TraceId::new();
        let span = run_span("ticker_pipeline", &trace_id);

        let (event_tx, event_rx) = mpsc::channel(self.config.event_queue_capacity.max(1));
        let (snapshot_tx, snapshot_rx) = mpsc::channel(self.config.feed_queue_capacity.max(1));
        let (update_tx, update_rx) = mpsc::channel(self.config.update_queue_capacity.max(1));

        let feed = Arc::clone(&self.feed);
        let feed_span = span.in_scope(|| child_span("snapshot_feed"));
        let feed_task = tokio::spawn(
            async move {
                info!("snapshot feed started");
                if let Err(e) = feed.stream_snapshots(snapshot_tx).await {
                    error!(error = ?e, "snapshot feed crashed");
                }
                info!("snapshot feed ended");
            }
            .instrument(feed_span),
        );

        let forwarder_span = span.in_scope(|| child_span("snapshot_forwarder"));
        let forwarder_task = forward_snapshots(snapshot_rx, event_tx.clone());
        let forwarder = tokio::spawn(forwarder_task.instrument(forwarder_span));

        let upstream = [feed_task.abort_handle(), forwarder.abort_handle()];
        let actor_task = run_actor(event_rx, update_tx, self.view.clone(), upstream);
        let actor = tokio::spawn(actor_task.instrument(span));

        *running = Some(RunningPipeline {
            trace_id,
            actor,
            feed: feed_task,
            forwarder,
        });

        info!(%trace_id, "ticker pipeline started");

        Ok(PipelineHandle {
            trace_id,
            updates: update_rx,
            queries: QuerySender { tx: event_tx },
        })
    }

    /// Detach from the feed and query sources and drop all retained state.
    ///
    /// Returns `false` if no run existed. When this returns, no task of the
    /// old run is alive any more.
    pub async fn stop(&self) -> bool {
        let mut running = self.running.lock().await;
        let Some(run) = running.take() else {
            return false;
        };

        self.shutdown(run).await;
        true
    }

    async fn shutdown(&self, run: RunningPipeline) {
        let RunningPipeline {
            trace_id,
            actor,
            feed,
            forwarder,
        } = run;

        for task in [feed, forwarder, actor] {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(%trace_id, error = ?e, "pipeline task panicked");
                }
            }
        }

        self.view.clear();
        info!(%trace_id, "ticker pipeline stopped");
    }
}

async fn forward_snapshots(mut snapshots: Receiver<Snapshot>, events: Sender<PipelineEvent>) {
    while let Some(snapshot) = snapshots.recv().await {
        debug!(listings = snapshot.len(), "raw snapshot received");
        let event = PipelineEvent::Snapshot(snapshot);
        if events.send(event).await.is_err() {
            break;
        }
    }
}

async fn run_actor(
    events: Receiver<PipelineEvent>,
    updates: Sender<TickerUpdate>,
    view: TickerViewStore,
    upstream: [AbortHandle; 2],
) {
    drive(events, &updates, &view).await;

    for task in &upstream {
        task.abort();
    }
    view.clear();
}

async fn drive(
    mut events: Receiver<PipelineEvent>,
    updates: &Sender<TickerUpdate>,
    view: &TickerViewStore,
) {
    let mut core = TickerCore::new();

    let initial = core.initial();
    if !publish(updates, view, initial).await {
        warn!("update consumer gone before initial update");
        return;
    }

    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = updates.closed() => {
                info!("update consumer gone; pipeline actor exiting");
                return;
            }
        };

        let Some(event) = event else {
            info!("all pipeline inputs closed; pipeline actor exiting");
            return;
        };

        let update = core.handle(event);
        if !publish(updates, view, update).await {
            info!("update consumer gone; pipeline actor exiting");
            return;
        }
    }
}

/// Returns `false` once nobody is listening.
async fn publish(
    updates: &Sender<TickerUpdate>,
    view: &TickerViewStore,
    update: TickerUpdate,
) -> bool {
    view.set(update.clone());
    updates.send(update).await.is_ok()
}
