use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use corelib::Snapshot;
use ticker::feed::SnapshotFeed;

use crate::stocks::parser::parse_snapshot;

pub const DEFAULT_WS_URL: &str = "wss://interviews.yum.dev/ws/stocks";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Client for the stock websocket.
///
/// The server pushes a full snapshot per text frame, no subscription request
/// is needed. The client:
/// - reconnects after `reconnect_delay` whenever the connection fails or ends
/// - logs and skips frames that do not parse
/// - stops once the receiving side of the channel is gone
pub struct StockWsClient {
    pub ws_url: String,
    pub reconnect_delay: Duration,
}

impl StockWsClient {
    pub fn new(ws_url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            ws_url: ws_url.into(),
            reconnect_delay,
        }
    }

    /// Main websocket loop. Only returns once `sender` is closed.
    pub async fn run_ws_loop(&self, sender: Sender<Snapshot>) -> anyhow::Result<()> {
        loop {
            if sender.is_closed() {
                return Ok(());
            }

            info!(url = %self.ws_url, "connecting to stock feed");

            match connect_async(self.ws_url.as_str()).await {
                Ok((mut ws, _)) => {
                    info!("connected to stock feed");

                    while let Some(msg) = ws.next().await {
                        let msg = match msg {
                            Ok(m) => m,
                            Err(e) => {
                                warn!(error = %e, "stock feed read failed");
                                break;
                            }
                        };

                        match msg {
                            Message::Text(text) => match parse_snapshot(text.as_str()) {
                                Ok(snapshot) => {
                                    debug!(listings = snapshot.len(), "snapshot frame");
                                    if sender.send(snapshot).await.is_err() {
                                        info!("snapshot receiver dropped; leaving stock feed");
                                        return Ok(());
                                    }
                                }
                                Err(e) => warn!(error = %e, "skipping malformed snapshot frame"),
                            },
                            Message::Close(frame) => {
                                info!(?frame, "stock feed closed by server");
                                break;
                            }
                            _ => {}
                        }
                    }
                }
                Err(e) => error!(error = %e, "stock feed connection failed"),
            }

            let delay_ms = self.reconnect_delay.as_millis() as u64;
            info!(delay_ms, "reconnecting to stock feed");
            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                _ = sender.closed() => return Ok(()),
            }
        }
    }
}

#[async_trait]
impl SnapshotFeed for StockWsClient {
    async fn stream_snapshots(&self, sender: Sender<Snapshot>) -> anyhow::Result<()> {
        self.run_ws_loop(sender).await
    }
}
