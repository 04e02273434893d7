use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, ensure};

use adapters::stocks::{DEFAULT_DETAIL_URL, DEFAULT_WS_URL};
use common::logger::LogFormat;
use ticker::types::PipelineConfig;

use crate::cli::Cli;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Websocket endpoint streaming full snapshots.
    pub ws_url: String,

    /// Base URL for detail lookups; the id is appended as a path segment.
    pub detail_url: String,

    /// Pause between feed reconnect attempts.
    pub reconnect_delay_ms: u64,

    // =========================
    // Pipeline queues
    // =========================
    /// Capacity of the shared feed + query input queue.
    pub event_queue_capacity: usize,

    /// Capacity of the update channel towards the console.
    pub update_queue_capacity: usize,

    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let base = PipelineConfig::default();

        let event_queue_capacity =
            parse_var(&lookup, "TICKER_EVENT_QUEUE", base.event_queue_capacity)?;
        let update_queue_capacity =
            parse_var(&lookup, "TICKER_UPDATE_QUEUE", base.update_queue_capacity)?;
        ensure!(
            event_queue_capacity > 0,
            "TICKER_EVENT_QUEUE must be at least 1"
        );
        ensure!(
            update_queue_capacity > 0,
            "TICKER_UPDATE_QUEUE must be at least 1"
        );

        let is_production = lookup("APP_ENV").unwrap_or_default() == "production";
        let log_format = if is_production {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        Ok(Self {
            ws_url: lookup("TICKER_WS_URL")
                .unwrap_or_else(|| DEFAULT_WS_URL.to_string()),
            detail_url: lookup("TICKER_DETAIL_URL")
                .unwrap_or_else(|| DEFAULT_DETAIL_URL.to_string()),
            reconnect_delay_ms: parse_var(&lookup, "TICKER_RECONNECT_MS", 3_000)?,
            event_queue_capacity,
            update_queue_capacity,
            log_format,
        })
    }

    /// Command line flags win over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.ws_url {
            self.ws_url = url.clone();
        }
        if let Some(url) = &cli.detail_url {
            self.detail_url = url.clone();
        }
        if cli.json_logs {
            self.log_format = LogFormat::Json;
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            event_queue_capacity: self.event_queue_capacity,
            update_queue_capacity: self.update_queue_capacity,
            ..PipelineConfig::default()
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
