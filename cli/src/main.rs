pub mod cli;
pub mod config;
pub mod console;

use std::sync::Arc;

use clap::Parser;

use adapters::stocks::{StockHttpClient, StockWsClient};
use common::logger::init_logger;
use ticker::detail::DetailTracker;
use ticker::pipeline::TickerPipeline;

use cli::Cli;
use config::AppConfig;
use console::{render_detail, run_console};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = AppConfig::from_env()?;
    cfg.apply_cli(&cli);

    init_logger("ticker", cfg.log_format);
    tracing::info!(ws_url = %cfg.ws_url, detail_url = %cfg.detail_url, "starting ticker");

    let api = Arc::new(StockHttpClient::new(&cfg.detail_url)?);
    let tracker = Arc::new(DetailTracker::new(api));

    if let Some(id) = cli.detail.as_deref() {
        let status = tracker.load(id).await;
        print!("{}", render_detail(id, &status));
        return Ok(());
    }

    let feed = StockWsClient::new(cfg.ws_url.clone(), cfg.reconnect_delay());
    let feed = Arc::new(feed);
    let pipeline = TickerPipeline::new(feed, cfg.pipeline_config());

    run_console(&pipeline, tracker, cli.query.clone()).await?;

    tracing::info!("ticker stopped");
    Ok(())
}
