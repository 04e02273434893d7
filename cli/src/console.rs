//! Line-oriented front-end: renders every update and turns stdin lines into
//! pipeline input.

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{info, warn};

use ticker::StockListing;
use ticker::detail::{DetailApi, DetailStatus, DetailTracker};
use ticker::error::PipelineError;
use ticker::feed::SnapshotFeed;
use ticker::pipeline::{PipelineHandle, TickerPipeline};
use ticker::types::TickerUpdate;

use crate::cli::{ConsoleCommand, HELP};

/// One live run as seen from the console: the handle plus the rows on screen,
/// kept in sync by replaying each diff.
struct Session {
    handle: PipelineHandle,
    displayed: Vec<StockListing>,
}

impl Session {
    async fn start<F: SnapshotFeed>(
        pipeline: &TickerPipeline<F>,
        query: &str,
    ) -> Result<Self, PipelineError> {
        let handle = pipeline.start().await?;
        if !query.is_empty() {
            handle.queries.send(query).await?;
        }
        Ok(Self {
            handle,
            displayed: Vec::new(),
        })
    }

    fn show(&mut self, update: &TickerUpdate) {
        if let Err(e) = update.diff.apply(&mut self.displayed, &update.snapshot) {
            warn!(error = %e, seq = update.seq, "diff did not apply; resyncing rows");
            self.displayed = update.snapshot.clone();
        }
        print!("{}", render_update(update, &self.displayed));
    }
}

async fn next_update(session: &mut Option<Session>) -> Option<TickerUpdate> {
    match session {
        Some(s) => s.handle.updates.recv().await,
        None => std::future::pending().await,
    }
}

/// Fetch one detail and render it. Runs outside the console loop so updates
/// keep rendering while the request is in flight.
async fn lookup_detail<D: DetailApi>(tracker: Arc<DetailTracker<D>>, id: String) -> String {
    let status = tracker.load(&id).await;
    render_detail(&id, &status)
}

pub async fn run_console<F, D>(
    pipeline: &TickerPipeline<F>,
    tracker: Arc<DetailTracker<D>>,
    initial_query: Option<String>,
) -> anyhow::Result<()>
where
    F: SnapshotFeed,
    D: DetailApi,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut query = initial_query.unwrap_or_default();
    let mut session = Some(Session::start(pipeline, &query).await?);
    let mut details = JoinSet::new();

    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };

                match ConsoleCommand::parse(&line) {
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Help => println!("{HELP}"),
                    ConsoleCommand::Usage(usage) => println!("{usage}"),
                    ConsoleCommand::Pause => {
                        pipeline.stop().await;
                        session = None;
                        println!("-- paused --");
                    }
                    ConsoleCommand::Resume => {
                        if session.is_none() {
                            session = Some(Session::start(pipeline, &query).await?);
                        }
                    }
                    ConsoleCommand::Detail(id) => {
                        print!("{}", render_detail(&id, &DetailStatus::Loading));
                        details.spawn(lookup_detail(Arc::clone(&tracker), id));
                    }
                    ConsoleCommand::Query(text) => {
                        query = text;
                        match &session {
                            Some(s) => {
                                if let Err(e) = s.handle.queries.send(query.as_str()).await {
                                    warn!(error = %e, "query dropped");
                                }
                            }
                            None => println!("-- paused; query applies on :resume --"),
                        }
                    }
                }
            }
            update = next_update(&mut session) => {
                match update {
                    Some(update) => {
                        if let Some(s) = session.as_mut() {
                            s.show(&update);
                        }
                    }
                    None => {
                        warn!("pipeline stopped publishing; use :resume to restart");
                        pipeline.stop().await;
                        session = None;
                    }
                }
            }
            Some(done) = details.join_next() => {
                match done {
                    Ok(text) => print!("{text}"),
                    Err(e) => warn!(error = %e, "detail lookup aborted"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    details.abort_all();
    pipeline.stop().await;
    Ok(())
}

pub fn render_update(update: &TickerUpdate, rows: &[StockListing]) -> String {
    let d = &update.diff;
    let mut out = format!(
        "#{} {} rows (+{} -{} >{} ~{})\n",
        update.seq,
        rows.len(),
        d.inserted(),
        d.removed(),
        d.moved(),
        d.changed()
    );
    for row in rows {
        let _ = writeln!(out, "{}", format_row(row));
    }
    out
}

pub fn format_row(row: &StockListing) -> String {
    let delta = row
        .price_delta
        .map(|d| format!("{d:+.2}"))
        .unwrap_or_default();
    format!(
        "{:<8} {:<24} {:>10.2} {:>9}  {}",
        row.id,
        row.display_name,
        row.price,
        delta,
        row.tags.join("|")
    )
}

pub fn render_detail(id: &str, status: &DetailStatus) -> String {
    match status {
        DetailStatus::Loading => format!("{id}: loading\n"),
        DetailStatus::Failed(message) => format!("{id}: {message}\n"),
        DetailStatus::Loaded(d) => format!(
            "{} ({})\n  price {:.2}  high {:.2}  low {:.2}\n  {}\n  {}\n  {}\n",
            d.name,
            d.id,
            d.price,
            d.daily_high,
            d.daily_low,
            d.company_type.join(" | "),
            d.address,
            d.website
        ),
    }
}
