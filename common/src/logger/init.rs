use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Output flavour for the global subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-line output for local runs.
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; only the first call has any effect. The filter
/// comes from `RUST_LOG` and falls back to `info`.
pub fn init_logger(service_name: &'static str, format: LogFormat) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let base = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE);

        // try_init: a test harness may already own the global subscriber
        let installed = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(base.json())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(base.pretty())
                .try_init(),
        };

        if installed.is_ok() {
            tracing::info!(service = service_name, ?format, "logger initialized");
        }
    });
}
