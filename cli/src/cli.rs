use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "ticker", version)]
pub struct Cli {
    /// Stock websocket endpoint (overrides TICKER_WS_URL)
    #[clap(long)]
    pub ws_url: Option<String>,

    /// Base URL for detail lookups (overrides TICKER_DETAIL_URL)
    #[clap(long)]
    pub detail_url: Option<String>,

    /// Query to start with, e.g. "f tag:tech"
    #[clap(long)]
    pub query: Option<String>,

    /// Fetch the detail record of one listing and exit
    #[clap(long, value_name = "ID")]
    pub detail: Option<String>,

    /// Emit logs as JSON regardless of APP_ENV
    #[clap(long)]
    pub json_logs: bool,
}

pub(crate) const DETAIL_USAGE: &str = "usage: :detail <ID>";

pub(crate) const HELP: &str =
    "commands: :pause  :resume  :detail <ID>  :quit  (anything else replaces the query)";

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConsoleCommand {
    Pause,
    Resume,
    Detail(String),
    Quit,
    Help,
    Usage(&'static str),
    /// The whole line, untrimmed, as the new query text.
    Query(String),
}

impl ConsoleCommand {
    pub(crate) fn parse(line: &str) -> Self {
        match line.trim() {
            ":pause" => return Self::Pause,
            ":resume" => return Self::Resume,
            ":quit" => return Self::Quit,
            ":help" => return Self::Help,
            _ => {}
        }

        if let Some(rest) = line.trim().strip_prefix(":detail") {
            if rest.is_empty() {
                return Self::Usage(DETAIL_USAGE);
            }
            if rest.starts_with(char::is_whitespace) {
                let id = rest.trim();
                return if id.is_empty() {
                    Self::Usage(DETAIL_USAGE)
                } else {
                    Self::Detail(id.to_string())
                };
            }
        }

        Self::Query(line.to_string())
    }
}
