//! Network adapters for the stock ticker service.
//!
//! [`StockWsClient`] streams snapshots over a websocket and plugs into the
//! pipeline as its [`ticker::feed::SnapshotFeed`]. [`StockHttpClient`] answers
//! one-off detail lookups as a [`ticker::detail::DetailApi`].

pub mod errors;
pub mod http;
pub mod parser;
pub mod ws;

pub use errors::FeedError;
pub use http::{DEFAULT_DETAIL_URL, StockHttpClient};
pub use parser::parse_snapshot;
pub use ws::{DEFAULT_WS_URL, StockWsClient};
