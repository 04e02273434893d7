//! Derived-view pipeline for a live stock ticker.
//!
//! Raw snapshots flow through the [`annotator`] (price deltas), are fused with
//! the compiled [`query`] in the [`selector`], and every filtered result is
//! diffed against the previous one by [`diff`]. [`pipeline`] wires the stages
//! together behind a single actor task.

pub mod annotator;
pub mod detail;
pub mod diff;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod query;
pub mod rolling_window;
pub mod selector;
pub mod time;
pub mod types;
pub mod view_store;

pub use corelib::{DetailOutcome, Snapshot, StockDetail, StockListing};
