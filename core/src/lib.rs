pub mod models;

pub use models::{DetailOutcome, Snapshot, StockDetail, StockListing};
