mod detail;
mod listing;

pub use detail::{DetailOutcome, StockDetail};
pub use listing::{Snapshot, StockListing};
