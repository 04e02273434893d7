//! Stock feed message parser.
//!
//! Every text frame on the stock websocket carries one complete snapshot as a
//! JSON array:
//!
//! ```jsonc
//! [
//!   { "id": "FOO", "name": "Foo", "price": 900.0, "companyType": ["Tech"] },
//!   ...
//! ]
//! ```
//!
//! A `priceDiff` sent by the server is accepted but carries no meaning here;
//! the annotator overwrites it.

use corelib::Snapshot;

use crate::stocks::errors::FeedError;

pub fn parse_snapshot(raw: &str) -> Result<Snapshot, FeedError> {
    Ok(serde_json::from_str(raw)?)
}
