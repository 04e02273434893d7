use serde::{Deserialize, Serialize};

/// One priced entity as delivered by the ticker feed.
///
/// Field names on the wire follow the feed's JSON (`name`, `companyType`,
/// `priceDiff`); the Rust names describe what the values mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockListing {
    /// Stable, case-sensitive identity. Two listings are the same entity iff
    /// their ids are equal.
    pub id: String,

    #[serde(rename = "name")]
    pub display_name: String,

    pub price: f64,

    /// Category labels in feed order. Matching against them ignores case.
    #[serde(rename = "companyType", default)]
    pub tags: Vec<String>,

    /// Price change since the previous snapshot that contained this id.
    #[serde(rename = "priceDiff", default, skip_serializing_if = "Option::is_none")]
    pub price_delta: Option<f64>,
}

impl StockListing {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            price,
            tags: Vec::new(),
            price_delta: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.price_delta = Some(delta);
        self
    }

    /// Case-insensitive tag membership. `tag` must already be upper-cased.
    pub fn has_tag_upper(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.to_uppercase() == tag)
    }
}

/// One point-in-time set of listings.
///
/// Downstream of the annotator a snapshot is always sorted by `id` ascending.
/// A snapshot must never contain the same id twice; that is the feed's
/// contract and nothing here checks it.
pub type Snapshot = Vec<StockListing>;
