use serde::{Deserialize, Serialize};

/// Full record for a single listing, fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDetail {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub daily_high: f64,
    pub daily_low: f64,
    #[serde(default)]
    pub company_type: Vec<String>,
    pub address: String,
    pub image_url: String,
    pub website: String,
}

/// Result of one detail lookup. Failures are values, not errors: the caller
/// always gets something it can render.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Found(StockDetail),
    Failed { message: String },
}

impl DetailOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
