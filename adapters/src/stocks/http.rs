use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument};

use corelib::{DetailOutcome, StockDetail};
use ticker::detail::DetailApi;

use crate::stocks::errors::FeedError;

pub const DEFAULT_DETAIL_URL: &str = "https://interviews.yum.dev/api/stocks";

pub const INVALID_BODY_MESSAGE: &str = "Invalid response from server despite successful code";

#[derive(Clone)]
pub struct StockHttpClient {
    http: Client,
    base: Url,
}

impl StockHttpClient {
    pub fn new(base_url: &str) -> Result<Self, FeedError> {
        let base = Url::parse(base_url)
            .map_err(|e| FeedError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FeedError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base })
    }

    /// `{base}/{id}` with `id` percent-encoded as a single path segment.
    pub fn detail_url(&self, id: &str) -> Result<Url, FeedError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FeedError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    async fn request(&self, id: &str) -> Result<DetailOutcome, FeedError> {
        let url = self.detail_url(id)?;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        debug!(%status, bytes = body.len(), "detail response");

        Ok(outcome_from_response(status, &body))
    }
}

#[async_trait]
impl DetailApi for StockHttpClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_detail(&self, id: &str) -> DetailOutcome {
        match self.request(id).await {
            Ok(outcome) => outcome,
            Err(e) => DetailOutcome::failed(e.to_string()),
        }
    }
}

/// Map a finished HTTP exchange to an outcome.
///
/// Non-success statuses report the reason phrase (or the bare code when the
/// status has none). A success whose body is not a detail record reports
/// [`INVALID_BODY_MESSAGE`].
pub fn outcome_from_response(status: StatusCode, body: &str) -> DetailOutcome {
    if !status.is_success() {
        let message = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());
        return DetailOutcome::failed(message);
    }

    match serde_json::from_str::<StockDetail>(body) {
        Ok(detail) => DetailOutcome::Found(detail),
        Err(_) => DetailOutcome::failed(INVALID_BODY_MESSAGE),
    }
}
