//! Place summary adapter
//!
//! Fetches an encyclopedic summary for the destination. No credential is
//! required; a missing article is an `Unavailable` outcome, not a failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::{API_CLIENT, cache};

/// Summary of a place, used for the description and fact derivation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceSummary {
    pub title: String,
    /// Lead extract, plain text
    pub extract: String,
    /// Short classification, e.g. "capital of France"
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub page_url: Option<String>,
}

/// Upstream place-summary capability
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn summary(&self, place: &str) -> ProviderResult<PlaceSummary>;
}

/// Wikipedia REST summary client
#[derive(Default)]
pub struct WikipediaClient;

impl WikipediaClient {
    const SUMMARY_URL: &'static str = "https://en.wikipedia.org/api/rest_v1/page/summary";

    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SummaryProvider for WikipediaClient {
    async fn summary(&self, place: &str) -> ProviderResult<PlaceSummary> {
        let title = place.trim().replace(' ', "_");
        let url = format!(
            "{}/{}",
            Self::SUMMARY_URL,
            urlencoding::encode(&title)
        );

        let response = API_CLIENT.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(
                response.status().as_u16(),
                "wikipedia",
            ));
        }

        let body: wikipedia::SummaryResponse = response.json().await?;
        Ok(body.into_summary())
    }
}

/// Fetch a place summary, cache-first with a 24h TTL
#[tracing::instrument(skip(provider))]
pub async fn place_summary(
    provider: &dyn SummaryProvider,
    place: &str,
) -> ProviderResult<PlaceSummary> {
    let key = cache::key(&["summary", place]);

    if let Ok(Some(cached)) = cache::get::<PlaceSummary>(&key).await {
        debug!("Summary cache hit for {place}");
        return Ok(cached);
    }

    let summary = provider.summary(place).await.inspect_err(|err| {
        warn!("Summary fetch failed for {place}: {err}");
    })?;

    if let Err(e) = cache::put(&key, summary.clone(), cache::jittered(cache::SUMMARY_TTL)).await {
        warn!("Failed to cache summary for {place}: {e}");
    }
    Ok(summary)
}

/// Wikipedia REST summary response structures
mod wikipedia {
    use super::PlaceSummary;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct SummaryResponse {
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub extract: String,
        pub description: Option<String>,
        pub thumbnail: Option<Thumbnail>,
        pub content_urls: Option<ContentUrls>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Thumbnail {
        pub source: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ContentUrls {
        pub desktop: Option<PageUrls>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PageUrls {
        pub page: Option<String>,
    }

    impl SummaryResponse {
        pub fn into_summary(self) -> PlaceSummary {
            PlaceSummary {
                title: self.title,
                extract: self.extract,
                description: self.description,
                thumbnail_url: self.thumbnail.and_then(|t| t.source),
                page_url: self.content_urls.and_then(|c| c.desktop).and_then(|d| d.page),
            }
        }
    }
}
