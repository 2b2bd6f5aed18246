//! Photo search adapter
//!
//! Fetches destination images by free-text query, preserving upstream
//! relevance order.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::ProvidersConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::ImageRef;
use crate::{API_CLIENT, cache};

/// Upstream photo-search capability
#[async_trait]
pub trait PhotoProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> ProviderResult<Vec<ImageRef>>;
}

/// Unsplash search client
pub struct UnsplashClient {
    access_key: Option<String>,
}

impl UnsplashClient {
    const SEARCH_URL: &'static str = "https://api.unsplash.com/search/photos";

    #[must_use]
    pub fn new(config: &ProvidersConfig) -> Self {
        Self {
            access_key: config.unsplash_access_key.clone(),
        }
    }
}

#[async_trait]
impl PhotoProvider for UnsplashClient {
    async fn search(&self, query: &str, limit: usize) -> ProviderResult<Vec<ImageRef>> {
        let Some(access_key) = &self.access_key else {
            return Err(ProviderError::unavailable(
                "Unsplash access key not configured",
            ));
        };

        let url = format!(
            "{}?query={}&per_page={}&orientation=landscape&client_id={}",
            Self::SEARCH_URL,
            urlencoding::encode(query),
            limit,
            access_key
        );

        let response = API_CLIENT.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(
                response.status().as_u16(),
                "unsplash",
            ));
        }

        let body: unsplash::SearchResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .take(limit)
            .filter_map(unsplash::Photo::into_image)
            .collect())
    }
}

/// Search for place images, cache-first with a 12h TTL
#[tracing::instrument(skip(provider))]
pub async fn place_images(
    provider: &dyn PhotoProvider,
    place: &str,
    limit: usize,
) -> ProviderResult<Vec<ImageRef>> {
    let key = cache::key(&["photos", place, &limit.to_string()]);

    if let Ok(Some(cached)) = cache::get::<Vec<ImageRef>>(&key).await {
        debug!("Photo cache hit for {place}");
        return Ok(cached);
    }

    let images = provider.search(place, limit).await.inspect_err(|err| {
        if err.is_auth() {
            error!("Photo search credential rejected: {err}");
        } else {
            warn!("Photo search failed for {place}: {err}");
        }
    })?;

    if let Err(e) = cache::put(&key, images.clone(), cache::jittered(cache::PHOTOS_TTL)).await {
        warn!("Failed to cache photos for {place}: {e}");
    }
    Ok(images)
}

/// Unsplash search response structures
mod unsplash {
    use super::ImageRef;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct SearchResponse {
        #[serde(default)]
        pub results: Vec<Photo>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Photo {
        pub urls: Option<Urls>,
        pub alt_description: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Urls {
        pub regular: Option<String>,
    }

    impl Photo {
        pub fn into_image(self) -> Option<ImageRef> {
            let url = self.urls?.regular?;
            Some(ImageRef {
                url,
                alt: self.alt_description,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_parsing_preserves_order() {
        let json = r#"{
            "results": [
                {"urls": {"regular": "https://images.example/first"}, "alt_description": "eiffel tower"},
                {"urls": {"regular": "https://images.example/second"}, "alt_description": null},
                {"urls": null, "alt_description": "broken entry"}
            ]
        }"#;
        let response: super::unsplash::SearchResponse = serde_json::from_str(json).unwrap();
        let images: Vec<ImageRef> = response
            .results
            .into_iter()
            .filter_map(super::unsplash::Photo::into_image)
            .collect();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].url, "https://images.example/first");
        assert_eq!(images[0].alt.as_deref(), Some("eiffel tower"));
        assert_eq!(images[1].url, "https://images.example/second");
    }
}
