//! Place-name resolution
//!
//! Resolves free-text place names to coordinates once per request, backed by
//! the result cache so dependent adapters never trigger a second lookup.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::ProvidersConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{GeoCoordinate, ResolvedPlace};
use crate::{API_CLIENT, cache};

/// Upstream geocoding capability: free-text query to candidates, best first
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    async fn geocode(&self, query: &str) -> ProviderResult<Vec<ResolvedPlace>>;
}

/// Geoapify forward geocoding client
pub struct GeoapifyGeocoder {
    api_key: Option<String>,
}

impl GeoapifyGeocoder {
    const GEOCODE_URL: &'static str = "https://api.geoapify.com/v1/geocode/search";

    #[must_use]
    pub fn new(config: &ProvidersConfig) -> Self {
        Self {
            api_key: config.geoapify_api_key.clone(),
        }
    }
}

#[async_trait]
impl GeocodeProvider for GeoapifyGeocoder {
    async fn geocode(&self, query: &str) -> ProviderResult<Vec<ResolvedPlace>> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::unavailable("Geoapify API key not configured"));
        };

        let url = format!(
            "{}?text={}&limit=5&apiKey={}",
            Self::GEOCODE_URL,
            urlencoding::encode(query),
            api_key
        );

        let response = API_CLIENT.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(
                response.status().as_u16(),
                "geoapify geocoding",
            ));
        }

        let body: geoapify::GeocodeResponse = response.json().await?;
        Ok(body
            .features
            .into_iter()
            .filter_map(geoapify::Feature::into_resolved_place)
            .collect())
    }
}

/// Resolve a place name to coordinates, cache-first with a 24h TTL.
///
/// Zero candidates and upstream faults both come back as `Unavailable`:
/// "place not found" is a legitimate outcome the orchestrator degrades from,
/// never an exception it propagates.
#[tracing::instrument(skip(provider))]
pub async fn resolve(provider: &dyn GeocodeProvider, place: &str) -> ProviderResult<ResolvedPlace> {
    let key = cache::key(&["geocode", place]);

    if let Ok(Some(cached)) = cache::get::<ResolvedPlace>(&key).await {
        debug!("Geocode cache hit for {place}");
        return Ok(cached);
    }

    match provider.geocode(place).await {
        Ok(candidates) => match candidates.into_iter().next() {
            Some(resolved) => {
                debug!(
                    "Resolved {place} to ({}, {})",
                    resolved.coordinate.latitude, resolved.coordinate.longitude
                );
                if let Err(e) = cache::put(&key, resolved.clone(), cache::jittered(cache::GEOCODE_TTL)).await
                {
                    warn!("Failed to cache geocode result for {place}: {e}");
                }
                Ok(resolved)
            }
            None => Err(ProviderError::unavailable(format!(
                "No geocoding results for {place}"
            ))),
        },
        Err(err @ ProviderError::Unavailable(_)) => Err(err),
        Err(err) => {
            if err.is_auth() {
                error!("Geocoding credential rejected: {err}");
            } else {
                warn!("Geocoding failed for {place}: {err}");
            }
            Err(ProviderError::unavailable(format!(
                "Geocoding failed for {place}"
            )))
        }
    }
}

/// Geoapify geocoding response structures
mod geoapify {
    use super::{GeoCoordinate, ResolvedPlace};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResponse {
        #[serde(default)]
        pub features: Vec<Feature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Feature {
        pub geometry: Option<Geometry>,
        #[serde(default)]
        pub properties: Properties,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        /// Geoapify returns `[lon, lat]`
        #[serde(default)]
        pub coordinates: Vec<f64>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Properties {
        pub name: Option<String>,
        pub city: Option<String>,
        pub formatted: Option<String>,
    }

    impl Feature {
        pub fn into_resolved_place(self) -> Option<ResolvedPlace> {
            let coordinates = self.geometry?.coordinates;
            if coordinates.len() < 2 {
                return None;
            }
            let coordinate = GeoCoordinate::checked(coordinates[1], coordinates[0])?;
            let name = self
                .properties
                .name
                .or(self.properties.city)
                .or_else(|| self.properties.formatted.clone())
                .unwrap_or_else(|| coordinate.format());
            Some(ResolvedPlace {
                name,
                formatted_address: self.properties.formatted,
                coordinate,
            })
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticGeocoder {
        calls: AtomicUsize,
        candidates: Vec<ResolvedPlace>,
    }

    #[async_trait]
    impl GeocodeProvider for StaticGeocoder {
        async fn geocode(&self, _query: &str) -> ProviderResult<Vec<ResolvedPlace>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.candidates.clone())
        }
    }

    fn paris() -> ResolvedPlace {
        ResolvedPlace::new("Paris", GeoCoordinate::checked(48.8566, 2.3522).unwrap())
    }

    #[tokio::test]
    async fn test_resolve_uses_first_candidate() {
        crate::cache::init_for_tests();
        let provider = StaticGeocoder {
            calls: AtomicUsize::new(0),
            candidates: vec![
                paris(),
                ResolvedPlace::new("Paris, Texas", GeoCoordinate::checked(33.66, -95.55).unwrap()),
            ],
        };

        let resolved = resolve(&provider, "resolve-first-candidate-paris").await.unwrap();
        assert_eq!(resolved.name, "Paris");
    }

    #[tokio::test]
    async fn test_resolve_caches_success() {
        crate::cache::init_for_tests();
        let provider = StaticGeocoder {
            calls: AtomicUsize::new(0),
            candidates: vec![paris()],
        };

        let first = resolve(&provider, "resolve-cache-hit-paris").await.unwrap();
        let second = resolve(&provider, "Resolve-Cache-Hit-Paris").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_results_is_unavailable() {
        crate::cache::init_for_tests();
        let provider = StaticGeocoder {
            calls: AtomicUsize::new(0),
            candidates: vec![],
        };

        let result = resolve(&provider, "resolve-nowhere-at-all").await;
        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
    }

    #[test]
    fn test_feature_parsing_lon_lat_order() {
        let json = r#"{
            "features": [{
                "geometry": {"coordinates": [2.3522, 48.8566]},
                "properties": {"name": "Paris", "formatted": "Paris, France"}
            }]
        }"#;
        let response: super::geoapify::GeocodeResponse = serde_json::from_str(json).unwrap();
        let place = response
            .features
            .into_iter()
            .next()
            .unwrap()
            .into_resolved_place()
            .unwrap();
        assert_eq!(place.coordinate.latitude, 48.8566);
        assert_eq!(place.coordinate.longitude, 2.3522);
        assert_eq!(place.formatted_address.as_deref(), Some("Paris, France"));
    }
}
