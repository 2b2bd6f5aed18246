//! Points-of-interest search adapter
//!
//! Circular geographic search around a resolved coordinate. The category
//! vocabulary is fixed and passed per call site: generic attractions, hotels
//! as accommodation, and restaurants each query different upstream category
//! sets through the same adapter.

use async_trait::async_trait;
use haversine::{Location as HaversinePoint, Units, distance};
use tracing::{debug, error, warn};

use crate::config::ProvidersConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{GeoCoordinate, PointOfInterest};
use crate::{API_CLIENT, cache};

/// Default search radius in meters
pub const DEFAULT_RADIUS_M: u32 = 5_000;

/// Fixed category vocabulary, chosen per call site rather than inside the
/// adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoiCategory {
    Attractions,
    Hotels,
    Restaurants,
}

impl PoiCategory {
    /// Upstream category set for the circular search
    #[must_use]
    pub fn upstream_categories(self) -> &'static str {
        match self {
            PoiCategory::Attractions => "building.tourism,building.historic,activity",
            PoiCategory::Hotels => "accommodation.hotel,accommodation",
            PoiCategory::Restaurants => "catering.restaurant,catering.cafe,catering.fast_food",
        }
    }

    /// Label used on normalized results and in cache keys
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PoiCategory::Attractions => "attraction",
            PoiCategory::Hotels => "hotel",
            PoiCategory::Restaurants => "restaurant",
        }
    }
}

/// Upstream place-search capability
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Search within `radius_m` of `center`, preserving upstream relevance order
    async fn search(
        &self,
        center: GeoCoordinate,
        category: PoiCategory,
        radius_m: u32,
        limit: usize,
    ) -> ProviderResult<Vec<PointOfInterest>>;
}

/// Geoapify Places client
pub struct GeoapifyPlaces {
    api_key: Option<String>,
}

impl GeoapifyPlaces {
    const PLACES_URL: &'static str = "https://api.geoapify.com/v2/places";

    #[must_use]
    pub fn new(config: &ProvidersConfig) -> Self {
        Self {
            api_key: config.geoapify_api_key.clone(),
        }
    }
}

#[async_trait]
impl PlacesProvider for GeoapifyPlaces {
    async fn search(
        &self,
        center: GeoCoordinate,
        category: PoiCategory,
        radius_m: u32,
        limit: usize,
    ) -> ProviderResult<Vec<PointOfInterest>> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::unavailable("Geoapify API key not configured"));
        };

        // Geoapify circle filter takes lon,lat order
        let url = format!(
            "{}?categories={}&filter=circle:{},{},{}&limit={}&apiKey={}",
            Self::PLACES_URL,
            category.upstream_categories(),
            center.longitude,
            center.latitude,
            radius_m,
            limit,
            api_key
        );

        let response = API_CLIENT.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(
                response.status().as_u16(),
                "geoapify places",
            ));
        }

        let body: geoapify::PlacesResponse = response.json().await?;
        Ok(body
            .features
            .into_iter()
            .take(limit)
            .map(|feature| feature.into_poi(category.label(), center))
            .collect())
    }
}

/// Search for points of interest, cache-first with a 6h TTL.
///
/// The cache key covers the full parameter tuple so different categories,
/// radii, or limits never collide.
#[tracing::instrument(skip(provider))]
pub async fn search_nearby(
    provider: &dyn PlacesProvider,
    center: GeoCoordinate,
    category: PoiCategory,
    radius_m: u32,
    limit: usize,
) -> ProviderResult<Vec<PointOfInterest>> {
    let key = cache::key(&[
        "places",
        &center.cache_fragment(),
        category.label(),
        &radius_m.to_string(),
        &limit.to_string(),
    ]);

    if let Ok(Some(cached)) = cache::get::<Vec<PointOfInterest>>(&key).await {
        debug!("Places cache hit for {} {}", category.label(), center.format());
        return Ok(cached);
    }

    let results = provider
        .search(center, category, radius_m, limit)
        .await
        .inspect_err(|err| {
            if err.is_auth() {
                error!("Places credential rejected: {err}");
            } else {
                warn!(
                    "Places search failed for {} near {}: {err}",
                    category.label(),
                    center.format()
                );
            }
        })?;

    if let Err(e) = cache::put(&key, results.clone(), cache::jittered(cache::PLACES_TTL)).await {
        warn!("Failed to cache places for {}: {e}", center.format());
    }
    Ok(results)
}

/// Geoapify Places response structures
mod geoapify {
    use super::{GeoCoordinate, HaversinePoint, PointOfInterest, Units, distance};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct PlacesResponse {
        #[serde(default)]
        pub features: Vec<Feature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Feature {
        #[serde(default)]
        pub properties: Properties,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Properties {
        pub name: Option<String>,
        pub formatted: Option<String>,
        pub lat: Option<f64>,
        pub lon: Option<f64>,
        /// Distance from the filter center in meters, when upstream includes it
        pub distance: Option<f64>,
        pub description: Option<String>,
    }

    impl Feature {
        pub fn into_poi(self, category_label: &str, center: GeoCoordinate) -> PointOfInterest {
            let properties = self.properties;
            let coordinate = match (properties.lat, properties.lon) {
                (Some(lat), Some(lon)) => GeoCoordinate::checked(lat, lon),
                _ => None,
            };

            // Prefer the upstream-reported distance; compute it when omitted
            let distance_meters = properties.distance.or_else(|| {
                coordinate.map(|poi| {
                    let km = distance(
                        HaversinePoint {
                            latitude: center.latitude,
                            longitude: center.longitude,
                        },
                        HaversinePoint {
                            latitude: poi.latitude,
                            longitude: poi.longitude,
                        },
                        Units::Kilometers,
                    );
                    km * 1000.0
                })
            });

            PointOfInterest {
                name: properties
                    .name
                    .unwrap_or_else(|| format!("Unnamed {category_label}")),
                category: category_label.to_string(),
                address: properties.formatted,
                coordinate,
                distance_meters,
                description: properties.description,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_category_vocabulary() {
        assert!(PoiCategory::Restaurants
            .upstream_categories()
            .contains("catering.restaurant"));
        assert!(PoiCategory::Hotels
            .upstream_categories()
            .contains("accommodation"));
        assert_eq!(PoiCategory::Attractions.label(), "attraction");
    }

    #[test]
    fn test_feature_conversion_computes_missing_distance() {
        let json = r#"{
            "features": [{
                "properties": {"name": "Louvre", "lat": 48.8606, "lon": 2.3376}
            }]
        }"#;
        let response: super::geoapify::PlacesResponse = serde_json::from_str(json).unwrap();
        let center = GeoCoordinate::checked(48.8566, 2.3522).unwrap();
        let poi = response
            .features
            .into_iter()
            .next()
            .unwrap()
            .into_poi("attraction", center);

        assert_eq!(poi.name, "Louvre");
        let meters = poi.distance_meters.unwrap();
        assert!(meters > 500.0 && meters < 2500.0, "implausible distance {meters}");
    }

    #[test]
    fn test_feature_conversion_prefers_upstream_distance() {
        let json = r#"{
            "features": [{
                "properties": {"name": "Cafe", "lat": 48.86, "lon": 2.35, "distance": 120.0}
            }]
        }"#;
        let response: super::geoapify::PlacesResponse = serde_json::from_str(json).unwrap();
        let center = GeoCoordinate::checked(48.8566, 2.3522).unwrap();
        let poi = response
            .features
            .into_iter()
            .next()
            .unwrap()
            .into_poi("restaurant", center);
        assert_eq!(poi.distance_meters, Some(120.0));
    }

    struct StaticPlaces {
        calls: AtomicUsize,
        results: Vec<PointOfInterest>,
    }

    #[async_trait]
    impl PlacesProvider for StaticPlaces {
        async fn search(
            &self,
            _center: GeoCoordinate,
            _category: PoiCategory,
            _radius_m: u32,
            _limit: usize,
        ) -> ProviderResult<Vec<PointOfInterest>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    #[tokio::test]
    async fn test_search_nearby_caches_by_parameter_tuple() {
        crate::cache::init_for_tests();
        let provider = StaticPlaces {
            calls: AtomicUsize::new(0),
            results: vec![],
        };
        // A center no other test uses, so call counting stays deterministic
        let center = GeoCoordinate::checked(-33.8688, 151.2093).unwrap();

        search_nearby(&provider, center, PoiCategory::Restaurants, 5000, 10)
            .await
            .unwrap();
        search_nearby(&provider, center, PoiCategory::Restaurants, 5000, 10)
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // A different radius is a different tuple: goes upstream again
        search_nearby(&provider, center, PoiCategory::Restaurants, 3000, 10)
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
