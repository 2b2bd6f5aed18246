//! Hotel lookup
//!
//! Composes the places adapter (accommodation categories) with deterministic
//! price/rating synthesis so every hotel carries a displayable price and
//! rating, then degrades to templated fallback hotels when the search fails
//! or comes back empty.

use tracing::warn;

use crate::fallback;
use crate::models::{GeoCoordinate, Hotel, PointOfInterest};
use crate::places::{self, PlacesProvider, PoiCategory};

/// Hotel searches cast a wider net than the POI default
pub const HOTEL_RADIUS_M: u32 = 10_000;

/// Find hotels near a coordinate. Infallible: a failing or empty upstream
/// search yields deterministic fallback hotels interpolating `place_label`.
pub async fn hotels_near(
    provider: &dyn PlacesProvider,
    center: GeoCoordinate,
    place_label: &str,
    limit: usize,
) -> Vec<Hotel> {
    match places::search_nearby(provider, center, PoiCategory::Hotels, HOTEL_RADIUS_M, limit).await
    {
        Ok(pois) if !pois.is_empty() => pois.into_iter().map(from_poi).collect(),
        Ok(_) => {
            warn!("No hotels found near {}, using fallback", center.format());
            fallback::hotels(place_label, limit)
        }
        Err(_) => fallback::hotels(place_label, limit),
    }
}

/// Promote a point of interest to a hotel, deriving the fields the places
/// upstream does not carry.
fn from_poi(poi: PointOfInterest) -> Hotel {
    let price_display = fallback::hotel_price(&poi.name);
    let rating_display = fallback::hotel_rating(&poi.name);
    let image_url = fallback::hotel_image(&poi.name);
    Hotel {
        name: poi.name,
        address: poi.address,
        coordinate: poi.coordinate,
        price_display,
        rating_display,
        image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, ProviderError, ProviderResult};
    use async_trait::async_trait;

    struct FailingPlaces;

    #[async_trait]
    impl PlacesProvider for FailingPlaces {
        async fn search(
            &self,
            _center: GeoCoordinate,
            _category: PoiCategory,
            _radius_m: u32,
            _limit: usize,
        ) -> ProviderResult<Vec<PointOfInterest>> {
            Err(ProviderError::failed(FailureKind::Timeout, "deadline exceeded"))
        }
    }

    struct OneHotelPlaces;

    #[async_trait]
    impl PlacesProvider for OneHotelPlaces {
        async fn search(
            &self,
            center: GeoCoordinate,
            _category: PoiCategory,
            _radius_m: u32,
            _limit: usize,
        ) -> ProviderResult<Vec<PointOfInterest>> {
            Ok(vec![PointOfInterest {
                name: "Hotel Lutetia".to_string(),
                category: "hotel".to_string(),
                address: Some("45 Boulevard Raspail, Paris".to_string()),
                coordinate: Some(center),
                distance_meters: Some(800.0),
                description: None,
            }])
        }
    }

    #[tokio::test]
    async fn test_failing_search_yields_fallback_hotels() {
        crate::cache::init_for_tests();
        let center = GeoCoordinate::checked(48.8566, 2.3522).unwrap();
        let hotels = hotels_near(&FailingPlaces, center, "Paris", 5).await;
        assert_eq!(hotels.len(), 5);
        assert!(hotels.iter().all(|h| h.name.contains("Paris")));
        assert!(hotels.iter().all(|h| !h.price_display.is_empty()));
    }

    #[tokio::test]
    async fn test_real_results_are_promoted() {
        crate::cache::init_for_tests();
        // Distinct coordinate so this test's cache entry is its own
        let center = GeoCoordinate::checked(41.9028, 12.4964).unwrap();
        let hotels = hotels_near(&OneHotelPlaces, center, "Rome", 5).await;
        assert_eq!(hotels.len(), 1);
        let hotel = &hotels[0];
        assert_eq!(hotel.name, "Hotel Lutetia");
        assert_eq!(hotel.address.as_deref(), Some("45 Boulevard Raspail, Paris"));
        // Synthesized fields are always present and stable
        assert_eq!(hotel.rating_display, fallback::hotel_rating("Hotel Lutetia"));
        assert_eq!(hotel.price_display, fallback::hotel_price("Hotel Lutetia"));
    }
}
