//! Aggregation orchestrator
//!
//! Resolves the destination once, fans the independent provider adapters out
//! concurrently with per-adapter fault isolation, and merges the partial
//! results into a response where every top-level field is real or synthetic.
//! The only error a caller can see is an empty place name.

use std::sync::Arc;

use futures::join;
use tracing::{debug, info, warn};

use crate::config::ProvidersConfig;
use crate::error::TravelError;
use crate::fallback;
use crate::geocoding::{self, GeoapifyGeocoder, GeocodeProvider};
use crate::hotels;
use crate::models::{
    AggregatedTravelInfo, GeoCoordinate, Hotel, ImageRef, PointOfInterest, ResolvedPlace,
    RouteSummary, WeatherSnapshot,
};
use crate::photos::{self, PhotoProvider, UnsplashClient};
use crate::places::{self, DEFAULT_RADIUS_M, GeoapifyPlaces, PlacesProvider, PoiCategory};
use crate::routing::{self, GeoapifyRouting, RoutingProvider, TravelMode};
use crate::summary::{self, PlaceSummary, SummaryProvider, WikipediaClient};
use crate::weather::{self, OpenWeatherClient, WeatherProvider};

/// Every response carries exactly this many facts
const FACT_COUNT: usize = 5;
/// Default itinerary length in days
const ITINERARY_DAYS: usize = 3;
/// Result counts for the aggregate response
const IMAGE_LIMIT: usize = 5;
const ATTRACTION_LIMIT: usize = 5;
const HOTEL_LIMIT: usize = 5;

/// The full set of provider adapters the orchestrator fans out to
pub struct ProviderSet {
    pub geocode: Arc<dyn GeocodeProvider>,
    pub places: Arc<dyn PlacesProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub routing: Arc<dyn RoutingProvider>,
    pub photos: Arc<dyn PhotoProvider>,
    pub summary: Arc<dyn SummaryProvider>,
}

impl ProviderSet {
    /// Build the real upstream clients from configuration
    #[must_use]
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            geocode: Arc::new(GeoapifyGeocoder::new(config)),
            places: Arc::new(GeoapifyPlaces::new(config)),
            weather: Arc::new(OpenWeatherClient::new(config)),
            routing: Arc::new(GeoapifyRouting::new(config)),
            photos: Arc::new(UnsplashClient::new(config)),
            summary: Arc::new(WikipediaClient::new()),
        }
    }
}

/// The travel-info aggregation service
pub struct TravelService {
    providers: ProviderSet,
}

impl TravelService {
    #[must_use]
    pub fn new(providers: ProviderSet) -> Self {
        Self { providers }
    }

    #[must_use]
    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    /// Aggregate travel information for a destination.
    ///
    /// Always returns a fully populated response for a non-empty place name:
    /// a provider that is unconfigured, failing, or empty contributes
    /// fallback data for its field and nothing else.
    pub async fn get_travel_info(
        &self,
        place: &str,
        origin: Option<&str>,
    ) -> Result<AggregatedTravelInfo, TravelError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(TravelError::validation("place must not be empty"));
        }
        info!("Fetching travel info for: {place}");

        // Resolve once; every coordinate-dependent adapter reuses this result.
        let resolved = match geocoding::resolve(&*self.providers.geocode, place).await {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                warn!("Could not resolve {place}: {e}; continuing with fallback data");
                None
            }
        };
        let coordinate = resolved.as_ref().map(|r| r.coordinate);

        let (place_summary, images, weather, attractions, hotels, distance) = join!(
            self.fetch_summary(place),
            self.fetch_images(place),
            self.fetch_weather(coordinate),
            self.fetch_attractions(place, coordinate),
            self.fetch_hotels(place, coordinate),
            self.fetch_route(origin, coordinate),
        );

        let description = build_description(place, place_summary.as_ref(), resolved.as_ref());
        let facts = build_facts(place, place_summary.as_ref(), coordinate);
        let itinerary = build_itinerary(place, ITINERARY_DAYS);

        Ok(AggregatedTravelInfo {
            place: place.to_string(),
            description,
            images,
            weather: Some(weather),
            attractions,
            hotels,
            distance,
            facts,
            itinerary,
        })
    }

    async fn fetch_summary(&self, place: &str) -> Option<PlaceSummary> {
        summary::place_summary(&*self.providers.summary, place)
            .await
            .ok()
    }

    async fn fetch_images(&self, place: &str) -> Vec<ImageRef> {
        match photos::place_images(&*self.providers.photos, place, IMAGE_LIMIT).await {
            Ok(images) if !images.is_empty() => images,
            _ => fallback::images(IMAGE_LIMIT),
        }
    }

    async fn fetch_weather(&self, coordinate: Option<GeoCoordinate>) -> WeatherSnapshot {
        let Some(coordinate) = coordinate else {
            return fallback::weather();
        };
        weather::current(&*self.providers.weather, coordinate)
            .await
            .unwrap_or_else(|_| fallback::weather())
    }

    async fn fetch_attractions(
        &self,
        place: &str,
        coordinate: Option<GeoCoordinate>,
    ) -> Vec<PointOfInterest> {
        let Some(coordinate) = coordinate else {
            return fallback::attractions(place);
        };
        match places::search_nearby(
            &*self.providers.places,
            coordinate,
            PoiCategory::Attractions,
            DEFAULT_RADIUS_M,
            ATTRACTION_LIMIT,
        )
        .await
        {
            Ok(pois) if !pois.is_empty() => pois,
            _ => fallback::attractions(place),
        }
    }

    async fn fetch_hotels(&self, place: &str, coordinate: Option<GeoCoordinate>) -> Vec<Hotel> {
        let Some(coordinate) = coordinate else {
            return fallback::hotels(place, HOTEL_LIMIT);
        };
        hotels::hotels_near(&*self.providers.places, coordinate, place, HOTEL_LIMIT).await
    }

    /// Route from the caller's origin to the destination. `None` only when no
    /// origin was given; any resolution or routing failure falls back.
    async fn fetch_route(
        &self,
        origin: Option<&str>,
        destination: Option<GeoCoordinate>,
    ) -> Option<RouteSummary> {
        let origin = origin?.trim();
        if origin.is_empty() {
            return None;
        }
        let Some(destination) = destination else {
            return Some(fallback::route());
        };

        let origin_place = match geocoding::resolve(&*self.providers.geocode, origin).await {
            Ok(place) => place,
            Err(e) => {
                debug!("Could not resolve origin {origin}: {e}");
                return Some(fallback::route());
            }
        };

        match routing::route_between(
            &*self.providers.routing,
            origin_place.coordinate,
            destination,
            TravelMode::Drive,
        )
        .await
        {
            Ok(summary) => Some(summary),
            Err(_) => Some(fallback::route()),
        }
    }
}

/// Compose the description from the summary extract, the resolved location,
/// and the short classification, in that order.
fn build_description(
    place: &str,
    summary: Option<&PlaceSummary>,
    resolved: Option<&ResolvedPlace>,
) -> String {
    let mut parts = Vec::new();

    if let Some(summary) = summary {
        if !summary.extract.is_empty() {
            parts.push(summary.extract.clone());
        }
    }

    if let Some(resolved) = resolved {
        parts.push(format!(
            "Location: Coordinates {:.4}°N, {:.4}°E",
            resolved.coordinate.latitude, resolved.coordinate.longitude
        ));
    }

    if let Some(summary) = summary {
        if let Some(short) = &summary.description {
            if !summary.extract.contains(short.as_str()) {
                parts.push(short.clone());
            }
        }
    }

    if parts.is_empty() {
        fallback::description(place)
    } else {
        parts.join("\n\n")
    }
}

/// Derive exactly `FACT_COUNT` facts: a coordinate fact, short sentences
/// lifted from the summary, the classification, then generic filler.
fn build_facts(
    place: &str,
    summary: Option<&PlaceSummary>,
    coordinate: Option<GeoCoordinate>,
) -> Vec<String> {
    let mut facts: Vec<String> = Vec::new();

    if let Some(coordinate) = coordinate {
        facts.push(format!(
            "{place} is located at coordinates {:.4}°N, {:.4}°E",
            coordinate.latitude, coordinate.longitude
        ));
    }

    if let Some(summary) = summary {
        for sentence in summary.extract.split('.') {
            if facts.len() >= 3 {
                break;
            }
            let sentence = sentence.replace('\n', " ").trim().to_string();
            if sentence.chars().count() > 30
                && sentence.chars().count() < 200
                && !sentence.starts_with("It ")
            {
                facts.push(sentence);
            }
        }

        if let Some(short) = &summary.description {
            if !summary.extract.contains(short.as_str()) {
                facts.push(format!("{place} is {}", short.to_lowercase()));
            }
        }
    }

    for generic in fallback::generic_facts(place) {
        if facts.len() >= FACT_COUNT {
            break;
        }
        if !facts.contains(&generic) {
            facts.push(generic);
        }
    }

    facts.truncate(FACT_COUNT);
    facts
}

/// Fixed-template multi-day plan interpolating the place name
fn build_itinerary(place: &str, days: usize) -> String {
    let mut lines = vec![format!("Plan your {days}-day visit to {place}:"), String::new()];

    for day in 1..=days {
        lines.push(format!("Day {day}:"));
        let activities: [&str; 3] = if day == 1 {
            [
                "- Morning: Arrive and check into your accommodation",
                "- Afternoon: Explore the city center and local markets",
                "- Evening: Enjoy local cuisine and cultural experiences",
            ]
        } else if day == days {
            [
                "- Morning: Explore natural attractions or parks",
                "- Afternoon: Shopping and souvenir hunting",
                "- Evening: Farewell dinner and preparation for departure",
            ]
        } else {
            [
                "- Morning: Visit top historical and cultural sites",
                "- Afternoon: Discover local attractions and landmarks",
                "- Evening: Experience nightlife or local entertainment",
            ]
        };
        lines.extend(activities.iter().map(ToString::to_string));
        lines.push(String::new());
    }

    lines.push("Tips:".to_string());
    lines.push("- Book accommodations in advance".to_string());
    lines.push("- Carry local currency".to_string());
    lines.push("- Respect local customs and traditions".to_string());
    lines.push("- Stay hydrated and wear comfortable shoes".to_string());
    lines.push("- Keep important documents safe".to_string());
    lines.push(String::new());
    lines.push(format!("Enjoy your trip to {place}!"));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris_summary() -> PlaceSummary {
        PlaceSummary {
            title: "Paris".to_string(),
            extract: "Paris is the capital and most populous city of France, known worldwide. \
                      The city has been a major center of finance and commerce for centuries. \
                      It hosts many museums and galleries."
                .to_string(),
            description: Some("capital of France".to_string()),
            thumbnail_url: None,
            page_url: None,
        }
    }

    #[test]
    fn test_facts_are_exactly_five() {
        let coordinate = GeoCoordinate::checked(48.8566, 2.3522);
        assert_eq!(build_facts("Paris", Some(&paris_summary()), coordinate).len(), 5);
        assert_eq!(build_facts("Paris", None, None).len(), 5);
        assert_eq!(build_facts("Paris", Some(&paris_summary()), None).len(), 5);
    }

    #[test]
    fn test_coordinate_fact_comes_first() {
        let coordinate = GeoCoordinate::checked(48.8566, 2.3522);
        let facts = build_facts("Paris", None, coordinate);
        assert_eq!(
            facts[0],
            "Paris is located at coordinates 48.8566°N, 2.3522°E"
        );
    }

    #[test]
    fn test_facts_extract_summary_sentences() {
        let facts = build_facts("Paris", Some(&paris_summary()), None);
        assert!(facts.iter().any(|f| f.contains("capital and most populous")));
        assert!(facts.iter().any(|f| f == "Paris is capital of france"));
    }

    #[test]
    fn test_itinerary_template() {
        let itinerary = build_itinerary("Kyoto", 3);
        assert!(itinerary.starts_with("Plan your 3-day visit to Kyoto:"));
        assert!(itinerary.contains("Day 1:"));
        assert!(itinerary.contains("Day 3:"));
        assert!(!itinerary.contains("Day 4:"));
        assert!(itinerary.contains("Tips:"));
        assert!(itinerary.ends_with("Enjoy your trip to Kyoto!"));
    }

    #[test]
    fn test_description_falls_back_without_sources() {
        let description = build_description("Atlantis", None, None);
        assert_eq!(description, "Atlantis is a beautiful destination worth exploring.");
    }

    #[test]
    fn test_description_includes_location_when_resolved() {
        let resolved = ResolvedPlace::new("Paris", GeoCoordinate::checked(48.8566, 2.3522).unwrap());
        let description = build_description("Paris", Some(&paris_summary()), Some(&resolved));
        assert!(description.contains("Location: Coordinates 48.8566°N, 2.3522°E"));
        assert!(description.starts_with("Paris is the capital"));
    }
}
