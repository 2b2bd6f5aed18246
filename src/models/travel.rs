//! Models for the aggregated travel response

use serde::{Deserialize, Serialize};

use super::GeoCoordinate;

/// Current weather conditions, rendered for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    /// e.g. "25.0°C"
    pub temperature: String,
    /// e.g. "Partly Cloudy"
    pub condition: String,
    /// e.g. "60%"
    pub humidity: String,
    /// e.g. "36.0 km/h"
    pub wind_speed: String,
    /// Icon URL, empty when the upstream has none
    pub icon: String,
}

/// A point of interest near a resolved place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointOfInterest {
    pub name: String,
    /// Category label, e.g. "attraction", "restaurant", "hotel"
    pub category: String,
    pub address: Option<String>,
    pub coordinate: Option<GeoCoordinate>,
    /// Distance from the search center in meters
    pub distance_meters: Option<f64>,
    pub description: Option<String>,
}

/// A hotel near a resolved place. `price_display` and `rating_display` are
/// always populated, sourced or deterministically derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hotel {
    pub name: String,
    pub address: Option<String>,
    pub coordinate: Option<GeoCoordinate>,
    pub price_display: String,
    pub rating_display: String,
    pub image_url: String,
}

/// Distance and travel time between two places, rendered for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteSummary {
    /// e.g. "150.3 km"
    pub distance: String,
    /// e.g. "2.5 hours" or "45 minutes"
    pub duration: String,
    /// e.g. "Car"
    pub mode: String,
}

/// A single image result from photo search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRef {
    pub url: String,
    pub alt: Option<String>,
}

impl ImageRef {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
        }
    }
}

/// The merged travel-info response. Every field is always populated, with
/// synthetic data standing in for any provider that failed: `weather` is only
/// `None` before the merge step, `distance` only when no origin was given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedTravelInfo {
    pub place: String,
    pub description: String,
    pub images: Vec<ImageRef>,
    pub weather: Option<WeatherSnapshot>,
    pub attractions: Vec<PointOfInterest>,
    pub hotels: Vec<Hotel>,
    pub distance: Option<RouteSummary>,
    pub facts: Vec<String>,
    pub itinerary: String,
}
