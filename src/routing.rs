//! Routing adapter
//!
//! Distance and travel time between two resolved coordinates via Geoapify
//! Routing. Rendering rules: duration >= 1 hour displays as "{hours:.1}
//! hours", otherwise "{minutes:.0} minutes"; distance always as "{km:.1} km".

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::ProvidersConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{GeoCoordinate, RouteSummary};
use crate::{API_CLIENT, cache};

/// Supported travel modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Drive,
    Walk,
    Bicycle,
    Transit,
}

impl TravelMode {
    /// Upstream mode parameter
    #[must_use]
    pub fn as_mode_param(self) -> &'static str {
        match self {
            TravelMode::Drive => "drive",
            TravelMode::Walk => "walk",
            TravelMode::Bicycle => "bicycle",
            TravelMode::Transit => "transit",
        }
    }

    /// Display name used in route summaries
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            TravelMode::Drive => "Car",
            TravelMode::Walk => "Walking",
            TravelMode::Bicycle => "Bicycle",
            TravelMode::Transit => "Transit",
        }
    }
}

impl FromStr for TravelMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drive" | "driving" | "driving-car" | "car" => Ok(TravelMode::Drive),
            "walk" | "walking" => Ok(TravelMode::Walk),
            "bicycle" | "cycling" | "bike" => Ok(TravelMode::Bicycle),
            "transit" => Ok(TravelMode::Transit),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_mode_param())
    }
}

/// A raw route leg as the upstream reports it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Upstream routing capability
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route(
        &self,
        origin: GeoCoordinate,
        destination: GeoCoordinate,
        mode: TravelMode,
    ) -> ProviderResult<RouteLeg>;
}

/// Geoapify Routing client
pub struct GeoapifyRouting {
    api_key: Option<String>,
}

impl GeoapifyRouting {
    const ROUTING_URL: &'static str = "https://api.geoapify.com/v1/routing";

    #[must_use]
    pub fn new(config: &ProvidersConfig) -> Self {
        Self {
            api_key: config.geoapify_api_key.clone(),
        }
    }
}

#[async_trait]
impl RoutingProvider for GeoapifyRouting {
    async fn route(
        &self,
        origin: GeoCoordinate,
        destination: GeoCoordinate,
        mode: TravelMode,
    ) -> ProviderResult<RouteLeg> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::unavailable("Geoapify API key not configured"));
        };

        // Geoapify waypoints take lat,lon order
        let url = format!(
            "{}?waypoints={},{}|{},{}&mode={}&apiKey={}",
            Self::ROUTING_URL,
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude,
            mode.as_mode_param(),
            api_key
        );

        let response = API_CLIENT.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(
                response.status().as_u16(),
                "geoapify routing",
            ));
        }

        let body: geoapify::RoutingResponse = response.json().await?;
        body.into_leg()
            .ok_or_else(|| ProviderError::unavailable("No route found between the waypoints"))
    }
}

/// Render a duration per the display rule
#[must_use]
pub fn format_duration(duration_seconds: f64) -> String {
    if duration_seconds >= 3600.0 {
        format!("{:.1} hours", duration_seconds / 3600.0)
    } else {
        format!("{:.0} minutes", duration_seconds / 60.0)
    }
}

/// Render a distance per the display rule
#[must_use]
pub fn format_distance(distance_meters: f64) -> String {
    format!("{:.1} km", distance_meters / 1000.0)
}

/// Render a raw leg for display
#[must_use]
pub fn summarize(leg: RouteLeg, mode: TravelMode) -> RouteSummary {
    RouteSummary {
        distance: format_distance(leg.distance_meters),
        duration: format_duration(leg.duration_seconds),
        mode: mode.display_name().to_string(),
    }
}

/// Route between two coordinates, cache-first with a 7-day TTL
#[tracing::instrument(skip(provider))]
pub async fn route_between(
    provider: &dyn RoutingProvider,
    origin: GeoCoordinate,
    destination: GeoCoordinate,
    mode: TravelMode,
) -> ProviderResult<RouteSummary> {
    let key = cache::key(&[
        "route",
        &origin.cache_fragment(),
        &destination.cache_fragment(),
        mode.as_mode_param(),
    ]);

    if let Ok(Some(cached)) = cache::get::<RouteSummary>(&key).await {
        debug!("Route cache hit");
        return Ok(cached);
    }

    let leg = provider
        .route(origin, destination, mode)
        .await
        .inspect_err(|err| {
            if err.is_auth() {
                error!("Routing credential rejected: {err}");
            } else {
                warn!("Routing failed: {err}");
            }
        })?;

    let summary = summarize(leg, mode);
    if let Err(e) = cache::put(&key, summary.clone(), cache::jittered(cache::ROUTE_TTL)).await {
        warn!("Failed to cache route: {e}");
    }
    Ok(summary)
}

/// Geoapify Routing response structures
mod geoapify {
    use super::RouteLeg;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct RoutingResponse {
        #[serde(default)]
        pub features: Vec<Feature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Feature {
        pub properties: Properties,
    }

    #[derive(Debug, Deserialize)]
    pub struct Properties {
        /// Distance in meters
        #[serde(default)]
        pub distance: f64,
        /// Travel time in seconds
        #[serde(default)]
        pub time: f64,
    }

    impl RoutingResponse {
        pub fn into_leg(self) -> Option<RouteLeg> {
            self.features.into_iter().next().map(|feature| RouteLeg {
                distance_meters: feature.properties.distance,
                duration_seconds: feature.properties.time,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(9000.0, "2.5 hours")]
    #[case(3600.0, "1.0 hours")]
    #[case(3599.0, "60 minutes")]
    #[case(2700.0, "45 minutes")]
    #[case(59.0, "1 minutes")]
    fn test_duration_formatting(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }

    #[rstest]
    #[case(150_300.0, "150.3 km")]
    #[case(980.0, "1.0 km")]
    #[case(0.0, "0.0 km")]
    fn test_distance_formatting(#[case] meters: f64, #[case] expected: &str) {
        assert_eq!(format_distance(meters), expected);
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(
            RouteLeg {
                distance_meters: 343_000.0,
                duration_seconds: 12_600.0,
            },
            TravelMode::Drive,
        );
        assert_eq!(summary.distance, "343.0 km");
        assert_eq!(summary.duration, "3.5 hours");
        assert_eq!(summary.mode, "Car");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("driving-car".parse::<TravelMode>(), Ok(TravelMode::Drive));
        assert_eq!("walking".parse::<TravelMode>(), Ok(TravelMode::Walk));
        assert_eq!("bike".parse::<TravelMode>(), Ok(TravelMode::Bicycle));
        assert!("teleport".parse::<TravelMode>().is_err());
    }

    #[test]
    fn test_routing_response_parsing() {
        let json = r#"{
            "features": [{"properties": {"distance": 343210.0, "time": 12480.5}}]
        }"#;
        let response: super::geoapify::RoutingResponse = serde_json::from_str(json).unwrap();
        let leg = response.into_leg().unwrap();
        assert_eq!(leg.distance_meters, 343_210.0);
        assert_eq!(leg.duration_seconds, 12_480.5);
    }
}
