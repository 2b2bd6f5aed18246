//! Current-weather adapter
//!
//! Fetches current conditions for a coordinate and renders them for display.
//! Unit conversion is adapter-internal and exact: upstream wind arrives in
//! m/s and is rendered in km/h (x 3.6); temperature passes through in Celsius.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::config::ProvidersConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{GeoCoordinate, WeatherSnapshot};
use crate::{API_CLIENT, cache};

/// Raw current-weather reading as the upstream reports it
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Free-text condition, e.g. "scattered clouds"
    pub condition: String,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: u8,
    /// Wind speed in m/s
    pub wind_speed_ms: f64,
    /// Upstream icon code, empty when none
    pub icon: String,
    /// When the reading was taken
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherObservation {
    /// Render the observation for display
    #[must_use]
    pub fn into_snapshot(self) -> WeatherSnapshot {
        let icon = if self.icon.is_empty() {
            String::new()
        } else {
            format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
        };
        WeatherSnapshot {
            temperature: format!("{:.1}°C", self.temperature_c),
            condition: title_case(&self.condition),
            humidity: format!("{}%", self.humidity_pct),
            wind_speed: format!("{:.1} km/h", self.wind_speed_ms * 3.6),
            icon,
        }
    }
}

/// Upstream current-weather capability
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, coordinate: GeoCoordinate) -> ProviderResult<WeatherObservation>;
}

/// OpenWeatherMap One Call 3.0 client
pub struct OpenWeatherClient {
    api_key: Option<String>,
}

impl OpenWeatherClient {
    const ONECALL_URL: &'static str = "https://api.openweathermap.org/data/3.0/onecall";

    #[must_use]
    pub fn new(config: &ProvidersConfig) -> Self {
        Self {
            api_key: config.openweather_api_key.clone(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, coordinate: GeoCoordinate) -> ProviderResult<WeatherObservation> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::unavailable(
                "OpenWeather API key not configured",
            ));
        };

        let url = format!(
            "{}?lat={}&lon={}&units=metric&exclude=minutely,hourly,daily,alerts&appid={}",
            Self::ONECALL_URL,
            coordinate.latitude,
            coordinate.longitude,
            api_key
        );

        let response = API_CLIENT.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(
                response.status().as_u16(),
                "openweather",
            ));
        }

        let body: openweather::OneCallResponse = response.json().await?;
        body.into_observation()
            .ok_or_else(|| ProviderError::unavailable("OpenWeather returned no current conditions"))
    }
}

/// Fetch current weather for a coordinate, cache-first with a 30 minute TTL
#[tracing::instrument(skip(provider))]
pub async fn current(
    provider: &dyn WeatherProvider,
    coordinate: GeoCoordinate,
) -> ProviderResult<WeatherSnapshot> {
    let key = cache::key(&["weather", &coordinate.cache_fragment()]);

    if let Ok(Some(cached)) = cache::get::<WeatherSnapshot>(&key).await {
        debug!("Weather cache hit for {}", coordinate.format());
        return Ok(cached);
    }

    let observation = provider.current(coordinate).await.inspect_err(|err| {
        if err.is_auth() {
            error!("Weather credential rejected: {err}");
        } else {
            warn!("Weather fetch failed for {}: {err}", coordinate.format());
        }
    })?;

    let snapshot = observation.into_snapshot();
    if let Err(e) = cache::put(&key, snapshot.clone(), cache::jittered(cache::WEATHER_TTL)).await {
        warn!("Failed to cache weather for {}: {e}", coordinate.format());
    }
    Ok(snapshot)
}

/// Capitalize each word, the way conditions are displayed ("Scattered Clouds")
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// OpenWeatherMap One Call API response structures
mod openweather {
    use super::WeatherObservation;
    use chrono::DateTime;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct OneCallResponse {
        pub current: Option<Current>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Current {
        pub dt: Option<i64>,
        pub temp: f64,
        #[serde(default)]
        pub humidity: u8,
        #[serde(default)]
        pub wind_speed: f64,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub icon: String,
    }

    impl OneCallResponse {
        pub fn into_observation(self) -> Option<WeatherObservation> {
            let current = self.current?;
            let condition = current.weather.into_iter().next().unwrap_or(Condition {
                description: "Unknown".to_string(),
                icon: String::new(),
            });
            Some(WeatherObservation {
                temperature_c: current.temp,
                condition: condition.description,
                humidity_pct: current.humidity,
                wind_speed_ms: current.wind_speed,
                icon: condition.icon,
                observed_at: current.dt.and_then(|dt| DateTime::from_timestamp(dt, 0)),
            })
        }
    }
}
