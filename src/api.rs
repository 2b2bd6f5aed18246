//! Inbound HTTP surface
//!
//! Routes nested under `/api`. The aggregate endpoint is best-effort and
//! always structurally complete; the narrow restaurant endpoint surfaces
//! upstream transport failure as 502 instead of falling back.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

use crate::error::{ProviderError, TravelError};
use crate::models::{AggregatedTravelInfo, GeoCoordinate, Hotel, PointOfInterest};
use crate::places::{self, DEFAULT_RADIUS_M, PoiCategory};
use crate::travel::TravelService;
use crate::{fallback, geocoding, hotels};

const DEFAULT_RESTAURANT_LIMIT: usize = 20;
const DEFAULT_HOTEL_LIMIT: usize = 10;

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct TravelInfoRequest {
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub user_location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RestaurantsResponse {
    pub total: usize,
    pub restaurants: Vec<PointOfInterest>,
}

#[derive(Debug, Serialize)]
pub struct HotelsResponse {
    pub total: usize,
    pub hotels: Vec<Hotel>,
}

pub fn router(service: Arc<TravelService>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/travel/info/", post(travel_info))
        .route("/restaurants/", get(restaurants))
        .route("/hotels/", get(hotels_by_query))
        .with_state(service)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Wayfarer API is running",
        "version": crate::VERSION,
    }))
}

async fn travel_info(
    State(service): State<Arc<TravelService>>,
    Json(request): Json<TravelInfoRequest>,
) -> ApiResult<AggregatedTravelInfo> {
    let place = request.place.trim();
    if place.is_empty() {
        return Err(bad_request(json!({
            "error": "Place parameter is required",
            "example": {"place": "Paris, France", "user_location": "London, UK"},
        })));
    }

    let origin = request
        .user_location
        .as_deref()
        .map(str::trim)
        .filter(|origin| !origin.is_empty());

    match service.get_travel_info(place, origin).await {
        Ok(info) => Ok(Json(info)),
        Err(TravelError::Validation(message)) => {
            Err(bad_request(json!({"error": message})))
        }
        Err(e) => {
            error!("Error in travel_info: {e}");
            Err(internal_error(&e))
        }
    }
}

async fn restaurants(
    State(service): State<Arc<TravelService>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<RestaurantsResponse> {
    let center = parse_coordinate_params(&params).map_err(|message| {
        bad_request(json!({
            "error": message,
            "example": "/api/restaurants/?lat=48.8566&lon=2.3522&limit=10",
        }))
    })?;
    let limit = parse_count_param(&params, "limit", DEFAULT_RESTAURANT_LIMIT)
        .map_err(|message| bad_request(json!({"error": message})))?;
    let radius = parse_count_param(&params, "radius", DEFAULT_RADIUS_M as usize)
        .map_err(|message| bad_request(json!({"error": message})))?;

    let results = places::search_nearby(
        &*service.providers().places,
        center,
        PoiCategory::Restaurants,
        radius as u32,
        limit,
    )
    .await
    .map_err(|err| match err {
        ProviderError::Unavailable(reason) => {
            error!("Restaurant search unavailable: {reason}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Places provider not configured"})),
            )
        }
        err => {
            error!("Restaurant search failed: {err}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "Failed to fetch data from places provider",
                    "details": err.to_string(),
                })),
            )
        }
    })?;

    Ok(Json(RestaurantsResponse {
        total: results.len(),
        restaurants: results,
    }))
}

async fn hotels_by_query(
    State(service): State<Arc<TravelService>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<HotelsResponse> {
    let limit = parse_count_param(&params, "limit", DEFAULT_HOTEL_LIMIT)
        .map_err(|message| bad_request(json!({"error": message})))?;
    let place = params
        .get("place")
        .map(|place| place.trim())
        .filter(|place| !place.is_empty());
    let has_coordinates = params.contains_key("lat") || params.contains_key("lon");

    let hotels = if has_coordinates {
        let center = parse_coordinate_params(&params)
            .map_err(|message| bad_request(json!({"error": message})))?;
        let label = place.map_or_else(|| center.format(), ToString::to_string);
        hotels::hotels_near(&*service.providers().places, center, &label, limit).await
    } else if let Some(place) = place {
        match geocoding::resolve(&*service.providers().geocode, place).await {
            Ok(resolved) => {
                hotels::hotels_near(&*service.providers().places, resolved.coordinate, place, limit)
                    .await
            }
            Err(_) => fallback::hotels(place, limit),
        }
    } else {
        return Err(bad_request(json!({
            "error": "Either place name or coordinates (lat, lon) are required",
            "examples": [
                "/api/hotels/?place=Paris&limit=5",
                "/api/hotels/?lat=48.8566&lon=2.3522&limit=10",
            ],
        })));
    };

    Ok(Json(HotelsResponse {
        total: hotels.len(),
        hotels,
    }))
}

fn bad_request(body: Value) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(body))
}

fn internal_error(err: &TravelError) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "An error occurred while fetching travel information",
            "details": err.user_message(),
        })),
    )
}

/// Parse required `lat`/`lon` query parameters into a validated coordinate
fn parse_coordinate_params(params: &HashMap<String, String>) -> Result<GeoCoordinate, String> {
    let (Some(lat), Some(lon)) = (params.get("lat"), params.get("lon")) else {
        return Err("lat and lon query parameters are required".to_string());
    };
    let (Ok(lat), Ok(lon)) = (lat.parse::<f64>(), lon.parse::<f64>()) else {
        return Err("Invalid lat or lon value. Must be valid numbers.".to_string());
    };
    GeoCoordinate::checked(lat, lon)
        .ok_or_else(|| "lat/lon out of range: expected -90..90 and -180..180".to_string())
}

/// Parse an optional positive count parameter with a default
fn parse_count_param(
    params: &HashMap<String, String>,
    name: &str,
    default: usize,
) -> Result<usize, String> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| format!("Invalid {name} value. Must be a non-negative integer.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_coordinates_ok() {
        let coordinate =
            parse_coordinate_params(&params(&[("lat", "48.8566"), ("lon", "2.3522")])).unwrap();
        assert_eq!(coordinate.latitude, 48.8566);
        assert_eq!(coordinate.longitude, 2.3522);
    }

    #[test]
    fn test_parse_coordinates_missing() {
        let err = parse_coordinate_params(&params(&[("lat", "48.8566")])).unwrap_err();
        assert!(err.contains("required"));
    }

    #[test]
    fn test_parse_coordinates_non_numeric() {
        let err =
            parse_coordinate_params(&params(&[("lat", "north"), ("lon", "2.35")])).unwrap_err();
        assert!(err.contains("valid numbers"));
    }

    #[test]
    fn test_parse_coordinates_out_of_range() {
        let err =
            parse_coordinate_params(&params(&[("lat", "120.0"), ("lon", "2.35")])).unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_parse_count_default_and_override() {
        assert_eq!(parse_count_param(&params(&[]), "limit", 20).unwrap(), 20);
        assert_eq!(
            parse_count_param(&params(&[("limit", "5")]), "limit", 20).unwrap(),
            5
        );
        assert!(parse_count_param(&params(&[("limit", "lots")]), "limit", 20).is_err());
    }
}
