//! Location models for geographic coordinates and resolved places

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoCoordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate, rejecting values outside the valid WGS84 ranges
    #[must_use]
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Cache key fragment for this coordinate. Rounded to ~1km so nearby
    /// lookups collide and genuinely different ones do not.
    #[must_use]
    pub fn cache_fragment(&self) -> String {
        let (lat, lon) = self.rounded(2);
        format!("{lat:.2}:{lon:.2}")
    }

    /// Format coordinate as a display string
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A place name resolved to coordinates by the geocoder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPlace {
    /// The place name as resolved upstream
    pub name: String,
    /// Full formatted address, when the upstream provides one
    pub formatted_address: Option<String>,
    /// Resolved coordinate
    pub coordinate: GeoCoordinate,
}

impl ResolvedPlace {
    #[must_use]
    pub fn new(name: impl Into<String>, coordinate: GeoCoordinate) -> Self {
        Self {
            name: name.into(),
            formatted_address: None,
            coordinate,
        }
    }
}
