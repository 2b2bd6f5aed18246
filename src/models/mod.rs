//! Data models for the Wayfarer service
//!
//! Core domain models organized by concern:
//! - Location: coordinates and resolved places
//! - Travel: the aggregated response and its building blocks

pub mod location;
pub mod travel;

// Re-export all public types for convenient access
pub use location::{GeoCoordinate, ResolvedPlace};
pub use travel::{
    AggregatedTravelInfo, Hotel, ImageRef, PointOfInterest, RouteSummary, WeatherSnapshot,
};
