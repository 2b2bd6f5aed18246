//! Wayfarer - travel information aggregation backend
//!
//! Resolves a destination place once, fans out to independent upstream
//! providers (weather, points of interest, photos, routing, summaries) with
//! per-provider caching and fault isolation, and merges the results into one
//! response that is always structurally complete: synthetic data stands in
//! for any provider that is unconfigured or failing.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod geocoding;
pub mod hotels;
pub mod models;
pub mod photos;
pub mod places;
pub mod routing;
pub mod summary;
pub mod travel;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::{ProvidersConfig, WayfarerConfig};
pub use error::{FailureKind, ProviderError, ProviderResult, TravelError};
pub use models::{
    AggregatedTravelInfo, GeoCoordinate, Hotel, ImageRef, PointOfInterest, ResolvedPlace,
    RouteSummary, WeatherSnapshot,
};
pub use travel::{ProviderSet, TravelService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-call timeout applied to every upstream request
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client for all upstream calls: 10s timeout per attempt plus
/// transient-error retry with a small backoff.
pub(crate) static API_CLIENT: LazyLock<ClientWithMiddleware> = LazyLock::new(|| {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(2);
    let client = reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .user_agent(concat!("wayfarer/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client");
    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
