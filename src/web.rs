use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::api;
use crate::travel::TravelService;

/// Inbound requests are bounded well above the per-upstream timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run(service: Arc<TravelService>, port: u16) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new().nest("/api", api::router(service)).layer(
        ServiceBuilder::new()
            .layer(cors)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
    );

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
