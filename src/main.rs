use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use wayfarer::config::WayfarerConfig;
use wayfarer::travel::{ProviderSet, TravelService};
use wayfarer::{cache, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wayfarer=info")),
        )
        .init();

    let config = WayfarerConfig::from_env()?;
    cache::init(&config.cache.location)?;

    for (provider, configured) in config.providers.credential_summary() {
        if configured {
            info!("Provider {provider}: credential configured");
        } else {
            info!("Provider {provider}: no credential, will serve fallback data");
        }
    }

    let providers = ProviderSet::from_config(&config.providers);
    let service = Arc::new(TravelService::new(providers));

    web::run(service, config.server.port).await
}
