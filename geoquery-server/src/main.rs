use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use geoquery_server::cache::ResponseCache;
use geoquery_server::config::ServerConfig;
use geoquery_server::google::{FixtureTransport, GoogleClient, MapsTransport};
use geoquery_server::orchestrator::{Orchestrator, OrchestratorConfig};
use geoquery_server::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "info,geoquery_server=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let transport: Arc<dyn MapsTransport> = match &config.mock_data_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving provider responses from fixtures");
            Arc::new(FixtureTransport::new(dir)?)
        }
        None => {
            if config.google.api_key.is_empty() {
                warn!("GOOGLE_API_KEY not set. Provider calls will be rejected.");
            }
            Arc::new(GoogleClient::new(config.google.clone())?)
        }
    };

    let orchestrator = Orchestrator::new(transport, OrchestratorConfig::default());
    let cache = ResponseCache::new(&config.cache);
    let state = AppState::new(orchestrator, cache, config.request_timeout);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "geoquery server listening");
    info!("  GET  /health");
    info!("  GET  /google-distance");
    info!("  POST /google-distance/areas");
    info!("  GET  /google-places-search");
    info!("  POST /google-places-destination");
    info!("  GET  /google-places-ac");
    info!("  GET  /google-place-details");

    axum::serve(listener, app).await?;
    Ok(())
}
