//! connect-four-relay server entry point.
//!
//! Starts the Axum server with the `/ws` game endpoint and system routes.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use connect_four_relay::api;
use connect_four_relay::app_state::AppState;
use connect_four_relay::config::RelayConfig;
use connect_four_relay::domain::SessionRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting connect-four-relay");

    // Build domain layer
    let registry = Arc::new(SessionRegistry::new(config.event_bus_capacity));

    // Build application
    let app_state = AppState::new(registry, config.connection_settings());
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
