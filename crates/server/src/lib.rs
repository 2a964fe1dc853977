//! Relay server library.
//!
//! Provides a reusable server function to serve the relay either for the binary, or for the integration tests.

#![deny(missing_docs)]

mod health;
mod pages;

use std::{net::SocketAddr, sync::Arc};

use ::rate_limit::RateLimitManager;
use anyhow::anyhow;
use axum::Router;
use config::Config;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Configuration for serving the relay.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized relay TOML configuration.
    pub config: Config,
}

/// Starts and runs the relay with the provided configuration until ctrl-c is received.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig) -> anyhow::Result<()> {
    let has_api_key = config.upstream.has_api_key();

    log::info!(
        "Upstream provider {} with model {}, API key configured: {has_api_key}",
        config.upstream.provider,
        config.upstream.model
    );

    if !has_api_key {
        log::warn!(
            "No API key configured for upstream provider {}, generation requests will fail",
            config.upstream.provider
        );
    }

    let rate_limit_manager = if config.rate_limits.enabled {
        let manager = Arc::new(RateLimitManager::new(config.rate_limits.clone()));
        spawn_sweeper(manager.clone());

        Some(manager)
    } else {
        log::debug!("Rate limiting disabled - no manager created");
        None
    };

    let app = router(&config, rate_limit_manager)?;

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    log::info!("AI endpoint available at: http://{listen_address}{}", llm::GENERATE_PATH);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;

    log::info!("Server stopped");

    Ok(())
}

/// The complete application: pages, health, generation endpoint and the public directory.
fn router(config: &Config, rate_limit_manager: Option<Arc<RateLimitManager>>) -> anyhow::Result<Router> {
    let mut app = pages::router().merge(llm::router(config.upstream.clone(), rate_limit_manager)?);

    if config.server.health.enabled {
        app = app.merge(health::router(&config.server.health));
    }

    log::debug!("Serving static files from {}", config.server.public_dir.display());

    let app = app
        .fallback_service(ServeDir::new(&config.server.public_dir))
        .layer(CorsLayer::permissive());

    Ok(app)
}

/// Drop expired rate limit windows once per interval so idle clients do not accumulate.
fn spawn_sweeper(manager: Arc<RateLimitManager>) {
    let period = manager.interval();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);

        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            manager.purge_expired();
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    log::info!("Shutdown signal received, draining connections");
}
