use axum::{Json, Router, routing::get};
use config::HealthConfig;
use http::StatusCode;

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum HealthState {
    /// The relay accepts requests.
    Healthy,
}

/// Liveness probe. Does not contact the upstream provider.
pub(crate) async fn health() -> (StatusCode, Json<HealthState>) {
    (StatusCode::OK, Json(HealthState::Healthy))
}

/// Router with the health endpoint mounted at its configured path.
pub(crate) fn router(config: &HealthConfig) -> Router {
    log::debug!("Health check endpoint exposed at {}", config.path);

    Router::new().route(&config.path, get(health))
}
