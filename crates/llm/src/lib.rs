use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::header::CONTENT_TYPE,
    routing::post,
};
use config::UpstreamConfig;
use rate_limit::RateLimitManager;

mod diagnostics;
mod error;
mod messages;
mod provider;
mod request;
mod server;

pub use diagnostics::{Diagnostics, LogDiagnostics};
pub use error::{LlmError, UpstreamError};
pub use messages::Usage;

use messages::GenerateResponse;
use provider::{Provider, openai::OpenAIProvider};
use server::{BodyFormat, LlmServer, RequestDefaults};

pub(crate) type Result<T> = std::result::Result<T, LlmError>;

/// Path of the generation endpoint.
pub const GENERATE_PATH: &str = "/ai/generate";

/// Upper bound for request bodies of the generation endpoint.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Creates an axum router for the generation endpoint, logging diagnostics through `log`.
pub fn router(config: UpstreamConfig, rate_limiter: Option<Arc<RateLimitManager>>) -> anyhow::Result<Router> {
    router_with_diagnostics(config, rate_limiter, Arc::new(LogDiagnostics))
}

/// Creates an axum router for the generation endpoint with a custom diagnostics sink.
pub fn router_with_diagnostics(
    config: UpstreamConfig,
    rate_limiter: Option<Arc<RateLimitManager>>,
    diagnostics: Arc<dyn Diagnostics>,
) -> anyhow::Result<Router> {
    let defaults = RequestDefaults::from(&config);
    let provider = OpenAIProvider::new(config)?;

    Ok(routes(Box::new(provider), rate_limiter, diagnostics, defaults))
}

fn routes(
    provider: Box<dyn Provider>,
    rate_limiter: Option<Arc<RateLimitManager>>,
    diagnostics: Arc<dyn Diagnostics>,
    defaults: RequestDefaults,
) -> Router {
    let server = LlmServer::new(provider, rate_limiter, diagnostics, defaults);

    Router::new()
        .route(GENERATE_PATH, post(generate))
        .with_state(Arc::new(server))
}

/// Handle generation requests.
///
/// Runs admission, validation and the upstream call strictly in that order; the first
/// failing step decides the response.
async fn generate(State(server): State<Arc<LlmServer>>, req: Request) -> Result<Json<GenerateResponse>> {
    let identity = request::client_identity(&req, server.trusts_forwarded_for());
    server.admit(&identity)?;

    let format = BodyFormat::from_content_type(
        req.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
    );

    let body = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|e| {
            log::debug!("Failed to read generate request body: {e}");
            LlmError::InvalidBody
        })?;

    let completion_request = server.validate(&body, format)?;

    log::debug!(
        "Generating completion for {identity} with temperature {} and timeout {:?}",
        completion_request.temperature,
        completion_request.timeout
    );

    let result = server.complete(completion_request).await?;

    Ok(Json(GenerateResponse::from(result)))
}
