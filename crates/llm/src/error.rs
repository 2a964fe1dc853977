use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Provider label reported when no upstream answer could be relayed.
const FALLBACK_PROVIDER: &str = "fallback";

/// Errors of the generation endpoint, each mapped to one HTTP response.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request carried no usable prompt.
    #[error("Prompt is required")]
    PromptRequired,

    /// The body could not be read or is not the expected JSON shape.
    #[error("Invalid request body")]
    InvalidBody,

    /// The client used up its quota for the current window.
    #[error("Too many requests")]
    RateLimitExceeded { retry_after: Duration },

    /// The upstream provider could not produce an answer.
    #[error("AI request failed")]
    Upstream(#[from] UpstreamError),
}

/// Any failure contacting the upstream provider or interpreting its response.
///
/// The `Display` output is meant for server logs. Callers only ever see the generic
/// [`LlmError::Upstream`] body.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// No credential is configured, so no request was sent.
    #[error("no upstream API key configured")]
    MissingCredential,

    /// The request did not finish within its timeout.
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be sent or the response could not be read.
    #[error("failed to reach upstream: {0}")]
    Connection(String),

    /// The provider answered with a non-success status.
    #[error("upstream returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw error payload, for logging only.
        body: String,
    },

    /// The provider answered 2xx but the body is not a usable completion.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl UpstreamError {
    /// The provider's own error payload, if it sent one.
    pub fn provider_payload(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Connection(error.to_string())
        }
    }
}

impl LlmError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PromptRequired | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<u64>,
}

impl IntoResponse for LlmError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut body = ErrorResponse {
            error: self.to_string(),
            provider: None,
            retry_after_secs: None,
        };

        match self {
            Self::RateLimitExceeded { retry_after } => {
                let seconds = retry_after_secs(retry_after);
                body.retry_after_secs = Some(seconds);

                let mut response = (status, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(seconds));

                response
            }
            Self::Upstream(_) => {
                // Details were reported through diagnostics where the error was created.
                body.provider = Some(FALLBACK_PROVIDER);
                (status, Json(body)).into_response()
            }
            Self::PromptRequired | Self::InvalidBody => (status, Json(body)).into_response(),
        }
    }
}

/// Whole seconds until retrying makes sense, rounded up and at least one.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let mut seconds = retry_after.as_secs();

    if retry_after.subsec_nanos() > 0 {
        seconds += 1;
    }

    seconds.max(1)
}
