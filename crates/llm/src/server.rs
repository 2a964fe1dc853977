use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use config::UpstreamConfig;
use rate_limit::{ClientIdentity, RateLimitError, RateLimitManager};

use crate::{
    diagnostics::Diagnostics,
    error::LlmError,
    messages::{CompletionRequest, CompletionResult, GenerateRequest},
    provider::Provider,
};

/// Values applied when the caller leaves a field out.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestDefaults {
    pub(crate) temperature: f64,
    pub(crate) timeout: Duration,
    pub(crate) max_timeout: Duration,
}

impl From<&UpstreamConfig> for RequestDefaults {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            temperature: config.default_temperature,
            timeout: config.default_timeout,
            max_timeout: config.max_timeout,
        }
    }
}

/// How the body of a generate request is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyFormat {
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
}

impl BodyFormat {
    /// Anything that is not declared as a form is read as JSON.
    pub(crate) fn from_content_type(content_type: Option<&str>) -> Self {
        let is_form = content_type
            .and_then(|value| value.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"));

        if is_form { Self::Form } else { Self::Json }
    }
}

/// Everything the generation endpoint needs: one provider, the optional rate limiter and
/// the diagnostics sink.
pub(crate) struct LlmServer {
    provider: Box<dyn Provider>,
    rate_limiter: Option<Arc<RateLimitManager>>,
    diagnostics: Arc<dyn Diagnostics>,
    defaults: RequestDefaults,
}

impl LlmServer {
    pub fn new(
        provider: Box<dyn Provider>,
        rate_limiter: Option<Arc<RateLimitManager>>,
        diagnostics: Arc<dyn Diagnostics>,
        defaults: RequestDefaults,
    ) -> Self {
        Self {
            provider,
            rate_limiter,
            diagnostics,
            defaults,
        }
    }

    pub fn trusts_forwarded_for(&self) -> bool {
        self.rate_limiter
            .as_ref()
            .is_some_and(|manager| manager.trusts_forwarded_for())
    }

    /// Count the request against the caller's window.
    pub fn admit(&self, identity: &ClientIdentity) -> crate::Result<()> {
        let Some(ref manager) = self.rate_limiter else {
            return Ok(());
        };

        manager.admit(identity).map_err(|error| match error {
            RateLimitError::LimitExceeded { retry_after, .. } => {
                self.diagnostics.request_rejected(identity, retry_after);
                LlmError::RateLimitExceeded { retry_after }
            }
        })
    }

    /// Turn a raw request body into a completion request, applying defaults.
    pub fn validate(&self, body: &[u8], format: BodyFormat) -> crate::Result<CompletionRequest> {
        let request: GenerateRequest = if body.iter().all(u8::is_ascii_whitespace) {
            GenerateRequest::default()
        } else {
            let parsed = match format {
                BodyFormat::Json => serde_json::from_slice(body).map_err(|e| e.to_string()),
                BodyFormat::Form => serde_urlencoded::from_bytes(body).map_err(|e| e.to_string()),
            };

            parsed.map_err(|e| {
                log::debug!("Rejecting {format:?} body that is not a generate request: {e}");
                LlmError::InvalidBody
            })?
        };

        let prompt = match request.prompt {
            Some(prompt) if !prompt.is_empty() => prompt,
            _ => return Err(LlmError::PromptRequired),
        };

        let timeout = match request.timeout {
            None | Some(0) => self.defaults.timeout,
            Some(millis) => Duration::from_millis(millis).min(self.defaults.max_timeout),
        };

        Ok(CompletionRequest {
            prompt,
            temperature: request.temperature.unwrap_or(self.defaults.temperature),
            timeout,
        })
    }

    /// Forward the request to the provider, reporting the outcome to diagnostics.
    pub async fn complete(&self, request: CompletionRequest) -> crate::Result<CompletionResult> {
        let provider = self.provider.name();
        let started = Instant::now();

        match self.provider.complete(request).await {
            Ok(result) => {
                self.diagnostics
                    .completion_succeeded(provider, result.usage.as_ref(), started.elapsed());

                Ok(result)
            }
            Err(error) => {
                self.diagnostics.completion_failed(provider, &error, started.elapsed());

                Err(LlmError::Upstream(error))
            }
        }
    }
}
