//! Diagnostic records emitted by the generation endpoint.

use std::time::Duration;

use rate_limit::ClientIdentity;

use crate::{error::UpstreamError, messages::Usage};

/// Sink for the endpoint's diagnostic events.
///
/// Implementations must return quickly; they run inline on the request path.
pub trait Diagnostics: Send + Sync {
    /// A completion was relayed successfully.
    fn completion_succeeded(&self, provider: &str, usage: Option<&Usage>, elapsed: Duration);

    /// The upstream call failed. The error may carry the provider's payload.
    fn completion_failed(&self, provider: &str, error: &UpstreamError, elapsed: Duration);

    /// A request was turned away by the rate limiter.
    fn request_rejected(&self, identity: &ClientIdentity, retry_after: Duration);
}

/// Writes diagnostics through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn completion_succeeded(&self, provider: &str, usage: Option<&Usage>, elapsed: Duration) {
        let usage = usage.copied().unwrap_or_default();

        log::info!(
            "Completion from {provider} succeeded in {elapsed:?}: prompt_tokens={} completion_tokens={} total_tokens={}",
            counter(usage.prompt_tokens),
            counter(usage.completion_tokens),
            counter(usage.total_tokens),
        );
    }

    fn completion_failed(&self, provider: &str, error: &UpstreamError, elapsed: Duration) {
        log::error!("Completion from {provider} failed after {elapsed:?}: {error}");

        if let Some(payload) = error.provider_payload() {
            log::error!("Upstream error payload: {payload}");
        }
    }

    fn request_rejected(&self, identity: &ClientIdentity, retry_after: Duration) {
        log::info!("Rate limit exceeded for {identity}, retry after {retry_after:?}");
    }
}

fn counter(value: Option<u32>) -> String {
    value.map_or_else(|| "unknown".to_string(), |value| value.to_string())
}
