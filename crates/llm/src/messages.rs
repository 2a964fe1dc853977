use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Body of `POST /ai/generate` as sent by callers.
///
/// Every field is optional on the wire so that a missing prompt can be reported with a
/// precise message instead of a generic deserialization error.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateRequest {
    #[serde(default)]
    pub(crate) prompt: Option<String>,
    #[serde(default)]
    pub(crate) temperature: Option<f64>,
    /// Upstream timeout in milliseconds.
    #[serde(default)]
    pub(crate) timeout: Option<u64>,
}

/// A validated request for the upstream provider.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompletionRequest {
    pub(crate) prompt: String,
    pub(crate) temperature: f64,
    pub(crate) timeout: Duration,
}

/// Token usage as reported by the provider.
///
/// Counters the provider did not report stay `None` and are left out of the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    /// Tokens in the generated completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
    /// Prompt plus completion tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

/// The outcome of one successful upstream call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompletionResult {
    pub(crate) content: String,
    pub(crate) usage: Option<Usage>,
    pub(crate) provider: String,
}

/// Successful response body of `POST /ai/generate`.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateResponse {
    pub(crate) content: String,
    pub(crate) usage: Option<Usage>,
    pub(crate) provider: String,
}

impl From<CompletionResult> for GenerateResponse {
    fn from(result: CompletionResult) -> Self {
        let CompletionResult {
            content,
            usage,
            provider,
        } = result;

        Self {
            content,
            usage,
            provider,
        }
    }
}
