//! Configuration of the chat-completion provider the relay forwards to.

use std::time::Duration;

use duration_str::deserialize_duration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Upstream chat-completion provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Label reported back to callers in the `provider` field of successful responses.
    pub provider: String,
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer credential. Usually supplied through the `GROQ_API_KEY` environment variable.
    pub api_key: Option<SecretString>,
    /// Sampling temperature used when the caller does not send one.
    pub default_temperature: f64,
    /// Upstream timeout used when the caller does not send one.
    #[serde(deserialize_with = "deserialize_duration")]
    pub default_timeout: Duration,
    /// Upper bound for caller-supplied timeouts.
    #[serde(deserialize_with = "deserialize_duration")]
    pub max_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            api_key: None,
            default_temperature: 0.7,
            default_timeout: Duration::from_secs(10),
            max_timeout: Duration::from_secs(60),
        }
    }
}

impl UpstreamConfig {
    /// The credential for upstream calls. A blank key counts as no key.
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }

    /// Whether a credential is available for upstream calls.
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }
}
