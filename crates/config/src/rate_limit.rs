//! Rate limiting configuration structures.

use duration_str::deserialize_duration;
use serde::Deserialize;
use std::time::Duration;

/// Fixed-window rate limit applied per client to the generation endpoint.
///
/// The values are process-wide; callers cannot influence them per request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled.
    pub enabled: bool,
    /// Maximum number of requests a client may make within one window.
    pub limit: u32,
    /// Length of the window.
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP` instead of the socket peer.
    ///
    /// Only enable this behind a reverse proxy that overwrites these headers.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: 20,
            interval: Duration::from_secs(60),
            trust_forwarded_for: false,
        }
    }
}
