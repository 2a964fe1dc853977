//! Error types for rate limiting.

use std::time::Duration;

/// Errors that can occur during rate limiting.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// The client used up its quota for the current window.
    #[error("Rate limit exceeded for {identity}")]
    LimitExceeded {
        /// Key of the client that exceeded the limit.
        identity: String,
        /// Time until the current window closes.
        retry_after: Duration,
    },
}

impl RateLimitError {
    /// Get the retry-after duration.
    pub fn retry_after(&self) -> Duration {
        match self {
            Self::LimitExceeded { retry_after, .. } => *retry_after,
        }
    }
}
