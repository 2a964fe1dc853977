//! Storage backends for rate limiting.

use std::time::Duration;

pub mod memory;

pub use memory::InMemoryStorage;

/// Result type for rate limit checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed.
    pub allowed: bool,
    /// Requests counted in the current window, including this one when allowed.
    pub count: u32,
    /// Time to wait before retrying if not allowed.
    pub retry_after: Option<Duration>,
}

/// Trait for rate limit storage backends.
pub trait RateLimitStorage: Send + Sync {
    /// Check and, if there is room, count a request against the window for `key`.
    ///
    /// The check and the increment must be atomic with respect to concurrent calls for the
    /// same key.
    fn check_and_consume(&self, key: &str, limit: u32, interval: Duration) -> RateLimitResult;

    /// Forget every key whose window has elapsed. Returns how many keys were dropped.
    fn purge_expired(&self, interval: Duration) -> usize;
}
