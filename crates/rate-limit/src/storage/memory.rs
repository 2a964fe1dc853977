//! In-memory fixed-window rate limit storage.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::{RateLimitResult, RateLimitStorage};
use crate::clock::{Clock, SystemClock};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: Instant,
}

impl Window {
    fn new(started_at: Instant) -> Self {
        Self { count: 0, started_at }
    }

    fn has_elapsed(&self, now: Instant, interval: Duration) -> bool {
        now.duration_since(self.started_at) >= interval
    }
}

/// In-memory rate limit storage implementation.
///
/// Windows are kept in a sharded map; the shard lock taken by the entry API makes the
/// check-then-increment for one key atomic.
pub struct InMemoryStorage {
    windows: DashMap<String, Window>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage instance using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a storage instance reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            clock,
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitStorage for InMemoryStorage {
    fn check_and_consume(&self, key: &str, limit: u32, interval: Duration) -> RateLimitResult {
        let now = self.clock.now();

        let mut window = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window::new(now));

        if window.has_elapsed(now, interval) {
            log::debug!("Window for key '{key}' elapsed, starting a new one");
            *window = Window::new(now);
        }

        if window.count < limit {
            window.count += 1;

            log::debug!("Request allowed for key '{key}' - {}/{limit} in current window", window.count);

            return RateLimitResult {
                allowed: true,
                count: window.count,
                retry_after: None,
            };
        }

        let retry_after = (window.started_at + interval).saturating_duration_since(now);
        log::debug!("Request blocked for key '{key}' - rate limit exceeded, retry after {retry_after:?}");

        RateLimitResult {
            allowed: false,
            count: window.count,
            retry_after: Some(retry_after),
        }
    }

    fn purge_expired(&self, interval: Duration) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();

        self.windows.retain(|_, window| !window.has_elapsed(now, interval));

        before.saturating_sub(self.windows.len())
    }
}
