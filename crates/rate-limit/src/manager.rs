//! Rate limit manager implementation.

use std::sync::Arc;
use std::time::Duration;

use config::RateLimitConfig;

use crate::clock::Clock;
use crate::error::RateLimitError;
use crate::request::ClientIdentity;
use crate::storage::{InMemoryStorage, RateLimitStorage};

/// Admission control for the generation endpoint.
pub struct RateLimitManager {
    /// Rate limit configuration.
    config: RateLimitConfig,
    /// Storage backend.
    storage: Box<dyn RateLimitStorage>,
}

impl RateLimitManager {
    /// Create a new rate limit manager with in-memory storage on the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_storage(config, InMemoryStorage::new())
    }

    /// Create a manager whose windows are measured with `clock`.
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_storage(config, InMemoryStorage::with_clock(clock))
    }

    /// Create a manager on top of an arbitrary storage backend.
    pub fn with_storage(config: RateLimitConfig, storage: impl RateLimitStorage + 'static) -> Self {
        log::debug!(
            "Rate limiting {} requests per {:?} per client",
            config.limit,
            config.interval
        );

        Self {
            config,
            storage: Box::new(storage),
        }
    }

    /// Check if rate limiting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Length of a rate limit window.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Whether client addresses may be taken from forwarding headers.
    pub fn trusts_forwarded_for(&self) -> bool {
        self.config.trust_forwarded_for
    }

    /// Count a request from `identity` against its window.
    ///
    /// Returns [`RateLimitError::LimitExceeded`] once the identity has used up its quota,
    /// carrying the time left until the window closes.
    pub fn admit(&self, identity: &ClientIdentity) -> Result<(), RateLimitError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let key = identity.key();
        let result = self
            .storage
            .check_and_consume(&key, self.config.limit, self.config.interval);

        if !result.allowed {
            return Err(RateLimitError::LimitExceeded {
                identity: key,
                retry_after: result.retry_after.unwrap_or_default(),
            });
        }

        Ok(())
    }

    /// Drop the state of every identity whose window has elapsed.
    pub fn purge_expired(&self) -> usize {
        let purged = self.storage.purge_expired(self.config.interval);

        if purged > 0 {
            log::debug!("Purged {purged} idle rate limit windows");
        }

        purged
    }
}
