//! Per-client rate limiting for the relay.
//!
//! Every client identity gets a fixed window of `interval` length in which at most `limit`
//! requests are admitted. State lives in memory only and is discarded once a window has
//! elapsed and [`RateLimitManager::purge_expired`] runs.

#![deny(missing_docs)]

mod clock;
mod error;
mod manager;
mod request;
mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RateLimitError;
pub use manager::RateLimitManager;
pub use request::ClientIdentity;
pub use storage::{InMemoryStorage, RateLimitResult, RateLimitStorage};
