//! Relay configuration structures to map the relay.toml configuration.

#![deny(missing_docs)]

mod loader;
mod rate_limit;
mod upstream;

use std::{
    borrow::Cow,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    path::{Path, PathBuf},
};

pub use rate_limit::RateLimitConfig;
use serde::Deserialize;
pub use upstream::UpstreamConfig;

/// Port used when neither the configuration nor the environment names one.
pub const DEFAULT_PORT: u16 = 3000;

/// Main configuration structure for the relay.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Per-client rate limiting of the generation endpoint.
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
    /// The chat-completion provider requests are relayed to.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }
}

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// Directory whose files are served verbatim at their relative path.
    pub public_dir: PathBuf,
    /// Health endpoint configuration.
    pub health: HealthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            public_dir: PathBuf::from("public"),
            health: HealthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// The configured listen address, or all interfaces on [`DEFAULT_PORT`].
    pub fn listen_address_or_default(&self) -> SocketAddr {
        self.listen_address
            .unwrap_or(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }
}

/// Health endpoint configuration.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    /// Whether the health endpoint is enabled.
    pub enabled: bool,
    /// The path for the health endpoint.
    pub path: Cow<'static, str>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        HealthConfig {
            enabled: true,
            path: Cow::Borrowed("/health"),
        }
    }
}
