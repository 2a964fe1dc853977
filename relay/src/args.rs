use std::{borrow::Cow, fmt, io::IsTerminal, net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use config::Config;
use logforth::filter::EnvFilter;
use secrecy::SecretString;

#[derive(Parser)]
#[command(name = "Relay", version, long_about = concat!("Relay v", env!("CARGO_PKG_VERSION")))]
pub struct Args {
    /// IP address on which the server will listen for incoming connections.
    /// Default: 0.0.0.0:3000
    #[arg(short, long, env = "RELAY_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
    /// Port to listen on, keeping the configured host. Ignored when a listen address is given.
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "RELAY_CONFIG_PATH", default_value = "./relay.toml")]
    pub config: PathBuf,
    /// API key for the upstream provider.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Set the logging level for the relay's own crates.
    #[arg(long = "log", env = "RELAY_LOG", default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
    /// Set the style of log output
    #[arg(long, env = "RELAY_LOG_STYLE", default_value_t = LogStyle::default())]
    pub log_style: LogStyle,
}

impl Args {
    /// Load the configuration file if it exists and apply the command line on top.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = if self.config.exists() {
            Config::load(&self.config)?
        } else {
            Config::default()
        };

        self.apply(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(ref api_key) = self.api_key {
            config.upstream.api_key = Some(SecretString::from(api_key.clone()));
        }

        let mut listen_address = self
            .listen_address
            .unwrap_or_else(|| config.server.listen_address_or_default());

        if self.listen_address.is_none()
            && let Some(port) = self.port
        {
            listen_address.set_port(port);
        }

        config.server.listen_address = Some(listen_address);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Colorized text, used as the default with TTY output
    Color,
    /// Standard text, used as the default with non-TTY output
    Text,
    /// JSON objects
    Json,
}

impl Default for LogStyle {
    fn default() -> Self {
        if std::io::stdout().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Color => "color",
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Disable logging
    Off,
    /// Only log errors
    Error,
    /// Log errors, and warnings
    Warn,
    /// Log errors, warnings, and info messages
    #[default]
    Info,
    /// Log errors, warnings, info, and debug messages
    Debug,
    /// Log errors, warnings, info, debug, and trace messages
    Trace,
}

impl LogLevel {
    /// Dependencies log at `warn`, the relay's own crates at the selected level.
    pub fn env_filter(self) -> anyhow::Result<EnvFilter> {
        let filter_str = match self {
            LogLevel::Off => Cow::Borrowed("off"),
            level => Cow::Owned(format!(
                "warn,relay={level},server={level},config={level},llm={level},rate_limit={level}"
            )),
        };

        EnvFilter::from_str(&filter_str).map_err(|e| anyhow!("Invalid log filter '{filter_str}': {e}"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
