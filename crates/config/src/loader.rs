use std::path::Path;

use anyhow::{Context, bail};
use indoc::formatdoc;

use crate::Config;

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse configuration file {}", path.display()))?;

    validate(&config)?;

    log::debug!("Loaded configuration from {}", path.display());

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    let rate_limits = &config.rate_limits;

    if rate_limits.enabled && rate_limits.limit == 0 {
        bail!(formatdoc! {r#"
            Rate limiting is enabled with a limit of 0, which would reject every request.

            Either raise the limit or disable rate limiting:

              [rate_limits]
              enabled = false
        "#});
    }

    if rate_limits.enabled && rate_limits.interval.is_zero() {
        bail!("Rate limit interval must be greater than zero");
    }

    let upstream = &config.upstream;

    url::Url::parse(&upstream.base_url)
        .with_context(|| format!("Invalid upstream base_url '{}'", upstream.base_url))?;

    if upstream.model.trim().is_empty() {
        bail!("Upstream model must not be empty");
    }

    if upstream.default_timeout.is_zero() {
        bail!("Upstream default_timeout must be greater than zero");
    }

    if upstream.default_timeout > upstream.max_timeout {
        bail!(
            "Upstream default_timeout ({:?}) exceeds max_timeout ({:?})",
            upstream.default_timeout,
            upstream.max_timeout
        );
    }

    Ok(())
}
