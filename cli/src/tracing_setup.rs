//! Tracing setup for the command line tools
//!
//! `RUST_LOG` takes precedence; otherwise the filter comes from
//! [`LoggingConfig::filter_directive`]. SQLx statement logs are emitted
//! through `log` and bridged into the same subscriber.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use dt_shared::config::{LogFormat, LoggingConfig};

/// Build the filter used by [`init_tracing`]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter_directive()))
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    }
    .map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_uses_config_directive() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "info".to_string(),
            sql_statements: true,
            ..Default::default()
        };
        let filter = env_filter(&config).to_string();
        assert!(filter.contains("sqlx=debug"));
        assert!(filter.contains("info"));
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
