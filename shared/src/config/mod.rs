//! Configuration module
//!
//! - `database` - MySQL connection settings and DSN formatting
//! - `pool` - connection pool tuning knobs
//! - `environment` - environment detection and logging configuration

pub mod database;
pub mod environment;
pub mod pool;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use database::{MySqlConfig, Network};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use pool::PoolConfig;

/// Look up `key` and parse it, ignoring values that do not parse
pub(crate) fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|value| value.trim().parse().ok())
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// MySQL connection configuration
    pub database: MySqlConfig,

    /// Pool tuning configuration
    #[serde(default)]
    pub pool: PoolConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// `LOG_LEVEL` and `LOG_FORMAT` override the environment's logging defaults.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|f| f.parse().ok()) {
            logging.format = format;
        }

        Self {
            environment,
            database: MySqlConfig::from_env(),
            pool: PoolConfig::from_env(),
            logging,
        }
    }
}
