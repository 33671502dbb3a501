//! Shared configuration types for dbtour
//!
//! This crate provides the configuration used across the workspace:
//! - MySQL connection settings
//! - Connection pool tuning knobs
//! - Environment and logging configuration

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, LogFormat, LoggingConfig, MySqlConfig, Network, PoolConfig,
};
