//! # Infrastructure Layer
//!
//! Concrete MySQL implementations for the dbtour workspace:
//! - **Database**: connection pool management and repositories using SQLx
//! - **Bench**: the connection pool tuning benchmark harness
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core and shared types for convenience
pub use dt_core::errors::*;
pub use dt_shared::config::{MySqlConfig, PoolConfig};

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Connection pool benchmark harness
#[cfg(feature = "mysql")]
pub mod bench;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Benchmark run failed
    #[error("Benchmark error: {0}")]
    Benchmark(String),

    /// Error raised by a repository
    #[error(transparent)]
    Domain(#[from] DomainError),
}
