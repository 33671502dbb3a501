//! Database module - MySQL implementations using SQLx
//!
//! This module provides database access layer implementations including:
//! - Connection pool management
//! - Repository implementations
//! - Schema bootstrap

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::{connect_options, DatabasePool, PoolStatistics};
pub use mysql::{MySqlDoctorRepository, MySqlIsbnRepository};
