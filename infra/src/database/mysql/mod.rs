//! MySQL-specific database implementations
//!
//! This module contains MySQL implementations of the repositories using
//! SQLx for database operations.

pub mod doctor_repository_impl;
pub mod isbn_repository_impl;

// Re-export the MySQL implementations
pub use doctor_repository_impl::MySqlDoctorRepository;
pub use isbn_repository_impl::MySqlIsbnRepository;

use std::future::Future;
use std::time::Duration;

use dt_core::errors::DomainError;

/// Run one database round trip, failing with `Timeout` once `limit` elapses
pub(crate) async fn with_deadline<T, F>(
    limit: Duration,
    operation: &str,
    fut: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DomainError::Database {
            message: format!("{} failed: {}", operation, e),
        }),
        Err(_) => Err(DomainError::Timeout {
            operation: operation.to_string(),
        }),
    }
}
