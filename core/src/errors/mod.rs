//! Domain error types.

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Shorthand for a missing doctor row
    pub fn doctor_not_found(id: i64) -> Self {
        DomainError::NotFound {
            resource: format!("doctor {}", id),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
