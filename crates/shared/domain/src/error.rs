//! Domain-level errors.
//!
//! Shape failures caught before a request reaches the user service. Business
//! rule failures (duplicate email, missing user) live in `common::AppError`.

use thiserror::Error;

/// Domain-specific errors for input shape violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
