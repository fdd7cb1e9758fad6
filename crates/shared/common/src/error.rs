//! Unified error handling for the user service and its adapters.
//!
//! Provides a single error type that can be:
//! - returned from the record store, event notifier and user service
//! - rendered as an Axum HTTP response (for the gateway)
//! - printed by the CLI

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // Business rule failures
    #[error("User with email {email} already exists")]
    DuplicateEmail { email: String },

    #[error("User not found with id: {id}")]
    NotFound { id: i64 },

    // Validation
    #[error("{0}")]
    Validation(String),

    // Record store failures
    #[error("Persistence error during {operation}: {cause}")]
    Persistence { operation: String, cause: String },

    // Event channel failures (never returned by the user service)
    #[error("Notification error: {0}")]
    Notification(String),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DuplicateEmail { .. } => "DUPLICATE_EMAIL",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Persistence { .. } => "PERSISTENCE_ERROR",
            AppError::Notification(_) => "NOTIFICATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Notification(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Business-rule failures the caller can correct by changing its input.
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            AppError::DuplicateEmail { .. } | AppError::NotFound { .. } | AppError::Validation(_)
        )
    }

    /// Infrastructure faults worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Persistence { .. })
    }

    /// Get user-facing message (hides infrastructure details)
    pub fn user_message(&self) -> String {
        match self {
            // Business rule failures are surfaced verbatim
            AppError::DuplicateEmail { .. } | AppError::NotFound { .. } => self.to_string(),
            AppError::Validation(msg) => msg.clone(),

            AppError::Persistence { operation, cause } => {
                tracing::error!(operation = %operation, "Persistence error: {}", cause);
                "A storage error occurred, please retry".to_string()
            }
            AppError::Notification(msg) => {
                tracing::error!("Notification error: {}", msg);
                "An event delivery error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, id: i64) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, id: i64) -> AppResult<T> {
        self.ok_or(AppError::NotFound { id })
    }
}

/// Convenience constructors
impl AppError {
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        AppError::DuplicateEmail {
            email: email.into(),
        }
    }

    pub fn not_found(id: i64) -> Self {
        AppError::NotFound { id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Wrap a record store failure with the operation that hit it.
    pub fn persistence(operation: impl Into<String>, cause: impl Display) -> Self {
        AppError::Persistence {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    pub fn notification(cause: impl Display) -> Self {
        AppError::Notification(cause.to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_business_errors_embed_identifier() {
        assert_eq!(
            AppError::duplicate_email("ann@x.com").to_string(),
            "User with email ann@x.com already exists"
        );
        assert_eq!(AppError::not_found(7).to_string(), "User not found with id: 7");
    }

    #[test]
    fn test_persistence_message_hides_cause() {
        let err = AppError::persistence("insert user ann@x.com", "connection reset");
        assert_eq!(err.user_message(), "A storage error occurred, please retry");
        assert!(err.to_string().contains("connection reset"));
        assert!(err.is_retryable());
        assert!(!err.is_caller_correctable());
    }

    #[test]
    fn test_domain_error_conversion() {
        assert_eq!(
            AppError::from(DomainError::validation("bad")),
            AppError::validation("bad")
        );
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        assert_eq!(missing.ok_or_not_found(9), Err(AppError::not_found(9)));
        assert_eq!(Some(1u8).ok_or_not_found(9), Ok(1));
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = AppError::duplicate_email("ann@x.com").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "DUPLICATE_EMAIL");
        assert_eq!(
            json["error"]["message"],
            "User with email ann@x.com already exists"
        );
    }
}
