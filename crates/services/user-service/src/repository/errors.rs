//! Mapping from driver failures to the application error taxonomy.
//!
//! Every `Persistence` error names the operation and its subject (user id or
//! email) so a failure can be logged and retried from the error alone.

use sea_orm::{DbErr, SqlErr};

use common::AppError;

/// PostgreSQL text for SQLSTATE 23505, seen when the driver error arrives
/// without a structured code.
const UNIQUE_VIOLATION_TEXT: &str = "duplicate key value violates unique constraint";

/// Wrap a failed read with the operation and subject that hit it.
pub(super) fn read_error(operation: impl Into<String>, err: DbErr) -> AppError {
    let operation = operation.into();
    tracing::error!(operation = %operation, "Record store read failed: {}", err);
    AppError::persistence(operation, err)
}

/// Map a failed insert or update of a row carrying `email`.
///
/// A unique-index violation means another writer committed the same email
/// between the uniqueness check and this write, so it is a duplicate.
pub(super) fn write_error(operation: impl Into<String>, email: &str, err: DbErr) -> AppError {
    write_failure(operation.into(), email, err.sql_err(), err)
}

/// Wrap a failed delete of user `id`.
pub(super) fn delete_error(id: i64, err: DbErr) -> AppError {
    let operation = format!("delete user {}", id);
    tracing::error!(operation = %operation, "Record store delete failed: {}", err);
    AppError::persistence(operation, err)
}

fn write_failure(operation: String, email: &str, sql_err: Option<SqlErr>, err: DbErr) -> AppError {
    let unique_violation = match sql_err {
        Some(SqlErr::UniqueConstraintViolation(detail)) => Some(detail),
        _ => {
            let text = err.to_string();
            text.contains(UNIQUE_VIOLATION_TEXT).then_some(text)
        }
    };

    match unique_violation {
        Some(detail) => {
            tracing::warn!(email, "Unique index rejected write: {}", detail);
            AppError::duplicate_email(email)
        }
        None => {
            let operation = format!("{} ({})", operation, email);
            tracing::error!(operation = %operation, "Record store write failed: {}", err);
            AppError::persistence(operation, err)
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::RuntimeErr;

    use super::*;

    fn postgres_unique_violation() -> DbErr {
        DbErr::Query(RuntimeErr::Internal(format!(
            "error returned from database: {} \"idx_users_email_unique\"",
            UNIQUE_VIOLATION_TEXT
        )))
    }

    #[test]
    fn test_structured_unique_violation_is_duplicate_email() {
        let err = write_failure(
            "insert user".to_string(),
            "ann@x.com",
            Some(SqlErr::UniqueConstraintViolation(
                "idx_users_email_unique".to_string(),
            )),
            DbErr::Custom("23505".to_string()),
        );
        assert_eq!(err, AppError::duplicate_email("ann@x.com"));
    }

    #[test]
    fn test_unique_violation_text_is_duplicate_email() {
        let err = write_error("update user 4", "ann@x.com", postgres_unique_violation());
        assert_eq!(err, AppError::duplicate_email("ann@x.com"));
    }

    #[test]
    fn test_generic_write_failure_names_subject() {
        let err = write_error("update user 4", "ann@x.com", DbErr::Custom("connection reset".into()));
        assert!(matches!(
            err,
            AppError::Persistence { ref operation, .. } if operation == "update user 4 (ann@x.com)"
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_read_failure_keeps_cause() {
        let err = read_error("find user by id 12", DbErr::Custom("timeout".into()));
        let text = err.to_string();
        assert!(text.contains("find user by id 12"));
        assert!(text.contains("timeout"));
    }

    #[test]
    fn test_delete_failure_names_id() {
        let err = delete_error(9, DbErr::Custom("connection reset".into()));
        assert!(matches!(
            err,
            AppError::Persistence { ref operation, .. } if operation == "delete user 9"
        ));
    }
}
