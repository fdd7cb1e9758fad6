//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Event Operations
// =============================================================================

/// Operation tag for a user creation event
pub const OPERATION_CREATE: &str = "CREATE";

/// Operation tag for a user update event (only emitted when enabled)
pub const OPERATION_UPDATE: &str = "UPDATE";

/// Operation tag for a user deletion event
pub const OPERATION_DELETE: &str = "DELETE";

/// Default channel that user events are published to
pub const DEFAULT_EVENTS_CHANNEL: &str = "user-events";

// =============================================================================
// Validation
// =============================================================================

/// Minimum name length requirement
pub const MIN_NAME_LENGTH: usize = 1;

/// Minimum accepted age
pub const MIN_AGE: i32 = 0;

/// Character every email address must contain
pub const EMAIL_SEPARATOR: char = '@';

/// Check a display name before it reaches the service.
pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LENGTH
}

/// Check an email address before it reaches the service.
///
/// This is a shape check only. Uniqueness is enforced by the user service.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once(EMAIL_SEPARATOR) {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

/// Check an age value before it reaches the service.
pub fn is_valid_age(age: i32) -> bool {
    age >= MIN_AGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("Ann"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("   "));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ann@x.com"));
        assert!(!is_valid_email("ann.x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("ann@"));
    }

    #[test]
    fn test_age_validation() {
        assert!(is_valid_age(0));
        assert!(is_valid_age(30));
        assert!(!is_valid_age(-1));
    }
}
