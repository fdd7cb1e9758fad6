//! User domain entity and related types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{is_valid_age, is_valid_email, is_valid_name};
use crate::error::{DomainError, DomainResult};

/// User domain entity.
///
/// `id` and `created_at` are assigned by the record store on insert and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Apply new mutable fields, keeping identity and creation time.
    pub fn apply(&mut self, changes: UserChanges) {
        self.name = changes.name;
        self.email = changes.email;
        self.age = changes.age;
    }

    /// Check whether this user currently holds the given email.
    ///
    /// Comparison is exact and case-sensitive.
    pub fn has_email(&self, email: &str) -> bool {
        self.email == email
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User{{id={}, name='{}', email='{}', age={}, createdAt={}}}",
            self.id,
            self.name,
            self.email,
            self.age,
            self.created_at.format("%Y-%m-%dT%H:%M:%S")
        )
    }
}

/// A user that has not been persisted yet (no id, no creation time).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    /// User display name
    pub name: String,
    /// User email address
    pub email: String,
    /// User age
    pub age: i32,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    /// Shape-check the fields. Presentation adapters call this before the service.
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, &self.email, self.age)
    }
}

/// Replacement values for the mutable fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserChanges {
    /// New display name
    pub name: String,
    /// New email address
    pub email: String,
    /// New age
    pub age: i32,
}

impl UserChanges {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    /// Shape-check the fields. Presentation adapters call this before the service.
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, &self.email, self.age)
    }
}

fn validate_fields(name: &str, email: &str, age: i32) -> DomainResult<()> {
    if !is_valid_name(name) {
        return Err(DomainError::validation("Name cannot be empty"));
    }
    if !is_valid_email(email) {
        return Err(DomainError::validation("Invalid email format"));
    }
    if !is_valid_age(age) {
        return Err(DomainError::validation("Age cannot be negative"));
    }
    Ok(())
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Store-assigned user identifier
    pub id: i64,
    /// User display name
    pub name: String,
    /// User email address
    pub email: String,
    /// User age
    pub age: i32,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_user() -> User {
        User {
            id: 1,
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            age: 30,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut user = sample_user();
        let created_at = user.created_at;

        user.apply(UserChanges::new("Annie", "annie@x.com", 31));

        assert_eq!(user.id, 1);
        assert_eq!(user.created_at, created_at);
        assert_eq!(user.name, "Annie");
        assert_eq!(user.email, "annie@x.com");
        assert_eq!(user.age, 31);
    }

    #[test]
    fn test_has_email_is_case_sensitive() {
        let user = sample_user();
        assert!(user.has_email("ann@x.com"));
        assert!(!user.has_email("Ann@x.com"));
    }

    #[test]
    fn test_display_matches_record_line() {
        assert_eq!(
            sample_user().to_string(),
            "User{id=1, name='Ann', email='ann@x.com', age=30, createdAt=2024-01-02T03:04:05}"
        );
    }

    #[test]
    fn test_new_user_validation() {
        assert!(NewUser::new("Ann", "ann@x.com", 30).validate().is_ok());
        assert_eq!(
            NewUser::new(" ", "ann@x.com", 30).validate(),
            Err(DomainError::validation("Name cannot be empty"))
        );
        assert_eq!(
            NewUser::new("Ann", "ann", 30).validate(),
            Err(DomainError::validation("Invalid email format"))
        );
        assert_eq!(
            UserChanges::new("Ann", "ann@x.com", -3).validate(),
            Err(DomainError::validation("Age cannot be negative"))
        );
    }

    #[test]
    fn test_response_uses_camel_case() {
        let json = serde_json::to_value(UserResponse::from(sample_user())).unwrap();
        assert_eq!(json["createdAt"], "2024-01-02T03:04:05Z");
        assert_eq!(json["age"], 30);
    }
}
