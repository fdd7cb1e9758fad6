//! Domain events emitted after a user mutation commits.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{OPERATION_CREATE, OPERATION_DELETE, OPERATION_UPDATE};

/// Operation tag carried by a user event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserOperation {
    Create,
    Update,
    Delete,
}

impl UserOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserOperation::Create => OPERATION_CREATE,
            UserOperation::Update => OPERATION_UPDATE,
            UserOperation::Delete => OPERATION_DELETE,
        }
    }
}

impl fmt::Display for UserOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral notification payload. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvent {
    pub operation: UserOperation,
    pub email: String,
    /// Assigned at emission time
    pub timestamp: DateTime<Utc>,
}

impl UserEvent {
    /// Create an event stamped with the current time.
    pub fn new(operation: UserOperation, email: impl Into<String>) -> Self {
        Self {
            operation,
            email: email.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn created(email: impl Into<String>) -> Self {
        Self::new(UserOperation::Create, email)
    }

    pub fn updated(email: impl Into<String>) -> Self {
        Self::new(UserOperation::Update, email)
    }

    pub fn deleted(email: impl Into<String>) -> Self {
        Self::new(UserOperation::Delete, email)
    }
}
