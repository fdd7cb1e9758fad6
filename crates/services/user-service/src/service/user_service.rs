//! User service - Handles user-related business logic.
//!
//! Owns the email uniqueness invariant and orchestrates each use case against
//! the record store, followed by a non-blocking notification.
//!
//! Uniqueness is a check-then-act sequence and is not atomic on its own. Two
//! concurrent creates with the same email can both pass the check; the unique
//! index on `users.email` rejects the second write and the store reports it as
//! `DuplicateEmail`.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{NewUser, User, UserChanges, UserEvent};

use crate::events::Notifier;
use crate::repository::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user; fails with `DuplicateEmail` if the email is taken
    async fn create_user(&self, name: String, email: String, age: i32) -> AppResult<User>;

    /// Get user by ID; fails with `NotFound` if absent
    async fn get_user(&self, id: i64) -> AppResult<User>;

    /// Look up a user by ID, `None` if absent
    async fn find_user(&self, id: i64) -> AppResult<Option<User>>;

    /// List every user (empty when there are none)
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Replace name, email and age of an existing user
    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<User>;

    /// Delete an existing user; fails with `NotFound` if absent
    async fn delete_user(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    notifier: Notifier,
    emit_on_update: bool,
}

impl UserManager {
    /// Create new user service instance with repository and no notifications
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self::with_notifier(repo, Notifier::noop())
    }

    /// Create new user service instance that emits events through `notifier`
    pub fn with_notifier(repo: Arc<dyn UserRepository>, notifier: Notifier) -> Self {
        Self {
            repo,
            notifier,
            emit_on_update: false,
        }
    }

    /// Also emit an `UPDATE` event after each successful update
    pub fn emit_on_update(mut self, enabled: bool) -> Self {
        self.emit_on_update = enabled;
        self
    }

    async fn ensure_email_free(&self, email: &str) -> AppResult<()> {
        if self.repo.exists_by_email(email).await? {
            tracing::warn!(email, "Rejected duplicate email");
            return Err(AppError::duplicate_email(email));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, name: String, email: String, age: i32) -> AppResult<User> {
        tracing::info!(email = %email, "Creating new user");

        self.ensure_email_free(&email).await?;

        let user = self.repo.insert(NewUser { name, email, age }).await?;
        tracing::info!(id = user.id, "User created");

        self.notifier.emit(UserEvent::created(&user.email)).await;
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> AppResult<User> {
        tracing::info!(id, "Retrieving user by id");
        self.repo.find_by_id(id).await?.ok_or_not_found(id)
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        tracing::info!(id, "Looking up user by id");
        self.repo.find_by_id(id).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        tracing::info!("Retrieving all users");
        self.repo.find_all().await
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<User> {
        tracing::info!(id, "Updating user");

        let mut user = self.repo.find_by_id(id).await?.ok_or_not_found(id)?;

        // A user cannot collide with its own current email
        if !user.has_email(&changes.email) {
            self.ensure_email_free(&changes.email).await?;
        }

        user.apply(changes);
        let user = self.repo.update(user).await?;

        if self.emit_on_update {
            self.notifier.emit(UserEvent::updated(&user.email)).await;
        }
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        tracing::info!(id, "Deleting user");

        let user = self.repo.find_by_id(id).await?.ok_or_not_found(id)?;

        self.repo.delete_by_id(id).await?;
        tracing::info!(id, "User deleted");

        self.notifier.emit(UserEvent::deleted(user.email)).await;
        Ok(())
    }
}
