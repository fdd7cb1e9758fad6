//! User repository trait and its SeaORM entity implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, Unchanged,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::errors::{delete_error, read_error, write_error};
use common::{AppError, AppResult, DeletePolicy};
use domain::{NewUser, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Record store contract for user records.
///
/// Lookups return `None` for missing rows rather than failing. Store failures
/// surface as `AppError::Persistence`. The store does not enforce email
/// uniqueness itself, apart from mapping a unique-index violation on write to
/// `AppError::DuplicateEmail`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find user by exact email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Snapshot of every user, ordered by ID
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Check for a user ID without loading the row
    async fn exists_by_id(&self, id: i64) -> AppResult<bool>;

    /// Check for an email without loading the row
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Insert a new user; the store assigns `id` and `created_at`
    async fn insert(&self, user: NewUser) -> AppResult<User>;

    /// Persist name, email and age of an existing user
    async fn update(&self, user: User) -> AppResult<User>;

    /// Delete a user by ID (missing rows handled per [`DeletePolicy`])
    async fn delete_by_id(&self, id: i64) -> AppResult<()>;
}

/// SeaORM entity implementation of UserRepository
pub struct UserStore {
    db: Arc<DatabaseConnection>,
    delete_policy: DeletePolicy,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            delete_policy: DeletePolicy::default(),
        }
    }

    /// Choose how deleting a missing row behaves
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(|e| read_error(format!("find user by id {}", id), e))?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(|e| read_error(format!("find user by email {}", email), e))?;

        Ok(result.map(User::from))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| read_error("list users", e))?;

        tracing::debug!("Found {} users", models.len());
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let count = UserEntity::find_by_id(id)
            .count(&*self.db)
            .await
            .map_err(|e| read_error(format!("check user id {}", id), e))?;

        Ok(count > 0)
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .count(&*self.db)
            .await
            .map_err(|e| read_error(format!("check user email {}", email), e))?;

        Ok(count > 0)
    }

    async fn insert(&self, new_user: NewUser) -> AppResult<User> {
        let email = new_user.email.clone();
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(new_user.name),
            email: Set(new_user.email),
            age: Set(new_user.age),
            created_at: Set(Utc::now()),
        };

        let model = active_model
            .insert(&*self.db)
            .await
            .map_err(|e| write_error("insert user", &email, e))?;

        tracing::debug!(id = model.id, "User row inserted");
        Ok(User::from(model))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let id = user.id;
        let email = user.email.clone();

        // created_at is left NotSet so it is never rewritten
        let active = ActiveModel {
            id: Unchanged(id),
            name: Set(user.name),
            email: Set(user.email),
            age: Set(user.age),
            created_at: NotSet,
        };

        let model = active.update(&*self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => AppError::not_found(id),
            other => write_error(format!("update user {}", id), &email, other),
        })?;

        Ok(User::from(model))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(|e| delete_error(id, e))?;

        if result.rows_affected == 0 && self.delete_policy == DeletePolicy::Strict {
            return Err(AppError::not_found(id));
        }

        Ok(())
    }
}
