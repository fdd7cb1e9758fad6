//! Raw SQL implementation of UserRepository.
//!
//! Issues hand-written PostgreSQL statements over the shared connection
//! instead of going through the entity query builder.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement, Value,
};

use super::entities::user::Model;
use super::errors::{delete_error, read_error, write_error};
use super::UserRepository;
use common::{AppError, AppResult, DeletePolicy};
use domain::{NewUser, User};

const SELECT_BY_ID: &str =
    "SELECT id, name, email, age, created_at FROM users WHERE id = $1";
const SELECT_BY_EMAIL: &str =
    "SELECT id, name, email, age, created_at FROM users WHERE email = $1";
const SELECT_ALL: &str = "SELECT id, name, email, age, created_at FROM users ORDER BY id";
const EXISTS_BY_ID: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1) AS present";
const EXISTS_BY_EMAIL: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS present";
const INSERT: &str = "INSERT INTO users (name, email, age, created_at) VALUES ($1, $2, $3, $4) \
                      RETURNING id, name, email, age, created_at";
const UPDATE: &str = "UPDATE users SET name = $1, email = $2, age = $3 WHERE id = $4 \
                      RETURNING id, name, email, age, created_at";
const DELETE_BY_ID: &str = "DELETE FROM users WHERE id = $1";

/// Hand-written SQL implementation of UserRepository (PostgreSQL dialect)
pub struct SqlUserStore {
    db: Arc<DatabaseConnection>,
    delete_policy: DeletePolicy,
}

impl SqlUserStore {
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

    fn statement<I>(&self, sql: &str, values: I) -> Statement
    where
        I: IntoIterator<Item = Value>,
    {
        Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
    }

    async fn fetch_one(&self, operation: String, stmt: Statement) -> AppResult<Option<User>> {
        let row = Model::find_by_statement(stmt)
            .one(&*self.db)
            .await
            .map_err(|e| read_error(&operation, e))?;

        Ok(row.map(User::from))
    }

    async fn exists(&self, operation: String, stmt: Statement) -> AppResult<bool> {
        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(|e| read_error(&operation, e))?;

        match row {
            Some(row) => row
                .try_get::<bool>("", "present")
                .map_err(|e| read_error(&operation, e)),
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepository for SqlUserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let stmt = self.statement(SELECT_BY_ID, [id.into()]);
        self.fetch_one(format!("find user by id {}", id), stmt).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let stmt = self.statement(SELECT_BY_EMAIL, [email.into()]);
        self.fetch_one(format!("find user by email {}", email), stmt).await
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let stmt = Statement::from_string(DbBackend::Postgres, SELECT_ALL.to_owned());
        let rows = Model::find_by_statement(stmt)
            .all(&*self.db)
            .await
            .map_err(|e| read_error("list users", e))?;

        tracing::debug!("Found {} users", rows.len());
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let stmt = self.statement(EXISTS_BY_ID, [id.into()]);
        self.exists(format!("check user id {}", id), stmt).await
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let stmt = self.statement(EXISTS_BY_EMAIL, [email.into()]);
        self.exists(format!("check user email {}", email), stmt).await
    }

    async fn insert(&self, new_user: NewUser) -> AppResult<User> {
        let email = new_user.email.clone();
        let stmt = self.statement(
            INSERT,
            [
                new_user.name.into(),
                new_user.email.into(),
                new_user.age.into(),
                Utc::now().into(),
            ],
        );

        let row = Model::find_by_statement(stmt)
            .one(&*self.db)
            .await
            .map_err(|e| write_error("insert user", &email, e))?
            .ok_or_else(|| AppError::persistence("insert user", "INSERT returned no row"))?;

        tracing::debug!(id = row.id, "User row inserted");
        Ok(User::from(row))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let id = user.id;
        let email = user.email.clone();
        let stmt = self.statement(
            UPDATE,
            [
                user.name.into(),
                user.email.into(),
                user.age.into(),
                id.into(),
            ],
        );

        let row = Model::find_by_statement(stmt)
            .one(&*self.db)
            .await
            .map_err(|e| write_error(format!("update user {}", id), &email, e))?;

        row.map(User::from).ok_or(AppError::not_found(id))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let stmt = self.statement(DELETE_BY_ID, [id.into()]);
        let result = self
            .db
            .execute(stmt)
            .await
            .map_err(|e| delete_error(id, e))?;

        if result.rows_affected() == 0 && self.delete_policy == DeletePolicy::Strict {
            return Err(AppError::not_found(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr, Transaction};

    use super::*;

    fn store(db: DatabaseConnection) -> SqlUserStore {
        SqlUserStore::new(Arc::new(db))
    }

    fn model(id: i64) -> Model {
        Model {
            id,
            name: "Bo".to_string(),
            email: "bo@x.com".to_string(),
            age: 40,
            created_at: Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_issues_parameterized_select() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(2)]])
            .into_connection();
        let store = store(db);

        let user = store.find_by_id(2).await.unwrap().unwrap();
        assert_eq!(user.name, "Bo");

        let log = Arc::try_unwrap(store.db).ok().unwrap().into_transaction_log();
        assert_eq!(
            log,
            vec![Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                SELECT_BY_ID,
                [2i64.into()],
            )]
        );
    }

    #[tokio::test]
    async fn test_exists_by_email_reads_flag() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("present", Value::from(true))])]])
            .into_connection();

        assert!(store(db).exists_by_email("bo@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_without_returning_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = store(db).update(User::from(model(5))).await;

        assert_eq!(result, Err(AppError::not_found(5)));
    }

    #[tokio::test]
    async fn test_strict_delete_of_missing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let store = store(db).with_delete_policy(DeletePolicy::Strict);
        assert_eq!(store.delete_by_id(3).await, Err(AppError::not_found(3)));
    }

    #[tokio::test]
    async fn test_insert_rejected_by_unique_index_is_duplicate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                "duplicate key value violates unique constraint \"idx_users_email_unique\""
                    .to_string(),
            ))])
            .into_connection();

        let result = store(db).insert(NewUser::new("Bo", "bo@x.com", 40)).await;

        assert_eq!(result, Err(AppError::duplicate_email("bo@x.com")));
    }

    #[tokio::test]
    async fn test_read_failure_names_the_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("pool timed out".to_string())])
            .into_connection();

        let err = store(db).find_by_id(12345).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(err.to_string().contains("find user by id 12345"));
    }
}
