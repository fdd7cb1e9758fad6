//! Database connection and initialization.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Statement,
};
use sea_orm_migration::MigratorTrait;

use common::DatabaseConfig;

use super::migrations::Migrator;

/// Database wrapper for connection management.
///
/// Acquired once at startup and handed to the stores that need it. Call
/// [`Database::close`] on shutdown to release the pool.
///
/// `DatabaseConnection` is not `Clone` under SeaORM's `mock` feature, so the
/// stores share it through an `Arc`.
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
}

impl Database {
    /// Open the connection pool and bootstrap the schema.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let connection = SeaDatabase::connect(options).await?;

        Migrator::up(&connection, None).await?;
        tracing::info!("Database connected and schema ready");

        Ok(Self::from_connection(connection))
    }

    /// Wrap an existing connection (mock databases in tests).
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self {
            connection: Arc::new(connection),
        }
    }

    /// Get a shared handle to the database connection.
    pub fn get_connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.connection)
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }

    /// Release the connection pool.
    ///
    /// Stores built from this handle must be dropped first. If another handle
    /// is still alive the pool is released when the last one drops.
    pub async fn close(self) -> Result<(), DbErr> {
        match Arc::try_unwrap(self.connection) {
            Ok(connection) => {
                connection.close().await?;
                tracing::info!("Database connection closed");
            }
            Err(shared) => {
                tracing::warn!(
                    handles = Arc::strong_count(&shared) - 1,
                    "Database still shared at close, pool released on last drop"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn mock_database() -> Database {
        Database::from_connection(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        )
    }

    #[tokio::test]
    async fn test_clones_share_one_connection() {
        let db = mock_database();
        let handle = db.clone();

        assert!(Arc::ptr_eq(&db.get_connection(), &handle.get_connection()));
        assert!(handle.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_close_while_shared_defers_to_last_handle() {
        let db = mock_database();
        let store_handle = db.get_connection();

        assert!(db.close().await.is_ok());
        assert_eq!(Arc::strong_count(&store_handle), 1);
    }

    #[tokio::test]
    async fn test_close_sole_handle_releases_pool() {
        assert!(mock_database().close().await.is_ok());
    }
}
