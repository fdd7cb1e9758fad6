//! Service container - builds the user service from configuration.
//!
//! Replaces a process-wide session factory: the database handle is acquired
//! once by the caller and passed in here explicitly.

use std::sync::Arc;

use common::{AppError, AppResult, EventsConfig, NotifierKind, StoreBackend, StoreConfig};

use super::{UserManager, UserService};
use crate::config::UserServiceConfig;
use crate::events::{EventPublisher, LogPublisher, NoopPublisher, Notifier, RedisPublisher};
use crate::infra::Database;
use crate::repository::{SqlUserStore, UserRepository, UserStore};

/// Wired services for one process.
#[derive(Clone)]
pub struct Services {
    user_service: Arc<dyn UserService>,
    notifier: Notifier,
}

impl Services {
    /// Wrap an already-built user service and the notifier it emits through
    pub fn new(user_service: Arc<dyn UserService>, notifier: Notifier) -> Self {
        Self {
            user_service,
            notifier,
        }
    }

    /// Build the store, notifier and user service selected by `config`
    pub async fn from_config(db: &Database, config: &UserServiceConfig) -> AppResult<Self> {
        let repo = build_repository(db, &config.store);
        let notifier = build_notifier(&config.events).await?;

        let user_service = UserManager::with_notifier(repo, notifier.clone())
            .emit_on_update(config.events.notify_on_update);

        Ok(Self::new(Arc::new(user_service), notifier))
    }

    /// Get user service
    pub fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    /// Wait for detached event publishes. Call before closing the database.
    pub async fn shutdown(&self) {
        self.notifier.drain().await;
    }
}

/// Pick the record store backend.
pub fn build_repository(db: &Database, config: &StoreConfig) -> Arc<dyn UserRepository> {
    tracing::info!(backend = ?config.backend, "Using record store backend");
    match config.backend {
        StoreBackend::Orm => Arc::new(
            UserStore::new(db.get_connection()).with_delete_policy(config.delete_policy),
        ),
        StoreBackend::Sql => Arc::new(
            SqlUserStore::new(db.get_connection()).with_delete_policy(config.delete_policy),
        ),
    }
}

/// Pick the event publisher and dispatch mode.
pub async fn build_notifier(config: &EventsConfig) -> AppResult<Notifier> {
    let publisher: Arc<dyn EventPublisher> = match config.notifier {
        NotifierKind::None => Arc::new(NoopPublisher),
        NotifierKind::Log => Arc::new(LogPublisher::new(config.channel.clone())),
        NotifierKind::Redis => {
            let publisher = RedisPublisher::connect(&config.redis_url, config.channel.clone())
                .await
                .map_err(|e| AppError::internal(format!("Failed to connect to Redis: {}", e)))?;
            Arc::new(publisher)
        }
    };

    tracing::info!(
        notifier = ?config.notifier,
        dispatch = ?config.dispatch,
        channel = %config.channel,
        "Event notifier configured"
    );
    Ok(Notifier::new(publisher, config.dispatch))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use common::DispatchMode;
    use domain::{NewUser, User, UserEvent};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::repository::MockUserRepository;

    #[derive(Default)]
    struct CountingPublisher {
        published: AtomicUsize,
    }

    #[async_trait]
    impl EventPublisher for CountingPublisher {
        async fn publish(&self, _event: &UserEvent) -> AppResult<()> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.published.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_detached_events() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email().returning(|_| Ok(false));
        repo.expect_insert().returning(|new: NewUser| {
            Ok(User {
                id: 1,
                name: new.name,
                email: new.email,
                age: new.age,
                created_at: Utc::now(),
            })
        });

        let publisher = Arc::new(CountingPublisher::default());
        let notifier = Notifier::new(publisher.clone(), DispatchMode::Detached);
        let services = Services::new(
            Arc::new(UserManager::with_notifier(Arc::new(repo), notifier.clone())),
            notifier,
        );

        services
            .users()
            .create_user("Ann".into(), "ann@x.com".into(), 30)
            .await
            .unwrap();
        services.shutdown().await;

        assert_eq!(publisher.published.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_build_in_process_notifier() {
        let config = EventsConfig {
            notifier: NotifierKind::Log,
            dispatch: DispatchMode::Inline,
            ..EventsConfig::default()
        };

        let notifier = build_notifier(&config).await.unwrap();
        assert_eq!(notifier.mode(), DispatchMode::Inline);
    }

    #[tokio::test]
    async fn test_from_config_with_mock_database() {
        let db = Database::from_connection(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let mut config = UserServiceConfig::default();
        config.store.backend = StoreBackend::Sql;
        config.events.notifier = NotifierKind::None;

        let services = Services::from_config(&db, &config).await;
        assert!(services.is_ok());
    }
}
