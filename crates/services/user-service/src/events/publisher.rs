//! Event publisher trait and in-process implementations.

use async_trait::async_trait;

use common::AppResult;
use domain::UserEvent;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Best-effort publisher of user events.
///
/// Delivery is at-most-once; implementations do not retry. Failures are
/// reported as `AppError::Notification`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &UserEvent) -> AppResult<()>;
}

/// Publisher used when notifications are not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event: &UserEvent) -> AppResult<()> {
        Ok(())
    }
}

/// Writes each event to the tracing log.
#[derive(Debug, Clone, Default)]
pub struct LogPublisher {
    channel: String,
}

impl LogPublisher {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &UserEvent) -> AppResult<()> {
        tracing::info!(
            channel = %self.channel,
            operation = %event.operation,
            email = %event.email,
            timestamp = %event.timestamp.to_rfc3339(),
            "User event"
        );
        Ok(())
    }
}
