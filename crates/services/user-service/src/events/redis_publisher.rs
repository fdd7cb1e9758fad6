//! Redis pub/sub event publisher.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use tracing::debug;

use common::{AppError, AppResult};
use domain::UserEvent;

use super::EventPublisher;

/// Publishes events as JSON on a Redis channel.
pub struct RedisPublisher {
    conn: ConnectionManager,
    channel: String,
}

impl RedisPublisher {
    /// Connect to Redis.
    pub async fn connect(url: &str, channel: impl Into<String>) -> Result<Self, RedisError> {
        let channel = channel.into();
        debug!("Connecting event publisher to Redis channel {}", channel);
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn, channel })
    }

    /// Channel this publisher writes to.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

/// Serialize an event into the wire payload.
pub(super) fn encode(event: &UserEvent) -> AppResult<String> {
    serde_json::to_string(event).map_err(AppError::notification)
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, event: &UserEvent) -> AppResult<()> {
        let payload = encode(event)?;
        let mut conn = self.conn.clone();

        let receivers: i64 = conn
            .publish(&self.channel, payload)
            .await
            .map_err(AppError::notification)?;

        debug!(
            channel = %self.channel,
            operation = %event.operation,
            receivers,
            "User event published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uses_wire_shape() {
        let payload = encode(&UserEvent::deleted("ann@x.com")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(json["operation"], "DELETE");
        assert_eq!(json["email"], "ann@x.com");
        assert!(json["timestamp"].is_string());
    }
}
