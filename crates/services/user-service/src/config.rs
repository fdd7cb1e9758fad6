//! User service configuration.

use std::env;
use std::str::FromStr;

use common::{DatabaseConfig, DeletePolicy, EventsConfig, StoreConfig};

/// User service configuration.
#[derive(Debug, Clone, Default)]
pub struct UserServiceConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Record store backend selection
    pub store: StoreConfig,
    /// Event notification settings
    pub events: EventsConfig,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database: DatabaseConfig {
                url: env::var("USER_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.database.url),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(defaults.database.max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(defaults.database.min_connections),
            },
            store: StoreConfig {
                backend: parse_var("USER_STORE_BACKEND").unwrap_or(defaults.store.backend),
                delete_policy: match flag_var("USER_STORE_STRICT_DELETE") {
                    Some(true) => DeletePolicy::Strict,
                    Some(false) => DeletePolicy::Ignore,
                    None => defaults.store.delete_policy,
                },
            },
            events: EventsConfig {
                notifier: parse_var("NOTIFIER").unwrap_or(defaults.events.notifier),
                redis_url: env::var("USER_SERVICE_REDIS_URL")
                    .or_else(|_| env::var("REDIS_URL"))
                    .unwrap_or(defaults.events.redis_url),
                channel: env::var("USER_EVENTS_CHANNEL").unwrap_or(defaults.events.channel),
                dispatch: parse_var("NOTIFY_DISPATCH").unwrap_or(defaults.events.dispatch),
                notify_on_update: flag_var("NOTIFY_ON_UPDATE")
                    .unwrap_or(defaults.events.notify_on_update),
            },
        }
    }
}

/// Parse a variable, warning and falling back to the default when it is malformed.
fn parse_var<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring invalid {}={}: {}", name, raw, e);
            None
        }
    }
}

fn flag_var(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{DispatchMode, NotifierKind, StoreBackend};

    #[test]
    fn test_defaults() {
        let config = UserServiceConfig::default();
        assert_eq!(config.store.backend, StoreBackend::Orm);
        assert_eq!(config.store.delete_policy, DeletePolicy::Ignore);
        assert_eq!(config.events.notifier, NotifierKind::Log);
        assert_eq!(config.events.dispatch, DispatchMode::Detached);
        assert_eq!(config.events.channel, "user-events");
        assert!(!config.events.notify_on_update);
    }
}
