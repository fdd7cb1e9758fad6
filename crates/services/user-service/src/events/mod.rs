//! Event notification layer.
//!
//! Publishers deliver [`UserEvent`](domain::UserEvent)s to an external channel.
//! The [`Notifier`] decides when a publish runs and keeps its failures away
//! from the caller.

mod notifier;
mod publisher;
mod redis_publisher;

pub use notifier::Notifier;
pub use publisher::{EventPublisher, LogPublisher, NoopPublisher};
pub use redis_publisher::RedisPublisher;

#[cfg(any(test, feature = "test-utils"))]
pub use publisher::MockEventPublisher;
