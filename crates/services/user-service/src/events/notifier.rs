//! Dispatch of user events relative to the triggering call.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinSet;

use common::DispatchMode;
use domain::UserEvent;

use super::{EventPublisher, NoopPublisher};

/// Emits user events after a store mutation has committed.
///
/// A publish failure is logged and dropped. It never reaches the caller and
/// never undoes the mutation that triggered it.
///
/// Detached publishes are tracked so [`Notifier::drain`] can wait for them
/// before the process tears down its runtime.
#[derive(Clone)]
pub struct Notifier {
    publisher: Arc<dyn EventPublisher>,
    mode: DispatchMode,
    pending: Arc<Mutex<JoinSet<()>>>,
}

impl Notifier {
    pub fn new(publisher: Arc<dyn EventPublisher>, mode: DispatchMode) -> Self {
        Self {
            publisher,
            mode,
            pending: Arc::default(),
        }
    }

    /// Notifier that drops every event.
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopPublisher), DispatchMode::Inline)
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Emit an event.
    ///
    /// In `Detached` mode this returns as soon as the publish is spawned.
    /// Outside a Tokio runtime the event is dropped with a warning.
    pub async fn emit(&self, event: UserEvent) {
        match self.mode {
            DispatchMode::Inline => deliver(self.publisher.as_ref(), &event).await,
            DispatchMode::Detached => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let publisher = Arc::clone(&self.publisher);
                    let mut pending = self.pending();
                    // Reap finished publishes
                    while pending.try_join_next().is_some() {}
                    pending.spawn_on(
                        async move {
                            deliver(publisher.as_ref(), &event).await;
                        },
                        &handle,
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        operation = %event.operation,
                        email = %event.email,
                        "No runtime available, dropping user event"
                    );
                }
            },
        }
    }

    /// Wait for every detached publish spawned so far.
    ///
    /// Call before shutting the runtime down; afterwards in-flight events
    /// would be cancelled.
    pub async fn drain(&self) {
        let mut pending = std::mem::take(&mut *self.pending());
        if pending.is_empty() {
            return;
        }

        tracing::debug!(count = pending.len(), "Waiting for detached user events");
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("User event task did not complete: {}", e);
            }
        }
    }

    fn pending(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::noop()
    }
}

async fn deliver(publisher: &dyn EventPublisher, event: &UserEvent) {
    if let Err(e) = publisher.publish(event).await {
        tracing::warn!(
            operation = %event.operation,
            email = %event.email,
            "Failed to publish user event: {}",
            e
        );
    }
}
