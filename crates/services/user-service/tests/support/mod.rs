//! In-memory fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use common::{AppError, AppResult, DispatchMode};
use domain::{NewUser, User, UserEvent};
use user_service_lib::events::{EventPublisher, Notifier};
use user_service_lib::repository::UserRepository;
use user_service_lib::service::UserManager;

/// In-memory record store with per-operation call counters.
#[derive(Default)]
pub struct InMemoryUserStore {
    rows: Mutex<BTreeMap<i64, User>>,
    next_id: AtomicUsize,
    /// Reject duplicate emails on write like a unique index would
    unique_email: bool,
    /// Yield inside existence checks so concurrent callers interleave
    yield_on_check: bool,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
    pub email_checks: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique_index(mut self) -> Self {
        self.unique_email = true;
        self
    }

    pub fn with_interleaving(mut self) -> Self {
        self.yield_on_check = true;
        self
    }

    pub fn snapshot(&self) -> Vec<User> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    fn email_taken(rows: &BTreeMap<i64, User>, email: &str, except: Option<i64>) -> bool {
        rows.values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.email_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(self.snapshot())
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        Ok(self.rows.lock().unwrap().contains_key(&id))
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        self.email_checks.fetch_add(1, Ordering::SeqCst);
        let taken = Self::email_taken(&self.rows.lock().unwrap(), email, None);
        if self.yield_on_check {
            tokio::task::yield_now().await;
        }
        Ok(taken)
    }

    async fn insert(&self, user: NewUser) -> AppResult<User> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if self.unique_email && Self::email_taken(&rows, &user.email, None) {
            return Err(AppError::duplicate_email(user.email));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let stored = User {
            id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: Utc::now(),
        };
        rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if self.unique_email && Self::email_taken(&rows, &user.email, Some(user.id)) {
            return Err(AppError::duplicate_email(user.email));
        }

        let existing = rows.get_mut(&user.id).ok_or(AppError::not_found(user.id))?;
        existing.name = user.name;
        existing.email = user.email;
        existing.age = user.age;
        Ok(existing.clone())
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Publisher that records every event it receives.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<UserEvent>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            events: Mutex::default(),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<UserEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &UserEvent) -> AppResult<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(AppError::notification("channel closed"));
        }
        Ok(())
    }
}

/// Service over a fresh store and recording publisher, dispatching inline.
pub fn service_with(
    store: InMemoryUserStore,
) -> (UserManager, Arc<InMemoryUserStore>, Arc<RecordingPublisher>) {
    let store = Arc::new(store);
    let publisher = Arc::new(RecordingPublisher::default());
    let notifier = Notifier::new(publisher.clone(), DispatchMode::Inline);
    let service = UserManager::with_notifier(store.clone(), notifier);
    (service, store, publisher)
}
