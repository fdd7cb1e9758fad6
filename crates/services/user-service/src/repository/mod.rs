//! Repository layer for data access.
//!
//! The user service depends only on [`UserRepository`]. Two interchangeable
//! PostgreSQL backends implement it: [`UserStore`] over the SeaORM entity and
//! [`SqlUserStore`] over hand-written statements.

pub mod entities;
mod errors;
mod sql_user_repository;
mod user_repository;

pub use sql_user_repository::SqlUserStore;
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
