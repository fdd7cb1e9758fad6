//! Service layer - business use cases.

mod container;
mod user_service;

pub use container::Services;
pub use user_service::{UserManager, UserService};
