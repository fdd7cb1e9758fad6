//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The user-service and gateway crates share these types.

pub mod constants;
pub mod error;
pub mod event;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use event::{UserEvent, UserOperation};
pub use user::{NewUser, User, UserChanges, UserResponse};
