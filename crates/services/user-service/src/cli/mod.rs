//! Command-line presentation adapter.
//!
//! Translates terminal input into user service calls and renders the
//! results. Input parsing and shape validation happen here, never in the
//! service.

mod shell;

use std::io::Write;

use common::{AppError, AppResult};
use domain::{NewUser, UserChanges};

use crate::service::UserService;

pub use shell::run_shell;

/// One-shot and interactive commands understood by the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Interactive numbered menu
    Shell,
    Create {
        name: String,
        email: String,
        age: i32,
    },
    Get {
        id: i64,
    },
    List,
    Update {
        id: i64,
        name: String,
        email: String,
        age: i32,
    },
    Delete {
        id: i64,
    },
}

/// Run a one-shot command, writing the outcome to `out`.
///
/// `Shell` is handled by [`run_shell`] and rejected here.
pub async fn execute<W: Write>(
    service: &dyn UserService,
    command: UserCommand,
    out: &mut W,
) -> AppResult<()> {
    match command {
        UserCommand::Shell => {
            return Err(AppError::internal("shell must be run through run_shell"));
        }
        UserCommand::Create { name, email, age } => {
            let draft = NewUser::new(name, email, age);
            draft.validate()?;
            let user = service.create_user(draft.name, draft.email, draft.age).await?;
            emit(out, format_args!("User created successfully: {}", user))?;
        }
        UserCommand::Get { id } => match service.find_user(id).await? {
            Some(user) => emit(out, format_args!("User found: {}", user))?,
            None => emit(out, format_args!("User not found with ID: {}", id))?,
        },
        UserCommand::List => {
            let users = service.list_users().await?;
            if users.is_empty() {
                emit(out, format_args!("No users found."))?;
            } else {
                emit(out, format_args!("Users:"))?;
                for user in users {
                    emit(out, format_args!("{}", user))?;
                }
            }
        }
        UserCommand::Update {
            id,
            name,
            email,
            age,
        } => {
            let changes = UserChanges::new(name, email, age);
            changes.validate()?;
            let user = service.update_user(id, changes).await?;
            emit(out, format_args!("User updated successfully: {}", user))?;
        }
        UserCommand::Delete { id } => {
            service.delete_user(id).await?;
            emit(out, format_args!("User deleted successfully"))?;
        }
    }

    Ok(())
}

fn emit<W: Write>(out: &mut W, line: std::fmt::Arguments<'_>) -> AppResult<()> {
    writeln!(out, "{}", line).map_err(io_error)
}

pub(crate) fn io_error(err: std::io::Error) -> AppError {
    AppError::internal(format!("Terminal I/O failed: {}", err))
}
