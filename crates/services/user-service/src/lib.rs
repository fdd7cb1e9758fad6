//! User Service Library
//!
//! This crate provides user management: the record store, the event
//! notifier, the user service that coordinates them, and a command-line
//! front end. The gateway crate embeds it to serve HTTP.

pub mod cli;
pub mod config;
pub mod events;
pub mod infra;
pub mod repository;
pub mod service;

use std::io::Write;

use tokio::io::BufReader;
use tracing::{info, warn};

use crate::cli::UserCommand;
use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::service::Services;

/// Run one CLI command against a freshly acquired database handle.
///
/// Pending events are delivered and the handle is released before
/// returning, whether the command succeeded or failed.
pub async fn run_cli(command: UserCommand) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    let db = Database::connect(&config.database).await?;

    let result = run_with_database(&db, &config, command).await;

    if let Err(e) = db.close().await {
        warn!("Failed to close database connection: {}", e);
    }
    result
}

async fn run_with_database(
    db: &Database,
    config: &UserServiceConfig,
    command: UserCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = Services::from_config(db, config).await?;
    let mut out = std::io::stdout();

    let result = run_command(&services, command, &mut out).await;

    // Detached events would be cancelled with the runtime
    services.shutdown().await;

    result?;
    out.flush()?;
    Ok(())
}

async fn run_command(
    services: &Services,
    command: UserCommand,
    out: &mut std::io::Stdout,
) -> common::AppResult<()> {
    let users = services.users();

    match command {
        UserCommand::Shell => {
            info!("Starting interactive user shell");
            let input = BufReader::new(tokio::io::stdin());
            cli::run_shell(users.as_ref(), input, out).await
        }
        other => cli::execute(users.as_ref(), other, out).await,
    }
}
