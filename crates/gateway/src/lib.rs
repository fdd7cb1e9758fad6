//! API Gateway Library
//!
//! This crate provides the HTTP REST API over the embedded user service.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use user_service_lib::infra::Database;
use user_service_lib::service::Services;

use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Run the HTTP server until it stops, then release the database handle.
pub async fn run_server(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect(&config.users.database).await?;

    let result = serve(&db, &config).await;

    if let Err(e) = db.close().await {
        warn!("Failed to close database connection: {}", e);
    }
    result
}

async fn serve(db: &Database, config: &GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let services = Services::from_config(db, &config.users).await?;

    let state = AppState::new(services.users(), db.clone());
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    services.shutdown().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
