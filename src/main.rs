mod auth;
mod blob;
mod config;
mod dashboard;
mod entities;
mod http;
mod models;
mod platform;
mod resolver;
mod state;
mod store;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::PgAuthGate;
use crate::blob::FsBlobStore;
use crate::config::ApiConfig;
use crate::state::{AppState, DashboardSessions};
use crate::store::PgLinkStore;
use anyhow::{Context, Result};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::ConnectOptions;
use sea_orm::Database;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ApiConfig::load().context("Failed to load configuration")?;
    let database = connect_database(&config).await?;
    run_migrations(&database).await?;

    tokio::fs::create_dir_all(config.storage.root.join(&config.storage.bucket))
        .await
        .context("Failed to prepare blob storage directory")?;

    let app_state = AppState::new(
        Arc::new(PgLinkStore::new(database.clone())),
        Arc::new(PgAuthGate::new(database.clone())),
        Arc::new(FsBlobStore::new(&config.storage)),
        Arc::new(DashboardSessions::new(&config.dashboard)),
        config.site.clone(),
        config.storage.max_upload_bytes,
    );

    let listener = TcpListener::bind(config.server.address())
        .await
        .context("Failed to bind HTTP listener")?;
    let local_addr = listener
        .local_addr()
        .context("Failed to obtain listener address")?;
    info!("{} API listening on {local_addr}", config.site.name);

    let router: Router = http::router(app_state)
        .nest_service("/storage", ServeDir::new(&config.storage.root));
    let server = axum::serve(listener, router.into_make_service());
    server
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited with error")?;

    database
        .close()
        .await
        .context("Failed to close database pool")?;
    Ok(())
}

fn init_tracing() {
    let default_filter = "info";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    assert!(!filter.is_empty(), "Tracing filter must not be empty");
    assert!(filter.len() < 256, "Tracing filter length exceeds bounds");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false);

    match std::env::var("TAPLINK_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.compact().init(),
    }
}

async fn connect_database(config: &ApiConfig) -> Result<sea_orm::DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug)
        .acquire_timeout(Duration::from_secs(10));

    if let Some(min) = config.database.min_connections {
        options.min_connections(min);
    }

    Database::connect(options)
        .await
        .context("Failed to connect to PostgreSQL")
}

async fn run_migrations(database: &sea_orm::DatabaseConnection) -> Result<()> {
    migration::Migrator::up(database, None)
        .await
        .context("Database migrations failed")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
