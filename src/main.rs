//! JobNest Server: identity and access core of the JobNest job board.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use jobnest_api::{AppState, build_app, serve};
use jobnest_auth::session::RefreshTokenSweeper;
use jobnest_core::config::AppConfig;
use jobnest_core::error::AppError;
use jobnest_database::DatabasePool;
use jobnest_service::{AuthService, GoogleTokenVerifier, build_mailer};
use jobnest_worker::MaintenanceScheduler;

#[tokio::main]
async fn main() {
    let env = std::env::var("JOBNEST_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting JobNest v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.jwt_secret == "CHANGE_ME_IN_PRODUCTION" {
        tracing::warn!("Using the default JWT secret; set JOBNEST__AUTH__JWT_SECRET");
    }

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = DatabasePool::connect(&config.database).await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        db_pool.migrate().await?;
        tracing::info!("Database migrations complete");
    }

    // ── Step 2: Identity core ────────────────────────────────────
    let stores = db_pool.stores();
    let mailer = build_mailer(&config.mail)?;
    let auth = AuthService::new(&config.auth, &stores, mailer)?;
    let sweeper = Arc::new(RefreshTokenSweeper::new(auth.ledger()));
    let identity = Arc::new(GoogleTokenVerifier::new(&config.auth)?);

    // ── Step 3: Maintenance scheduler ────────────────────────────
    let mut scheduler = if config.maintenance.enabled {
        let scheduler = MaintenanceScheduler::new(&config.maintenance, sweeper).await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Maintenance scheduler disabled");
        None
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let server_config = config.server.clone();
    let state = AppState::new(config, auth, identity).with_database(db_pool.clone());
    let app = build_app(state);

    serve(app, &server_config, shutdown_signal()).await?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    db_pool.close().await;

    tracing::info!("JobNest shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
