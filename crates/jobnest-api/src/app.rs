//! Application builder and HTTP server loop.

use std::future::Future;

use axum::Router;

use jobnest_core::config::ServerConfig;
use jobnest_core::error::AppError;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Binds the configured address and serves `app` until `shutdown` resolves.
pub async fn serve<F>(app: Router, config: &ServerConfig, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("JobNest server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("JobNest server stopped");
    Ok(())
}
