//! Route definitions for the JobNest HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// The authentication gate runs on every request and only attaches a
/// principal; handlers that need one reject through `CurrentUser`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(account_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Auth endpoints: registration, login, tokens, passwords, verification
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/logout-all", post(handlers::auth::logout_all))
        .route(
            "/auth/password/forgot",
            post(handlers::auth::forgot_password),
        )
        .route("/auth/password/reset", post(handlers::auth::reset_password))
        .route(
            "/auth/password/change",
            post(handlers::auth::change_password),
        )
        .route("/auth/verify-email", post(handlers::auth::verify_email))
        .route(
            "/auth/resend-verification",
            post(handlers::auth::resend_verification),
        )
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/google/verify", post(handlers::auth::google_verify))
}

/// Account self-service and administration
fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/me",
            get(handlers::account::get_me).put(handlers::account::update_me),
        )
        .route(
            "/accounts/change-password",
            put(handlers::account::change_password),
        )
        .route("/accounts/block/{id}", post(handlers::account::block))
        .route("/accounts/unblock/{id}", post(handlers::account::unblock))
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
