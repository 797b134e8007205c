//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use jobnest_auth::jwt::JwtDecoder;
use jobnest_core::config::AppConfig;
use jobnest_database::DatabasePool;
use jobnest_database::store::AccountStore;
use jobnest_service::{AuthService, IdentityVerifier};

use crate::middleware::auth::PublicRoutes;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Identity use cases
    pub auth: Arc<AuthService>,
    /// Federated identity verifier
    pub identity: Arc<dyn IdentityVerifier>,
    /// Access token verifier used by the gate
    pub decoder: Arc<JwtDecoder>,
    /// Account lookups for the gate
    pub accounts: Arc<dyn AccountStore>,
    /// Paths admitted without authentication
    pub public_routes: Arc<PublicRoutes>,
    /// PostgreSQL pool, absent when running on the in-memory store
    pub database: Option<DatabasePool>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .field("public_routes", &self.public_routes)
            .field("database", &self.database.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Builds the state around an auth service.
    pub fn new(
        config: AppConfig,
        auth: AuthService,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            decoder: auth.decoder(),
            accounts: auth.accounts(),
            auth: Arc::new(auth),
            identity,
            public_routes: Arc::new(PublicRoutes::jobnest()),
            database: None,
        }
    }

    /// Attaches the PostgreSQL pool used by the health check.
    pub fn with_database(mut self, pool: DatabasePool) -> Self {
        self.database = Some(pool);
        self
    }
}
