//! # jobnest-api
//!
//! HTTP API layer for JobNest built on Axum.
//!
//! Provides the auth and account endpoints, the request authentication gate,
//! extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use middleware::auth::PublicRoutes;
pub use state::AppState;
