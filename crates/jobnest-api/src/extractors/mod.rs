//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod validated;

pub use auth::CurrentUser;
pub use client::ClientMeta;
pub use validated::ValidatedJson;
