//! Account identity lifecycle.

pub mod service;
pub mod types;

pub use service::AuthService;
pub use types::{LoginResult, NewRegistration, RefreshResult, Registration};
