//! # jobnest-service
//!
//! Identity use cases for JobNest. [`AuthService`] orchestrates the
//! credential store, token codec, refresh token ledger and one-time token
//! issuers; mail dispatch and federated identity verification are injected
//! behind traits.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod auth;
pub mod context;
pub mod identity;
pub mod mail;

pub use auth::{AuthService, LoginResult, NewRegistration, RefreshResult, Registration};
pub use context::Principal;
pub use identity::{FederatedIdentity, GoogleTokenVerifier, IdentityVerifier};
pub use mail::{EmailDispatcher, HttpMailer, LogMailer, build_mailer};
