//! Single-use tokens for email verification and password reset.

pub mod issuer;

pub use issuer::OneTimeTokenIssuer;
