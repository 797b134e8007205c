//! # jobnest-auth
//!
//! Credential primitives for the JobNest identity core.
//!
//! ## Modules
//!
//! - `jwt`: signed access and refresh token creation and verification
//! - `password`: Argon2id password hashing and policy enforcement
//! - `session`: the refresh token ledger and its expiry sweep
//! - `verification`: single-use email verification and password reset tokens
//! - `rbac`: role checks used by request handlers

pub mod error;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;
pub mod verification;

pub use error::{AuthError, AuthResult};
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{ClientInfo, IssuedRefreshToken, RefreshTokenLedger, RefreshTokenSweeper};
pub use verification::OneTimeTokenIssuer;
