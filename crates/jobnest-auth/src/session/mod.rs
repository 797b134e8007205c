//! Refresh token ledger and its periodic expiry sweep.

pub mod ledger;
pub mod sweeper;

pub use ledger::{ClientInfo, IssuedRefreshToken, RefreshTokenLedger, hash_token};
pub use sweeper::RefreshTokenSweeper;
