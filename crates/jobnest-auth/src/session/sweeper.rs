//! Periodic removal of expired refresh token rows.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use jobnest_core::error::AppError;

use super::ledger::RefreshTokenLedger;

/// Runs the ledger's expiry sweep and reports the outcome.
#[derive(Debug, Clone)]
pub struct RefreshTokenSweeper {
    ledger: Arc<RefreshTokenLedger>,
}

impl RefreshTokenSweeper {
    /// Creates a sweeper for the given ledger.
    pub fn new(ledger: Arc<RefreshTokenLedger>) -> Self {
        Self { ledger }
    }

    /// Runs one sweep. Returns the number of rows deleted.
    pub async fn run_cleanup(&self) -> Result<u64, AppError> {
        match self.ledger.sweep_expired(Utc::now()).await {
            Ok(0) => Ok(0),
            Ok(removed) => {
                info!(removed = removed, "Expired refresh tokens swept");
                Ok(removed)
            }
            Err(e) => {
                error!(error = %e, "Refresh token sweep failed");
                Err(e)
            }
        }
    }
}
