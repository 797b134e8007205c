//! Maintenance scheduler configuration.

use serde::{Deserialize, Serialize};

/// Periodic maintenance job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Whether the scheduler runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression for the expired refresh token sweep.
    #[serde(default = "default_sweep_cron")]
    pub refresh_token_sweep_cron: String,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            refresh_token_sweep_cron: default_sweep_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_cron() -> String {
    "0 0 * * * *".to_string()
}
