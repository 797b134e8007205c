//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use jobnest_auth::session::RefreshTokenSweeper;
use jobnest_core::config::MaintenanceConfig;
use jobnest_core::error::AppError;

/// Cron-based scheduler for the maintenance jobs
pub struct MaintenanceScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Schedules
    config: MaintenanceConfig,
    /// Expired refresh token sweep
    sweeper: Arc<RefreshTokenSweeper>,
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MaintenanceScheduler {
    /// Create a new scheduler. Nothing runs until [`Self::start`].
    pub async fn new(
        config: &MaintenanceConfig,
        sweeper: Arc<RefreshTokenSweeper>,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            config: config.clone(),
            sweeper,
        })
    }

    /// Register all configured tasks
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register_refresh_token_sweep().await?;
        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler shut down");
        Ok(())
    }

    /// Expired refresh token sweep, on `refresh_token_sweep_cron`
    async fn register_refresh_token_sweep(&self) -> Result<(), AppError> {
        let schedule = self.config.refresh_token_sweep_cron.as_str();
        let sweeper = Arc::clone(&self.sweeper);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                tracing::debug!("Running refresh token sweep");
                // The sweeper logs its own failures.
                let _ = sweeper.run_cleanup().await;
            })
        })
        .map_err(|e| {
            AppError::internal(format!(
                "Invalid refresh token sweep schedule '{schedule}': {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add refresh token sweep schedule: {e}"))
        })?;

        tracing::info!(schedule = schedule, "Registered: refresh_token_sweep");
        Ok(())
    }
}
