//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use saveserve_core::error::AppError;

use crate::executor::JobExecutor;

/// Cron-based scheduler driving the registered job handlers.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Executor the cron ticks dispatch into.
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register all default scheduled tasks.
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register("booking_expiry", "0 */5 * * * *", "every 5min").await?;
        self.register("listing_expiry", "0 */15 * * * *", "every 15min")
            .await?;
        self.register("ngo_window_release", "30 */5 * * * *", "every 5min")
            .await?;
        self.register("notification_cleanup", "0 0 2 * * *", "daily at 2AM")
            .await?;
        self.register("session_cleanup", "0 0 3 * * *", "daily at 3AM")
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    async fn register(
        &self,
        job_type: &'static str,
        schedule: &str,
        cadence: &str,
    ) -> Result<(), AppError> {
        let executor = Arc::clone(&self.executor);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            Box::pin(async move {
                if let Err(e) = executor.run(job_type).await {
                    tracing::error!("Scheduled job '{}' failed: {}", job_type, e);
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create {job_type} schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {job_type} schedule: {e}")))?;

        tracing::info!("Registered: {} ({})", job_type, cadence);
        Ok(())
    }
}
