//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring batch-refresh job.

use std::sync::Arc;

use koltrack_scraper::ScrapeClient;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Registers the periodic batch refresh and starts the scheduler. Returns
/// the running [`JobScheduler`] handle, which must be kept alive for the
/// lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered (including an invalid cron expression), or
/// the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    scraper: Arc<ScrapeClient>,
    schedule: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_refresh_job(&scheduler, pool, scraper, schedule).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring batch-refresh job.
///
/// Every tick re-fetches engagement counts for all tracked posts through
/// one provider call and appends an observation to each matched post.
/// Failures are logged and dropped — the next tick runs regardless; there
/// is no retry inside a tick.
async fn register_refresh_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    scraper: Arc<ScrapeClient>,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let pool = pool.clone();
        let scraper = Arc::clone(&scraper);

        Box::pin(async move {
            tracing::info!("scheduler: starting batch refresh");
            match koltrack_engine::refresh_all(&pool, &scraper).await {
                Ok(refreshed) => {
                    tracing::info!(refreshed = refreshed.len(), "scheduler: batch refresh complete");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: batch refresh failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
