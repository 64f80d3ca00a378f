//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring enrichment drain.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use fbpulse_core::FeedbackStore;
use fbpulse_enrich::{enrich_pending, Enricher};

/// Builds and starts the background job scheduler.
///
/// Registers the enrichment drain and starts the scheduler. Returns the
/// running [`JobScheduler`] handle, which must be kept alive for the
/// lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    store: Arc<dyn FeedbackStore>,
    enricher: Arc<dyn Enricher>,
    interval_secs: u64,
    batch_size: i64,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_enrich_job(&scheduler, store, enricher, interval_secs, batch_size).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the repeating enrichment drain.
///
/// Every `interval_secs` the job lists up to `batch_size` records still
/// missing a summary and runs them through the enricher. Records that fail
/// stay pending and are retried on the next tick.
async fn register_enrich_job(
    scheduler: &JobScheduler,
    store: Arc<dyn FeedbackStore>,
    enricher: Arc<dyn Enricher>,
    interval_secs: u64,
    batch_size: i64,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_repeated_async(
        Duration::from_secs(interval_secs),
        move |_uuid, _lock| {
            let store = Arc::clone(&store);
            let enricher = Arc::clone(&enricher);

            Box::pin(async move {
                tracing::debug!("scheduler: starting enrichment pass");
                match enrich_pending(store.as_ref(), enricher.as_ref(), batch_size).await {
                    Ok(outcome) if outcome.enriched + outcome.failed > 0 => {
                        tracing::info!(
                            enriched = outcome.enriched,
                            failed = outcome.failed,
                            "scheduler: enrichment pass complete"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "scheduler: enrichment pass failed");
                    }
                }
            })
        },
    )?;

    scheduler.add(job).await?;
    Ok(())
}
