use fbpulse_core::{FeedbackStore, StoreError};

use crate::Enricher;

/// Outcome of one enrichment drain pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainOutcome {
    pub enriched: usize,
    pub failed: usize,
}

/// Enrich up to `batch` pending records in one pass.
///
/// Records whose enrichment call fails are logged and left pending, so a
/// later pass retries them. Store failures abort the pass.
///
/// # Errors
///
/// Returns [`StoreError`] if listing pending records or persisting an
/// enrichment fails.
pub async fn enrich_pending(
    store: &dyn FeedbackStore,
    enricher: &dyn Enricher,
    batch: i64,
) -> Result<DrainOutcome, StoreError> {
    let pending = store.list_pending_enrichment(batch).await?;
    if pending.is_empty() {
        return Ok(DrainOutcome::default());
    }

    let mut outcome = DrainOutcome::default();
    for record in pending {
        match enricher.enrich(&record.body).await {
            Ok(enrichment) => {
                store.apply_enrichment(&record.id, enrichment).await?;
                outcome.enriched += 1;
            }
            Err(e) => {
                tracing::warn!(id = %record.id, error = %e, "enrichment failed; will retry");
                outcome.failed += 1;
            }
        }
    }

    tracing::info!(
        enriched = outcome.enriched,
        failed = outcome.failed,
        "enrichment pass complete"
    );
    Ok(outcome)
}
