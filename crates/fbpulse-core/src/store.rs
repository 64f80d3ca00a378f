//! Storage capability consumed by the server, scheduler, and CLI.
//!
//! The analytics core never talks to storage directly — it takes an
//! already-materialized record collection. This trait is the seam that
//! materializes that collection, with a Postgres implementation in
//! `fbpulse-db` and [`MemoryStore`] for tests and local seed-data runs.
//! Both run the exact same filter semantics.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::feedback::{Enrichment, FeedbackRecord, FeedbackStatus, NewFeedback};
use crate::filter::{apply_filters, FilterSet};
use crate::CoreError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("feedback record not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Invalid(#[from] CoreError),
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Full filtered set, newest-ingested first — analytics expects the
    /// whole working set materialized, never a page.
    async fn fetch_feedback(&self, filter: &FilterSet) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Paginated raw-list view over the same filter semantics, plus the
    /// total matching count.
    async fn list_feedback(
        &self,
        filter: &FilterSet,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FeedbackRecord>, u64), StoreError>;

    async fn insert_feedback(&self, input: NewFeedback) -> Result<FeedbackRecord, StoreError>;

    async fn get_feedback(&self, id: &str) -> Result<Option<FeedbackRecord>, StoreError>;

    /// Set sentiment, themes, and summary together — the one logical
    /// mutation the enrichment collaborator performs.
    async fn apply_enrichment(
        &self,
        id: &str,
        enrichment: Enrichment,
    ) -> Result<FeedbackRecord, StoreError>;

    async fn update_status(
        &self,
        id: &str,
        status: FeedbackStatus,
    ) -> Result<FeedbackRecord, StoreError>;

    /// Records awaiting enrichment (no summary yet), oldest first.
    async fn list_pending_enrichment(&self, limit: i64)
        -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// In-memory store backed by a `RwLock`ed vector.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<FeedbackRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with pre-built records, replacing current contents.
    pub async fn replace_all(&self, records: Vec<FeedbackRecord>) {
        *self.records.write().await = records;
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn fetch_feedback(&self, filter: &FilterSet) -> Result<Vec<FeedbackRecord>, StoreError> {
        let records = self.records.read().await;
        let mut matched: Vec<FeedbackRecord> = apply_filters(&records, filter, Utc::now())
            .into_iter()
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.ingested_at.cmp(&a.ingested_at));
        Ok(matched)
    }

    async fn list_feedback(
        &self,
        filter: &FilterSet,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FeedbackRecord>, u64), StoreError> {
        let all = self.fetch_feedback(filter).await?;
        let total = all.len() as u64;
        let offset = usize::try_from(offset.max(0)).unwrap_or(0);
        let limit = usize::try_from(limit.max(0)).unwrap_or(0);
        let page = all.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn insert_feedback(&self, input: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        let record = input.into_record(Utc::now())?;
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn get_feedback(&self, id: &str) -> Result<Option<FeedbackRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn apply_enrichment(
        &self,
        id: &str,
        enrichment: Enrichment,
    ) -> Result<FeedbackRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.sentiment = enrichment.sentiment;
        record.themes = crate::feedback::normalize_labels(enrichment.themes);
        record.summary = Some(enrichment.summary);
        Ok(record.clone())
    }

    async fn update_status(
        &self,
        id: &str,
        status: FeedbackStatus,
    ) -> Result<FeedbackRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.status = status;
        Ok(record.clone())
    }

    async fn list_pending_enrichment(
        &self,
        limit: i64,
    ) -> Result<Vec<FeedbackRecord>, StoreError> {
        let records = self.records.read().await;
        let mut pending: Vec<FeedbackRecord> = records
            .iter()
            .filter(|r| !r.is_enriched())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.ingested_at.cmp(&b.ingested_at));
        pending.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(pending)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
