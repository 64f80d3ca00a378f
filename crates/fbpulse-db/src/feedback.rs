//! `feedback` table queries and the Postgres `FeedbackStore`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fbpulse_core::{
    Enrichment, FeedbackRecord, FeedbackStatus, FeedbackStore, FilterSet, NewFeedback, Sentiment,
    Source, StoreError,
};
use sqlx::PgPool;

const SELECT_COLUMNS: &str = "id, source, external_id, url, title, body, author_handle, \
     created_at, ingested_at, sentiment, themes, summary, urgency, status, product_area, tags";

/// A row from the `feedback` table. Enum-like columns stay TEXT here and
/// are validated when converting into the core record.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedbackRow {
    id: String,
    source: String,
    external_id: Option<String>,
    url: Option<String>,
    title: Option<String>,
    body: String,
    author_handle: Option<String>,
    created_at: DateTime<Utc>,
    ingested_at: DateTime<Utc>,
    sentiment: String,
    themes: Vec<String>,
    summary: Option<String>,
    urgency: Option<i16>,
    status: String,
    product_area: Option<String>,
    tags: Vec<String>,
}

impl TryFrom<FeedbackRow> for FeedbackRecord {
    type Error = fbpulse_core::CoreError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        Ok(FeedbackRecord {
            id: row.id,
            source: row.source.parse::<Source>()?,
            external_id: row.external_id,
            url: row.url,
            title: row.title,
            body: row.body,
            author_handle: row.author_handle,
            created_at: row.created_at,
            ingested_at: row.ingested_at,
            sentiment: row.sentiment.parse::<Sentiment>()?,
            themes: row.themes,
            summary: row.summary,
            urgency: row.urgency.and_then(|u| u8::try_from(u).ok()),
            status: row.status.parse::<FeedbackStatus>()?,
            product_area: row.product_area,
            tags: row.tags,
        })
    }
}

/// Bind values for the shared optional-filter WHERE clause.
#[derive(Debug)]
struct FilterBinds {
    source: Option<&'static str>,
    sentiment: Option<&'static str>,
    status: Option<&'static str>,
    theme: Option<String>,
    q: Option<String>,
    cutoff: Option<DateTime<Utc>>,
}

impl FilterBinds {
    fn from_filter(filter: &FilterSet, now: DateTime<Utc>) -> Self {
        Self {
            source: filter.source.map(Source::as_str),
            sentiment: filter.sentiment.map(Sentiment::as_str),
            status: filter.status.map(FeedbackStatus::as_str),
            theme: filter.theme.clone(),
            q: filter.q.clone(),
            cutoff: filter
                .days
                .filter(|days| *days > 0)
                .map(|days| now - Duration::hours(i64::from(days) * 24)),
        }
    }
}

/// Shared WHERE clause: every constraint collapses to TRUE when its bind is
/// NULL, mirroring the in-memory filtering engine exactly.
const FILTER_WHERE: &str = "($1::TEXT IS NULL OR source = $1) \
       AND ($2::TEXT IS NULL OR sentiment = $2) \
       AND ($3::TEXT IS NULL OR status = $3) \
       AND ($4::TEXT IS NULL OR themes @> ARRAY[$4]) \
       AND ($5::TEXT IS NULL OR title ILIKE '%' || $5 || '%' OR body ILIKE '%' || $5 || '%') \
       AND ($6::TIMESTAMPTZ IS NULL OR ingested_at >= $6)";

/// Postgres-backed [`FeedbackStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

/// Insert a fully-materialized record as-is, timestamps included. The seed
/// command uses this to plant backdated, already-enriched rows.
///
/// # Errors
///
/// Returns [`StoreError::Backend`] on query failure.
pub async fn insert_record(
    pool: &PgPool,
    record: &FeedbackRecord,
) -> Result<FeedbackRecord, StoreError> {
    let row = sqlx::query_as::<_, FeedbackRow>(&format!(
        "INSERT INTO feedback \
             (id, source, external_id, url, title, body, author_handle, \
              created_at, ingested_at, sentiment, themes, summary, urgency, \
              status, product_area, tags) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {SELECT_COLUMNS}"
    ))
    .bind(&record.id)
    .bind(record.source.as_str())
    .bind(&record.external_id)
    .bind(&record.url)
    .bind(&record.title)
    .bind(&record.body)
    .bind(&record.author_handle)
    .bind(record.created_at)
    .bind(record.ingested_at)
    .bind(record.sentiment.as_str())
    .bind(&record.themes)
    .bind(&record.summary)
    .bind(record.urgency.map(i16::from))
    .bind(record.status.as_str())
    .bind(&record.product_area)
    .bind(&record.tags)
    .fetch_one(pool)
    .await
    .map_err(backend)?;

    Ok(FeedbackRecord::try_from(row)?)
}

/// Delete every feedback row, returning the count removed. Seeding always
/// starts from a clean slate.
///
/// # Errors
///
/// Returns [`sqlx::Error`] on query failure.
pub async fn clear_feedback(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM feedback").execute(pool).await?;
    Ok(result.rows_affected())
}

fn into_records(rows: Vec<FeedbackRow>) -> Result<Vec<FeedbackRecord>, StoreError> {
    rows.into_iter()
        .map(|row| FeedbackRecord::try_from(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl FeedbackStore for PgStore {
    async fn fetch_feedback(&self, filter: &FilterSet) -> Result<Vec<FeedbackRecord>, StoreError> {
        let binds = FilterBinds::from_filter(filter, Utc::now());
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM feedback WHERE {FILTER_WHERE} ORDER BY ingested_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, FeedbackRow>(&sql)
            .bind(binds.source)
            .bind(binds.sentiment)
            .bind(binds.status)
            .bind(binds.theme)
            .bind(binds.q)
            .bind(binds.cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        into_records(rows)
    }

    async fn list_feedback(
        &self,
        filter: &FilterSet,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FeedbackRecord>, u64), StoreError> {
        let binds = FilterBinds::from_filter(filter, Utc::now());

        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM feedback WHERE {FILTER_WHERE} \
             ORDER BY ingested_at DESC, id DESC LIMIT $7 OFFSET $8"
        );
        let rows = sqlx::query_as::<_, FeedbackRow>(&sql)
            .bind(binds.source)
            .bind(binds.sentiment)
            .bind(binds.status)
            .bind(binds.theme.clone())
            .bind(binds.q.clone())
            .bind(binds.cutoff)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let count_sql = format!("SELECT COUNT(*) FROM feedback WHERE {FILTER_WHERE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(binds.source)
            .bind(binds.sentiment)
            .bind(binds.status)
            .bind(binds.theme)
            .bind(binds.q)
            .bind(binds.cutoff)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        Ok((into_records(rows)?, total.try_into().unwrap_or(0)))
    }

    async fn insert_feedback(&self, input: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        let record = input.into_record(Utc::now())?;
        insert_record(&self.pool, &record).await
    }

    async fn get_feedback(&self, id: &str) -> Result<Option<FeedbackRecord>, StoreError> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM feedback WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(FeedbackRecord::try_from)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn apply_enrichment(
        &self,
        id: &str,
        enrichment: Enrichment,
    ) -> Result<FeedbackRecord, StoreError> {
        let themes = fbpulse_core::normalize_labels(enrichment.themes);
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            "UPDATE feedback SET sentiment = $2, themes = $3, summary = $4 \
             WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(enrichment.sentiment.as_str())
        .bind(&themes)
        .bind(&enrichment.summary)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(FeedbackRecord::try_from(row)?)
    }

    async fn update_status(
        &self,
        id: &str,
        status: FeedbackStatus,
    ) -> Result<FeedbackRecord, StoreError> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            "UPDATE feedback SET status = $2 WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(FeedbackRecord::try_from(row)?)
    }

    async fn list_pending_enrichment(
        &self,
        limit: i64,
    ) -> Result<Vec<FeedbackRecord>, StoreError> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM feedback WHERE summary IS NULL \
             ORDER BY ingested_at ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        into_records(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::ping(&self.pool).await.map_err(backend)
    }
}
