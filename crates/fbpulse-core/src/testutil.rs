//! Fixture builders shared by unit tests across the workspace.

use chrono::{DateTime, Utc};

use crate::feedback::{FeedbackRecord, FeedbackStatus, Sentiment, Source};

/// Build a minimal enriched record for analytics and filter tests.
#[must_use]
pub fn record(
    id: &str,
    source: Source,
    sentiment: Sentiment,
    themes: &[&str],
    ingested_at: DateTime<Utc>,
) -> FeedbackRecord {
    FeedbackRecord {
        id: id.to_string(),
        source,
        external_id: None,
        url: None,
        title: None,
        body: format!("feedback body for {id}"),
        author_handle: None,
        created_at: ingested_at,
        ingested_at,
        sentiment,
        themes: themes.iter().map(|t| (*t).to_string()).collect(),
        summary: Some(format!("summary for {id}")),
        urgency: None,
        status: FeedbackStatus::New,
        product_area: None,
        tags: Vec::new(),
    }
}
