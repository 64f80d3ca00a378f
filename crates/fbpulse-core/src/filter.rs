//! Filter Set and the Filtering Engine.
//!
//! A [`FilterSet`] is a set of independently optional constraints combined
//! with logical AND. The same filter object is applied uniformly to the raw
//! list view and to every analytics computation — the day window is part of
//! the single filter contract, not a per-endpoint option.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::feedback::{FeedbackRecord, FeedbackStatus, Sentiment, Source};

/// Default day window when the filter does not carry one.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Query constraint set. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FeedbackStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Day window: 0 or absent means no time restriction. Boundaries that
    /// want the [`DEFAULT_WINDOW_DAYS`] default resolve it explicitly via
    /// [`FilterSet::with_default_window`]. Malformed values fall back to
    /// absent rather than failing the whole request.
    #[serde(default, deserialize_with = "lenient_days", skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

/// Unparseable `days` values degrade to the default window instead of
/// rejecting the request.
fn lenient_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<u32>().ok()))
}

impl FilterSet {
    /// Resolve the day window: absent defaults to 7, 0 stays 0 (all time).
    #[must_use]
    pub fn effective_days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_WINDOW_DAYS)
    }

    /// Pin an absent day window to the resolved default. Boundary code
    /// (HTTP handlers, the CLI report) calls this before querying; the
    /// engine itself never injects a window the caller did not ask for.
    #[must_use]
    pub fn with_default_window(mut self) -> Self {
        self.days = Some(self.effective_days());
        self
    }

    /// Flat `k=v` query-string form, keys present only when set.
    /// Used as the insight-cache key, so it must be deterministic.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(source) = self.source {
            parts.push(format!("source={source}"));
        }
        if let Some(sentiment) = self.sentiment {
            parts.push(format!("sentiment={sentiment}"));
        }
        if let Some(status) = self.status {
            parts.push(format!("status={status}"));
        }
        if let Some(theme) = &self.theme {
            parts.push(format!("theme={theme}"));
        }
        if let Some(q) = &self.q {
            parts.push(format!("q={q}"));
        }
        if let Some(days) = self.days {
            parts.push(format!("days={days}"));
        }
        parts.join("&")
    }

    /// Whether a single record satisfies every present constraint.
    #[must_use]
    pub fn matches(&self, record: &FeedbackRecord, now: DateTime<Utc>) -> bool {
        if let Some(source) = self.source {
            if record.source != source {
                return false;
            }
        }
        if let Some(sentiment) = self.sentiment {
            if record.sentiment != sentiment {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(theme) = &self.theme {
            if !record.has_theme(theme) {
                return false;
            }
        }
        if let Some(q) = &self.q {
            let needle = q.to_lowercase();
            let title_hit = record
                .title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            if !title_hit && !record.body.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(days) = self.days {
            if days > 0 {
                let cutoff = now - Duration::hours(i64::from(days) * 24);
                if record.ingested_at < cutoff {
                    return false;
                }
            }
        }
        true
    }
}

/// Apply a filter to a record collection, producing the working set every
/// downstream computation consumes. Pure and deterministic: an empty
/// filter returns the input unchanged, and filtering is idempotent.
#[must_use]
pub fn apply_filters<'a>(
    records: &'a [FeedbackRecord],
    filter: &FilterSet,
    now: DateTime<Utc>,
) -> Vec<&'a FeedbackRecord> {
    records.iter().filter(|r| filter.matches(r, now)).collect()
}
