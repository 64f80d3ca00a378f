//! Canonical feedback data model shared by every crate in the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Channel a piece of feedback arrived through.
///
/// The variant order here is the fixed enumeration order used for sankey
/// node layout and for dominant-source tie-breaking, so it must not be
/// reordered casually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    SocialPost,
    IssueTracker,
    Chat,
    SupportTicket,
    Email,
    Forum,
}

impl Source {
    /// All channels in their fixed enumeration order.
    pub const ALL: [Source; 6] = [
        Source::SocialPost,
        Source::IssueTracker,
        Source::Chat,
        Source::SupportTicket,
        Source::Email,
        Source::Forum,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::SocialPost => "social-post",
            Source::IssueTracker => "issue-tracker",
            Source::Chat => "chat",
            Source::SupportTicket => "support-ticket",
            Source::Email => "email",
            Source::Forum => "forum",
        }
    }

    /// Index into [`Source::ALL`], used for order-stable per-source counting.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Source::SocialPost => 0,
            Source::IssueTracker => 1,
            Source::Chat => 2,
            Source::SupportTicket => 3,
            Source::Email => 4,
            Source::Forum => 5,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "social-post" => Ok(Source::SocialPost),
            "issue-tracker" => Ok(Source::IssueTracker),
            "chat" => Ok(Source::Chat),
            "support-ticket" => Ok(Source::SupportTicket),
            "email" => Ok(Source::Email),
            "forum" => Ok(Source::Forum),
            other => Err(CoreError::InvalidSource(other.to_string())),
        }
    }
}

/// Sentiment label assigned during enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    #[default]
    Unknown,
}

impl Sentiment {
    /// Fixed column order of the theme-by-sentiment matrix.
    pub const AXIS: [Sentiment; 4] = [
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Positive,
        Sentiment::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            "unknown" => Ok(Sentiment::Unknown),
            other => Err(CoreError::InvalidSentiment(other.to_string())),
        }
    }
}

/// Triage workflow state, mutated by humans independently of enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    New,
    Triaged,
    Ignored,
}

impl FeedbackStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackStatus::New => "new",
            FeedbackStatus::Triaged => "triaged",
            FeedbackStatus::Ignored => "ignored",
        }
    }
}

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeedbackStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(FeedbackStatus::New),
            "triaged" => Ok(FeedbackStatus::Triaged),
            "ignored" => Ok(FeedbackStatus::Ignored),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// One normalized item of external feedback.
///
/// `ingested_at` is the reference timestamp for every recency computation
/// (filter windows, trend buckets, focus recency, delta windows);
/// `created_at` records when the feedback originated and is display-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub source: Source,
    pub external_id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub body: String,
    pub author_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
    pub sentiment: Sentiment,
    pub themes: Vec<String>,
    pub summary: Option<String>,
    pub urgency: Option<u8>,
    pub status: FeedbackStatus,
    pub product_area: Option<String>,
    pub tags: Vec<String>,
}

impl FeedbackRecord {
    /// Whether the enrichment collaborator has processed this record.
    /// Summary presence is the signal; sentiment/themes are set with it.
    #[must_use]
    pub fn is_enriched(&self) -> bool {
        self.summary.is_some()
    }

    /// Exact membership test against the record's theme set.
    #[must_use]
    pub fn has_theme(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t == theme)
    }
}

/// Ingestion input for one feedback item. Everything the caller may omit is
/// defaulted in [`NewFeedback::into_record`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
    pub id: Option<String>,
    pub source: Source,
    pub external_id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub body: String,
    pub author_handle: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub urgency: Option<u8>,
    pub product_area: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewFeedback {
    /// Materialize a full record at ingestion time: sentiment unknown,
    /// no themes, no summary, status new.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyBody`] if the body is empty or whitespace,
    /// or [`CoreError::InvalidUrgency`] if urgency is outside 1..=5.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<FeedbackRecord, CoreError> {
        if self.body.trim().is_empty() {
            return Err(CoreError::EmptyBody);
        }
        if let Some(u) = self.urgency {
            if !(1..=5).contains(&u) {
                return Err(CoreError::InvalidUrgency(u));
            }
        }

        Ok(FeedbackRecord {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            source: self.source,
            external_id: self.external_id,
            url: self.url,
            title: self.title,
            body: self.body,
            author_handle: self.author_handle,
            created_at: self.created_at.unwrap_or(now),
            ingested_at: now,
            sentiment: Sentiment::Unknown,
            themes: Vec::new(),
            summary: None,
            urgency: self.urgency,
            status: FeedbackStatus::New,
            product_area: self.product_area,
            tags: normalize_labels(self.tags),
        })
    }
}

/// Output of the enrichment collaborator, applied to a record as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub sentiment: Sentiment,
    pub themes: Vec<String>,
    pub summary: String,
}

/// Trim, lowercase, drop empties, and dedup while preserving first-seen
/// order. Theme and tag sets must carry no duplicates and no empty strings.
#[must_use]
pub fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let cleaned = label.trim().to_lowercase();
        if !cleaned.is_empty() && !out.contains(&cleaned) {
            out.push(cleaned);
        }
    }
    out
}
