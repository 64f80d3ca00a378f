//! Deterministic sample data spanning the last 48 hours.
//!
//! The offsets are chosen so every insight view has something to show:
//! a performance cluster inside the last 24h (spike + focus candidate),
//! billing chatter in the previous day (drop candidate), and a positive
//! sprinkling so the heatmap has more than one column.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use fbpulse_core::{FeedbackRecord, FeedbackStatus, Sentiment, Source};

struct Seed {
    id: &'static str,
    source: Source,
    hours_ago: i64,
    title: Option<&'static str>,
    body: &'static str,
    url: Option<&'static str>,
    sentiment: Sentiment,
    themes: &'static [&'static str],
    summary: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "seed-1",
        source: Source::IssueTracker,
        hours_ago: 5,
        title: Some("Cold start latency on inference jobs"),
        body: "The managed inference tier is great but cold start times are killing my use case.",
        url: Some("https://tracker.example.com/issues/1"),
        sentiment: Sentiment::Negative,
        themes: &["performance", "inference"],
        summary: "High cold start latency on the inference tier",
    },
    Seed {
        id: "seed-2",
        source: Source::IssueTracker,
        hours_ago: 10,
        title: Some("Query performance degradation after migration"),
        body: "After migrating to the hosted database we see significant slowdowns on tables over 100k rows.",
        url: Some("https://tracker.example.com/issues/2"),
        sentiment: Sentiment::Negative,
        themes: &["database", "performance"],
        summary: "Hosted database slow on large tables",
    },
    Seed {
        id: "seed-3",
        source: Source::Chat,
        hours_ago: 2,
        title: None,
        body: "Just shipped my first deploy and the developer experience is amazing!",
        url: None,
        sentiment: Sentiment::Positive,
        themes: &["developer-experience", "cli"],
        summary: "Praise for the local development workflow",
    },
    Seed {
        id: "seed-4",
        source: Source::SupportTicket,
        hours_ago: 36,
        title: Some("Unable to bind multiple databases"),
        body: "We run a multi-tenant architecture and need to attach a separate database per tenant.",
        url: None,
        sentiment: Sentiment::Neutral,
        themes: &["architecture", "database", "multi-tenancy"],
        summary: "Enterprise customer needs per-tenant database binding",
    },
    Seed {
        id: "seed-5",
        source: Source::SocialPost,
        hours_ago: 3,
        title: None,
        body: "Deploy took three minutes today. What is going on?",
        url: Some("https://social.example.com/status/1"),
        sentiment: Sentiment::Negative,
        themes: &["deployment", "performance"],
        summary: "Slow deployment times reported",
    },
    Seed {
        id: "seed-6",
        source: Source::Chat,
        hours_ago: 30,
        title: None,
        body: "The new image pipeline API is exactly what we needed.",
        url: None,
        sentiment: Sentiment::Positive,
        themes: &["media", "cdn"],
        summary: "Very positive feedback on the image pipeline",
    },
    Seed {
        id: "seed-7",
        source: Source::Email,
        hours_ago: 15,
        title: Some("Pricing question for object storage"),
        body: "Trying to understand storage pricing for 500TB with high read volume.",
        url: None,
        sentiment: Sentiment::Neutral,
        themes: &["billing", "pricing", "storage"],
        summary: "Customer confusion about storage pricing",
    },
    Seed {
        id: "seed-8",
        source: Source::Email,
        hours_ago: 18,
        title: Some("Another billing question"),
        body: "How does billing work for inference requests on the metered plan?",
        url: None,
        sentiment: Sentiment::Neutral,
        themes: &["billing", "inference"],
        summary: "Questions about inference billing",
    },
    Seed {
        id: "seed-9",
        source: Source::IssueTracker,
        hours_ago: 4,
        title: Some("Performance regression after latest release"),
        body: "Since the latest release our endpoints respond 50ms slower on average.",
        url: Some("https://tracker.example.com/issues/3"),
        sentiment: Sentiment::Negative,
        themes: &["performance", "runtime"],
        summary: "Performance regression in the runtime",
    },
    Seed {
        id: "seed-10",
        source: Source::SocialPost,
        hours_ago: 6,
        title: None,
        body: "Fastest edge runtime I have used, full stop.",
        url: Some("https://social.example.com/status/2"),
        sentiment: Sentiment::Positive,
        themes: &["performance", "runtime"],
        summary: "Praise for runtime performance",
    },
];

/// Materialize the seed set relative to `now`, already enriched.
#[must_use]
pub fn seed_records(now: DateTime<Utc>) -> Vec<FeedbackRecord> {
    SEEDS
        .iter()
        .map(|seed| {
            let at = now - Duration::hours(seed.hours_ago);
            FeedbackRecord {
                id: seed.id.to_string(),
                source: seed.source,
                external_id: None,
                url: seed.url.map(String::from),
                title: seed.title.map(String::from),
                body: seed.body.to_string(),
                author_handle: None,
                created_at: at,
                ingested_at: at,
                sentiment: seed.sentiment,
                themes: seed.themes.iter().map(|t| (*t).to_string()).collect(),
                summary: Some(seed.summary.to_string()),
                urgency: None,
                status: FeedbackStatus::New,
                product_area: None,
                tags: Vec::new(),
            }
        })
        .collect()
}

/// Replace all feedback with the deterministic seed set.
pub async fn run(pool: &PgPool) -> anyhow::Result<usize> {
    let removed = fbpulse_db::clear_feedback(pool).await?;
    if removed > 0 {
        tracing::info!(removed, "cleared existing feedback");
    }

    let records = seed_records(Utc::now());
    for record in &records {
        fbpulse_db::insert_record(pool, record).await?;
    }
    Ok(records.len())
}
