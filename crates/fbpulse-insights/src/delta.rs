//! Delta Detector: 24h-vs-24h per-theme movement classification.
//!
//! The current window covers the last 24 hours of ingestion, the previous
//! window the 24 hours before that. Each category (spike, drop, new) runs
//! its own independent selection and picks at most one theme, so the output
//! holds between zero and three items — and a theme may legitimately appear
//! in more than one category.

use chrono::{DateTime, Duration, Utc};
use fbpulse_core::{FeedbackRecord, Source};
use serde::Serialize;

use crate::focus::dominant_source;
use crate::group::group_by_theme;

/// Minimum absolute movement before a spike or drop is reported.
const DELTA_THRESHOLD: i64 = 2;
/// Minimum current-window count before a theme counts as newly emerged.
const NEW_THEME_MIN_COUNT: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaKind {
    Spike,
    Drop,
    New,
}

/// One detected movement. Ephemeral, recomputed per request.
#[derive(Debug, Clone, Serialize)]
pub struct DeltaItem {
    pub kind: DeltaKind,
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub count_current: i64,
    pub count_previous: i64,
    pub delta: i64,
    pub label: String,
}

#[derive(Debug)]
struct ThemeDelta {
    theme: String,
    source: Option<Source>,
    current: i64,
    previous: i64,
    delta: i64,
}

/// Classify per-theme movement between the two adjacent 24h windows.
#[must_use]
pub fn recent_deltas(records: &[&FeedbackRecord], now: DateTime<Utc>) -> Vec<DeltaItem> {
    let one_day_ago = now - Duration::hours(24);
    let two_days_ago = now - Duration::hours(48);

    let deltas: Vec<ThemeDelta> = group_by_theme(records)
        .into_iter()
        .filter_map(|group| {
            let current_records: Vec<&FeedbackRecord> = group
                .records
                .iter()
                .copied()
                .filter(|r| r.ingested_at >= one_day_ago && r.ingested_at <= now)
                .collect();
            let previous_records: Vec<&FeedbackRecord> = group
                .records
                .iter()
                .copied()
                .filter(|r| r.ingested_at >= two_days_ago && r.ingested_at < one_day_ago)
                .collect();

            let current = current_records.len() as i64;
            let previous = previous_records.len() as i64;
            if current == 0 && previous == 0 {
                return None;
            }

            // Attribution follows the window that actually has records.
            let source = dominant_source(&current_records)
                .or_else(|| dominant_source(&previous_records));

            Some(ThemeDelta {
                theme: group.theme,
                source,
                current,
                previous,
                delta: current - previous,
            })
        })
        .collect();

    let mut items = Vec::with_capacity(3);

    // Largest rise, first-seen tie-break via strict comparison.
    let spike = deltas
        .iter()
        .filter(|d| d.delta >= DELTA_THRESHOLD)
        .fold(None::<&ThemeDelta>, |best, d| match best {
            Some(b) if b.delta >= d.delta => Some(b),
            _ => Some(d),
        });
    if let Some(d) = spike {
        items.push(build_item(
            DeltaKind::Spike,
            d,
            format!("{} feedback increased (+{})", capitalize(&d.theme), d.delta),
        ));
    }

    let drop = deltas
        .iter()
        .filter(|d| d.delta <= -DELTA_THRESHOLD)
        .fold(None::<&ThemeDelta>, |best, d| match best {
            Some(b) if b.delta <= d.delta => Some(b),
            _ => Some(d),
        });
    if let Some(d) = drop {
        items.push(build_item(
            DeltaKind::Drop,
            d,
            format!("{} feedback decreased ({})", capitalize(&d.theme), d.delta),
        ));
    }

    let newly_emerged = deltas
        .iter()
        .filter(|d| d.current >= NEW_THEME_MIN_COUNT && d.previous == 0)
        .fold(None::<&ThemeDelta>, |best, d| match best {
            Some(b) if b.current >= d.current => Some(b),
            _ => Some(d),
        });
    if let Some(d) = newly_emerged {
        items.push(build_item(
            DeltaKind::New,
            d,
            format!(
                "New theme detected: {} ({} items)",
                capitalize(&d.theme),
                d.current
            ),
        ));
    }

    items
}

fn build_item(kind: DeltaKind, delta: &ThemeDelta, label: String) -> DeltaItem {
    DeltaItem {
        kind,
        theme: delta.theme.clone(),
        source: delta.source,
        count_current: delta.current,
        count_previous: delta.previous,
        delta: delta.delta,
        label,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
