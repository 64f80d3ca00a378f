//! Focus Recommender: deterministic heuristic ranking of which theme
//! deserves attention next.
//!
//! Scoring is decision support, not prediction — a fixed formula over
//! volume, negativity, and recency. It must stay a transparent heuristic,
//! never a trained classifier.

use chrono::{DateTime, Duration, Utc};
use fbpulse_core::{FeedbackRecord, Sentiment, Source};
use serde::Serialize;

use crate::group::{group_by_theme, ThemeGroup};

/// Recency window for the score multiplier and supporting stats. Fixed at
/// 7 days regardless of the filter's day window.
pub const FOCUS_WINDOW_DAYS: u32 = 7;

/// At most this many recommendations are returned.
pub const FOCUS_LIMIT: usize = 3;

const HIGH_SCORE: f64 = 10.0;
const MEDIUM_SCORE: f64 = 5.0;
const RECENCY_MULTIPLIER: f64 = 1.5;

/// Coarse low/medium/high bucket used for both the signal tier (derived
/// from the score) and the confidence tier (derived from sample shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuggestedAction {
    Investigate,
    Monitor,
    Ignore,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportingStats {
    pub item_count: u64,
    pub source_count: u64,
    pub negative_count: u64,
    pub window_days: u32,
    pub recent_share: f64,
}

/// A ranked recommendation. Ephemeral: recomputed fresh per request and
/// never persisted authoritatively.
#[derive(Debug, Clone, Serialize)]
pub struct FocusItem {
    pub id: String,
    pub title: String,
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub score: f64,
    pub signal: Tier,
    pub explanation: String,
    pub suggested_action: SuggestedAction,
    pub confidence: Tier,
    pub coverage_text: String,
    pub supporting_stats: SupportingStats,
}

/// Rank theme groups by `volume * (1 + negative_ratio) * recency_multiplier`
/// and return the top 3, scores non-increasing.
///
/// Empty input yields an empty list. Zero-volume groups cannot exist by
/// construction (a group only forms around at least one record), and every
/// ratio guards its denominator.
#[must_use]
pub fn recommended_focus(records: &[&FeedbackRecord], now: DateTime<Utc>) -> Vec<FocusItem> {
    let recent_cutoff = now - Duration::hours(i64::from(FOCUS_WINDOW_DAYS) * 24);

    let mut items: Vec<FocusItem> = group_by_theme(records)
        .into_iter()
        .map(|group| score_group(&group, recent_cutoff))
        .collect();

    // Stable sort keeps first-seen grouping order on equal scores.
    items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    items.truncate(FOCUS_LIMIT);
    items
}

fn score_group(group: &ThemeGroup<'_>, recent_cutoff: DateTime<Utc>) -> FocusItem {
    let volume = group.records.len() as u64;
    let negative_count = group
        .records
        .iter()
        .filter(|r| r.sentiment == Sentiment::Negative)
        .count() as u64;
    let recent_count = group
        .records
        .iter()
        .filter(|r| r.ingested_at >= recent_cutoff)
        .count() as u64;

    let negative_ratio = ratio(negative_count, volume);
    let recent_share = ratio(recent_count, volume);
    let multiplier = if recent_share > 0.5 {
        RECENCY_MULTIPLIER
    } else {
        1.0
    };

    #[allow(clippy::cast_precision_loss)]
    let score = volume as f64 * (1.0 + negative_ratio) * multiplier;

    let signal = if score >= HIGH_SCORE {
        Tier::High
    } else if score >= MEDIUM_SCORE {
        Tier::Medium
    } else {
        Tier::Low
    };

    let suggested_action = match signal {
        Tier::High => SuggestedAction::Investigate,
        Tier::Medium => SuggestedAction::Monitor,
        Tier::Low => SuggestedAction::Ignore,
    };

    let source_count = distinct_source_count(&group.records);
    let confidence = if volume >= 10 && source_count >= 2 && recent_share >= 0.6 {
        Tier::High
    } else if volume >= 5 && source_count >= 1 && recent_share >= 0.4 {
        Tier::Medium
    } else {
        Tier::Low
    };

    let explanation = format!(
        "{volume} items, {}% negative, {}% recent",
        (negative_ratio * 100.0).round(),
        (recent_share * 100.0).round()
    );
    let coverage_text = format!(
        "{volume} items • {source_count} {} • last {FOCUS_WINDOW_DAYS} days",
        if source_count == 1 { "source" } else { "sources" }
    );

    FocusItem {
        id: format!("focus-{}", group.theme),
        title: format!("{} feedback", capitalize(&group.theme)),
        theme: group.theme.clone(),
        source: dominant_source(&group.records),
        score,
        signal,
        explanation,
        suggested_action,
        confidence,
        coverage_text,
        supporting_stats: SupportingStats {
            item_count: volume,
            source_count,
            negative_count,
            window_days: FOCUS_WINDOW_DAYS,
            recent_share,
        },
    }
}

/// A ratio with a zero denominator is defined as zero, never NaN.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            numerator as f64 / denominator as f64
        }
    }
}

fn distinct_source_count(records: &[&FeedbackRecord]) -> u64 {
    let mut seen = [false; Source::ALL.len()];
    for record in records {
        seen[record.source.index()] = true;
    }
    seen.iter().filter(|&&s| s).count() as u64
}

/// Channel with the most occurrences in the group. Ties resolve to the
/// earlier channel in the fixed enumeration order.
pub(crate) fn dominant_source(records: &[&FeedbackRecord]) -> Option<Source> {
    let mut counts = [0_u64; Source::ALL.len()];
    for record in records {
        counts[record.source.index()] += 1;
    }

    let mut best: Option<Source> = None;
    let mut best_count = 0_u64;
    for source in Source::ALL {
        let count = counts[source.index()];
        if count > best_count {
            best = Some(source);
            best_count = count;
        }
    }
    best
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fbpulse_core::testutil::record;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(recommended_focus(&[], fixed_now()).is_empty());
    }

    #[test]
    fn output_is_capped_at_three_with_non_increasing_scores() {
        let now = fixed_now();
        let mut records = Vec::new();
        for (theme, n) in [("a", 6), ("b", 4), ("c", 3), ("d", 2), ("e", 1)] {
            for i in 0..n {
                records.push(record(
                    &format!("{theme}{i}"),
                    Source::Chat,
                    Sentiment::Neutral,
                    &[theme],
                    now - Duration::hours(1),
                ));
            }
        }
        let refs: Vec<&_> = records.iter().collect();
        let items = recommended_focus(&refs, now);

        assert_eq!(items.len(), FOCUS_LIMIT);
        for pair in items.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn score_formula_matches_documented_example() {
        // 2 in-window negatives on "performance":
        // volume=2, negative_ratio=1.0, recent_share=1.0 > 0.5 → x1.5
        // score = 2 * (1 + 1.0) * 1.5 = 6.0 → medium → Monitor
        let now = fixed_now();
        let records = vec![
            record("p1", Source::IssueTracker, Sentiment::Negative, &["performance"], now - Duration::hours(2)),
            record("p2", Source::Chat, Sentiment::Negative, &["performance"], now - Duration::hours(5)),
        ];
        let refs: Vec<&_> = records.iter().collect();
        let items = recommended_focus(&refs, now);

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert!((item.score - 6.0).abs() < f64::EPSILON);
        assert_eq!(item.signal, Tier::Medium);
        assert_eq!(item.suggested_action, SuggestedAction::Monitor);
        assert_eq!(item.supporting_stats.negative_count, 2);
        assert_eq!(item.supporting_stats.source_count, 2);
    }

    #[test]
    fn score_over_ten_is_high_and_investigate() {
        // 7 items, 0 negative, all recent: 7 * 1.0 * 1.5 = 10.5 → high.
        let now = fixed_now();
        let records: Vec<_> = (0..7)
            .map(|i| {
                record(
                    &format!("r{i}"),
                    Source::Forum,
                    Sentiment::Neutral,
                    &["kv"],
                    now - Duration::hours(i + 1),
                )
            })
            .collect();
        let refs: Vec<&_> = records.iter().collect();
        let items = recommended_focus(&refs, now);

        let item = &items[0];
        assert!((item.score - 10.5).abs() < f64::EPSILON);
        assert_eq!(item.signal, Tier::High);
        assert_eq!(item.suggested_action, SuggestedAction::Investigate);
    }

    #[test]
    fn stale_theme_misses_recency_multiplier() {
        let now = fixed_now();
        let records: Vec<_> = (0..4)
            .map(|i| {
                record(
                    &format!("old{i}"),
                    Source::Email,
                    Sentiment::Neutral,
                    &["legacy"],
                    now - Duration::days(20 + i),
                )
            })
            .collect();
        let refs: Vec<&_> = records.iter().collect();
        let items = recommended_focus(&refs, now);

        let item = &items[0];
        assert!((item.score - 4.0).abs() < f64::EPSILON);
        assert!((item.supporting_stats.recent_share - 0.0).abs() < f64::EPSILON);
        assert_eq!(item.signal, Tier::Low);
        assert_eq!(item.suggested_action, SuggestedAction::Ignore);
    }

    #[test]
    fn confidence_tiers_follow_volume_sources_and_recency() {
        let now = fixed_now();

        // high: 10 items across 2 sources, all recent.
        let mut records = Vec::new();
        for i in 0..10 {
            let source = if i % 2 == 0 { Source::Chat } else { Source::Forum };
            records.push(record(
                &format!("h{i}"),
                source,
                Sentiment::Negative,
                &["outage"],
                now - Duration::hours(i + 1),
            ));
        }
        let refs: Vec<&_> = records.iter().collect();
        assert_eq!(recommended_focus(&refs, now)[0].confidence, Tier::High);

        // low: 2 items from one source.
        let records = vec![
            record("l1", Source::Chat, Sentiment::Neutral, &["minor"], now - Duration::hours(1)),
            record("l2", Source::Chat, Sentiment::Neutral, &["minor"], now - Duration::hours(2)),
        ];
        let refs: Vec<&_> = records.iter().collect();
        assert_eq!(recommended_focus(&refs, now)[0].confidence, Tier::Low);
    }

    #[test]
    fn dominant_source_tie_breaks_on_enumeration_order() {
        let now = fixed_now();
        // forum and social-post tie at 1 each; social-post comes first in
        // the channel enumeration.
        let records = vec![
            record("a", Source::Forum, Sentiment::Neutral, &["dx"], now - Duration::hours(1)),
            record("b", Source::SocialPost, Sentiment::Neutral, &["dx"], now - Duration::hours(2)),
        ];
        let refs: Vec<&_> = records.iter().collect();
        let items = recommended_focus(&refs, now);
        assert_eq!(items[0].source, Some(Source::SocialPost));
    }

    #[test]
    fn focus_item_texts_are_human_readable() {
        let now = fixed_now();
        let records = vec![
            record("a", Source::Chat, Sentiment::Negative, &["billing"], now - Duration::hours(1)),
            record("b", Source::Chat, Sentiment::Neutral, &["billing"], now - Duration::hours(2)),
        ];
        let refs: Vec<&_> = records.iter().collect();
        let item = &recommended_focus(&refs, now)[0];

        assert_eq!(item.id, "focus-billing");
        assert_eq!(item.title, "Billing feedback");
        assert_eq!(item.explanation, "2 items, 50% negative, 100% recent");
        assert_eq!(item.coverage_text, "2 items • 1 source • last 7 days");
    }

    #[test]
    fn serialized_tiers_and_actions_use_wire_casing() {
        let now = fixed_now();
        let records = vec![record("a", Source::Chat, Sentiment::Negative, &["billing"], now)];
        let refs: Vec<&_> = records.iter().collect();
        let json = serde_json::to_value(&recommended_focus(&refs, now)[0]).expect("serialize");

        assert_eq!(json["signal"], "low");
        assert_eq!(json["suggested_action"], "Ignore");
        assert_eq!(json["confidence"], "low");
    }
}
