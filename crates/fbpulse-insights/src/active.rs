//! Active-Focus Matcher.
//!
//! Clicking a focus recommendation applies `sentiment=negative` plus the
//! theme (and, when the recommendation carries one, the source) filter.
//! This check recognizes that state so already-applied suggestions can be
//! dimmed in the presentation layer — it never gates data access.

use fbpulse_core::{FilterSet, Sentiment};

use crate::focus::FocusItem;

/// Whether the current filter selection already reflects this
/// recommendation.
#[must_use]
pub fn is_focus_active(focus: &FocusItem, filter: &FilterSet) -> bool {
    if filter.theme.as_deref() != Some(focus.theme.as_str()) {
        return false;
    }
    if filter.sentiment != Some(Sentiment::Negative) {
        return false;
    }
    if let Some(source) = focus.source {
        if filter.source != Some(source) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::recommended_focus;
    use chrono::{Duration, TimeZone, Utc};
    use fbpulse_core::testutil::record;
    use fbpulse_core::Source;

    fn focus_for(theme: &str, source: Source) -> FocusItem {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let records = vec![
            record("a", source, Sentiment::Negative, &[theme], now - Duration::hours(1)),
            record("b", source, Sentiment::Negative, &[theme], now - Duration::hours(2)),
        ];
        let refs: Vec<&_> = records.iter().collect();
        recommended_focus(&refs, now).remove(0)
    }

    #[test]
    fn matches_when_theme_sentiment_and_source_align() {
        let focus = focus_for("performance", Source::IssueTracker);
        let filter = FilterSet {
            theme: Some("performance".to_string()),
            sentiment: Some(Sentiment::Negative),
            source: Some(Source::IssueTracker),
            ..FilterSet::default()
        };
        assert!(is_focus_active(&focus, &filter));
    }

    #[test]
    fn never_matches_without_negative_sentiment() {
        let focus = focus_for("performance", Source::IssueTracker);
        for sentiment in [None, Some(Sentiment::Positive), Some(Sentiment::Neutral)] {
            let filter = FilterSet {
                theme: Some("performance".to_string()),
                sentiment,
                source: Some(Source::IssueTracker),
                ..FilterSet::default()
            };
            assert!(!is_focus_active(&focus, &filter));
        }
    }

    #[test]
    fn theme_mismatch_is_inactive() {
        let focus = focus_for("performance", Source::IssueTracker);
        let filter = FilterSet {
            theme: Some("billing".to_string()),
            sentiment: Some(Sentiment::Negative),
            ..FilterSet::default()
        };
        assert!(!is_focus_active(&focus, &filter));
    }

    #[test]
    fn source_only_matters_when_the_focus_has_one() {
        let mut focus = focus_for("performance", Source::IssueTracker);
        focus.source = None;
        let filter = FilterSet {
            theme: Some("performance".to_string()),
            sentiment: Some(Sentiment::Negative),
            source: Some(Source::Forum),
            ..FilterSet::default()
        };
        assert!(is_focus_active(&focus, &filter));

        focus.source = Some(Source::IssueTracker);
        assert!(!is_focus_active(&focus, &filter));
    }
}
