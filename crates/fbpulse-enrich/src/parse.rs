//! Tolerant parser for the model's line-oriented enrichment reply.

use fbpulse_core::{normalize_labels, Enrichment, Sentiment};

/// Longest summary we will synthesize from the raw body when the model
/// omits one.
const FALLBACK_SUMMARY_LEN: usize = 100;

/// Extract `{sentiment, themes, summary}` from a completion.
///
/// Lines are matched case-insensitively on their `Sentiment:`, `Themes:`,
/// and `Summary:` prefixes; anything missing falls back: neutral sentiment,
/// a single `general` theme, and a truncated copy of the original body as
/// the summary. The parser never fails — a garbage completion still yields
/// a usable enrichment.
#[must_use]
pub fn parse_completion(completion: &str, original_body: &str) -> Enrichment {
    let mut sentiment: Option<Sentiment> = None;
    let mut themes: Option<Vec<String>> = None;
    let mut summary: Option<String> = None;

    for line in completion.lines() {
        let line = line.trim();
        if let Some(value) = strip_prefix_ci(line, "sentiment:") {
            sentiment = sentiment.or_else(|| parse_sentiment(value));
        } else if let Some(value) = strip_prefix_ci(line, "themes:") {
            let parsed = normalize_labels(
                value
                    .trim_matches(|c| c == '[' || c == ']')
                    .split(',')
                    .map(ToString::to_string)
                    .collect(),
            );
            if !parsed.is_empty() {
                themes.get_or_insert(parsed);
            }
        } else if let Some(value) = strip_prefix_ci(line, "summary:") {
            let cleaned = value.trim_matches(|c| c == '[' || c == ']').trim();
            if !cleaned.is_empty() {
                summary.get_or_insert_with(|| cleaned.to_string());
            }
        }
    }

    Enrichment {
        sentiment: sentiment.unwrap_or(Sentiment::Neutral),
        themes: themes.unwrap_or_else(|| vec!["general".to_string()]),
        summary: summary.unwrap_or_else(|| truncate(original_body, FALLBACK_SUMMARY_LEN)),
    }
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}

fn parse_sentiment(value: &str) -> Option<Sentiment> {
    let cleaned = value
        .trim_matches(|c| c == '[' || c == ']')
        .trim()
        .to_lowercase();
    match cleaned.as_str() {
        "positive" => Some(Sentiment::Positive),
        "negative" => Some(Sentiment::Negative),
        "neutral" => Some(Sentiment::Neutral),
        _ => None,
    }
}

/// Cut on a char boundary at or below `max` bytes.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
