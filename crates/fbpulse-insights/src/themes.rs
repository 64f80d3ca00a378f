//! Theme Aggregator: top-theme counts, the theme-by-sentiment heatmap, and
//! the source-to-theme sankey flow.

use fbpulse_core::{FeedbackRecord, Sentiment, Source};
use serde::Serialize;

use crate::group::{group_by_theme, ThemeGroup};

/// Themes beyond this rank are dropped from every aggregate view.
pub const TOP_THEME_LIMIT: usize = 15;

#[derive(Debug, Clone, Serialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct ThemeSummary {
    pub window_days: u32,
    pub total_items_considered: u64,
    pub themes: Vec<ThemeCount>,
}

#[derive(Debug, Serialize)]
pub struct Heatmap {
    /// Row labels, in top-theme order.
    pub themes: Vec<String>,
    /// Column labels, fixed sentiment axis order.
    pub sentiments: Vec<&'static str>,
    /// `matrix[row][col]` = records carrying `themes[row]` with
    /// `sentiments[col]`. Each row sums to the theme's total count.
    pub matrix: Vec<Vec<u64>>,
    pub total_items_considered: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeyNode {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeyLink {
    pub source: String,
    pub target: String,
    pub value: u64,
}

#[derive(Debug, Serialize)]
pub struct Sankey {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
    pub total_items_considered: u64,
}

/// Theme groups sorted by count descending, first-seen order on ties,
/// truncated to [`TOP_THEME_LIMIT`].
fn top_theme_groups<'a>(records: &[&'a FeedbackRecord]) -> Vec<ThemeGroup<'a>> {
    let mut groups = group_by_theme(records);
    // Stable sort: equal counts keep their first-seen discovery order.
    groups.sort_by(|a, b| b.records.len().cmp(&a.records.len()));
    groups.truncate(TOP_THEME_LIMIT);
    groups
}

/// Count occurrences per theme over the working set.
#[must_use]
pub fn theme_summary(records: &[&FeedbackRecord], window_days: u32) -> ThemeSummary {
    let themes = top_theme_groups(records)
        .into_iter()
        .map(|g| ThemeCount {
            theme: g.theme,
            count: g.records.len() as u64,
        })
        .collect();

    ThemeSummary {
        window_days,
        total_items_considered: records.len() as u64,
        themes,
    }
}

/// Theme-by-sentiment count matrix over the top themes.
#[must_use]
pub fn heatmap(records: &[&FeedbackRecord]) -> Heatmap {
    let groups = top_theme_groups(records);

    let matrix = groups
        .iter()
        .map(|group| {
            Sentiment::AXIS
                .iter()
                .map(|&sentiment| {
                    group
                        .records
                        .iter()
                        .filter(|r| r.sentiment == sentiment)
                        .count() as u64
                })
                .collect()
        })
        .collect();

    Heatmap {
        themes: groups.into_iter().map(|g| g.theme).collect(),
        sentiments: Sentiment::AXIS.iter().map(|s| s.as_str()).collect(),
        matrix,
        total_items_considered: records.len() as u64,
    }
}

/// Weighted source-to-theme edges over the top themes.
///
/// Nodes list every channel in enumeration order followed by the top themes
/// in rank order; links iterate sources in enumeration order, themes in top
/// order, and only nonzero co-occurrences are emitted.
#[must_use]
pub fn sankey(records: &[&FeedbackRecord]) -> Sankey {
    let groups = top_theme_groups(records);

    let mut nodes: Vec<SankeyNode> = Source::ALL
        .iter()
        .map(|s| SankeyNode {
            name: s.as_str().to_string(),
        })
        .collect();
    nodes.extend(groups.iter().map(|g| SankeyNode {
        name: g.theme.clone(),
    }));

    let mut links = Vec::new();
    for source in Source::ALL {
        for group in &groups {
            let value = group
                .records
                .iter()
                .filter(|r| r.source == source)
                .count() as u64;
            if value > 0 {
                links.push(SankeyLink {
                    source: source.as_str().to_string(),
                    target: group.theme.clone(),
                    value,
                });
            }
        }
    }

    Sankey {
        nodes,
        links,
        total_items_considered: records.len() as u64,
    }
}
