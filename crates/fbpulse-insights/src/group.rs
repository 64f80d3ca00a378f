//! Multi-membership theme grouping.
//!
//! A record carrying k themes is counted into k groups. This is the one
//! shared grouping primitive behind the theme summary, the heatmap, the
//! sankey flow, the focus recommender, and the delta detector — groups hold
//! back-references only, never owned copies.

use std::collections::HashMap;

use fbpulse_core::FeedbackRecord;

/// One theme's records within a working set.
#[derive(Debug)]
pub struct ThemeGroup<'a> {
    pub theme: String,
    pub records: Vec<&'a FeedbackRecord>,
}

/// Group a working set by theme, preserving first-seen theme order.
///
/// First-seen order is the deterministic tie-break for every downstream
/// "top-N" and equal-score sort, so it must stay stable.
#[must_use]
pub fn group_by_theme<'a>(records: &[&'a FeedbackRecord]) -> Vec<ThemeGroup<'a>> {
    let mut groups: Vec<ThemeGroup<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        for theme in &record.themes {
            match index.get(theme) {
                Some(&i) => groups[i].records.push(record),
                None => {
                    index.insert(theme.clone(), groups.len());
                    groups.push(ThemeGroup {
                        theme: theme.clone(),
                        records: vec![record],
                    });
                }
            }
        }
    }

    groups
}
