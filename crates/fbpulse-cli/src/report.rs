//! Plain-text insight report for a terminal.

use chrono::Utc;

use fbpulse_core::{FeedbackRecord, FeedbackStore, FilterSet};

/// Print top themes, recommendations, and movement for the given window.
pub async fn run(store: &dyn FeedbackStore, days: Option<u32>) -> anyhow::Result<()> {
    let filter = FilterSet {
        days,
        ..FilterSet::default()
    }
    .with_default_window();
    let records = store.fetch_feedback(&filter).await?;
    let refs: Vec<&FeedbackRecord> = records.iter().collect();
    let now = Utc::now();

    let summary = fbpulse_insights::theme_summary(&refs, filter.effective_days());
    println!(
        "== Top themes (last {} days, {} items) ==",
        summary.window_days, summary.total_items_considered
    );
    for theme in &summary.themes {
        println!("  {:<24} {}", theme.theme, theme.count);
    }

    let focus = fbpulse_insights::recommended_focus(&refs, now);
    println!("\n== Recommended focus ==");
    if focus.is_empty() {
        println!("  nothing stands out");
    }
    for item in &focus {
        println!("  [{:.1}] {} — {}", item.score, item.title, item.explanation);
    }

    let deltas = fbpulse_insights::recent_deltas(&refs, now);
    println!("\n== Last 24h movement ==");
    if deltas.is_empty() {
        println!("  no significant movement");
    }
    for delta in &deltas {
        println!("  {}", delta.label);
    }

    Ok(())
}
