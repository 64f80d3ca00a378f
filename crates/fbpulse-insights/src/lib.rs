//! Pure analytics over a filtered feedback working set.
//!
//! Every function here is a synchronous, deterministic transformation of a
//! record collection plus an explicit `now` — no storage, no clock reads,
//! no shared state. The boundary fetches the working set and serializes the
//! results; concurrent requests can run these computations independently.

pub mod active;
pub mod delta;
pub mod focus;
pub mod group;
pub mod themes;
pub mod trend;

pub use active::is_focus_active;
pub use delta::{recent_deltas, DeltaItem, DeltaKind};
pub use focus::{
    recommended_focus, FocusItem, SuggestedAction, SupportingStats, Tier, FOCUS_LIMIT,
    FOCUS_WINDOW_DAYS,
};
pub use group::{group_by_theme, ThemeGroup};
pub use themes::{
    heatmap, sankey, theme_summary, Heatmap, Sankey, SankeyLink, SankeyNode, ThemeCount,
    ThemeSummary, TOP_THEME_LIMIT,
};
pub use trend::{trend, TrendPoint, TrendSeries};
