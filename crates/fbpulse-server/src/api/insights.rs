use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;

use fbpulse_core::FilterSet;
use fbpulse_insights::{is_focus_active, FocusItem};

use crate::middleware::RequestId;

use super::{cached_insight, ApiError, ApiResponse, AppState, ResponseMeta};

/// Deltas compare the last 24h against the 24h before, so the working set
/// must span at least two days regardless of the requested window.
const DELTA_MIN_DAYS: u32 = 2;

#[derive(Debug, Serialize)]
struct RecommendedItem {
    #[serde(flatten)]
    focus: FocusItem,
    /// Whether the caller's current filters already reflect this
    /// recommendation.
    active: bool,
}

pub(super) async fn recommended_focus(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<FilterSet>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let filter = filter.with_default_window();
    let key = format!("recommended:{}", filter.cache_key());
    let now = Utc::now();
    let data = cached_insight(&state, &req_id.0, key, &filter, |records| {
        fbpulse_insights::recommended_focus(records, now)
            .into_iter()
            .map(|focus| RecommendedItem {
                active: is_focus_active(&focus, &filter),
                focus,
            })
            .collect::<Vec<_>>()
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn recent_deltas(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<FilterSet>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mut window = filter.clone();
    window.days = Some(window.effective_days().max(DELTA_MIN_DAYS));

    let key = format!("deltas:{}", window.cache_key());
    let now = Utc::now();
    let data = cached_insight(&state, &req_id.0, key, &window, |records| {
        fbpulse_insights::recent_deltas(records, now)
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
