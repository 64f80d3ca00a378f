use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use fbpulse_core::FilterSet;

use crate::middleware::RequestId;

use super::{cached_insight, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn theme_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<FilterSet>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let filter = filter.with_default_window();
    let key = format!("themes:{}", filter.cache_key());
    let window_days = filter.effective_days();
    let data = cached_insight(&state, &req_id.0, key, &filter, |records| {
        fbpulse_insights::theme_summary(records, window_days)
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn trend(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<FilterSet>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let filter = filter.with_default_window();
    let key = format!("trend:{}", filter.cache_key());
    let window_days = filter.effective_days();
    let now = Utc::now();
    let data = cached_insight(&state, &req_id.0, key, &filter, |records| {
        fbpulse_insights::trend(records, window_days, now)
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn heatmap(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<FilterSet>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let filter = filter.with_default_window();
    let key = format!("heatmap:{}", filter.cache_key());
    let data = cached_insight(&state, &req_id.0, key, &filter, |records| {
        fbpulse_insights::heatmap(records)
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn sankey(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<FilterSet>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let filter = filter.with_default_window();
    let key = format!("sankey:{}", filter.cache_key());
    let data = cached_insight(&state, &req_id.0, key, &filter, |records| {
        fbpulse_insights::sankey(records)
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_app;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use fbpulse_core::testutil::record;
    use fbpulse_core::{Sentiment, Source};
    use tower::ServiceExt;

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json parse"))
    }

    #[tokio::test]
    async fn trend_honors_the_days_parameter() {
        let now = Utc::now();
        let (app, store) = test_app();
        store
            .replace_all(vec![record(
                "fb-1",
                Source::Chat,
                Sentiment::Neutral,
                &["dx"],
                now - Duration::hours(1),
            )])
            .await;

        let (status, json) = get_json(app, "/api/v1/metrics/trend?days=3").await;
        assert_eq!(status, StatusCode::OK);
        // 3-day window yields 4 daily points, oldest first.
        assert_eq!(json["data"]["points"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn malformed_days_falls_back_to_default_window() {
        let (app, _store) = test_app();
        let (status, json) = get_json(app, "/api/v1/metrics/trend?days=banana").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["points"].as_array().map(Vec::len), Some(8));
    }

    #[tokio::test]
    async fn heatmap_rows_track_filtered_themes() {
        let now = Utc::now();
        let (app, store) = test_app();
        store
            .replace_all(vec![
                record("fb-1", Source::Forum, Sentiment::Negative, &["billing"], now),
                record("fb-2", Source::Chat, Sentiment::Positive, &["dx"], now),
            ])
            .await;

        let (status, json) = get_json(app, "/api/v1/metrics/heatmap?theme=billing").await;
        assert_eq!(status, StatusCode::OK);
        let themes = json["data"]["themes"].as_array().expect("themes");
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].as_str(), Some("billing"));
    }

    #[tokio::test]
    async fn sankey_always_lists_every_source_node() {
        let (app, store) = test_app();
        store
            .replace_all(vec![record(
                "fb-1",
                Source::Email,
                Sentiment::Neutral,
                &["docs"],
                Utc::now(),
            )])
            .await;

        let (status, json) = get_json(app, "/api/v1/metrics/sankey").await;
        assert_eq!(status, StatusCode::OK);
        let nodes = json["data"]["nodes"].as_array().expect("nodes");
        // 6 source nodes plus the single theme node.
        assert_eq!(nodes.len(), 7);
    }
}
