use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use fbpulse_core::{FeedbackRecord, FeedbackStatus, FilterSet, NewFeedback};

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct PageQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct FeedbackPage {
    items: Vec<FeedbackRecord>,
    total: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusUpdate {
    status: FeedbackStatus,
}

pub(super) async fn list_feedback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(filter): Query<FilterSet>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<FeedbackPage>>, ApiError> {
    let filter = filter.with_default_window();
    let limit = normalize_limit(page.limit);
    let offset = page.offset.unwrap_or(0).max(0);

    let (items, total) = state
        .store
        .list_feedback(&filter, limit, offset)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: FeedbackPage { items, total },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_feedback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(input): Json<NewFeedback>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackRecord>>), ApiError> {
    let record = state
        .store
        .insert_feedback(input)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    state.cache.invalidate_all().await;
    tracing::info!(id = %record.id, source = %record.source, "feedback ingested");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: record,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_feedback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FeedbackRecord>>, ApiError> {
    let record = state
        .store
        .get_feedback(&id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", format!("feedback not found: {id}")))?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn update_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<ApiResponse<FeedbackRecord>>, ApiError> {
    let record = state
        .store
        .update_status(&id, update.status)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    state.cache.invalidate_all().await;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// On-demand enrichment for a single record, bypassing the scheduled drain.
pub(super) async fn enrich_feedback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FeedbackRecord>>, ApiError> {
    let record = state
        .store
        .get_feedback(&id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", format!("feedback not found: {id}")))?;

    let enrichment = state.enricher.enrich(&record.body).await.map_err(|e| {
        tracing::warn!(id = %id, error = %e, "on-demand enrichment failed");
        ApiError::new(req_id.0.clone(), "upstream_error", "enrichment model unavailable")
    })?;

    let updated = state
        .store
        .apply_enrichment(&id, enrichment)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    state.cache.invalidate_all().await;

    Ok(Json(ApiResponse {
        data: updated,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_app;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (app, _store) = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/feedback",
                serde_json::json!({
                    "source": "forum",
                    "body": "cold starts are way too slow on the free tier"
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let id = json["data"]["id"].as_str().expect("id").to_string();
        assert_eq!(json["data"]["sentiment"].as_str(), Some("unknown"));
        assert_eq!(json["data"]["status"].as_str(), Some("new"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/feedback/{id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_body_is_a_validation_error() {
        let (app, _store) = test_app();

        let response = app
            .oneshot(post_json(
                "/api/v1/feedback",
                serde_json::json!({"source": "chat", "body": "   "}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
    }

    #[tokio::test]
    async fn get_missing_record_is_not_found() {
        let (app, _store) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/feedback/does-not-exist")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_patch_updates_the_record() {
        let (app, _store) = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/feedback",
                serde_json::json!({"source": "email", "body": "billing page is confusing"}),
            ))
            .await
            .expect("response");
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let id = json["data"]["id"].as_str().expect("id").to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/api/v1/feedback/{id}/status"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status":"triaged"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"].as_str(), Some("triaged"));
    }

    #[tokio::test]
    async fn on_demand_enrich_fills_summary() {
        let (app, _store) = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/feedback",
                serde_json::json!({"source": "chat", "body": "search never finds my docs"}),
            ))
            .await
            .expect("response");
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let id = json["data"]["id"].as_str().expect("id").to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/feedback/{id}/enrich"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["summary"].as_str(), Some("noop"));
        assert_eq!(json["data"]["sentiment"].as_str(), Some("neutral"));
    }
}
