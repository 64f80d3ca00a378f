mod feedback;
mod insights;
mod metrics;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use fbpulse_core::{FeedbackStore, StoreError};
use fbpulse_enrich::Enricher;

use crate::cache::InsightCache;
use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub enricher: Arc<dyn Enricher>,
    pub cache: InsightCache,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound(id) => {
            ApiError::new(request_id, "not_found", format!("feedback not found: {id}"))
        }
        StoreError::Invalid(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        StoreError::Backend(e) => {
            tracing::error!(error = %e, "store query failed");
            ApiError::new(request_id, "internal_error", "store query failed")
        }
    }
}

/// Serve an insight payload from the cache, computing it from the filtered
/// working set on a miss. All metric and insight endpoints route through
/// here so one computation serves every client with the same filters until
/// the TTL lapses or a write invalidates.
pub(super) async fn cached_insight<T, F>(
    state: &AppState,
    request_id: &str,
    key: String,
    filter: &fbpulse_core::FilterSet,
    compute: F,
) -> Result<serde_json::Value, ApiError>
where
    T: Serialize,
    F: FnOnce(&[&fbpulse_core::FeedbackRecord]) -> T,
{
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(hit);
    }

    let records = state
        .store
        .fetch_feedback(filter)
        .await
        .map_err(|e| map_store_error(request_id.to_string(), &e))?;
    let refs: Vec<&fbpulse_core::FeedbackRecord> = records.iter().collect();

    let value = serde_json::to_value(compute(&refs)).map_err(|e| {
        tracing::error!(error = %e, "insight serialization failed");
        ApiError::new(request_id.to_string(), "internal_error", "insight serialization failed")
    })?;

    state.cache.put(key, value.clone()).await;
    Ok(value)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn api_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/feedback",
            get(feedback::list_feedback).post(feedback::create_feedback),
        )
        .route("/api/v1/feedback/{id}", get(feedback::get_feedback))
        .route(
            "/api/v1/feedback/{id}/status",
            patch(feedback::update_status),
        )
        .route(
            "/api/v1/feedback/{id}/enrich",
            post(feedback::enrich_feedback),
        )
        .route("/api/v1/metrics/themes", get(metrics::theme_summary))
        .route("/api/v1/metrics/trend", get(metrics::trend))
        .route("/api/v1/metrics/heatmap", get(metrics::heatmap))
        .route("/api/v1/metrics/sankey", get(metrics::sankey))
        .route(
            "/api/v1/insights/recommended",
            get(insights::recommended_focus),
        )
        .route("/api/v1/insights/deltas", get(insights::recent_deltas))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        )))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    store: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        store: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Duration as ChronoDuration, Utc};
    use fbpulse_core::testutil::record;
    use fbpulse_core::{Enrichment, MemoryStore, Sentiment, Source};
    use fbpulse_enrich::EnrichError;
    use tower::ServiceExt;

    pub(crate) struct NoopEnricher;

    #[async_trait]
    impl Enricher for NoopEnricher {
        async fn enrich(&self, _text: &str) -> Result<Enrichment, EnrichError> {
            Ok(Enrichment {
                sentiment: Sentiment::Neutral,
                themes: vec!["general".to_string()],
                summary: "noop".to_string(),
            })
        }
    }

    pub(crate) fn test_app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState {
            store: Arc::clone(&store) as Arc<dyn FeedbackStore>,
            enricher: Arc::new(NoopEnricher),
            cache: InsightCache::new(Duration::from_secs(60)),
        };
        let app = build_app(state, default_rate_limit_state());
        (app, store)
    }

    #[tokio::test]
    async fn health_reports_ok_with_a_live_store() {
        let (app, _store) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
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
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn response_echoes_provided_request_id() {
        let (app, _store) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-abc-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-abc-123")
        );
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_upstream_error_maps_to_bad_gateway() {
        let response = ApiError::new("req-1", "upstream_error", "model down").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unknown_route_is_a_plain_404() {
        let (app, _store) = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nope")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_reflect_seeded_records() {
        let now = Utc::now();
        let records = vec![
            record("fb-1", Source::Forum, Sentiment::Negative, &["billing"], now),
            record(
                "fb-2",
                Source::Chat,
                Sentiment::Negative,
                &["billing"],
                now - ChronoDuration::hours(3),
            ),
            record(
                "fb-3",
                Source::Email,
                Sentiment::Positive,
                &["dx"],
                now - ChronoDuration::hours(5),
            ),
        ];
        let (app, store) = test_app();
        store.replace_all(records).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/metrics/themes")
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
        let themes = json["data"]["themes"].as_array().expect("themes array");
        assert_eq!(themes[0]["theme"].as_str(), Some("billing"));
        assert_eq!(themes[0]["count"].as_u64(), Some(2));
    }
}
