use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use fakescan_core::{format_count, format_created_at, format_timestamp, Label, Provenance};
use fakescan_pipeline::{AnalyzeError, Analysis};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    username: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    username: String,
    prediction: Label,
    confidence: f64,
    source: Provenance,
    account: AccountData,
    display: DisplayData,
}

#[derive(Debug, Serialize)]
struct AccountData {
    followers_count: Option<i64>,
    friends_count: Option<i64>,
    statuses_count: Option<i64>,
    listed_count: Option<i64>,
    created_at: String,
    verified: bool,
    description: String,
    fetched_at: String,
}

/// Pre-formatted values for presentation.
#[derive(Debug, Serialize)]
struct DisplayData {
    followers_count: String,
    friends_count: String,
    statuses_count: String,
    listed_count: String,
    created_at: String,
    source: &'static str,
}

impl From<Analysis> for AnalyzeData {
    fn from(analysis: Analysis) -> Self {
        let Analysis { result, record } = analysis;
        let count = |value: Option<i64>| value.map_or_else(|| "N/A".to_string(), format_count);

        Self {
            display: DisplayData {
                followers_count: count(record.followers_count),
                friends_count: count(record.friends_count),
                statuses_count: count(record.statuses_count),
                listed_count: count(record.listed_count),
                created_at: format_created_at(&record.created_at),
                source: result.source.display_name(),
            },
            account: AccountData {
                followers_count: record.followers_count,
                friends_count: record.friends_count,
                statuses_count: record.statuses_count,
                listed_count: record.listed_count,
                created_at: record.created_at,
                verified: record.verified,
                description: record.description,
                fetched_at: format_timestamp(&record.timestamp),
            },
            username: record.username,
            prediction: result.label,
            confidence: result.confidence,
            source: result.source,
        }
    }
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("request body must be JSON with a username field: {rejection}"),
        )
    })?;

    match state.analyzer.analyze(&request.username).await {
        Ok(analysis) => Ok(Json(ApiResponse {
            data: AnalyzeData::from(analysis),
            meta: ResponseMeta::new(req_id.0),
        })),
        Err(error) => Err(map_analyze_error(req_id.0, &error)),
    }
}

pub(super) fn map_analyze_error(request_id: String, error: &AnalyzeError) -> ApiError {
    match error {
        AnalyzeError::InvalidUsername => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        AnalyzeError::NotFound(_) => ApiError::new(request_id, "not_found", error.to_string()),
        AnalyzeError::Feature(_) | AnalyzeError::Store(_) => {
            tracing::error!(error = %error, "analysis failed");
            ApiError::new(request_id, "internal_error", error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use chrono::NaiveDate;
    use fakescan_core::{now_local, AccountRecord};
    use fakescan_model::FeatureError;
    use fakescan_twitter::NotFoundReason;
    use tower::ServiceExt;

    use super::super::build_app;
    use super::super::test_support::{state, MemoryStore};
    use super::*;

    fn alice() -> AccountRecord {
        AccountRecord {
            username: "alice".to_string(),
            followers_count: Some(1000),
            friends_count: Some(200),
            statuses_count: Some(500),
            listed_count: Some(10),
            created_at: "2012-06-01T08:30:00.000Z".to_string(),
            verified: false,
            description: "coffee and code".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn bob() -> AccountRecord {
        AccountRecord {
            username: "bob".to_string(),
            followers_count: Some(5),
            friends_count: Some(4000),
            statuses_count: Some(20_000),
            listed_count: Some(0),
            created_at: "unknown".to_string(),
            verified: false,
            description: String::new(),
            timestamp: now_local(),
        }
    }

    async fn post(app: axum::Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/analyze")
                    .header("content-type", "application/json")
                    .header("x-request-id", "req-analyze")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn live_fetch_is_classified_and_formatted() {
        let store = Arc::new(MemoryStore::default());
        let app = build_app(state(Arc::clone(&store), vec![alice()]));

        let (status, json) = post(app, r#"{"username": " @alice "}"#).await;

        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["username"], "alice");
        assert_eq!(data["prediction"], "genuine");
        assert_eq!(data["source"], "live-fetch");
        assert_eq!(data["account"]["friends_count"], 200);
        assert_eq!(data["display"]["followers_count"], "1,000");
        assert_eq!(data["display"]["created_at"], "Jun 01, 2012");
        assert_eq!(data["display"]["source"], "Twitter API");
        let confidence = data["confidence"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&confidence));
        assert_eq!(json["meta"]["request_id"], "req-analyze");
    }

    #[tokio::test]
    async fn cached_account_reports_cache_source() {
        let store = Arc::new(MemoryStore::default());
        store.insert(&bob());
        let app = build_app(state(store, Vec::new()));

        let (status, json) = post(app, r#"{"username": "bob"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["prediction"], "fake");
        assert_eq!(json["data"]["source"], "cache");
        assert_eq!(json["data"]["display"]["source"], "Database Cache");
        assert_eq!(json["data"]["display"]["created_at"], "N/A");
    }

    #[tokio::test]
    async fn blank_username_is_a_validation_error() {
        let app = build_app(state(Arc::new(MemoryStore::default()), Vec::new()));

        let (status, json) = post(app, r#"{"username": "  @ "}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
        assert_eq!(json["error"]["message"], "Please enter a username");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = build_app(state(Arc::new(MemoryStore::default()), Vec::new()));

        let (status, json) = post(app, r#"{"name": "alice"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let app = build_app(state(Arc::new(MemoryStore::default()), Vec::new()));

        let (status, json) = post(app, r#"{"username": "ghost"}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
        assert_eq!(json["error"]["message"], "User not found");
    }

    #[test]
    fn exhausted_credentials_look_like_not_found() {
        let error = AnalyzeError::NotFound(NotFoundReason::Exhausted { attempts: 4 });
        let response = map_analyze_error("r".to_string(), &error).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_feature_is_an_internal_error_with_detail() {
        let error = AnalyzeError::Feature(FeatureError::Missing {
            username: "dave".to_string(),
            field: "listed_count",
        });
        let api_error = map_analyze_error("r".to_string(), &error);
        assert_eq!(api_error.error.code, "internal_error");
        assert!(api_error.error.message.contains("listed_count"));
        assert_eq!(
            api_error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
