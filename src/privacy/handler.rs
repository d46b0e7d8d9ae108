//! HTTP handlers for the Privacy API
//!
//! Provides REST endpoints for validation, reporting, configuration and
//! audit inspection:
//! - POST  /api/v1/privacy/validate      - validate any JSON payload
//! - POST  /api/v1/privacy/report        - validate and build a compliance report
//! - GET   /api/v1/privacy/config        - current validator configuration
//! - PATCH /api/v1/privacy/config        - partial configuration update
//! - POST  /api/v1/privacy/config/reset  - restore defaults
//! - GET   /api/v1/privacy/audit         - recent audit records (filterable)
//! - GET   /api/v1/privacy/audit/stats   - audit summary

use crate::config::ConfigUpdate;
use crate::error::{to_json, Error};
use crate::privacy::audit::AuditLog;
use crate::privacy::report::ComplianceReport;
use crate::privacy::types::{Severity, ValidationResult};
use crate::privacy::validator::PrivacyValidator;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for privacy handlers
#[derive(Clone)]
pub struct PrivacyState {
    pub validator: Arc<PrivacyValidator>,
    pub audit: Arc<AuditLog>,
}

/// Create the privacy router
pub fn privacy_router(state: PrivacyState) -> Router {
    Router::new()
        .route("/api/v1/privacy/validate", post(validate))
        .route("/api/v1/privacy/report", post(report))
        .route(
            "/api/v1/privacy/config",
            get(get_config).patch(update_config),
        )
        .route("/api/v1/privacy/config/reset", post(reset_config))
        .route("/api/v1/privacy/audit", get(list_audit))
        .route("/api/v1/privacy/audit/stats", get(audit_stats))
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

/// API error body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: "BAD_REQUEST".to_string(),
                message: message.into(),
            },
        }
    }
}

/// Validation result together with its report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub result: ValidationResult,
    pub report: ComplianceReport,
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
    severity: Option<String>,
    limit: Option<usize>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/privacy/validate
async fn validate(State(state): State<PrivacyState>, body: Bytes) -> Response {
    match state.validator.validate_slice(&body) {
        Ok(result) => Json(result).into_response(),
        Err(e) => invalid_body(e),
    }
}

/// POST /api/v1/privacy/report
async fn report(State(state): State<PrivacyState>, body: Bytes) -> Response {
    match state.validator.validate_slice(&body) {
        Ok(result) => {
            let report = state.validator.report(&result);
            Json(ReportResponse { result, report }).into_response()
        }
        Err(e) => invalid_body(e),
    }
}

fn invalid_body(e: Error) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(to_json(ApiError::bad_request(format!(
            "Payload is not valid JSON: {}",
            e
        )))),
    )
        .into_response()
}

/// GET /api/v1/privacy/config
async fn get_config(State(state): State<PrivacyState>) -> impl IntoResponse {
    Json(to_json(&*state.validator.get_config()))
}

/// PATCH /api/v1/privacy/config
async fn update_config(
    State(state): State<PrivacyState>,
    Json(update): Json<ConfigUpdate>,
) -> impl IntoResponse {
    match state.validator.update_config(&update) {
        Ok(config) => (StatusCode::OK, Json(to_json(&*config))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(to_json(ApiError::bad_request(e.to_string()))),
        ),
    }
}

/// POST /api/v1/privacy/config/reset
async fn reset_config(State(state): State<PrivacyState>) -> impl IntoResponse {
    Json(to_json(&*state.validator.reset_config()))
}

/// GET /api/v1/privacy/audit
async fn list_audit(
    State(state): State<PrivacyState>,
    Query(params): Query<AuditQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(50).min(500);

    let severity = match params.severity.as_deref().map(str::to_lowercase).as_deref() {
        None => None,
        Some("low") => Some(Severity::Low),
        Some("medium") => Some(Severity::Medium),
        Some("high") => Some(Severity::High),
        Some(other) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(to_json(ApiError::bad_request(format!(
                    "Unknown severity: {}. Valid: low, medium, high",
                    other
                )))),
            );
        }
    };

    let records = match severity {
        Some(s) => state.audit.by_severity(s, limit),
        None => state.audit.recent(limit),
    };
    (StatusCode::OK, Json(to_json(records)))
}

/// GET /api/v1/privacy/audit/stats
async fn audit_stats(State(state): State<PrivacyState>) -> impl IntoResponse {
    Json(state.audit.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn make_state() -> PrivacyState {
        let audit = Arc::new(AuditLog::new(100));
        let validator = Arc::new(
            PrivacyValidator::with_defaults()
                .unwrap()
                .with_audit_sink(audit.clone()),
        );
        PrivacyState { validator, audit }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_validate_clean_payload() {
        let app = privacy_router(make_state());
        let resp = app
            .oneshot(post_json(
                "/api/v1/privacy/validate",
                r#"{"note":"the weather is nice today"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["isCompliant"], true);
        assert_eq!(json["riskScore"], 0);
        assert_eq!(json["dataClassification"], "PUBLIC");
        assert_eq!(json["processingRecommendation"], "ALLOW");
    }

    #[tokio::test]
    async fn test_validate_email() {
        let app = privacy_router(make_state());
        let resp = app
            .oneshot(post_json(
                "/api/v1/privacy/validate",
                r#"{"contact":"test@example.com"}"#,
            ))
            .await
            .unwrap();

        let json = body_json(resp).await;
        assert_eq!(json["isCompliant"], false);
        assert_eq!(json["violations"][0]["type"], "PII_DETECTED");
        assert_eq!(json["violations"][0]["field"], "email");
        assert_eq!(json["violations"][0]["severity"], "HIGH");
        assert_eq!(json["processingRecommendation"], "ANONYMIZE");
    }

    #[tokio::test]
    async fn test_validate_null_body() {
        let app = privacy_router(make_state());
        let resp = app
            .oneshot(post_json("/api/v1/privacy/validate", "null"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["isCompliant"], true);
    }

    #[tokio::test]
    async fn test_validate_deeply_nested_body_fails_closed() {
        let depth = 200;
        let body = format!("{}\"x\"{}", "[".repeat(depth), "]".repeat(depth));
        let resp = privacy_router(make_state())
            .oneshot(post_json("/api/v1/privacy/validate", &body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["isCompliant"], false);
        assert_eq!(json["riskScore"], 100);
        assert_eq!(json["dataClassification"], "RESTRICTED");
        assert_eq!(json["processingRecommendation"], "REJECT");
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_validate_malformed_body() {
        let resp = privacy_router(make_state())
            .oneshot(post_json("/api/v1/privacy/validate", "{\"note\": "))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_report() {
        let app = privacy_router(make_state());
        let resp = app
            .oneshot(post_json(
                "/api/v1/privacy/report",
                r#"["123-45-6789","test@example.com"]"#,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["result"]["dataClassification"], "RESTRICTED");
        assert!(json["report"]["summary"]
            .as_str()
            .unwrap()
            .contains("RESTRICTED"));
        assert!(!json["report"]["nextSteps"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_and_patch_config() {
        let state = make_state();

        let resp = privacy_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/v1/privacy/config")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"maxDataSize":2048}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["maxDataSize"], 2048);

        let resp = privacy_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/privacy/config")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["maxDataSize"], 2048);
        assert_eq!(json["logViolations"], true);
        assert_eq!(json["strictMode"], true);
    }

    #[tokio::test]
    async fn test_patch_config_rejects_negative_size() {
        let state = make_state();
        let resp = privacy_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/v1/privacy/config")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"maxDataSize":-10}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(
            state.validator.get_config().max_data_size,
            crate::config::DEFAULT_MAX_DATA_SIZE
        );
    }

    #[tokio::test]
    async fn test_reset_config() {
        let state = make_state();
        state
            .validator
            .update_config(&ConfigUpdate {
                strict_mode: Some(false),
                ..Default::default()
            })
            .unwrap();

        let resp = privacy_router(state.clone())
            .oneshot(post_json("/api/v1/privacy/config/reset", ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.validator.get_config().strict_mode);
    }

    #[tokio::test]
    async fn test_audit_endpoints() {
        let state = make_state();
        state
            .validator
            .validate_json(serde_json::json!(["test@example.com", "John Smith"]));

        let resp = privacy_router(state.clone())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/privacy/audit?severity=medium")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["field"], "name");

        let resp = privacy_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/privacy/audit/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["totalRecorded"], 2);
        assert_eq!(json["buffered"], 2);
        assert_eq!(json["bySeverity"]["high"], 1);
        assert_eq!(json["bySeverity"]["medium"], 1);
    }

    #[tokio::test]
    async fn test_audit_unknown_severity() {
        let resp = privacy_router(make_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/privacy/audit?severity=extreme")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
