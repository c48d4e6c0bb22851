//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use consent_gateway::server::{build_router, AppState};
use consent_gateway::verify::{VerifyClient, VerifyConfig};

/// Application state wired against an unreachable verify tenant.
///
/// Basic-mode tests never touch the network; verify-mode tests only exercise
/// the paths that fail before any upstream call.
pub fn test_state() -> AppState {
    let config = VerifyConfig::new(
        "http://127.0.0.1:9".to_string(),
        "test-client".to_string(),
        "test-secret".to_string(),
    );
    AppState::new(Arc::new(VerifyClient::new(config)))
}

/// Full application router over fresh state.
pub fn test_app() -> axum::Router {
    build_router(test_state()).expect("router builds")
}

/// Send a request to the test router.
pub async fn send_request(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

/// Assessment request body for one purpose.
pub fn assessment_body(subject_id: &str, purpose_id: &str) -> serde_json::Value {
    json!({
        "subjectId": subject_id,
        "items": [{"purposeId": purpose_id}]
    })
}

/// Minimal consent input for one purpose.
pub fn consent_input(subject_id: &str, purpose_id: &str, state: &str) -> serde_json::Value {
    json!({
        "subjectId": subject_id,
        "purposeId": purpose_id,
        "state": state
    })
}
