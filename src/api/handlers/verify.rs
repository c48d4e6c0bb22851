//! Handlers for the verify endpoints, delegated to the external
//! consent-management service.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::{consents_array, decode_body, validate_consent_fields, PrivacyRequest};
use crate::server::AppState;

use super::client_ip;

/// Caller IP for upstream context: an explicit `geoIP` in the request body
/// wins over the observed peer address.
fn effective_ip(
    request: &PrivacyRequest,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> String {
    request
        .geo_ip
        .clone()
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| client_ip(connect_info))
}

/// `POST /verify/assessment`
pub async fn assessment(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let request: PrivacyRequest = decode_body(body.clone())?;
    let (subject_id, _) = request.validated()?;

    // Items are forwarded verbatim; this endpoint is a pass-through.
    let items = body.get("items").cloned().unwrap_or_else(|| Value::Array(vec![]));
    let ip = effective_ip(&request, connect_info.as_ref());

    let response = state
        .verify
        .assess(
            subject_id,
            request.is_external_subject.unwrap_or(false),
            &ip,
            items,
        )
        .await?;

    Ok(Json(response))
}

/// `POST /verify/page_metadata`
pub async fn page_metadata(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let request: PrivacyRequest = decode_body(body.clone())?;
    let (subject_id, _) = request.validated()?;

    let items = body.get("items").cloned().unwrap_or_else(|| Value::Array(vec![]));
    let ip = effective_ip(&request, connect_info.as_ref());
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    let response = state
        .verify
        .consent_metadata(
            subject_id,
            request.is_external_subject.unwrap_or(false),
            &ip,
            items,
            accept_language,
        )
        .await?;

    Ok(Json(response))
}

/// `POST /verify/consents`
pub async fn consents(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let consents = consents_array(body)?;
    validate_consent_fields(&consents)?;

    let ip = client_ip(connect_info.as_ref());
    let response = state.verify.store_consents(consents, &ip).await?;

    let upstream_error = response.get("status").and_then(Value::as_str) == Some("error");
    let any_failed = response
        .get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .any(|r| r.get("result").and_then(Value::as_str) == Some("failure"))
        })
        .unwrap_or(false);

    let status = if upstream_error || any_failed {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };

    Ok((status, Json(response)))
}
