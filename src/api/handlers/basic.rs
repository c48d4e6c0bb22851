//! Handlers for the basic (in-memory) consent endpoints.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::{
    consents_array, decode_body, ConsentsResponse, PageMetadataResponse, PrivacyRequest,
};
use crate::infra::{Assessment, ConsentInput};
use crate::server::AppState;

use super::client_ip;

/// `POST /basic/assessment`
pub async fn assessment(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Assessment>, ApiError> {
    let request: PrivacyRequest = decode_body(body)?;
    let (subject_id, items) = request.validated()?;

    Ok(Json(state.assessor.assess(subject_id, items)))
}

/// `POST /basic/page_metadata`
pub async fn page_metadata(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PageMetadataResponse>, ApiError> {
    let request: PrivacyRequest = decode_body(body)?;
    let (subject_id, items) = request.validated()?;

    Ok(Json(PageMetadataResponse {
        metadata: state.metadata.assemble(subject_id, items),
        unhandled: Vec::new(),
    }))
}

/// `POST /basic/consents`
///
/// Records are processed independently: any per-record failure turns the
/// response into a 207 while still reporting every outcome in input order.
pub async fn consents(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let consents = consents_array(body)?;
    let inputs: Vec<ConsentInput> = consents
        .into_iter()
        .map(decode_body)
        .collect::<Result<_, _>>()?;

    let ip = client_ip(connect_info.as_ref());
    let outcome = state.recorder.store_batch(inputs, &ip);

    let status = if outcome.has_failures {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ConsentsResponse {
            results: outcome.results,
        }),
    ))
}
