//! API layer for the consent gateway.
//!
//! REST routers for the basic (in-memory) and verify (delegated) endpoint
//! groups, plus the shared error and request types.

pub mod error;
pub mod handlers;
pub mod types;

pub use error::{ApiError, ErrorBody, MessageId};

use axum::routing::post;
use axum::Router;

use crate::server::AppState;

/// Build the `/basic` router.
pub fn basic_router() -> Router<AppState> {
    Router::new()
        .route("/assessment", post(handlers::basic::assessment))
        .route("/page_metadata", post(handlers::basic::page_metadata))
        .route("/consents", post(handlers::basic::consents))
}

/// Build the `/verify` router. Bearer-token auth is layered on by the caller.
pub fn verify_router() -> Router<AppState> {
    Router::new()
        .route("/assessment", post(handlers::verify::assessment))
        .route("/page_metadata", post(handlers::verify::page_metadata))
        .route("/consents", post(handlers::verify::consents))
}
