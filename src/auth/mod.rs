//! Bearer-token authentication for the verify endpoints.
//!
//! Tokens are validated by introspecting them against the configured tenant;
//! a single external call per request, no local token parsing.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error;
use crate::verify::{Introspection, VerifyClient};

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub verify: Arc<VerifyClient>,
}

/// Introspection result attached to authenticated requests.
#[derive(Clone)]
pub struct TokenInfo(pub Introspection);

/// Middleware requiring a valid bearer token on every request.
pub async fn require_bearer(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(token) = header.and_then(bearer_token) else {
        return error::unauthorized("Authorization header with Bearer token is required")
            .into_response();
    };
    let token = token.to_string();

    match state.verify.introspect(&token).await {
        Ok(introspection) if introspection.active => {
            request.extensions_mut().insert(TokenInfo(introspection));
            next.run(request).await
        }
        Ok(_) => error::invalid_token().into_response(),
        Err(e) => {
            error::auth_error(format!("Failed to introspect token: {e}")).into_response()
        }
    }
}

/// Extract the token from a `Bearer`-scheme Authorization header.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .filter(|token| !token.is_empty())
}
