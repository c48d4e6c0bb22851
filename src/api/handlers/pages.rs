//! Static page handlers.

use axum::response::Html;

/// `GET /consent`
///
/// Serves the consent-collection page; everything else happens client-side
/// against the JSON endpoints.
pub async fn consent_page() -> Html<&'static str> {
    Html(include_str!("../../../assets/consent.html"))
}
