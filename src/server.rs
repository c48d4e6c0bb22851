//! HTTP server bootstrap for the consent gateway.
//!
//! This module wires together:
//! - configuration
//! - the in-memory consent store and its services
//! - the delegated verify client
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::auth::AuthState;
use crate::domain::Catalog;
use crate::infra::{Assessor, ConsentRecorder, MemoryConsentStore, MetadataAssembler};
use crate::verify::{VerifyClient, VerifyConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Delegated verify tenant.
    pub verify: VerifyConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .expect("Invalid listen address");

        Self {
            listen_addr,
            verify: VerifyConfig::from_env(),
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryConsentStore>,
    pub assessor: Arc<Assessor>,
    pub metadata: Arc<MetadataAssembler>,
    pub recorder: Arc<ConsentRecorder>,
    pub verify: Arc<VerifyClient>,
}

impl AppState {
    /// Build state around a fresh store and the given verify client.
    pub fn new(verify: Arc<VerifyClient>) -> Self {
        let store = Arc::new(MemoryConsentStore::new());
        let catalog = Arc::new(Catalog::builtin());

        Self {
            assessor: Arc::new(Assessor::new(store.clone())),
            metadata: Arc::new(MetadataAssembler::new(store.clone(), catalog)),
            recorder: Arc::new(ConsentRecorder::new(store.clone())),
            store,
            verify,
        }
    }
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting consent gateway v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Verify tenant: {}", config.verify.tenant_url);

    let verify = Arc::new(VerifyClient::new(config.verify.clone()));
    let state = AppState::new(verify);

    let app = build_router(state)?;

    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("Consent gateway is ready to accept connections");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

/// Build the full application router.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_state = AuthState {
        verify: state.verify.clone(),
    };

    let verify_routes = crate::api::verify_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        crate::auth::require_bearer,
    ));

    let router = Router::new()
        .nest("/basic", crate::api::basic_router())
        .nest("/verify", verify_routes)
        .route("/consent", get(crate::api::handlers::pages::consent_page))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer_from_env()?);

    Ok(router.with_state(state))
}

fn cors_layer_from_env() -> anyhow::Result<CorsLayer> {
    let origins = std::env::var("CORS_ALLOW_ORIGINS").unwrap_or_default();
    let origins = origins.trim();

    let allow_origin = if origins.is_empty() || origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {s:?}: {e}"))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]))
}

/// Health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
