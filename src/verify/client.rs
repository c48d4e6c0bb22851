//! Client for the delegated consent-management service.
//!
//! Acquires client-credentials tokens from the tenant, caches them for as
//! long as they keep working, and retries each call exactly once after a
//! token refresh when the upstream answers 401.

use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::{Result, VerifyError};
use super::remap;

/// Tenant configuration for the delegated service.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Tenant base URL, trailing slash trimmed.
    pub tenant_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl VerifyConfig {
    /// Load tenant configuration from environment variables.
    pub fn from_env() -> Self {
        let tenant_url = std::env::var("VERIFY_TENANT_URL")
            .unwrap_or_else(|_| "https://example.verify.ibm.com".to_string());
        let client_id =
            std::env::var("VERIFY_CLIENT_ID").unwrap_or_else(|_| "your-client-id".to_string());
        let client_secret = std::env::var("VERIFY_CLIENT_SECRET")
            .unwrap_or_else(|_| "your-client-secret".to_string());

        Self::new(tenant_url, client_id, client_secret)
    }

    pub fn new(tenant_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            tenant_url: tenant_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Introspection result for a bearer token presented by a caller.
#[derive(Debug, Clone, Deserialize)]
pub struct Introspection {
    #[serde(default)]
    pub active: bool,
    #[serde(flatten)]
    pub claims: serde_json::Map<String, Value>,
}

/// HTTP client for the delegated privacy endpoints.
pub struct VerifyClient {
    http: reqwest::Client,
    config: VerifyConfig,
    // Cached client-credentials token, reused until the upstream rejects it.
    token: Mutex<Option<String>>,
}

impl VerifyClient {
    pub fn new(config: VerifyConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: Mutex::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.tenant_url, path)
    }

    /// Fetch a fresh token via the client-credentials grant.
    async fn fetch_token(&self) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint("/oauth2/token"))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VerifyError::Token(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Token(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Return the cached token, fetching (or re-fetching) when needed.
    async fn access_token(&self, force_refresh: bool) -> Result<String> {
        let mut cached = self.token.lock().await;
        if !force_refresh {
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }

        debug!(force_refresh, "fetching OAuth access token");
        let token = self.fetch_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Introspect a caller-presented bearer token.
    pub async fn introspect(&self, token: &str) -> Result<Introspection> {
        let credentials = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));

        let response = self
            .http
            .post(self.endpoint("/oauth2/introspect"))
            .header(reqwest::header::AUTHORIZATION, format!("Basic {credentials}"))
            .form(&[("token", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VerifyError::Token(format!(
                "introspection endpoint returned {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }

    /// POST a JSON body with a bearer token and decode the JSON response.
    async fn post_json(
        &self,
        path: &str,
        token: &str,
        body: &Value,
        accept_language: Option<&str>,
    ) -> Result<Value> {
        let mut request = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(token)
            .json(body);
        if let Some(language) = accept_language {
            request = request.header(reqwest::header::ACCEPT_LANGUAGE, language);
        }

        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(payload);
        }

        Err(VerifyError::Upstream {
            status: status.as_u16(),
            message_id: payload
                .get("messageId")
                .and_then(Value::as_str)
                .map(str::to_string),
            message_description: payload
                .get("messageDescription")
                .and_then(Value::as_str)
                .unwrap_or("Error communicating with Privacy service")
                .to_string(),
            extra_info: payload.get("extraInfo").cloned(),
        })
    }

    /// Two-attempt policy: call with the cached token; on an upstream 401
    /// refresh the token once and retry the same call exactly once.
    async fn call(&self, path: &str, body: &Value, accept_language: Option<&str>) -> Result<Value> {
        let token = self.access_token(false).await?;
        match self.post_json(path, &token, body, accept_language).await {
            Err(error) if error.is_auth_expired() => {
                warn!("access token rejected, refreshing and retrying once");
                let token = self.access_token(true).await?;
                self.post_json(path, &token, body, accept_language).await
            }
            other => other,
        }
    }

    /// Delegate an assessment and collapse per-item result arrays.
    pub async fn assess(
        &self,
        subject_id: &str,
        is_external_subject: bool,
        client_ip: &str,
        items: Value,
    ) -> Result<Value> {
        let body = serde_json::json!({
            "subjectId": subject_id,
            "isExternalSubject": is_external_subject,
            "geoIP": client_ip,
            "items": items,
        });

        let mut response = self.call("/v1.0/privacy/assessment", &body, None).await?;
        remap::remap_assessment(&mut response);
        Ok(response)
    }

    /// Delegate a metadata request and remap the response fields.
    pub async fn consent_metadata(
        &self,
        subject_id: &str,
        is_external_subject: bool,
        client_ip: &str,
        items: Value,
        accept_language: Option<&str>,
    ) -> Result<Value> {
        let body = serde_json::json!({
            "subjectId": subject_id,
            "isExternalSubject": is_external_subject,
            "geoIP": client_ip,
            "items": items,
        });

        let mut response = self
            .call("/v1.0/privacy/metadata", &body, accept_language)
            .await?;
        remap::remap_metadata(&mut response);
        Ok(response)
    }

    /// Delegate consent storage and normalize the per-record results.
    pub async fn store_consents(&self, mut consents: Vec<Value>, client_ip: &str) -> Result<Value> {
        let batch_ip = remap::prepare_consents(&mut consents);
        let client_ip = batch_ip.as_deref().unwrap_or(client_ip);

        let body = serde_json::json!({
            "geoIP": client_ip,
            "consents": consents,
        });

        let mut response = self.call("/v1.0/privacy/consents", &body, None).await?;
        remap::remap_store_response(&mut response);
        Ok(response)
    }
}
