//! Error types for the delegated verify adapter.

use thiserror::Error;

/// Errors from the delegated consent-management service boundary.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Transport-level failure talking to the tenant.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint rejected the client-credentials request.
    #[error("failed to get OAuth token: {0}")]
    Token(String),

    /// The upstream service answered with an error status.
    #[error("privacy API error ({status}): {message_description}")]
    Upstream {
        status: u16,
        message_id: Option<String>,
        message_description: String,
        extra_info: Option<serde_json::Value>,
    },
}

impl VerifyError {
    /// True for the one failure kind worth a token refresh: an upstream 401.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, VerifyError::Upstream { status: 401, .. })
    }
}

/// Result type for verify adapter operations.
pub type Result<T> = std::result::Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upstream_401_triggers_refresh() {
        let expired = VerifyError::Upstream {
            status: 401,
            message_id: None,
            message_description: "token expired".to_string(),
            extra_info: None,
        };
        assert!(expired.is_auth_expired());

        let forbidden = VerifyError::Upstream {
            status: 403,
            message_id: None,
            message_description: "nope".to_string(),
            extra_info: None,
        };
        assert!(!forbidden.is_auth_expired());

        let token = VerifyError::Token("bad client secret".to_string());
        assert!(!token.is_auth_expired());
    }
}
