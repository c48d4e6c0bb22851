//! Structured API error responses.
//!
//! Every error body has the same shape: `{messageId, messageDescription,
//! extraInfo}`. Message ids are a closed enum with an exhaustive status
//! mapping; upstream errors may carry a foreign message id verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::verify::VerifyError;

/// Message ids produced locally.
///
/// Stable identifiers clients can match on programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageId {
    // Validation (400)
    InvalidRequest,
    MissingSubjectId,
    MissingPurposeId,
    MissingItems,

    // Verify-mode auth (401/500)
    Unauthorized,
    InvalidToken,
    AuthError,

    // Upstream / internal (500)
    PrivacyApiError,
    InternalError,
}

impl MessageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageId::InvalidRequest => "INVALID_REQUEST",
            MessageId::MissingSubjectId => "MISSING_SUBJECT_ID",
            MessageId::MissingPurposeId => "MISSING_PURPOSE_ID",
            MessageId::MissingItems => "MISSING_ITEMS",
            MessageId::Unauthorized => "UNAUTHORIZED",
            MessageId::InvalidToken => "INVALID_TOKEN",
            MessageId::AuthError => "AUTH_ERROR",
            MessageId::PrivacyApiError => "PRIVACY_API_ERROR",
            MessageId::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this message id.
    pub fn http_status(&self) -> StatusCode {
        match self {
            MessageId::InvalidRequest => StatusCode::BAD_REQUEST,
            MessageId::MissingSubjectId => StatusCode::BAD_REQUEST,
            MessageId::MissingPurposeId => StatusCode::BAD_REQUEST,
            MessageId::MissingItems => StatusCode::BAD_REQUEST,
            MessageId::Unauthorized => StatusCode::UNAUTHORIZED,
            MessageId::InvalidToken => StatusCode::UNAUTHORIZED,
            MessageId::AuthError => StatusCode::INTERNAL_SERVER_ERROR,
            MessageId::PrivacyApiError => StatusCode::INTERNAL_SERVER_ERROR,
            MessageId::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape shared by all error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message_id: String,
    pub message_description: String,
    pub extra_info: Option<serde_json::Value>,
}

/// An API error with its HTTP status.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub body: ErrorBody,
    status: StatusCode,
}

impl ApiError {
    pub fn new(message_id: MessageId, description: impl Into<String>) -> Self {
        Self {
            body: ErrorBody {
                message_id: message_id.as_str().to_string(),
                message_description: description.into(),
                extra_info: None,
            },
            status: message_id.http_status(),
        }
    }

    /// An upstream failure, preserving the upstream status and message id
    /// where available.
    pub fn upstream(
        status: u16,
        message_id: Option<String>,
        description: String,
        extra_info: Option<serde_json::Value>,
    ) -> Self {
        Self {
            body: ErrorBody {
                message_id: message_id
                    .unwrap_or_else(|| MessageId::PrivacyApiError.as_str().to_string()),
                message_description: description,
                extra_info,
            },
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn with_extra_info(mut self, extra_info: serde_json::Value) -> Self {
        self.body.extra_info = Some(extra_info);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Upstream {
                status,
                message_id,
                message_description,
                extra_info,
            } => ApiError::upstream(status, message_id, message_description, extra_info),
            VerifyError::Token(message) => ApiError::new(MessageId::PrivacyApiError, message),
            VerifyError::Transport(e) => ApiError::new(
                MessageId::PrivacyApiError,
                format!("Error communicating with Privacy service: {e}"),
            ),
        }
    }
}

// ============================================================================
// Helper constructors
// ============================================================================

pub fn invalid_request(description: impl Into<String>) -> ApiError {
    ApiError::new(MessageId::InvalidRequest, description)
}

pub fn missing_subject_id() -> ApiError {
    ApiError::new(MessageId::MissingSubjectId, "Subject ID is required")
}

pub fn missing_items() -> ApiError {
    ApiError::new(
        MessageId::MissingItems,
        "Items array is required and cannot be empty",
    )
}

pub fn missing_purpose_id(description: impl Into<String>) -> ApiError {
    ApiError::new(MessageId::MissingPurposeId, description)
}

pub fn unauthorized(description: impl Into<String>) -> ApiError {
    ApiError::new(MessageId::Unauthorized, description)
}

pub fn invalid_token() -> ApiError {
    ApiError::new(MessageId::InvalidToken, "Invalid or expired token")
}

pub fn auth_error(description: impl Into<String>) -> ApiError {
    ApiError::new(MessageId::AuthError, description)
}
