//! Shared request/response types and validation for the REST handlers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::RequestedItem;
use crate::infra::StoreOutcome;

use super::error::{self, ApiError};

/// Common body for assessment and page-metadata requests.
///
/// Fields are optional so validation can answer with precise message ids
/// instead of a decoder rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacyRequest {
    pub subject_id: Option<String>,
    pub items: Option<Vec<RequestedItem>>,
    pub is_external_subject: Option<bool>,
    #[serde(rename = "geoIP")]
    pub geo_ip: Option<String>,
}

impl PrivacyRequest {
    /// Validate the shared request shape and return the subject and items.
    pub fn validated(&self) -> Result<(&str, &[RequestedItem]), ApiError> {
        let subject_id = self
            .subject_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(error::missing_subject_id)?;

        let items = self
            .items
            .as_deref()
            .filter(|items| !items.is_empty())
            .ok_or_else(error::missing_items)?;

        for item in items {
            // Items naming a profile need no purpose.
            if item.profile_id.is_some() {
                continue;
            }
            if item.purpose_id.as_deref().unwrap_or("").is_empty() {
                return Err(error::missing_purpose_id(
                    "Purpose ID is required for each item when profile ID is not provided",
                ));
            }
        }

        Ok((subject_id, items))
    }
}

/// Decode a JSON body into `T`, mapping decode failures onto the error shape.
pub fn decode_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| error::invalid_request(format!("Invalid request body: {e}")))
}

/// Require the body to be a non-empty JSON array of objects.
pub fn consents_array(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(consents) if !consents.is_empty() => Ok(consents),
        _ => Err(error::invalid_request(
            "Invalid request: array of consents is required",
        )),
    }
}

/// Per-record field validation used by the verify route, which rejects the
/// whole batch up front rather than reporting per-record failures.
pub fn validate_consent_fields(consents: &[Value]) -> Result<(), ApiError> {
    for (index, consent) in consents.iter().enumerate() {
        if consent
            .get("subjectId")
            .and_then(Value::as_str)
            .unwrap_or("")
            .is_empty()
        {
            return Err(ApiError::new(
                super::error::MessageId::MissingSubjectId,
                format!("Subject ID is required for consent at index {index}"),
            ));
        }
        if consent
            .get("purposeId")
            .and_then(Value::as_str)
            .unwrap_or("")
            .is_empty()
        {
            return Err(ApiError::new(
                super::error::MessageId::MissingPurposeId,
                format!("Purpose ID is required for consent at index {index}"),
            ));
        }
    }
    Ok(())
}

/// Response body for `/basic/page_metadata`.
#[derive(Debug, Clone, Serialize)]
pub struct PageMetadataResponse {
    pub metadata: crate::infra::PageMetadata,
    pub unhandled: Vec<Value>,
}

/// Response body for `/basic/consents`.
#[derive(Debug, Clone, Serialize)]
pub struct ConsentsResponse {
    pub results: Vec<StoreOutcome>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validated_rejects_missing_subject() {
        let request: PrivacyRequest =
            decode_body(json!({"items": [{"purposeId": "marketing"}]})).unwrap();
        let error = request.validated().unwrap_err();
        assert_eq!(error.body.message_id, "MISSING_SUBJECT_ID");
    }

    #[test]
    fn validated_rejects_empty_items() {
        let request: PrivacyRequest =
            decode_body(json!({"subjectId": "u1", "items": []})).unwrap();
        let error = request.validated().unwrap_err();
        assert_eq!(error.body.message_id, "MISSING_ITEMS");

        let request: PrivacyRequest = decode_body(json!({"subjectId": "u1"})).unwrap();
        let error = request.validated().unwrap_err();
        assert_eq!(error.body.message_id, "MISSING_ITEMS");
    }

    #[test]
    fn validated_requires_purpose_unless_profile() {
        let request: PrivacyRequest =
            decode_body(json!({"subjectId": "u1", "items": [{"accessTypeId": "email"}]})).unwrap();
        let error = request.validated().unwrap_err();
        assert_eq!(error.body.message_id, "MISSING_PURPOSE_ID");

        let request: PrivacyRequest =
            decode_body(json!({"subjectId": "u1", "items": [{"profileId": "p1"}]})).unwrap();
        assert!(request.validated().is_ok());
    }

    #[test]
    fn consents_array_rejects_non_arrays() {
        assert!(consents_array(json!({"subjectId": "u1"})).is_err());
        assert!(consents_array(json!([])).is_err());
        assert!(consents_array(json!([{"subjectId": "u1"}])).is_ok());
    }

    #[test]
    fn consent_field_validation_reports_index() {
        let consents = vec![
            json!({"subjectId": "u1", "purposeId": "marketing"}),
            json!({"subjectId": "u1"}),
        ];
        let error = validate_consent_fields(&consents).unwrap_err();
        assert_eq!(error.body.message_id, "MISSING_PURPOSE_ID");
        assert!(error.body.message_description.contains("index 1"));
    }
}
