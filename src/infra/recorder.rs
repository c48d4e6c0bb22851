//! Consent recording: validation, normalization, and upsert into the store.
//!
//! Batches are processed record by record; one bad record never aborts the
//! rest.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    ConsentRecord, ConsentState, ConsentStatus, DEFAULT_CONSENT_DURATION_SECS,
};

use super::MemoryConsentStore;

/// Candidate consent as submitted by the caller. Everything is optional so
/// validation can report precise per-record failures instead of rejecting the
/// whole batch at decode time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsentInput {
    pub id: Option<String>,
    pub subject_id: Option<String>,
    pub purpose_id: Option<String>,
    pub access_type_id: Option<String>,
    pub attribute_id: Option<String>,
    pub attribute_value: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub is_global: Option<bool>,
    pub status: Option<ConsentStatus>,
    pub state: Option<ConsentState>,
    #[serde(rename = "geoIP")]
    pub geo_ip: Option<String>,
    pub custom_attributes: Option<BTreeMap<String, serde_json::Value>>,
    pub is_external_subject: Option<bool>,
}

/// Per-record outcome indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreResult {
    Success,
    Failure,
}

/// Error payload for a failed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    pub message_id: String,
    pub message_description: String,
    pub extra_info: Option<serde_json::Value>,
}

/// Outcome for one submitted consent, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOutcome {
    pub result: StoreResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecordError>,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<StoreOutcome>,
    pub has_failures: bool,
}

/// Validates and upserts consent records.
#[derive(Debug, Clone)]
pub struct ConsentRecorder {
    store: Arc<MemoryConsentStore>,
}

impl ConsentRecorder {
    pub fn new(store: Arc<MemoryConsentStore>) -> Self {
        Self { store }
    }

    /// Store a batch of candidate consents. `client_ip` backs the `geoIP`
    /// default for records that do not carry one.
    pub fn store_batch(&self, inputs: Vec<ConsentInput>, client_ip: &str) -> BatchOutcome {
        let now = Utc::now().timestamp();
        let mut has_failures = false;

        let results = inputs
            .into_iter()
            .map(|input| match normalize(input, now, client_ip) {
                Ok(record) => {
                    self.store.upsert(record.clone());
                    StoreOutcome {
                        result: StoreResult::Success,
                        path: Some(format!("/basic/consents/{}", record.id)),
                        consent: Some(record),
                        error: None,
                    }
                }
                Err(message) => {
                    has_failures = true;
                    StoreOutcome {
                        result: StoreResult::Failure,
                        path: None,
                        consent: None,
                        error: Some(RecordError {
                            message_id: "CONSENT_STORE_ERROR".to_string(),
                            message_description: message,
                            extra_info: None,
                        }),
                    }
                }
            })
            .collect();

        BatchOutcome {
            results,
            has_failures,
        }
    }
}

/// Fill defaults and produce a storable record, or a validation message.
fn normalize(input: ConsentInput, now: i64, client_ip: &str) -> Result<ConsentRecord, String> {
    let subject_id = input.subject_id.filter(|s| !s.is_empty());
    let purpose_id = input.purpose_id.filter(|s| !s.is_empty());

    let (Some(subject_id), Some(purpose_id)) = (subject_id, purpose_id) else {
        return Err("subjectId and purposeId are required".to_string());
    };

    let start_time = input.start_time.unwrap_or(now);
    let end_time = input
        .end_time
        .unwrap_or(now + DEFAULT_CONSENT_DURATION_SECS);

    Ok(ConsentRecord {
        id: input
            .id
            .unwrap_or_else(|| format!("consent-{}", Uuid::new_v4())),
        subject_id,
        purpose_id,
        access_type_id: input.access_type_id,
        attribute_id: input.attribute_id,
        attribute_value: input.attribute_value,
        start_time,
        end_time,
        is_global: input.is_global.unwrap_or(false),
        // Stored for display only; the read path recomputes it.
        status: input.status.unwrap_or(ConsentStatus::Active),
        state: input.state.unwrap_or_default(),
        geo_ip: input
            .geo_ip
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| client_ip.to_string()),
        custom_attributes: input.custom_attributes.unwrap_or_default(),
        is_external_subject: input.is_external_subject.unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConsentKey;

    fn input(subject: Option<&str>, purpose: Option<&str>) -> ConsentInput {
        ConsentInput {
            subject_id: subject.map(str::to_string),
            purpose_id: purpose.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn stores_record_with_defaults() {
        let store = Arc::new(MemoryConsentStore::new());
        let recorder = ConsentRecorder::new(store.clone());
        let before = Utc::now().timestamp();

        let outcome = recorder.store_batch(
            vec![input(Some("u1"), Some("terms-of-service"))],
            "203.0.113.9",
        );

        assert!(!outcome.has_failures);
        let result = &outcome.results[0];
        assert_eq!(result.result, StoreResult::Success);

        let consent = result.consent.as_ref().unwrap();
        assert!(consent.id.starts_with("consent-"));
        assert!(consent.start_time >= before);
        assert_eq!(
            consent.end_time - consent.start_time,
            DEFAULT_CONSENT_DURATION_SECS
        );
        assert_eq!(consent.state, ConsentState::Allow);
        assert_eq!(consent.geo_ip, "203.0.113.9");
        assert!(!consent.is_global);
        assert_eq!(
            result.path.as_deref().unwrap(),
            format!("/basic/consents/{}", consent.id)
        );

        assert!(store
            .get(&ConsentKey::for_document("u1", "terms-of-service"))
            .is_some());
    }

    #[test]
    fn missing_purpose_fails_only_that_record() {
        let store = Arc::new(MemoryConsentStore::new());
        let recorder = ConsentRecorder::new(store.clone());

        let outcome = recorder.store_batch(
            vec![
                input(Some("u1"), Some("terms-of-service")),
                input(Some("u1"), None),
            ],
            "203.0.113.9",
        );

        assert!(outcome.has_failures);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].result, StoreResult::Success);
        assert_eq!(outcome.results[1].result, StoreResult::Failure);

        let error = outcome.results[1].error.as_ref().unwrap();
        assert_eq!(error.message_id, "CONSENT_STORE_ERROR");
        assert_eq!(error.message_description, "subjectId and purposeId are required");

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn storing_twice_overwrites_one_entry() {
        let store = Arc::new(MemoryConsentStore::new());
        let recorder = ConsentRecorder::new(store.clone());

        let mut first = input(Some("u1"), Some("marketing"));
        first.state = Some(ConsentState::Allow);
        let mut second = input(Some("u1"), Some("marketing"));
        second.state = Some(ConsentState::OptOut);

        recorder.store_batch(vec![first], "127.0.0.1");
        recorder.store_batch(vec![second], "127.0.0.1");

        let records = store.list_for_subject("u1");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state, ConsentState::OptOut);
    }

    #[test]
    fn explicit_fields_are_preserved() {
        let store = Arc::new(MemoryConsentStore::new());
        let recorder = ConsentRecorder::new(store);

        let mut custom = BTreeMap::new();
        custom.insert("channel".to_string(), serde_json::json!("web"));

        let candidate = ConsentInput {
            id: Some("consent-fixed".to_string()),
            subject_id: Some("u1".to_string()),
            purpose_id: Some("marketing".to_string()),
            access_type_id: Some("email".to_string()),
            start_time: Some(1_000),
            end_time: Some(2_000),
            is_global: Some(true),
            state: Some(ConsentState::OptIn),
            geo_ip: Some("198.51.100.1".to_string()),
            custom_attributes: Some(custom),
            is_external_subject: Some(true),
            ..Default::default()
        };

        let outcome = recorder.store_batch(vec![candidate], "127.0.0.1");
        let consent = outcome.results[0].consent.as_ref().unwrap();

        assert_eq!(consent.id, "consent-fixed");
        assert_eq!(consent.start_time, 1_000);
        assert_eq!(consent.end_time, 2_000);
        assert!(consent.is_global);
        assert_eq!(consent.state, ConsentState::OptIn);
        assert_eq!(consent.geo_ip, "198.51.100.1");
        assert!(consent.is_external_subject);
        assert_eq!(consent.custom_attributes["channel"], "web");
    }
}
