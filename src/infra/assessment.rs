//! Consent assessment: per-item decisions plus the aggregate status.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AssessmentStatus, ConsentRecord, ConsentStatus, Decision, RequestedItem,
};

use super::MemoryConsentStore;

/// Assessment of a single requested item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAssessment {
    pub purpose_id: Option<String>,
    pub access_type_id: Option<String>,
    pub attribute_id: Option<String>,
    pub attribute_value: Option<String>,
    pub result: Decision,
}

/// Full assessment over a request's items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub status: AssessmentStatus,
    pub assessment: Vec<ItemAssessment>,
}

/// Evaluates requested items against the consent store.
///
/// Read-only: evaluation never writes to the store. The derived `status`
/// on fetched records is refreshed as part of the read.
#[derive(Debug, Clone)]
pub struct Assessor {
    store: Arc<MemoryConsentStore>,
}

impl Assessor {
    pub fn new(store: Arc<MemoryConsentStore>) -> Self {
        Self { store }
    }

    /// Assess all `items` for `subject_id`.
    pub fn assess(&self, subject_id: &str, items: &[RequestedItem]) -> Assessment {
        let now = Utc::now().timestamp();

        let assessment: Vec<ItemAssessment> = items
            .iter()
            .map(|item| {
                let record = self.store.get(&item.key(subject_id));
                ItemAssessment {
                    purpose_id: item.purpose_id.clone(),
                    access_type_id: item.access_type_id.clone(),
                    attribute_id: item.attribute_id.clone(),
                    attribute_value: item.attribute_value.clone(),
                    result: decide(record.as_ref(), now),
                }
            })
            .collect();

        let decisions: Vec<Decision> = assessment.iter().map(|a| a.result.clone()).collect();

        Assessment {
            status: AssessmentStatus::aggregate(&decisions),
            assessment,
        }
    }
}

/// Decision for one item given its matching record, if any.
fn decide(record: Option<&ConsentRecord>, now: i64) -> Decision {
    let Some(record) = record else {
        return Decision::no_consent();
    };

    match record.status_at(now) {
        ConsentStatus::Active if record.state.permits_access() => Decision::approved(),
        ConsentStatus::Active => Decision::denied(),
        ConsentStatus::Future => Decision::pending(),
        ConsentStatus::Expired => Decision::expired(),
        // status_at never derives None; treat as absent consent.
        ConsentStatus::None => Decision::no_consent(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{ConsentState, ReasonCode};

    fn store_with(records: Vec<ConsentRecord>) -> Arc<MemoryConsentStore> {
        let store = Arc::new(MemoryConsentStore::new());
        for record in records {
            store.upsert(record);
        }
        store
    }

    fn record(subject: &str, purpose: &str, state: ConsentState, start: i64, end: i64) -> ConsentRecord {
        ConsentRecord {
            id: format!("consent-{purpose}"),
            subject_id: subject.to_string(),
            purpose_id: purpose.to_string(),
            access_type_id: None,
            attribute_id: None,
            attribute_value: None,
            start_time: start,
            end_time: end,
            is_global: false,
            status: ConsentStatus::None,
            state,
            geo_ip: "127.0.0.1".to_string(),
            custom_attributes: BTreeMap::new(),
            is_external_subject: false,
        }
    }

    fn item(purpose: &str) -> RequestedItem {
        RequestedItem {
            purpose_id: Some(purpose.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn no_record_prompts_for_consent() {
        let assessor = Assessor::new(store_with(vec![]));
        let result = assessor.assess("u1", &[item("terms-of-service")]);

        assert_eq!(result.status, AssessmentStatus::NeedsConsent);
        let decision = &result.assessment[0].result;
        assert!(!decision.approved);
        assert!(decision.approval_required);
        assert!(decision.prompt_for_consent);
        assert!(decision.reason.is_none());
    }

    #[test]
    fn active_allow_is_approved() {
        let now = Utc::now().timestamp();
        let assessor = Assessor::new(store_with(vec![record(
            "u1",
            "terms-of-service",
            ConsentState::Allow,
            now - 10,
            now + 1000,
        )]));

        let result = assessor.assess("u1", &[item("terms-of-service")]);
        assert_eq!(result.status, AssessmentStatus::Approved);
        let decision = &result.assessment[0].result;
        assert!(decision.approved);
        assert!(!decision.approval_required);
        assert!(!decision.prompt_for_consent);
    }

    #[test]
    fn active_opt_out_is_denied_without_reprompt() {
        let now = Utc::now().timestamp();
        let assessor = Assessor::new(store_with(vec![record(
            "u1",
            "marketing",
            ConsentState::OptOut,
            now - 10,
            now + 1000,
        )]));

        let result = assessor.assess("u1", &[item("marketing")]);
        assert_eq!(result.status, AssessmentStatus::Denied);
        let decision = &result.assessment[0].result;
        assert!(!decision.approved);
        assert!(!decision.prompt_for_consent);
        assert_eq!(
            decision.reason.as_ref().unwrap().message_id,
            ReasonCode::ConsentDenied
        );
    }

    #[test]
    fn future_record_is_pending_without_prompt() {
        let now = Utc::now().timestamp();
        let assessor = Assessor::new(store_with(vec![record(
            "u1",
            "analytics",
            ConsentState::Allow,
            now + 500,
            now + 1000,
        )]));

        let result = assessor.assess("u1", &[item("analytics")]);
        let decision = &result.assessment[0].result;
        assert!(!decision.approved);
        assert!(!decision.prompt_for_consent);
        assert_eq!(
            decision.reason.as_ref().unwrap().message_id,
            ReasonCode::ConsentFuture
        );
    }

    #[test]
    fn expired_record_prompts_again() {
        let now = Utc::now().timestamp();
        let assessor = Assessor::new(store_with(vec![record(
            "u1",
            "analytics",
            ConsentState::Allow,
            now - 1000,
            now - 500,
        )]));

        let result = assessor.assess("u1", &[item("analytics")]);
        assert_eq!(result.status, AssessmentStatus::NeedsConsent);
        let decision = &result.assessment[0].result;
        assert!(!decision.approved);
        assert!(decision.prompt_for_consent);
        assert_eq!(
            decision.reason.as_ref().unwrap().message_id,
            ReasonCode::ConsentExpired
        );
    }

    #[test]
    fn mixed_approved_and_denied_is_multistatus() {
        let now = Utc::now().timestamp();
        let assessor = Assessor::new(store_with(vec![
            record("u1", "analytics", ConsentState::Allow, now - 10, now + 1000),
            record("u1", "marketing", ConsentState::Deny, now - 10, now + 1000),
        ]));

        let result = assessor.assess("u1", &[item("analytics"), item("marketing")]);
        assert_eq!(result.status, AssessmentStatus::Multistatus);
    }

    #[test]
    fn distinct_refinements_use_distinct_keys() {
        let now = Utc::now().timestamp();
        let mut refined = record("u1", "marketing", ConsentState::Allow, now - 10, now + 1000);
        refined.access_type_id = Some("email".to_string());
        let assessor = Assessor::new(store_with(vec![refined]));

        // Same purpose without the refinement has no matching record.
        let result = assessor.assess("u1", &[item("marketing")]);
        assert_eq!(result.status, AssessmentStatus::NeedsConsent);

        let refined_item = RequestedItem {
            purpose_id: Some("marketing".to_string()),
            access_type_id: Some("email".to_string()),
            ..Default::default()
        };
        let result = assessor.assess("u1", &[refined_item]);
        assert_eq!(result.status, AssessmentStatus::Approved);
    }
}
