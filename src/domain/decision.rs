//! Per-item consent decisions and the aggregate assessment status.

use serde::{Deserialize, Serialize};

/// Reason codes attached to non-approved decisions.
///
/// These are not errors: they ride inside successful assessment responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    ConsentDenied,
    ConsentFuture,
    ConsentExpired,
}

impl ReasonCode {
    fn description(&self) -> &'static str {
        match self {
            ReasonCode::ConsentDenied => "User has explicitly denied consent",
            ReasonCode::ConsentFuture => "Consent will be active in the future",
            ReasonCode::ConsentExpired => "Consent has expired",
        }
    }
}

/// Structured reason on a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionReason {
    pub message_id: ReasonCode,
    pub message_description: String,
    pub extra_info: Option<serde_json::Value>,
}

impl DecisionReason {
    pub fn new(code: ReasonCode) -> Self {
        Self {
            message_id: code,
            message_description: code.description().to_string(),
            extra_info: None,
        }
    }
}

/// Outcome of evaluating one requested item against the consent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub approved: bool,
    pub approval_required: bool,
    pub prompt_for_consent: bool,
    pub reason: Option<DecisionReason>,
}

impl Decision {
    /// Decision when no consent record exists: the caller must collect consent.
    pub fn no_consent() -> Self {
        Self {
            approved: false,
            approval_required: true,
            prompt_for_consent: true,
            reason: None,
        }
    }

    /// Active consent with a permitting disposition.
    pub fn approved() -> Self {
        Self {
            approved: true,
            approval_required: false,
            prompt_for_consent: false,
            reason: None,
        }
    }

    /// Active consent with an explicit denial. Denial stands; no re-prompt.
    pub fn denied() -> Self {
        Self {
            approved: false,
            approval_required: false,
            prompt_for_consent: false,
            reason: Some(DecisionReason::new(ReasonCode::ConsentDenied)),
        }
    }

    /// Consent not yet in effect: nothing to ask, nothing granted.
    pub fn pending() -> Self {
        Self {
            approved: false,
            approval_required: false,
            prompt_for_consent: false,
            reason: Some(DecisionReason::new(ReasonCode::ConsentFuture)),
        }
    }

    /// Consent lapsed: must be collected again.
    pub fn expired() -> Self {
        Self {
            approved: false,
            approval_required: false,
            prompt_for_consent: true,
            reason: Some(DecisionReason::new(ReasonCode::ConsentExpired)),
        }
    }

    /// Denied with no path forward short of a new consent being recorded.
    fn is_settled_denial(&self) -> bool {
        !self.approved && !self.prompt_for_consent
    }
}

/// Aggregate status over all per-item decisions in one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Approved,
    NeedsConsent,
    Multistatus,
    Denied,
    Unknown,
}

impl AssessmentStatus {
    /// Fold per-item decisions into the aggregate status.
    ///
    /// Precedence is load-bearing: `multistatus` is checked before `denied`.
    pub fn aggregate(decisions: &[Decision]) -> Self {
        let all_approved = decisions.iter().all(|d| d.approved);
        let some_need_consent = decisions.iter().any(|d| d.prompt_for_consent);
        let some_approved = decisions.iter().any(|d| d.approved);
        let some_denied = decisions.iter().any(|d| d.is_settled_denial());
        let all_denied = decisions.iter().all(|d| d.is_settled_denial());

        if all_approved {
            AssessmentStatus::Approved
        } else if some_need_consent {
            AssessmentStatus::NeedsConsent
        } else if some_approved && some_denied {
            AssessmentStatus::Multistatus
        } else if all_denied {
            AssessmentStatus::Denied
        } else {
            AssessmentStatus::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_consent_decision_shape() {
        let d = Decision::no_consent();
        assert!(!d.approved);
        assert!(d.approval_required);
        assert!(d.prompt_for_consent);
        assert!(d.reason.is_none());
    }

    #[test]
    fn reason_codes_serialize_screaming_snake() {
        let reason = DecisionReason::new(ReasonCode::ConsentExpired);
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["messageId"], "CONSENT_EXPIRED");
        assert_eq!(json["messageDescription"], "Consent has expired");
        assert_eq!(json["extraInfo"], serde_json::Value::Null);
    }

    #[test]
    fn aggregate_all_approved() {
        let decisions = vec![Decision::approved(), Decision::approved()];
        assert_eq!(
            AssessmentStatus::aggregate(&decisions),
            AssessmentStatus::Approved
        );
    }

    #[test]
    fn aggregate_prompt_wins_over_denial() {
        let decisions = vec![Decision::denied(), Decision::no_consent()];
        assert_eq!(
            AssessmentStatus::aggregate(&decisions),
            AssessmentStatus::NeedsConsent
        );
    }

    #[test]
    fn aggregate_multistatus_before_denied() {
        let decisions = vec![Decision::approved(), Decision::denied()];
        assert_eq!(
            AssessmentStatus::aggregate(&decisions),
            AssessmentStatus::Multistatus
        );
    }

    #[test]
    fn aggregate_all_denied() {
        let decisions = vec![Decision::denied(), Decision::pending()];
        assert_eq!(
            AssessmentStatus::aggregate(&decisions),
            AssessmentStatus::Denied
        );
    }

    #[test]
    fn aggregate_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AssessmentStatus::NeedsConsent).unwrap(),
            "\"needs_consent\""
        );
        assert_eq!(
            serde_json::to_string(&AssessmentStatus::Multistatus).unwrap(),
            "\"multistatus\""
        );
    }
}
