//! Consent records and the composite key that identifies them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default consent duration when no end time is supplied: one year in seconds.
pub const DEFAULT_CONSENT_DURATION_SECS: i64 = 31_536_000;

/// Disposition recorded for a consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentState {
    Allow,
    Deny,
    OptIn,
    OptOut,
    Transparent,
}

impl ConsentState {
    /// Whether this disposition grants access while the consent is active.
    pub fn permits_access(&self) -> bool {
        match self {
            ConsentState::Allow | ConsentState::OptIn | ConsentState::Transparent => true,
            ConsentState::Deny | ConsentState::OptOut => false,
        }
    }
}

impl Default for ConsentState {
    fn default() -> Self {
        ConsentState::Allow
    }
}

impl fmt::Display for ConsentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConsentState::Allow => "allow",
            ConsentState::Deny => "deny",
            ConsentState::OptIn => "opt_in",
            ConsentState::OptOut => "opt_out",
            ConsentState::Transparent => "transparent",
        };
        write!(f, "{}", s)
    }
}

/// Time-derived status of a consent record.
///
/// Never authoritative: the read path recomputes this from the stored time
/// bounds and the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
    Active,
    Expired,
    Future,
    None,
}

impl ConsentStatus {
    /// Derive the status for the window `[start_time, end_time]` at `now`.
    /// Bounds are inclusive.
    pub fn at(now: i64, start_time: i64, end_time: i64) -> Self {
        if now < start_time {
            ConsentStatus::Future
        } else if now > end_time {
            ConsentStatus::Expired
        } else {
            ConsentStatus::Active
        }
    }
}

impl Default for ConsentStatus {
    fn default() -> Self {
        ConsentStatus::None
    }
}

/// A stored consent record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub id: String,
    pub subject_id: String,
    pub purpose_id: String,
    pub access_type_id: Option<String>,
    pub attribute_id: Option<String>,
    pub attribute_value: Option<String>,
    /// Epoch seconds.
    pub start_time: i64,
    /// Epoch seconds.
    pub end_time: i64,
    pub is_global: bool,
    /// Derived field, refreshed on every read.
    pub status: ConsentStatus,
    pub state: ConsentState,
    #[serde(rename = "geoIP")]
    pub geo_ip: String,
    pub custom_attributes: BTreeMap<String, serde_json::Value>,
    pub is_external_subject: bool,
}

impl ConsentRecord {
    /// Composite key this record is stored under.
    pub fn key(&self) -> ConsentKey {
        ConsentKey::new(
            &self.subject_id,
            &self.purpose_id,
            self.access_type_id.as_deref(),
            self.attribute_id.as_deref(),
            self.attribute_value.as_deref(),
        )
    }

    /// Recompute the derived status at `now`.
    pub fn status_at(&self, now: i64) -> ConsentStatus {
        ConsentStatus::at(now, self.start_time, self.end_time)
    }
}

/// One requested data-access item in an assessment or metadata call.
///
/// Either `profile_id` is set, or `purpose_id` with optional refinements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestedItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    pub purpose_id: Option<String>,
    pub access_type_id: Option<String>,
    pub attribute_id: Option<String>,
    pub attribute_value: Option<String>,
}

impl RequestedItem {
    /// Composite key this item resolves to for `subject_id`.
    pub fn key(&self, subject_id: &str) -> ConsentKey {
        ConsentKey::new(
            subject_id,
            self.purpose_id.as_deref().unwrap_or(""),
            self.access_type_id.as_deref(),
            self.attribute_id.as_deref(),
            self.attribute_value.as_deref(),
        )
    }
}

/// Composite lookup key for consent records.
///
/// Absent optional fields are normalized to the empty string so that
/// `(subject, purpose, "", "", "")` and a record stored without refinements
/// land on the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsentKey {
    pub subject_id: String,
    pub purpose_id: String,
    pub access_type_id: String,
    pub attribute_id: String,
    pub attribute_value: String,
}

impl ConsentKey {
    pub fn new(
        subject_id: &str,
        purpose_id: &str,
        access_type_id: Option<&str>,
        attribute_id: Option<&str>,
        attribute_value: Option<&str>,
    ) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            purpose_id: purpose_id.to_string(),
            access_type_id: access_type_id.unwrap_or("").to_string(),
            attribute_id: attribute_id.unwrap_or("").to_string(),
            attribute_value: attribute_value.unwrap_or("").to_string(),
        }
    }

    /// Key for a document-style consent: purpose only, no refinements.
    pub fn for_document(subject_id: &str, purpose_id: &str) -> Self {
        Self::new(subject_id, purpose_id, None, None, None)
    }
}

impl fmt::Display for ConsentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.subject_id,
            self.purpose_id,
            self.access_type_id,
            self.attribute_id,
            self.attribute_value
        )
    }
}
