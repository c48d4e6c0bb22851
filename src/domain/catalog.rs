//! Static purpose and document catalogs backing the metadata endpoints.

use serde::{Deserialize, Serialize};

use super::consent::{ConsentStatus, DEFAULT_CONSENT_DURATION_SECS};

/// How a consent choice is presented to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentDisplayType {
    DoNotShow,
    Transparent,
    OptInOrOut,
    AllowOrDeny,
}

/// Catalog entry for a document-type purpose (terms of service, privacy
/// policy, and similar agreements presented as a document).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub purpose_id: String,
    pub purpose_name: String,
    pub purpose_description: String,
    pub default_consent_duration: i64,
    #[serde(rename = "assentUIDefault")]
    pub assent_ui_default: bool,
    pub consent_type: ConsentDisplayType,
    #[serde(rename = "documentURL")]
    pub document_url: String,
    pub status: ConsentStatus,
}

/// Catalog entry for an attribute-refined purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurposeInfo {
    pub purpose_id: String,
    pub purpose_name: String,
    pub purpose_description: String,
    pub access_type_id: String,
    pub access_type: String,
    pub attribute_id: String,
    pub attribute_name: String,
    pub default_consent_duration: i64,
    #[serde(rename = "assentUIDefault")]
    pub assent_ui_default: bool,
    pub consent_type: ConsentDisplayType,
    pub status: ConsentStatus,
}

/// The static catalog joined against stored consents by the metadata
/// assembler.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub documents: Vec<DocumentInfo>,
    pub purposes: Vec<PurposeInfo>,
}

impl Catalog {
    /// Built-in reference catalog.
    pub fn builtin() -> Self {
        Self {
            documents: vec![
                DocumentInfo {
                    purpose_id: "terms-of-service".to_string(),
                    purpose_name: "Terms of Service".to_string(),
                    purpose_description: "Our terms of service agreement".to_string(),
                    default_consent_duration: DEFAULT_CONSENT_DURATION_SECS,
                    assent_ui_default: true,
                    consent_type: ConsentDisplayType::AllowOrDeny,
                    document_url: "https://example.com/terms".to_string(),
                    status: ConsentStatus::Active,
                },
                DocumentInfo {
                    purpose_id: "privacy-policy".to_string(),
                    purpose_name: "Privacy Policy".to_string(),
                    purpose_description: "Our privacy policy".to_string(),
                    default_consent_duration: DEFAULT_CONSENT_DURATION_SECS,
                    assent_ui_default: true,
                    consent_type: ConsentDisplayType::Transparent,
                    document_url: "https://example.com/privacy".to_string(),
                    status: ConsentStatus::Active,
                },
            ],
            purposes: vec![
                PurposeInfo {
                    purpose_id: "marketing".to_string(),
                    purpose_name: "Marketing Communications".to_string(),
                    purpose_description: "Allow us to send you marketing communications"
                        .to_string(),
                    access_type_id: "email".to_string(),
                    access_type: "Email".to_string(),
                    attribute_id: "email_address".to_string(),
                    attribute_name: "Email Address".to_string(),
                    default_consent_duration: DEFAULT_CONSENT_DURATION_SECS,
                    assent_ui_default: false,
                    consent_type: ConsentDisplayType::OptInOrOut,
                    status: ConsentStatus::None,
                },
                PurposeInfo {
                    purpose_id: "analytics".to_string(),
                    purpose_name: "Analytics".to_string(),
                    purpose_description: "Allow us to collect usage data for analytics"
                        .to_string(),
                    access_type_id: "collect".to_string(),
                    access_type: "Collect".to_string(),
                    attribute_id: "usage_data".to_string(),
                    attribute_name: "Usage Data".to_string(),
                    default_consent_duration: DEFAULT_CONSENT_DURATION_SECS,
                    assent_ui_default: true,
                    consent_type: ConsentDisplayType::OptInOrOut,
                    status: ConsentStatus::None,
                },
            ],
        }
    }

    /// Look up a document-type purpose by id.
    pub fn document(&self, purpose_id: &str) -> Option<&DocumentInfo> {
        self.documents.iter().find(|d| d.purpose_id == purpose_id)
    }
}
