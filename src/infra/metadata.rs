//! Page metadata assembly: static catalog entries joined with stored consent.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{Catalog, ConsentKey, ConsentRecord, ConsentState, DocumentInfo, RequestedItem};

use super::MemoryConsentStore;

/// Display view of a stored consent.
///
/// The derived `status` field is intentionally not part of this view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentOverlay {
    pub start_time: i64,
    pub end_time: i64,
    pub is_global: bool,
    pub state: ConsentState,
    #[serde(rename = "geoIP")]
    pub geo_ip: String,
    pub custom_attributes: BTreeMap<String, serde_json::Value>,
    pub subject_id: String,
    pub is_external_subject: bool,
}

impl From<&ConsentRecord> for ConsentOverlay {
    fn from(record: &ConsentRecord) -> Self {
        Self {
            start_time: record.start_time,
            end_time: record.end_time,
            is_global: record.is_global,
            state: record.state,
            geo_ip: record.geo_ip.clone(),
            custom_attributes: record.custom_attributes.clone(),
            subject_id: record.subject_id.clone(),
            is_external_subject: record.is_external_subject,
        }
    }
}

/// Metadata entry for a document-type purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    #[serde(flatten)]
    pub document: DocumentInfo,
    pub consent: Option<ConsentOverlay>,
}

/// Metadata entry for any other requested item, echoed back as sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultEntry {
    #[serde(flatten)]
    pub item: RequestedItem,
    pub consent: Option<ConsentOverlay>,
}

/// Assembled metadata, partitioned into document and default entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMetadata {
    pub document: Vec<DocumentEntry>,
    pub default: Vec<DefaultEntry>,
}

/// Joins the static catalog with stored consents for presentation.
#[derive(Debug, Clone)]
pub struct MetadataAssembler {
    store: Arc<MemoryConsentStore>,
    catalog: Arc<Catalog>,
}

impl MetadataAssembler {
    pub fn new(store: Arc<MemoryConsentStore>, catalog: Arc<Catalog>) -> Self {
        Self { store, catalog }
    }

    /// Partition `items` into document and default entries for `subject_id`.
    pub fn assemble(&self, subject_id: &str, items: &[RequestedItem]) -> PageMetadata {
        let mut document = Vec::new();
        let mut default = Vec::new();

        for item in items {
            let document_match = item
                .purpose_id
                .as_deref()
                .and_then(|purpose_id| self.catalog.document(purpose_id));

            if let Some(info) = document_match {
                // Document consents are stored without refinements.
                let key = ConsentKey::for_document(subject_id, &info.purpose_id);
                let consent = self.store.get(&key).map(|r| ConsentOverlay::from(&r));
                document.push(DocumentEntry {
                    document: info.clone(),
                    consent,
                });
                continue;
            }

            let consent = self
                .store
                .get(&item.key(subject_id))
                .map(|r| ConsentOverlay::from(&r));
            default.push(DefaultEntry {
                item: item.clone(),
                consent,
            });
        }

        PageMetadata { document, default }
    }
}
