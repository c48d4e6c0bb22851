//! In-memory consent store.
//!
//! A process-lifetime map from composite key to consent record. Writes are
//! whole-record replacements, so racing writers resolve to last-write-wins
//! without any read-modify-write coordination.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::domain::{ConsentKey, ConsentRecord};

/// Shared in-memory consent store.
///
/// The derived `status` field is refreshed from the wall clock on every read;
/// the stored value is never treated as authoritative.
#[derive(Debug, Default)]
pub struct MemoryConsentStore {
    records: RwLock<HashMap<ConsentKey, ConsentRecord>>,
}

impl MemoryConsentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the record for `key`, with `status` recomputed at the current
    /// time.
    pub fn get(&self, key: &ConsentKey) -> Option<ConsentRecord> {
        let now = Utc::now().timestamp();
        let records = self.records.read().expect("consent store lock poisoned");
        records.get(key).map(|record| {
            let mut record = record.clone();
            record.status = record.status_at(now);
            record
        })
    }

    /// Insert or replace the record under its composite key.
    pub fn upsert(&self, record: ConsentRecord) {
        let key = record.key();
        let mut records = self.records.write().expect("consent store lock poisoned");
        records.insert(key, record);
    }

    /// All records for one subject, status refreshed.
    pub fn list_for_subject(&self, subject_id: &str) -> Vec<ConsentRecord> {
        let now = Utc::now().timestamp();
        let records = self.records.read().expect("consent store lock poisoned");
        records
            .values()
            .filter(|r| r.subject_id == subject_id)
            .map(|record| {
                let mut record = record.clone();
                record.status = record.status_at(now);
                record
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("consent store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{ConsentState, ConsentStatus};

    fn record(subject: &str, purpose: &str, start: i64, end: i64) -> ConsentRecord {
        ConsentRecord {
            id: format!("consent-{subject}-{purpose}"),
            subject_id: subject.to_string(),
            purpose_id: purpose.to_string(),
            access_type_id: None,
            attribute_id: None,
            attribute_value: None,
            start_time: start,
            end_time: end,
            is_global: false,
            status: ConsentStatus::None,
            state: ConsentState::Allow,
            geo_ip: "127.0.0.1".to_string(),
            custom_attributes: BTreeMap::new(),
            is_external_subject: false,
        }
    }

    #[test]
    fn get_refreshes_derived_status() {
        let store = MemoryConsentStore::new();
        let now = Utc::now().timestamp();

        store.upsert(record("u1", "marketing", now - 10, now + 10));
        let fetched = store
            .get(&ConsentKey::for_document("u1", "marketing"))
            .unwrap();
        assert_eq!(fetched.status, ConsentStatus::Active);

        store.upsert(record("u1", "analytics", now - 100, now - 50));
        let fetched = store
            .get(&ConsentKey::for_document("u1", "analytics"))
            .unwrap();
        assert_eq!(fetched.status, ConsentStatus::Expired);
    }

    #[test]
    fn upsert_overwrites_same_key() {
        let store = MemoryConsentStore::new();
        let now = Utc::now().timestamp();

        store.upsert(record("u1", "marketing", now, now + 100));
        let mut second = record("u1", "marketing", now, now + 100);
        second.state = ConsentState::Deny;
        store.upsert(second);

        assert_eq!(store.len(), 1);
        let records = store.list_for_subject("u1");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state, ConsentState::Deny);
    }

    #[test]
    fn missing_key_returns_none() {
        let store = MemoryConsentStore::new();
        assert!(store
            .get(&ConsentKey::for_document("nobody", "marketing"))
            .is_none());
        assert!(store.is_empty());
    }
}
