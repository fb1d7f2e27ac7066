//! Batches and header maps.

use crate::record::PatientRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Mapping from canonical field identifier to the original header text as it
/// appeared in the source CSV.
///
/// One header map exists per batch. It is used for display and for
/// required-header validation messages, never for re-parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap(BTreeMap<String, String>);

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates a canonical identifier with its original header text.
    ///
    /// Returns the previously mapped original text when the canonical
    /// identifier was already present (two raw headers normalized to the
    /// same identifier; the later column wins).
    pub fn insert(&mut self, canonical: impl Into<String>, original: impl Into<String>) -> Option<String> {
        self.0.insert(canonical.into(), original.into())
    }

    /// Original header text for a canonical identifier, if present.
    pub fn original(&self, canonical: &str) -> Option<&str> {
        self.0.get(canonical).map(String::as_str)
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.0.contains_key(canonical)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One import unit: an ordered record set plus its provenance.
///
/// Exactly one batch is active at a time; a new successful import replaces
/// the prior batch wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: Uuid,
    pub file_name: String,
    pub created: DateTime<Utc>,
    pub header_map: HeaderMap,
    pub records: Vec<PatientRecord>,
}

impl Batch {
    /// Creates a batch from freshly parsed records, stamped with a new id
    /// and the current time.
    pub fn new(file_name: impl Into<String>, header_map: HeaderMap, records: Vec<PatientRecord>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            created: Utc::now(),
            header_map,
            records,
        }
    }

    /// Finds a record by its EHR ID. With duplicate keys in a batch the
    /// first match wins.
    pub fn record(&self, ehr_id: &str) -> Option<&PatientRecord> {
        self.records.iter().find(|r| r.ehr_id() == ehr_id)
    }

    pub fn record_mut(&mut self, ehr_id: &str) -> Option<&mut PatientRecord> {
        self.records.iter_mut().find(|r| r.ehr_id() == ehr_id)
    }
}
