//! Patient records and the sync status lifecycle.

use crate::fields::CanonicalField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-record sync lifecycle marker.
///
/// A record starts `pending` and returns to `pending` on every edit. It
/// becomes `synced` or `error` only as the outcome of a completed sync
/// attempt that included it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Pending,
    Synced,
    Error,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// One patient record: canonical field identifier -> string value, plus
/// derived attributes.
///
/// `is_valid` and `sync_status` are derived state owned by the
/// reconciliation engine; they are carried here so a persisted batch restores
/// with its lifecycle intact. `revision` increments on every committed edit
/// and lets a sync outcome recognise records edited after dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default, rename = "isValid")]
    pub is_valid: bool,

    #[serde(default, rename = "syncStatus")]
    pub sync_status: SyncStatus,

    #[serde(default)]
    pub revision: u64,

    /// All field values, keyed by canonical field identifier. Extra CSV
    /// columns land here too, under their normalized header key.
    #[serde(flatten)]
    fields: BTreeMap<String, String>,
}

impl PatientRecord {
    /// Creates a record from parsed field values.
    ///
    /// Derived attributes start at their defaults: not validated, `pending`,
    /// revision zero. The reconciliation store owns recomputing `is_valid`.
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self {
            is_valid: false,
            sync_status: SyncStatus::Pending,
            revision: 0,
            fields,
        }
    }

    /// Returns the value for a canonical field identifier, or `""` when the
    /// field is absent.
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or_default()
    }

    /// The record's stable key within a batch.
    pub fn ehr_id(&self) -> &str {
        self.field(CanonicalField::EhrId.key())
    }

    pub fn patient_name(&self) -> &str {
        self.field(CanonicalField::PatientName.key())
    }

    /// Sets a single field value, inserting the key if absent.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Iterates field values in canonical-identifier order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
