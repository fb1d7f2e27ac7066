//! The reconciliation store.
//!
//! Owns the active batch and the edit lifecycle. At most one record is being
//! edited at a time, edits merge field-by-field, and every committed edit
//! returns the record to `pending` regardless of its prior sync status.
//!
//! Replaces the original page-level ambient state: callers get explicit
//! operations and result values, never thrown control flow.

use crate::error::{IntakeError, IntakeResult};
use crate::validation::is_record_valid;
use pir_types::{Batch, PatientRecord, SyncStatus};
use std::collections::BTreeMap;

/// Holds the active batch's records and the exclusive-edit marker.
#[derive(Debug, Default)]
pub struct ReconciliationStore {
    batch: Option<Batch>,
    editing: Option<String>,
}

impl ReconciliationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire record set with a new batch.
    ///
    /// Every record is revalidated on the way in; sync statuses are kept as
    /// carried by the batch (a restored batch resumes where it left off, a
    /// fresh import arrives all-`pending`). Any in-progress edit is
    /// discarded with the records it referred to.
    pub fn load(&mut self, mut batch: Batch) {
        for record in &mut batch.records {
            record.is_valid = is_record_valid(record);
        }
        self.batch = Some(batch);
        self.editing = None;
    }

    /// Discards the active batch and any in-progress edit.
    pub fn clear(&mut self) {
        self.batch = None;
        self.editing = None;
    }

    pub fn active(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    pub fn record(&self, ehr_id: &str) -> Option<&PatientRecord> {
        self.batch.as_ref().and_then(|b| b.record(ehr_id))
    }

    /// The EHR ID currently being edited, if any.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Marks one record as being edited.
    ///
    /// Editing is exclusive: a second `begin_edit` while one is in progress
    /// is rejected, whatever record it names.
    ///
    /// # Errors
    ///
    /// - [`IntakeError::NoActiveBatch`] with no batch loaded
    /// - [`IntakeError::EditInProgress`] while another edit is active
    /// - [`IntakeError::RecordNotFound`] for an unknown EHR ID
    pub fn begin_edit(&mut self, ehr_id: &str) -> IntakeResult<()> {
        if self.editing.is_some() {
            return Err(IntakeError::EditInProgress);
        }
        let batch = self.batch.as_ref().ok_or(IntakeError::NoActiveBatch)?;
        if batch.record(ehr_id).is_none() {
            return Err(IntakeError::RecordNotFound(ehr_id.to_string()));
        }
        self.editing = Some(ehr_id.to_string());
        Ok(())
    }

    /// Merges `patch` into the record keyed by `ehr_id`.
    ///
    /// Fields absent from the patch are unchanged. The record is revalidated
    /// and returned to `pending`; an edited record is never considered
    /// synced, whatever its prior state. The editing marker is cleared
    /// whether or not the commit lands.
    ///
    /// Returns the updated record. A commit may rewrite the key field
    /// itself, so callers must not rely on re-finding the record by either
    /// key afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::RecordNotFound`] when no record carries the
    /// key. Unreachable while records are never deleted, but handled as a
    /// logged no-op rather than a crash.
    pub fn commit_edit(
        &mut self,
        ehr_id: &str,
        patch: &BTreeMap<String, String>,
    ) -> IntakeResult<&PatientRecord> {
        self.editing = None;

        let batch = self.batch.as_mut().ok_or(IntakeError::NoActiveBatch)?;
        let Some(record) = batch.record_mut(ehr_id) else {
            tracing::warn!("commit for unknown EHR ID '{ehr_id}'; nothing changed");
            return Err(IntakeError::RecordNotFound(ehr_id.to_string()));
        };

        for (key, value) in patch {
            record.set_field(key.clone(), value.clone());
        }
        record.is_valid = is_record_valid(record);
        record.sync_status = SyncStatus::Pending;
        record.revision += 1;
        Ok(record)
    }

    /// Abandons the in-progress edit without touching any record.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// The ordered subsequence of valid records, the only data ever handed
    /// to the sync coordinator.
    pub fn select_syncable(&self) -> Vec<&PatientRecord> {
        self.batch
            .as_ref()
            .map(|b| b.records.iter().filter(|r| r.is_valid).collect())
            .unwrap_or_default()
    }

    /// Applies a sync outcome to the records captured at dispatch time.
    ///
    /// Only records whose `(ehr_id, revision)` still matches the captured
    /// pair are touched: a record edited after dispatch keeps its own
    /// `pending` status instead of being overwritten by a late result.
    /// Returns how many records were updated.
    pub(crate) fn apply_sync_outcome(
        &mut self,
        captured: &[(String, u64)],
        status: SyncStatus,
    ) -> usize {
        let Some(batch) = self.batch.as_mut() else {
            return 0;
        };
        let mut updated = 0;
        for record in &mut batch.records {
            let matches = captured
                .iter()
                .any(|(id, revision)| id == record.ehr_id() && *revision == record.revision);
            if matches {
                record.sync_status = status;
                updated += 1;
            }
        }
        updated
    }
}
