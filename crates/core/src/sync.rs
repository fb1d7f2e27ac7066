//! The sync coordinator.
//!
//! Drives the external CRM collaborator: one outstanding request at a time,
//! one all-or-nothing outcome per request, no automatic retry. The syncable
//! subset is captured at dispatch and only that subset's statuses are
//! updated when the outcome arrives.

use crate::error::{IntakeError, IntakeResult};
use crate::store::ReconciliationStore;
use async_trait::async_trait;
use pir_types::{PatientRecord, SyncStatus};

/// Typed failure from the CRM collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("CRM rejected the batch: {0}")]
    Rejected(String),
    #[error("could not reach the CRM: {0}")]
    Transport(String),
}

/// External CRM collaborator boundary.
///
/// The contract is all-or-nothing for the pushed subset: a single success or
/// a single typed failure, no per-record result shape.
#[async_trait]
pub trait CrmClient {
    async fn push_records(&self, records: &[PatientRecord]) -> Result<(), CrmError>;
}

/// Subset captured at dispatch time: the `(ehr_id, revision)` pairs whose
/// statuses the outcome may touch, plus the payload for the collaborator.
#[derive(Debug)]
struct SyncTicket {
    captured: Vec<(String, u64)>,
    payload: Vec<PatientRecord>,
}

/// Coordinates sync attempts against the active batch.
#[derive(Debug, Default)]
pub struct SyncCoordinator {
    in_flight: bool,
}

impl SyncCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Pushes the current syncable subset to the CRM collaborator.
    ///
    /// On success every pushed record becomes `synced`; on failure every
    /// pushed record becomes `error` and the failure is surfaced for
    /// display. Records edited while the request was in flight keep their
    /// own `pending` status either way. Returns the number of records whose
    /// status the outcome updated.
    ///
    /// # Errors
    ///
    /// - [`IntakeError::NothingToSync`] when the syncable subset is empty;
    ///   the collaborator is not called
    /// - [`IntakeError::SyncInFlight`] while a previous request is pending
    /// - [`IntakeError::Sync`] carrying the collaborator's failure, after
    ///   the captured subset has been marked `error`
    pub async fn sync<C>(
        &mut self,
        store: &mut ReconciliationStore,
        crm: &C,
    ) -> IntakeResult<usize>
    where
        C: CrmClient + ?Sized,
    {
        let ticket = self.dispatch(store)?;
        let outcome = crm.push_records(&ticket.payload).await;
        self.complete(store, ticket, outcome)
    }

    /// Captures the syncable subset and marks the request in flight.
    fn dispatch(&mut self, store: &ReconciliationStore) -> IntakeResult<SyncTicket> {
        if self.in_flight {
            return Err(IntakeError::SyncInFlight);
        }

        let syncable = store.select_syncable();
        if syncable.is_empty() {
            return Err(IntakeError::NothingToSync);
        }

        let captured = syncable
            .iter()
            .map(|r| (r.ehr_id().to_string(), r.revision))
            .collect();
        let payload = syncable.into_iter().cloned().collect();

        self.in_flight = true;
        Ok(SyncTicket { captured, payload })
    }

    /// Writes the outcome back into the store for the captured subset.
    ///
    /// The in-flight flag clears unconditionally; there is no cancellation
    /// path that could leave it set.
    fn complete(
        &mut self,
        store: &mut ReconciliationStore,
        ticket: SyncTicket,
        outcome: Result<(), CrmError>,
    ) -> IntakeResult<usize> {
        self.in_flight = false;

        match outcome {
            Ok(()) => {
                let updated = store.apply_sync_outcome(&ticket.captured, SyncStatus::Synced);
                tracing::info!("synced {updated} records to the CRM");
                Ok(updated)
            }
            Err(err) => {
                store.apply_sync_outcome(&ticket.captured, SyncStatus::Error);
                tracing::error!("sync failed: {err}");
                Err(IntakeError::Sync(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{ingest_csv, CSV_MEDIA_TYPE};
    use std::collections::BTreeMap;

    const SAMPLE: &str = "EHR ID,Patient Name,Email,Phone,Referring Provider\n\
        001,John Doe,john@example.com,1234567890,Dr. Smith\n\
        ,Jane Roe,jane@example.com,0987654321,Dr. Jones\n\
        003,Max Mustermann,max@example.com,5551234567,Dr. Brown";

    struct StubCrm {
        outcome: Result<(), &'static str>,
    }

    #[async_trait]
    impl CrmClient for StubCrm {
        async fn push_records(&self, _records: &[PatientRecord]) -> Result<(), CrmError> {
            self.outcome
                .map_err(|msg| CrmError::Rejected(msg.to_string()))
        }
    }

    fn loaded_store() -> ReconciliationStore {
        let batch = ingest_csv("patients.csv", CSV_MEDIA_TYPE, SAMPLE).expect("ingest");
        let mut store = ReconciliationStore::new();
        store.load(batch);
        store
    }

    fn status_of(store: &ReconciliationStore, ehr_id: &str) -> SyncStatus {
        store.record(ehr_id).expect("record").sync_status
    }

    #[tokio::test]
    async fn success_marks_the_pushed_subset_synced() {
        let mut store = loaded_store();
        let mut coordinator = SyncCoordinator::new();
        let crm = StubCrm { outcome: Ok(()) };

        let updated = coordinator.sync(&mut store, &crm).await.expect("sync");
        assert_eq!(updated, 2);
        assert_eq!(status_of(&store, "001"), SyncStatus::Synced);
        assert_eq!(status_of(&store, "003"), SyncStatus::Synced);
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn failure_marks_the_pushed_subset_error_and_surfaces_the_reason() {
        let mut store = loaded_store();
        let mut coordinator = SyncCoordinator::new();
        let crm = StubCrm {
            outcome: Err("service unavailable"),
        };

        let err = coordinator
            .sync(&mut store, &crm)
            .await
            .expect_err("sync should fail");
        assert!(matches!(err, IntakeError::Sync(_)));
        assert!(err.to_string().contains("service unavailable"));
        assert_eq!(status_of(&store, "001"), SyncStatus::Error);
        assert_eq!(status_of(&store, "003"), SyncStatus::Error);
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn invalid_records_are_untouched_by_either_outcome() {
        let mut store = loaded_store();
        let mut coordinator = SyncCoordinator::new();

        coordinator
            .sync(&mut store, &StubCrm { outcome: Ok(()) })
            .await
            .expect("sync");
        assert_eq!(status_of(&store, ""), SyncStatus::Pending);

        let _ = coordinator
            .sync(&mut store, &StubCrm { outcome: Err("down") })
            .await;
        assert_eq!(status_of(&store, ""), SyncStatus::Pending);
    }

    #[tokio::test]
    async fn an_empty_subset_short_circuits_without_a_call() {
        let mut store = ReconciliationStore::new();
        let mut coordinator = SyncCoordinator::new();
        let crm = StubCrm {
            outcome: Err("must never be reached"),
        };

        let err = coordinator
            .sync(&mut store, &crm)
            .await
            .expect_err("nothing to sync");
        assert!(matches!(err, IntakeError::NothingToSync));
        assert!(!coordinator.is_in_flight());
    }

    #[test]
    fn a_second_dispatch_is_rejected_while_one_is_in_flight() {
        let mut coordinator = SyncCoordinator::new();
        let store = loaded_store();

        let _ticket = coordinator.dispatch(&store).expect("first dispatch");
        assert!(coordinator.is_in_flight());

        let err = coordinator.dispatch(&store).expect_err("second dispatch");
        assert!(matches!(err, IntakeError::SyncInFlight));
    }

    #[test]
    fn the_in_flight_flag_clears_unconditionally_on_completion() {
        let mut coordinator = SyncCoordinator::new();
        let mut store = loaded_store();

        let ticket = coordinator.dispatch(&store).expect("dispatch");
        let _ = coordinator.complete(
            &mut store,
            ticket,
            Err(CrmError::Transport("timed out".to_string())),
        );
        assert!(!coordinator.is_in_flight());

        let ticket = coordinator.dispatch(&store).expect("dispatch after failure");
        let updated = coordinator
            .complete(&mut store, ticket, Ok(()))
            .expect("complete");
        assert_eq!(updated, 2);
    }

    #[test]
    fn a_record_edited_mid_flight_keeps_its_pending_status() {
        let mut coordinator = SyncCoordinator::new();
        let mut store = loaded_store();

        let ticket = coordinator.dispatch(&store).expect("dispatch");

        let mut patch = BTreeMap::new();
        patch.insert("phone".to_string(), "1112223333".to_string());
        store.commit_edit("001", &patch).expect("edit mid-flight");

        let updated = coordinator
            .complete(&mut store, ticket, Ok(()))
            .expect("complete");
        assert_eq!(updated, 1);
        assert_eq!(status_of(&store, "001"), SyncStatus::Pending);
        assert_eq!(status_of(&store, "003"), SyncStatus::Synced);
    }
}
