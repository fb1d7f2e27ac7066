use crate::sync::CrmError;

/// Failure taxonomy for the intake engine.
///
/// No variant is process-fatal: every failure is recovered at the batch or
/// record level and the engine stays usable afterwards.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("{file_name} is not a csv file")]
    UnsupportedFileType {
        file_name: String,
        media_type: String,
    },
    #[error("missing required headers: {}", .missing.join(", "))]
    MissingRequiredHeaders { missing: Vec<String> },
    #[error("no valid data found in the csv file")]
    EmptyImport,
    #[error("no active batch loaded")]
    NoActiveBatch,
    #[error("no record with EHR ID '{0}' in the active batch")]
    RecordNotFound(String),
    #[error("another record is already being edited")]
    EditInProgress,
    #[error("nothing to sync: the active batch has no valid records")]
    NothingToSync,
    #[error("a sync is already in flight")]
    SyncInFlight,
    #[error("failed to sync with CRM: {0}")]
    Sync(#[from] CrmError),
    #[error("failed to serialize batch: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to read persisted batch: {0}")]
    PersistRead(std::io::Error),
    #[error("failed to write persisted batch: {0}")]
    PersistWrite(std::io::Error),
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
