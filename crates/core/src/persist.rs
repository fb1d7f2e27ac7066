//! Persistence of the active batch.
//!
//! The active batch is serialized as JSON and kept under a single well-known
//! key in a key-value collaborator. Persistence is an explicit call at
//! defined lifecycle points (after import, after edits, after a sync
//! outcome), never an ambient side effect.
//!
//! No schema versioning exists yet: a persisted batch that no longer
//! deserializes is discarded with a warning rather than crashing restore.

use crate::error::{IntakeError, IntakeResult};
use pir_types::Batch;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Well-known key the active batch lives under.
pub const ACTIVE_BATCH_KEY: &str = "patientData";

/// Key-value persistence collaborator.
///
/// Implementations store opaque string values; the JSON shape is owned by
/// the functions in this module.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> IntakeResult<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> IntakeResult<()>;
    fn delete(&mut self, key: &str) -> IntakeResult<()>;
}

/// Saves the active batch under [`ACTIVE_BATCH_KEY`].
pub fn save_active_batch(store: &mut dyn KeyValueStore, batch: &Batch) -> IntakeResult<()> {
    let json = serde_json::to_string(batch).map_err(IntakeError::Serialization)?;
    store.put(ACTIVE_BATCH_KEY, &json)
}

/// Restores the active batch, if one was saved.
///
/// A value that fails to deserialize is treated as no saved batch; the
/// failure is logged, never propagated.
pub fn load_active_batch(store: &dyn KeyValueStore) -> IntakeResult<Option<Batch>> {
    let Some(json) = store.get(ACTIVE_BATCH_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str(&json) {
        Ok(batch) => Ok(Some(batch)),
        Err(err) => {
            tracing::warn!("discarding unreadable saved batch: {err}");
            Ok(None)
        }
    }
}

/// Removes any saved batch.
pub fn clear_active_batch(store: &mut dyn KeyValueStore) -> IntakeResult<()> {
    store.delete(ACTIVE_BATCH_KEY)
}

/// Directory-backed key-value store: one `<key>.json` file per key.
///
/// The directory is created lazily on first write.
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> IntakeResult<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(IntakeError::PersistRead(err)),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> IntakeResult<()> {
        fs::create_dir_all(&self.root).map_err(IntakeError::PersistWrite)?;
        fs::write(self.key_path(key), value).map_err(IntakeError::PersistWrite)
    }

    fn delete(&mut self, key: &str) -> IntakeResult<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(IntakeError::PersistWrite(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{ingest_csv, CSV_MEDIA_TYPE};

    const SAMPLE: &str = "EHR ID,Patient Name,Email,Phone,Referring Provider\n\
        001,John Doe,john@example.com,1234567890,Dr. Smith";

    fn sample_batch() -> Batch {
        ingest_csv("patients.csv", CSV_MEDIA_TYPE, SAMPLE).expect("ingest")
    }

    #[test]
    fn save_then_load_round_trips_the_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = DirectoryStore::new(dir.path());

        let batch = sample_batch();
        save_active_batch(&mut store, &batch).expect("save");
        let restored = load_active_batch(&store).expect("load").expect("batch present");
        assert_eq!(restored, batch);
    }

    #[test]
    fn load_without_a_saved_batch_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DirectoryStore::new(dir.path());
        assert!(load_active_batch(&store).expect("load").is_none());
    }

    #[test]
    fn an_unreadable_saved_batch_is_discarded_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = DirectoryStore::new(dir.path());
        store
            .put(ACTIVE_BATCH_KEY, "{\"not\": \"a batch\"}")
            .expect("put");

        assert!(load_active_batch(&store).expect("load").is_none());
    }

    #[test]
    fn clear_removes_the_saved_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = DirectoryStore::new(dir.path());

        save_active_batch(&mut store, &sample_batch()).expect("save");
        clear_active_batch(&mut store).expect("clear");
        assert!(load_active_batch(&store).expect("load").is_none());
    }

    #[test]
    fn clearing_an_empty_store_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = DirectoryStore::new(dir.path());
        clear_active_batch(&mut store).expect("clear");
    }
}
