//! # PIR Core
//!
//! Record ingestion and reconciliation engine for the PIR patient intake
//! system.
//!
//! The engine turns raw CSV text into a normalized, editable batch of
//! patient records and drives the sync-status lifecycle:
//! - CSV parsing with header normalization ([`parser`], [`headers`])
//! - Per-record validation ([`validation`])
//! - The reconciliation store holding the active batch ([`store`])
//! - The sync coordinator driving the external CRM call ([`sync`])
//! - JSON persistence of the active batch ([`persist`])
//!
//! **No presentation concerns**: page layout, prompts, and file-picker
//! mechanics belong to callers; the CLI in `pir-cli` is one such caller.

pub mod error;
pub mod headers;
pub mod ingest;
pub mod parser;
pub mod persist;
pub mod store;
pub mod sync;
pub mod validation;

pub use error::{IntakeError, IntakeResult};
pub use ingest::{ingest_csv, CSV_MEDIA_TYPE};
pub use parser::{parse_csv, ParsedCsv};
pub use persist::{
    clear_active_batch, load_active_batch, save_active_batch, DirectoryStore, KeyValueStore,
    ACTIVE_BATCH_KEY,
};
pub use store::ReconciliationStore;
pub use sync::{CrmClient, CrmError, SyncCoordinator};
