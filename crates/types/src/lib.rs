//! # PIR Types
//!
//! Shared domain types for the PIR patient intake system.
//!
//! This crate defines the data model that every other PIR crate speaks:
//! - Canonical field identifiers and the required-header contract
//! - Patient records keyed by canonical field identifier
//! - The batch (one imported CSV's worth of records plus metadata)
//! - The per-record sync status lifecycle
//!
//! **No engine concerns**: parsing, validation, and reconciliation logic
//! belong in `pir-core`.

pub mod batch;
pub mod fields;
pub mod record;

pub use batch::{Batch, HeaderMap};
pub use fields::CanonicalField;
pub use record::{PatientRecord, SyncStatus};
