//! The ingestion flow.
//!
//! Gates an uploaded file on its declared media type, parses it, validates
//! the header contract, and assembles the batch. Rejection is always
//! wholesale: a file missing any required header imports no records at all.

use crate::error::{IntakeError, IntakeResult};
use crate::headers::missing_required_headers;
use crate::parser::parse_csv;
use crate::validation::is_record_valid;
use pir_types::{Batch, PatientRecord};

/// The only media type accepted for import.
pub const CSV_MEDIA_TYPE: &str = "text/csv";

/// Ingests one uploaded file as a new batch.
///
/// `media_type` is the file's declared type, checked for exact equality with
/// [`CSV_MEDIA_TYPE`] before any parsing happens. The file's text content is
/// handed to the parser unchanged.
///
/// # Errors
///
/// - [`IntakeError::UnsupportedFileType`] for a non-CSV declared type
/// - [`IntakeError::MissingRequiredHeaders`] when the header row lacks any
///   required column, naming the missing *raw* headers
/// - [`IntakeError::EmptyImport`] when no data rows remain after parsing
pub fn ingest_csv(file_name: &str, media_type: &str, text: &str) -> IntakeResult<Batch> {
    if media_type != CSV_MEDIA_TYPE {
        return Err(IntakeError::UnsupportedFileType {
            file_name: file_name.to_string(),
            media_type: media_type.to_string(),
        });
    }

    let parsed = parse_csv(text);

    if !parsed.header_map.is_empty() {
        let missing = missing_required_headers(&parsed.header_map);
        if !missing.is_empty() {
            return Err(IntakeError::MissingRequiredHeaders { missing });
        }
    }

    if parsed.records.is_empty() {
        return Err(IntakeError::EmptyImport);
    }

    let records: Vec<PatientRecord> = parsed
        .records
        .into_iter()
        .map(|fields| {
            let mut record = PatientRecord::new(fields);
            record.is_valid = is_record_valid(&record);
            record
        })
        .collect();

    tracing::info!("{} records loaded from {file_name}", records.len());
    Ok(Batch::new(file_name, parsed.header_map, records))
}
