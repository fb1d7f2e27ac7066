//! CSV parsing.
//!
//! Turns raw delimited text into an ordered sequence of field-keyed records
//! plus the batch's header map.
//!
//! Known limitation: commas are literal delimiters. There is no quoted-field
//! or escape support, so a value containing a comma splits into two fields.
//! This matches the intake contract and is deliberate, not an oversight.

use crate::headers::normalize_header;
use pir_types::HeaderMap;
use std::collections::BTreeMap;

/// Result of parsing one CSV text: records in input row order, keyed by
/// canonical field identifier, plus the canonical-to-original header map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub records: Vec<BTreeMap<String, String>>,
    pub header_map: HeaderMap,
}

/// Parses raw CSV text.
///
/// Blank lines are discarded wherever they appear. The first remaining line
/// is the header row; every later line is a data row. With no header or no
/// data rows the result is empty on both sides, the canonical "nothing to
/// import" outcome rather than an error.
///
/// Rows shorter than the header are padded with empty strings; fields beyond
/// the header count are ignored. All headers and values are trimmed of
/// surrounding whitespace.
pub fn parse_csv(text: &str) -> ParsedCsv {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.len() < 2 {
        return ParsedCsv::default();
    }

    let raw_headers: Vec<&str> = lines[0].split(',').map(str::trim).collect();
    let canonical_headers: Vec<String> = raw_headers
        .iter()
        .map(|raw| normalize_header(raw))
        .collect();

    let mut header_map = HeaderMap::new();
    for (canonical, raw) in canonical_headers.iter().zip(&raw_headers) {
        if let Some(previous) = header_map.insert(canonical.clone(), *raw) {
            // Last column wins, but never silently.
            tracing::warn!(
                "headers '{previous}' and '{raw}' both normalize to '{canonical}'; keeping '{raw}'"
            );
        }
    }

    let records = lines[1..]
        .iter()
        .map(|line| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            let mut fields = BTreeMap::new();
            for (index, canonical) in canonical_headers.iter().enumerate() {
                let value = values.get(index).copied().unwrap_or_default();
                fields.insert(canonical.clone(), value.to_string());
            }
            fields
        })
        .collect();

    ParsedCsv {
        records,
        header_map,
    }
}
