//! Header normalization.
//!
//! Maps arbitrary human-readable column labels to canonical field
//! identifiers. The rule, applied independently per header: lowercase, strip
//! every character that is not a letter, digit, or space, then camel-case on
//! the remaining whitespace-delimited words (first word lowercase, later
//! words capitalised) and drop the spaces. `"Referring Provider"` becomes
//! `referringProvider`; `"EHR ID"` becomes `ehrId`.

use pir_types::{CanonicalField, HeaderMap};

/// Normalizes one raw header string to its canonical field identifier.
pub fn normalize_header(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();

    let mut canonical = String::with_capacity(cleaned.len());
    for (index, word) in cleaned.split_whitespace().enumerate() {
        if index == 0 {
            canonical.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            canonical.push(first.to_ascii_uppercase());
            canonical.extend(chars);
        }
    }
    canonical
}

/// Returns the *raw* header names expected but absent from a parsed header
/// map, in contract order.
///
/// An empty result means the header set is a superset of the five required
/// canonical fields and the batch may be accepted.
pub fn missing_required_headers(header_map: &HeaderMap) -> Vec<String> {
    CanonicalField::REQUIRED
        .iter()
        .filter(|field| !header_map.contains(field.key()))
        .map(|field| field.raw_header().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_the_required_headers_to_their_canonical_identifiers() {
        assert_eq!(normalize_header("EHR ID"), "ehrId");
        assert_eq!(normalize_header("Patient Name"), "patientName");
        assert_eq!(normalize_header("Email"), "email");
        assert_eq!(normalize_header("Phone"), "phone");
        assert_eq!(normalize_header("Referring Provider"), "referringProvider");
    }

    #[test]
    fn normalization_is_whitespace_invariant() {
        assert_eq!(normalize_header(" Email "), normalize_header("Email"));
        assert_eq!(normalize_header("Referring   Provider"), "referringProvider");
    }

    #[test]
    fn normalization_strips_special_characters() {
        assert_eq!(normalize_header("E-mail Address"), "emailAddress");
        assert_eq!(normalize_header("Phone #"), "phone");
        assert_eq!(normalize_header("Patient's Name"), "patientsName");
    }

    #[test]
    fn normalization_is_case_insensitive() {
        assert_eq!(normalize_header("ehr id"), "ehrId");
        assert_eq!(normalize_header("EHR id"), normalize_header("ehr ID"));
    }

    #[test]
    fn normalizing_an_empty_header_yields_an_empty_identifier() {
        assert_eq!(normalize_header(""), "");
        assert_eq!(normalize_header("   "), "");
        assert_eq!(normalize_header("***"), "");
    }

    #[test]
    fn reports_missing_headers_by_raw_name() {
        let mut header_map = HeaderMap::new();
        header_map.insert("ehrId", "EHR ID");
        header_map.insert("patientName", "Patient Name");
        header_map.insert("email", "Email");
        header_map.insert("referringProvider", "Referring Provider");

        assert_eq!(missing_required_headers(&header_map), vec!["Phone"]);
    }

    #[test]
    fn reports_no_missing_headers_for_a_complete_set() {
        let mut header_map = HeaderMap::new();
        for field in pir_types::CanonicalField::REQUIRED {
            header_map.insert(field.key(), field.raw_header());
        }
        header_map.insert("insurer", "Insurer");

        assert!(missing_required_headers(&header_map).is_empty());
    }

    #[test]
    fn reports_every_missing_header_for_an_empty_map() {
        assert_eq!(
            missing_required_headers(&HeaderMap::new()),
            vec!["EHR ID", "Patient Name", "Email", "Phone", "Referring Provider"]
        );
    }
}
