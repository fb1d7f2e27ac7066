//! Record validation.
//!
//! A record is valid iff both `ehrId` and `patientName` are non-empty after
//! trimming. The remaining fields are never required and carry no format
//! validation; an address-shaped email is not the intake engine's concern.

use pir_types::{CanonicalField, PatientRecord};

/// Pure validity check, re-evaluated after every mutation.
pub fn is_record_valid(record: &PatientRecord) -> bool {
    !record.field(CanonicalField::EhrId.key()).trim().is_empty()
        && !record.field(CanonicalField::PatientName.key()).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(ehr_id: &str, name: &str) -> PatientRecord {
        let mut fields = BTreeMap::new();
        fields.insert("ehrId".to_string(), ehr_id.to_string());
        fields.insert("patientName".to_string(), name.to_string());
        PatientRecord::new(fields)
    }

    #[test]
    fn valid_when_both_required_fields_are_populated() {
        assert!(is_record_valid(&record("001", "John Doe")));
    }

    #[test]
    fn invalid_when_ehr_id_is_empty() {
        assert!(!is_record_valid(&record("", "John Doe")));
    }

    #[test]
    fn invalid_when_patient_name_is_empty() {
        assert!(!is_record_valid(&record("001", "")));
    }

    #[test]
    fn whitespace_only_values_count_as_empty() {
        assert!(!is_record_valid(&record("   ", "John Doe")));
        assert!(!is_record_valid(&record("001", "  \t ")));
    }

    #[test]
    fn missing_keys_count_as_empty() {
        let record = PatientRecord::new(BTreeMap::new());
        assert!(!is_record_valid(&record));
    }

    #[test]
    fn optional_fields_never_affect_validity() {
        let mut populated = record("001", "John Doe");
        populated.set_field("email", "not-an-email");
        populated.set_field("phone", "");
        populated.set_field("referringProvider", "");
        assert!(is_record_valid(&populated));
    }
}
