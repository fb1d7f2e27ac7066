//! Canonical field identifiers.
//!
//! Imported CSV columns are keyed internally by canonical identifier
//! (`ehrId`, `patientName`, ...), derived from the raw header text. This
//! module names the five well-known fields and the raw header text each one
//! is expected to appear under in a source file.

/// A well-known patient record field.
///
/// Records may carry additional fields under their normalized header key;
/// these five are the ones the intake contract names. All five must be
/// present in an imported CSV's header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanonicalField {
    EhrId,
    PatientName,
    Email,
    Phone,
    ReferringProvider,
}

impl CanonicalField {
    /// Every field required in an imported header row.
    pub const REQUIRED: [CanonicalField; 5] = [
        CanonicalField::EhrId,
        CanonicalField::PatientName,
        CanonicalField::Email,
        CanonicalField::Phone,
        CanonicalField::ReferringProvider,
    ];

    /// Canonical identifier used as the record key.
    pub const fn key(self) -> &'static str {
        match self {
            CanonicalField::EhrId => "ehrId",
            CanonicalField::PatientName => "patientName",
            CanonicalField::Email => "email",
            CanonicalField::Phone => "phone",
            CanonicalField::ReferringProvider => "referringProvider",
        }
    }

    /// Raw header text this field is expected under in a source CSV.
    ///
    /// Used in user-facing messages when a required header is missing; the
    /// canonical identifier is never shown to users.
    pub const fn raw_header(self) -> &'static str {
        match self {
            CanonicalField::EhrId => "EHR ID",
            CanonicalField::PatientName => "Patient Name",
            CanonicalField::Email => "Email",
            CanonicalField::Phone => "Phone",
            CanonicalField::ReferringProvider => "Referring Provider",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
