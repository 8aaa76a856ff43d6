//! Input data for one certificate.

use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Identifier of one issued document (random v4 UUID).
///
/// Printed in the page watermark, the document info `/Subject` and both
/// file names of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Draw a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// The person issuing the certificate on behalf of an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerIdentity {
    /// Full name as printed
    pub full_name: String,
    /// DNI/NIE
    pub national_id: String,
    /// Position within the organization
    pub role: String,
    /// Legal name of the organization
    pub organization: String,
    /// CIF of the organization
    pub organization_tax_id: String,
}

/// The instructor whose teaching is certified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantIdentity {
    /// Full name as printed
    pub full_name: String,
    /// DNI/NIE
    pub national_id: String,
}

/// Hours taught, overall and per modality.
///
/// The per-modality hours are printed as given; they are not required to
/// add up to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CourseHours {
    /// Total hours
    pub total: u32,
    /// Classroom hours
    pub presential: u32,
    /// Live virtual classroom hours
    pub webinar: u32,
    /// E-learning hours
    pub online: u32,
}

/// The course that was delivered.
///
/// Optional fields that are `None` or empty are left out of the document;
/// any other value is printed exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDescriptor {
    /// Course title; an empty title drops the title line
    pub title: String,
    /// Course code, e.g. `IFCD0110`
    pub code: Option<String>,
    /// Professional family
    pub professional_family: Option<String>,
    /// Professional area
    pub professional_area: Option<String>,
    /// Start date as printed, e.g. `04/03/2025`
    pub start_date: String,
    /// End date as printed
    pub end_date: String,
    /// Hours taught
    pub hours: CourseHours,
}

/// Everything needed to compose one certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateRequest {
    /// Person signing on behalf of the organization
    pub signer: SignerIdentity,
    /// Instructor who delivered the course
    pub participant: ParticipantIdentity,
    /// Course being certified
    pub course: CourseDescriptor,
    /// Organization logo for the page header (PNG or JPEG)
    pub header_logo_path: PathBuf,
    /// Where the unsigned PDF is written (may start with `~`)
    pub output_path: PathBuf,
    /// Identifier printed in the watermark and the info dictionary
    pub document_id: DocumentId,
}

/// Value of an optional field, `None` when absent or empty.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_display() {
        let uuid = Uuid::parse_str("6B117545-C2E4-43EC-B74B-AB8C62A6AEC2").unwrap();
        let id = DocumentId::from_uuid(uuid);
        assert_eq!(id.to_string(), "6b117545-c2e4-43ec-b74b-ab8c62a6aec2");
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_present() {
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some(String::new())), None);
        assert_eq!(present(&Some("   ".to_string())), Some("   "));
        assert_eq!(present(&Some(" IFCD0110 ".to_string())), Some(" IFCD0110 "));
    }
}
