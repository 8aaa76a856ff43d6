//! One certificate-issuing run: compose, sign, clean up.
//!
//! Stages run strictly in order with no retries. A compose failure stops the
//! run before anything is signed; a signing failure leaves the unsigned
//! temporary file on disk. Failing to remove the temporary file is reported
//! in the [`RunReport`] rather than as an error.
//!
//! ```no_run
//! use delivery_certificate::config::RunConfig;
//! use delivery_certificate::orchestrator::{Issuance, RunOrchestrator};
//! # fn issuance() -> Issuance { unimplemented!() }
//!
//! let orchestrator = RunOrchestrator::new(RunConfig::default().with_working_dir("/tmp"));
//! let report = orchestrator.run(issuance())?;
//! println!("{}", report.signed_path.display());
//! # Ok::<(), delivery_certificate::Error>(())
//! ```

use crate::composer::{
    CertificateComposer, CertificateRequest, CourseDescriptor, DocumentId, ParticipantIdentity,
    SignerIdentity,
};
use crate::config::{expand_home, RunConfig};
use crate::error::Result;
use crate::signatures::sign_pdf;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// The caller-supplied part of a certificate request.
///
/// File paths and the document identifier are filled in by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct Issuance {
    /// Person signing on behalf of the organization
    pub signer: SignerIdentity,
    /// Instructor who delivered the course
    pub participant: ParticipantIdentity,
    /// Course being certified
    pub course: CourseDescriptor,
    /// Organization logo for the page header
    pub header_logo_path: PathBuf,
}

impl Issuance {
    fn into_request(self, output_path: PathBuf, document_id: DocumentId) -> CertificateRequest {
        CertificateRequest {
            signer: self.signer,
            participant: self.participant,
            course: self.course,
            header_logo_path: self.header_logo_path,
            output_path,
            document_id,
        }
    }
}

/// Result of removing the unsigned temporary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The file was removed
    Success,
    /// The file could not be removed; the signed document is still valid
    SuccessWithWarning(String),
}

impl CleanupOutcome {
    /// Whether cleanup produced a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, CleanupOutcome::SuccessWithWarning(_))
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Identifier printed on the certificate and used in file names
    pub document_id: DocumentId,
    /// Temporary unsigned PDF (removed unless cleanup warned)
    pub unsigned_path: PathBuf,
    /// Signed PDF
    pub signed_path: PathBuf,
    /// Whether the unsigned file was removed
    pub cleanup: CleanupOutcome,
}

/// Drives compose → sign → cleanup for one document.
#[derive(Debug)]
pub struct RunOrchestrator {
    config: RunConfig,
    composer: CertificateComposer,
}

impl RunOrchestrator {
    /// Create an orchestrator for `config`.
    pub fn new(config: RunConfig) -> Self {
        let composer = CertificateComposer::new(config.assets.clone());
        Self { config, composer }
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// `<working_dir>/tmp_<id>_certificate.pdf`
    pub fn unsigned_path(&self, document_id: &DocumentId) -> Result<PathBuf> {
        Ok(expand_home(&self.config.working_dir)?.join(format!("tmp_{}_certificate.pdf", document_id)))
    }

    /// `<working_dir>/wekab_certificate_<id>_signed.pdf`
    pub fn signed_path(&self, document_id: &DocumentId) -> Result<PathBuf> {
        Ok(expand_home(&self.config.working_dir)?
            .join(format!("wekab_certificate_{}_signed.pdf", document_id)))
    }

    /// Issue one signed certificate under a fresh document identifier.
    pub fn run(&self, issuance: Issuance) -> Result<RunReport> {
        let document_id = DocumentId::generate();
        info!("🚀 Generating new document {}", document_id);

        let unsigned_path = self.unsigned_path(&document_id)?;
        let signed_path = self.signed_path(&document_id)?;

        let request = issuance.into_request(unsigned_path.clone(), document_id);
        self.compose(&request)?;
        self.sign(&unsigned_path, &signed_path)?;
        let cleanup = self.cleanup(&unsigned_path);

        Ok(RunReport {
            document_id,
            unsigned_path,
            signed_path,
            cleanup,
        })
    }

    /// Write the unsigned certificate to `request.output_path`.
    pub fn compose(&self, request: &CertificateRequest) -> Result<()> {
        info!("Composing certificate {}", request.document_id);
        self.composer.compose(request)
    }

    /// Sign `unsigned` into `signed` with the configured certificate.
    pub fn sign(&self, unsigned: &Path, signed: &Path) -> Result<()> {
        info!("Signing {}", unsigned.display());
        sign_pdf(
            unsigned,
            signed,
            &self.config.certificate_path,
            self.config.certificate_password.as_ref(),
            self.config.show_signature_info,
        )
    }

    /// Remove the unsigned temporary file.
    pub fn cleanup(&self, unsigned: &Path) -> CleanupOutcome {
        match std::fs::remove_file(unsigned) {
            Ok(()) => {
                info!("Removed temporary file {}", unsigned.display());
                CleanupOutcome::Success
            },
            Err(e) => {
                let reason = format!("could not remove temporary file {}: {}", unsigned.display(), e);
                warn!("{}", reason);
                CleanupOutcome::SuccessWithWarning(reason)
            },
        }
    }
}
