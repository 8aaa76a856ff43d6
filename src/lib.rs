// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]

//! # Delivery Certificate
//!
//! Issues signed "Certificado de impartición" documents: a one-page A4 PDF
//! certifying that an instructor delivered a training course, signed with
//! the organization's PKCS#12 credential.
//!
//! ## Core Features
//!
//! - **Composition**: header logo, certifying text, course details list,
//!   signature block, background logos and a rotated DocID watermark
//! - **Layout**: flowable story on a page template (paragraphs with inline
//!   markup, bullet lists, tables, rules, images)
//! - **Signing**: detached CMS signature embedded through one incremental
//!   update, optionally with a visible widget
//! - **Runs**: compose → sign → cleanup, with cleanup problems reported
//!   as warnings instead of errors
//!
//! ## Architecture
//!
//! ```text
//! Issuance ─► RunOrchestrator
//!                 │
//!                 ├─► CertificateComposer ─► layout ─► writer ─► tmp_<id>_certificate.pdf
//!                 │
//!                 ├─► signatures (xref + parser read the temp file back)
//!                 │                              ─► wekab_certificate_<id>_signed.pdf
//!                 └─► cleanup
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use delivery_certificate::config::RunConfig;
//! use delivery_certificate::orchestrator::{Issuance, RunOrchestrator};
//! # fn issuance() -> Issuance { unimplemented!() }
//!
//! let config = RunConfig::default()
//!     .with_working_dir("~/Downloads")
//!     .with_certificate_path("~/Documents/certificado/firma.p12");
//! let report = RunOrchestrator::new(config).run(issuance())?;
//! println!("Signed certificate at {}", report.signed_path.display());
//! # Ok::<(), delivery_certificate::Error>(())
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Core PDF parsing (reading back the unsigned document)
pub mod lexer;
pub mod object;
pub mod parser;
pub mod xref;

// Page geometry and layout
pub mod geometry;
pub mod layout;

// PDF writing
pub mod writer;

// Certificate composition
pub mod composer;

// Digital signatures
pub mod signatures;

// Compose → sign → cleanup
pub mod orchestrator;

// Re-exports
pub use error::{Error, Result};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "delivery_certificate");
    }
}
