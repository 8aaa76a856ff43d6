//! PDF digital signatures.
//!
//! Signs an existing document with a PKCS#12 bundle by appending one
//! incremental update. The signature is a detached CMS SignedData
//! (`adbe.pkcs7.detached`) over the ByteRange of the final file.
//!
//! ## Example
//!
//! ```no_run
//! use delivery_certificate::signatures::sign_pdf;
//!
//! // Passphrase taken from FNMT_CERTIFICATE_PASSWORD
//! sign_pdf("unsigned.pdf", "signed.pdf", "~/cert.p12", None, false)?;
//! # Ok::<(), delivery_certificate::Error>(())
//! ```
//!
//! ## PDF Specification Reference
//!
//! - ISO 32000-1:2008 Section 12.8 - Digital Signatures
//! - ISO 32000-1:2008 Section 7.5.6 - Incremental Updates

mod byterange;
mod credentials;
mod incremental;
mod signer;
mod types;

pub use byterange::{ByteRangeCalculator, BYTE_RANGE_PLACEHOLDER};
pub use credentials::{resolve_passphrase, SigningCredentials, SigningKey};
pub use incremental::IncrementalSignature;
pub use signer::{sign_pdf, PdfSigner};
pub use types::{
    SignOptions, SignatureAppearance, DEFAULT_SIGNATURE_SIZE, SIGNATURE_FIELD_NAME, SIGNATURE_FILTER,
    SIGNATURE_SUB_FILTER,
};
