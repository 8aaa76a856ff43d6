//! Error types for certificate composition and signing.
//!
//! Input and credential errors abort a run. Cleanup problems are not errors
//! at all; see [`crate::orchestrator::CleanupOutcome`].

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while issuing a certificate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An image asset could not be opened or decoded
    #[error("Image error: {0}")]
    Image(String),

    /// The PKCS#12 bundle could not be loaded (bad path, bad passphrase, corrupt file)
    #[error("Credential error: {0}")]
    Credential(String),

    /// The CMS signature could not be built or embedded
    #[error("Signature error: {0}")]
    Signature(String),

    /// Invalid PDF structure
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Parse error at specific byte offset
    #[error("Failed to parse object at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where error occurred
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Unusable configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}
