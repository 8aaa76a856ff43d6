//! Run configuration.
//!
//! The orchestrator receives one [`RunConfig`] at startup. Defaults mirror the
//! historical static settings: output under `~/Downloads`, the signing
//! certificate under `~/Documents/certificado`, and an empty passphrase that
//! defers to the `FNMT_CERTIFICATE_PASSWORD` environment variable.

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no passphrase is configured.
pub const PASSWORD_ENV_VAR: &str = "FNMT_CERTIFICATE_PASSWORD";

/// Fixed decorative images drawn on the first page background.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundAssets {
    /// "Verified by" seal, drawn at (13 cm, 2.5 cm), 4 x 4 cm
    pub verified_seal: PathBuf,
    /// Keystore emblem, drawn at (4 cm, 3.75 cm), 1.5 x 2 cm
    pub keystore_emblem: PathBuf,
}

impl BackgroundAssets {
    /// Use `wekab_verified.png` and `keystore.png` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            verified_seal: dir.join("wekab_verified.png"),
            keystore_emblem: dir.join("keystore.png"),
        }
    }
}

impl Default for BackgroundAssets {
    fn default() -> Self {
        Self::in_dir("media")
    }
}

/// Configuration for one certificate-issuing run.
#[derive(Debug)]
pub struct RunConfig {
    /// Directory receiving the temporary and the signed PDF (may start with `~`)
    pub working_dir: PathBuf,
    /// PKCS#12 bundle used for signing (may start with `~`)
    pub certificate_path: PathBuf,
    /// Passphrase override; `None` or empty falls back to [`PASSWORD_ENV_VAR`]
    pub certificate_password: Option<SecretString>,
    /// Reserve a visible signature widget on the first page
    pub show_signature_info: bool,
    /// Background images for the first page
    pub assets: BackgroundAssets,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("~/Downloads"),
            certificate_path: PathBuf::from(
                "~/Documents/certificado/6B117545-C2E4-43EC-B74B-AB8C62A6AEC2.p12",
            ),
            certificate_password: None,
            show_signature_info: false,
            assets: BackgroundAssets::default(),
        }
    }
}

impl RunConfig {
    /// Create configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Set the PKCS#12 bundle path.
    pub fn with_certificate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_path = path.into();
        self
    }

    /// Set the PKCS#12 passphrase.
    pub fn with_certificate_password(mut self, password: impl Into<String>) -> Self {
        self.certificate_password = Some(SecretString::from(password.into()));
        self
    }

    /// Enable or disable the visible signature widget.
    pub fn with_signature_info(mut self, show: bool) -> Self {
        self.show_signature_info = show;
        self
    }

    /// Set the background images.
    pub fn with_assets(mut self, assets: BackgroundAssets) -> Self {
        self.assets = assets;
        self
    }
}

/// Expand a leading `~` to the current user's home directory.
///
/// Paths without a leading `~` are returned unchanged.
pub fn expand_home(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config(format!("cannot expand {}: no home directory", path.display())))?;
    Ok(home.join(rest))
}
