//! Signing credentials loaded from PKCS#12 bundles.

use crate::config::PASSWORD_ENV_VAR;
use crate::error::{Error, Result};
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION};
use p12_keystore::{KeyStore, KeyStoreEntry};
use pkcs8::{DecodePrivateKey, PrivateKeyInfo};
use secrecy::{ExposeSecret, SecretString};
use spki::EncodePublicKey;
use std::path::Path;

/// Private key of the signer.
#[derive(Clone)]
pub enum SigningKey {
    /// RSA key, signs with PKCS#1 v1.5 and SHA-256
    Rsa(rsa::RsaPrivateKey),
    /// NIST P-256 key, signs with ECDSA and SHA-256
    EcdsaP256(p256::ecdsa::SigningKey),
}

impl SigningKey {
    /// Decode a PKCS#8 `PrivateKeyInfo`.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::try_from(der)
            .map_err(|e| Error::Credential(format!("Malformed private key: {}", e)))?;

        let algorithm = info.algorithm.oid;
        if algorithm == RSA_ENCRYPTION {
            rsa::RsaPrivateKey::from_pkcs8_der(der)
                .map(SigningKey::Rsa)
                .map_err(|e| Error::Credential(format!("Invalid RSA private key: {}", e)))
        } else if algorithm == ID_EC_PUBLIC_KEY {
            p256::ecdsa::SigningKey::from_pkcs8_der(der)
                .map(SigningKey::EcdsaP256)
                .map_err(|e| Error::Credential(format!("Unsupported EC private key (P-256 only): {}", e)))
        } else {
            Err(Error::Credential(format!("Unsupported private key algorithm {}", algorithm)))
        }
    }

    /// DER `SubjectPublicKeyInfo` of the matching public key.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            SigningKey::Rsa(key) => rsa::RsaPublicKey::from(key).to_public_key_der(),
            SigningKey::EcdsaP256(key) => key.verifying_key().to_public_key_der(),
        };
        document
            .map(|d| d.as_bytes().to_vec())
            .map_err(|e| Error::Credential(format!("Cannot encode public key: {}", e)))
    }

    /// Short algorithm name for logs.
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            SigningKey::Rsa(_) => "RSA",
            SigningKey::EcdsaP256(_) => "ECDSA P-256",
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey({}, [REDACTED])", self.algorithm_name())
    }
}

/// Signing credentials containing certificate and private key.
#[derive(Clone)]
pub struct SigningCredentials {
    /// DER-encoded X.509 certificate of the key owner
    certificate: Vec<u8>,
    /// Other certificates from the bundle (DER-encoded)
    chain: Vec<Vec<u8>>,
    key: SigningKey,
}

impl SigningCredentials {
    /// Create credentials from raw components.
    pub fn new(certificate: Vec<u8>, key: SigningKey) -> Self {
        Self {
            certificate,
            chain: Vec::new(),
            key,
        }
    }

    /// Create credentials with a certificate chain.
    pub fn with_chain(mut self, chain: Vec<Vec<u8>>) -> Self {
        self.chain = chain;
        self
    }

    /// Load credentials from a PKCS#12 (.p12/.pfx) file.
    pub fn from_pkcs12_file(path: impl AsRef<Path>, passphrase: &SecretString) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            Error::Credential(format!("Could not read .p12 certificate {}: {}", path.display(), e))
        })?;
        Self::from_pkcs12(&data, passphrase).map_err(|e| match e {
            Error::Credential(reason) => Error::Credential(format!(
                "Could not load .p12 certificate {}: {}",
                path.display(),
                reason
            )),
            other => other,
        })
    }

    /// Load credentials from PKCS#12 data.
    ///
    /// Both the legacy format (SHA-1 MAC, 3DES/RC2) and the PBES2 format
    /// written by current OpenSSL and browsers (SHA-256 MAC, AES-256-CBC)
    /// are accepted. The certificate whose public key matches the private
    /// key is the signer certificate; every other certificate becomes chain.
    pub fn from_pkcs12(data: &[u8], passphrase: &SecretString) -> Result<Self> {
        let keystore = KeyStore::from_pkcs12(data, passphrase.expose_secret())
            .map_err(|e| Error::Credential(format!("wrong passphrase or corrupt file ({})", e)))?;

        let (alias, key_chain) = keystore
            .private_key_chain()
            .ok_or_else(|| Error::Credential("bundle holds no private key".to_string()))?;
        let key = SigningKey::from_pkcs8_der(key_chain.key())?;

        // CA certificates without a local key id may be stored as entries of their own
        let standalone = keystore.entries().filter_map(|(_, entry)| match entry {
            KeyStoreEntry::Certificate(cert) => Some(cert),
            _ => None,
        });
        let mut certificates: Vec<Vec<u8>> = Vec::new();
        for cert in key_chain.chain().iter().chain(standalone) {
            let der = cert.as_der().to_vec();
            if !certificates.contains(&der) {
                certificates.push(der);
            }
        }

        let public_key = key.public_key_der()?;
        let position = certificates
            .iter()
            .position(|cert| certificate_public_key(cert).as_deref() == Some(public_key.as_slice()))
            .ok_or_else(|| Error::Credential("no certificate matches the private key".to_string()))?;
        let certificate = certificates.remove(position);

        log::debug!(
            "Loaded {} credentials '{}' with {} chain certificate(s)",
            key.algorithm_name(),
            alias,
            certificates.len()
        );

        Ok(Self::new(certificate, key).with_chain(certificates))
    }

    /// DER certificate of the signer.
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// Chain certificates.
    pub fn chain(&self) -> &[Vec<u8>] {
        &self.chain
    }

    /// The private key.
    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    /// Common name of the certificate subject, if any.
    pub fn signer_name(&self) -> Option<String> {
        let (_, cert) = x509_parser::parse_x509_certificate(&self.certificate).ok()?;
        let name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string);
        name
    }
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("certificate", &format!("{} bytes", self.certificate.len()))
            .field("key", &self.key)
            .field("chain", &format!("{} certificates", self.chain.len()))
            .finish()
    }
}

/// Raw `SubjectPublicKeyInfo` of a DER certificate.
fn certificate_public_key(der: &[u8]) -> Option<Vec<u8>> {
    let (_, cert) = x509_parser::parse_x509_certificate(der).ok()?;
    let raw = cert.public_key().raw.to_vec();
    Some(raw)
}

/// Pick the PKCS#12 passphrase.
///
/// A non-empty explicit value wins; otherwise the value of
/// `FNMT_CERTIFICATE_PASSWORD`; otherwise the empty passphrase.
pub fn resolve_passphrase(explicit: Option<&SecretString>) -> SecretString {
    if let Some(secret) = explicit.filter(|s| !s.expose_secret().is_empty()) {
        return SecretString::from(secret.expose_secret().to_string());
    }
    match std::env::var(PASSWORD_ENV_VAR) {
        Ok(value) => {
            log::debug!("Using passphrase from {}", PASSWORD_ENV_VAR);
            SecretString::from(value)
        },
        Err(_) => SecretString::from(String::new()),
    }
}
