//! CMS signature creation and the `sign_pdf` entry point.

use super::byterange::ByteRangeCalculator;
use super::credentials::{resolve_passphrase, SigningCredentials, SigningKey};
use super::incremental::IncrementalSignature;
use super::types::SignOptions;
use crate::config::expand_home;
use crate::error::{Error, Result};
use cms::builder::{create_signing_time_attribute, SignedDataBuilder, SignerInfoBuilder};
use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::signed_data::{EncapsulatedContentInfo, SignerIdentifier};
use const_oid::db::rfc5911::ID_DATA;
use const_oid::db::rfc5912::ID_SHA_256;
use der::{Decode, Encode};
use secrecy::SecretString;
use sha2::{Digest, Sha256};
use signature::{Keypair, Signer};
use spki::{AlgorithmIdentifierOwned, DynSignatureAlgorithmIdentifier, EncodePublicKey, SignatureBitStringEncoding};
use std::path::Path;
use x509_cert::Certificate;

/// PDF signer that creates digital signatures.
pub struct PdfSigner {
    credentials: SigningCredentials,
    options: SignOptions,
    byte_range_calc: ByteRangeCalculator,
}

impl PdfSigner {
    /// Create a new PDF signer with the given credentials and options.
    pub fn new(credentials: SigningCredentials, options: SignOptions) -> Self {
        let byte_range_calc = ByteRangeCalculator::new(options.estimated_size);
        Self {
            credentials,
            options,
            byte_range_calc,
        }
    }

    /// Get the signing options.
    pub fn options(&self) -> &SignOptions {
        &self.options
    }

    /// Get the signing credentials.
    pub fn credentials(&self) -> &SigningCredentials {
        &self.credentials
    }

    /// ByteRange calculator sized for this signer.
    pub fn byte_range(&self) -> &ByteRangeCalculator {
        &self.byte_range_calc
    }

    /// SHA-256 of the signed bytes.
    pub fn compute_digest(signed_bytes: &[u8]) -> Vec<u8> {
        Sha256::digest(signed_bytes).to_vec()
    }

    /// Build a detached CMS SignedData over `signed_bytes`, DER-encoded.
    ///
    /// Signed attributes are contentType, messageDigest and signingTime;
    /// the signer certificate and chain are included.
    pub fn sign(&self, signed_bytes: &[u8]) -> Result<Vec<u8>> {
        let digest = Self::compute_digest(signed_bytes);
        let certificate = decode_certificate(self.credentials.certificate())?;
        let chain = self
            .credentials
            .chain()
            .iter()
            .map(|der| decode_certificate(der))
            .collect::<Result<Vec<_>>>()?;

        match self.credentials.key() {
            SigningKey::Rsa(key) => {
                let signer = rsa::pkcs1v15::SigningKey::<Sha256>::new(key.clone());
                build_signed_data::<_, rsa::pkcs1v15::Signature>(&signer, &certificate, &chain, &digest)
            },
            SigningKey::EcdsaP256(key) => {
                build_signed_data::<_, p256::ecdsa::DerSignature>(key, &certificate, &chain, &digest)
            },
        }
    }
}

fn decode_certificate(der: &[u8]) -> Result<Certificate> {
    Certificate::from_der(der).map_err(|e| Error::Signature(format!("Invalid certificate: {}", e)))
}

fn cms_error(context: &str, err: impl std::fmt::Debug) -> Error {
    Error::Signature(format!("{}: {:?}", context, err))
}

fn build_signed_data<S, Sig>(
    signer: &S,
    certificate: &Certificate,
    chain: &[Certificate],
    digest: &[u8],
) -> Result<Vec<u8>>
where
    S: Keypair + DynSignatureAlgorithmIdentifier + Signer<Sig>,
    S::VerifyingKey: EncodePublicKey,
    Sig: SignatureBitStringEncoding,
{
    let digest_algorithm = AlgorithmIdentifierOwned {
        oid: ID_SHA_256,
        parameters: None,
    };
    let content = EncapsulatedContentInfo {
        econtent_type: ID_DATA,
        econtent: None,
    };
    let signer_id = SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
        issuer: certificate.tbs_certificate.issuer.clone(),
        serial_number: certificate.tbs_certificate.serial_number.clone(),
    });

    let mut signer_info = SignerInfoBuilder::new(signer, signer_id, digest_algorithm.clone(), &content, Some(digest))
        .map_err(|e| cms_error("Cannot prepare signer info", e))?;
    let signing_time = create_signing_time_attribute().map_err(|e| cms_error("Cannot encode signing time", e))?;
    signer_info
        .add_signed_attribute(signing_time)
        .map_err(|e| cms_error("Cannot add signing time", e))?;

    let mut builder = SignedDataBuilder::new(&content);
    builder
        .add_digest_algorithm(digest_algorithm)
        .map_err(|e| cms_error("Cannot add digest algorithm", e))?;
    for cert in std::iter::once(certificate).chain(chain) {
        builder
            .add_certificate(CertificateChoices::Certificate(cert.clone()))
            .map_err(|e| cms_error("Cannot add certificate", e))?;
    }
    builder
        .add_signer_info::<S, Sig>(signer_info)
        .map_err(|e| cms_error("Cannot sign", e))?;

    let content_info = builder.build().map_err(|e| cms_error("Cannot build SignedData", e))?;
    content_info
        .to_der()
        .map_err(|e| Error::Signature(format!("Cannot encode SignedData: {}", e)))
}

/// Sign `input` into `output` with the PKCS#12 bundle at `pkcs12_path`.
///
/// The passphrase is resolved with [`resolve_passphrase`]. The output is
/// the input followed by one incremental update carrying the signature; it
/// is only written once the signature has been computed.
pub fn sign_pdf(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    pkcs12_path: impl AsRef<Path>,
    passphrase: Option<&SecretString>,
    show_signature_info: bool,
) -> Result<()> {
    let input = expand_home(input)?;
    let output = expand_home(output)?;
    let pkcs12_path = expand_home(pkcs12_path)?;

    let passphrase = resolve_passphrase(passphrase);
    let credentials = SigningCredentials::from_pkcs12_file(&pkcs12_path, &passphrase)?;
    let options = SignOptions::default().with_signature_info(show_signature_info);
    let signer = PdfSigner::new(credentials, options);

    let original = std::fs::read(&input)?;
    let signed = IncrementalSignature::prepare(&original, &signer)?.sign(&signer)?;

    std::fs::write(&output, &signed)?;
    log::info!(
        "Signed {} into {} ({} bytes appended)",
        input.display(),
        output.display(),
        signed.len() - original.len()
    );
    Ok(())
}
