//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use delivery_certificate::composer::{
    CertificateRequest, CourseDescriptor, CourseHours, DocumentId, ParticipantIdentity, SignerIdentity,
};
use delivery_certificate::config::BackgroundAssets;
use delivery_certificate::orchestrator::Issuance;
use std::path::{Path, PathBuf};

/// Common name of the fixture signing certificate.
pub const SIGNER_CN: &str = "Firmante de Pruebas";

/// Passphrase protecting the fixture PKCS#12 bundle.
pub const PASSPHRASE: &str = "correct horse";

/// Write a solid-color PNG of `width` x `height` pixels.
pub fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::from_pixel(width, height, image::Rgb([0, 156, 222]))
        .save(path)
        .unwrap();
}

/// Header logo plus both background images inside `dir`.
pub fn write_assets(dir: &Path) -> (PathBuf, BackgroundAssets) {
    let logo = dir.join("logo.png");
    write_png(&logo, 120, 60);
    let assets = BackgroundAssets::in_dir(dir);
    write_png(&assets.verified_seal, 40, 40);
    write_png(&assets.keystore_emblem, 15, 20);
    (logo, assets)
}

/// Self-signed P-256 certificate and its PKCS#8 key, both DER.
pub fn self_signed_p256() -> (Vec<u8>, Vec<u8>) {
    let key_pair = rcgen::KeyPair::generate().unwrap();
    let mut params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, SIGNER_CN);
    let cert = params.self_signed(&key_pair).unwrap();
    (cert.der().to_vec(), key_pair.serialize_der())
}

/// Common name of the RSA signer in [`rsa_aes256_pkcs12`].
pub const RSA_SIGNER_CN: &str = "Firmante RSA de Pruebas";

/// RSA bundle written by OpenSSL 3 `pkcs12 -export` with its defaults
/// (SHA-256 MAC, PBES2/PBKDF2/AES-256-CBC). Holds the signer certificate
/// and the issuing CA. Protected by [`PASSPHRASE`].
pub fn rsa_aes256_pkcs12() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/firma_rsa_aes256.p12")
}

/// Write a legacy PKCS#12 bundle (SHA-1 MAC, 3DES key, RC2 certificates)
/// protected by [`PASSPHRASE`] and return its path.
pub fn write_pkcs12(dir: &Path) -> PathBuf {
    let (cert, key) = self_signed_p256();
    let pfx = p12::PFX::new(&cert, &key, None, PASSPHRASE, "firma").unwrap();
    let path = dir.join("firma.p12");
    std::fs::write(&path, pfx.to_der()).unwrap();
    path
}

/// The course from the 380-hour scenario: no code, family or area.
pub fn course() -> CourseDescriptor {
    CourseDescriptor {
        title: "Creación automatizada de certificados desde Python".to_string(),
        code: None,
        professional_family: None,
        professional_area: None,
        start_date: "04/03/2025".to_string(),
        end_date: "15/04/2025".to_string(),
        hours: CourseHours {
            total: 380,
            presential: 380,
            webinar: 0,
            online: 0,
        },
    }
}

/// The sample issuance around [`course`].
pub fn issuance(header_logo_path: PathBuf) -> Issuance {
    Issuance {
        signer: SignerIdentity {
            full_name: "Felipe Alvarado Rodríguez".to_string(),
            national_id: "87654321F".to_string(),
            role: "Técnico de Formación".to_string(),
            organization: "3P Ventures S.L.".to_string(),
            organization_tax_id: "B12345678".to_string(),
        },
        participant: ParticipantIdentity {
            full_name: "Juan Diego Pereiro Areán".to_string(),
            national_id: "45671234Z".to_string(),
        },
        course: course(),
        header_logo_path,
    }
}

pub fn request(header_logo_path: PathBuf, output_path: PathBuf, document_id: DocumentId) -> CertificateRequest {
    let issuance = issuance(header_logo_path);
    CertificateRequest {
        signer: issuance.signer,
        participant: issuance.participant,
        course: issuance.course,
        header_logo_path: issuance.header_logo_path,
        output_path,
        document_id,
    }
}

/// Position of the first occurrence of `needle`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
