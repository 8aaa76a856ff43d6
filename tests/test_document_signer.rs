//! Integration tests for PDF signing with PKCS#12 credentials.

mod common;

use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::{SignedData, SignerIdentifier};
use const_oid::db::rfc5911::{ID_MESSAGE_DIGEST, ID_SIGNED_DATA};
use const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION;
use delivery_certificate::parser::decode_hex;
use delivery_certificate::signatures::{sign_pdf, SigningCredentials};
use delivery_certificate::writer::{Base14Font, ContentStreamBuilder, PdfWriter};
use delivery_certificate::Error;
use der::{Decode, Encode, SliceReader};
use p256::ecdsa::signature::Verifier;
use p256::pkcs8::DecodePublicKey;
use secrecy::SecretString;
use sha2::{Digest, Sha256};
use std::path::Path;

fn write_unsigned(path: &Path) -> Vec<u8> {
    let mut content = ContentStreamBuilder::new();
    content
        .set_font(Base14Font::Helvetica, 12.0)
        .text("Certificado de impartición", 72.0, 760.0)
        .end_text();
    let mut writer = PdfWriter::new();
    writer.add_page(595.2756, 841.8898, content);
    let bytes = writer.finish().unwrap();
    std::fs::write(path, &bytes).unwrap();
    bytes
}

fn passphrase(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn byte_range(pdf: &[u8]) -> [usize; 4] {
    let start = common::find(pdf, b"/ByteRange [").unwrap() + b"/ByteRange [".len();
    let end = start + pdf[start..].iter().position(|&b| b == b']').unwrap();
    let numbers: Vec<usize> = std::str::from_utf8(&pdf[start..end])
        .unwrap()
        .split_whitespace()
        .map(|n| n.parse().unwrap())
        .collect();
    [numbers[0], numbers[1], numbers[2], numbers[3]]
}

fn signed_data(pdf: &[u8], range: &[usize; 4]) -> SignedData {
    let hex = &pdf[range[1] + 1..range[2] - 1];
    let der = decode_hex(hex).unwrap();
    let mut reader = SliceReader::new(&der).unwrap();
    let content_info = ContentInfo::decode(&mut reader).unwrap();
    assert_eq!(content_info.content_type, ID_SIGNED_DATA);
    content_info.content.decode_as::<SignedData>().unwrap()
}

/// The certificate named by the first signer's issuer and serial number.
fn signer_certificate(sd: &SignedData) -> x509_cert::Certificate {
    let serial = match &sd.signer_infos.0.get(0).unwrap().sid {
        SignerIdentifier::IssuerAndSerialNumber(id) => id.serial_number.clone(),
        other => panic!("unexpected signer identifier {:?}", other),
    };
    sd.certificates
        .as_ref()
        .unwrap()
        .0
        .iter()
        .find_map(|choice| match choice {
            CertificateChoices::Certificate(cert) if cert.tbs_certificate.serial_number == serial => {
                Some(cert.clone())
            },
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_signed_output_extends_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsigned.pdf");
    let output = dir.path().join("signed.pdf");
    let original = write_unsigned(&input);
    let p12 = common::write_pkcs12(dir.path());

    sign_pdf(&input, &output, &p12, Some(&passphrase(common::PASSPHRASE)), false).unwrap();

    let signed = std::fs::read(&output).unwrap();
    assert!(signed.starts_with(&original));
    assert!(signed.ends_with(b"%%EOF\n"));

    let appended = String::from_utf8_lossy(&signed[original.len()..]).to_string();
    assert!(appended.contains("/Filter /Adobe.PPKLite /SubFilter /adbe.pkcs7.detached"));
    assert!(appended.contains("/Rect [0 0 0 0]"));
    assert!(appended.contains("/SigFlags 3"));
    assert!(appended.contains(&format!("/Name ({})", common::SIGNER_CN)));
}

#[test]
fn test_byte_range_covers_all_but_contents() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsigned.pdf");
    let output = dir.path().join("signed.pdf");
    write_unsigned(&input);
    let p12 = common::write_pkcs12(dir.path());

    sign_pdf(&input, &output, &p12, Some(&passphrase(common::PASSPHRASE)), false).unwrap();
    let signed = std::fs::read(&output).unwrap();
    let range = byte_range(&signed);

    assert_eq!(range[0], 0);
    assert_eq!(range[2] + range[3], signed.len());
    assert_eq!(range[2] - range[1], 16386);
    assert_eq!(signed[range[1]], b'<');
    assert_eq!(signed[range[2] - 1], b'>');
}

#[test]
fn test_cms_is_detached_and_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsigned.pdf");
    let output = dir.path().join("signed.pdf");
    write_unsigned(&input);
    let p12 = common::write_pkcs12(dir.path());

    sign_pdf(&input, &output, &p12, Some(&passphrase(common::PASSPHRASE)), false).unwrap();
    let signed = std::fs::read(&output).unwrap();
    let range = byte_range(&signed);
    let sd = signed_data(&signed, &range);

    assert!(sd.encap_content_info.econtent.is_none());
    let certificates = sd.certificates.as_ref().unwrap();
    assert_eq!(certificates.0.len(), 1);

    let mut covered = signed[..range[1]].to_vec();
    covered.extend_from_slice(&signed[range[2]..range[2] + range[3]]);
    let expected_digest = Sha256::digest(&covered);

    let signer_info = sd.signer_infos.0.get(0).unwrap();
    let signed_attrs = signer_info.signed_attrs.as_ref().unwrap();
    let digest_attr = signed_attrs.iter().find(|a| a.oid == ID_MESSAGE_DIGEST).unwrap();
    let digest = digest_attr
        .values
        .get(0)
        .unwrap()
        .decode_as::<der::asn1::OctetString>()
        .unwrap();
    assert_eq!(digest.as_bytes(), expected_digest.as_slice());

    let spki = match certificates.0.get(0).unwrap() {
        CertificateChoices::Certificate(cert) => cert.tbs_certificate.subject_public_key_info.to_der().unwrap(),
        other => panic!("unexpected certificate choice {:?}", other),
    };
    let verifying_key = p256::ecdsa::VerifyingKey::from_public_key_der(&spki).unwrap();
    let signature = p256::ecdsa::DerSignature::from_bytes(signer_info.signature.as_bytes()).unwrap();
    verifying_key
        .verify(&signed_attrs.to_der().unwrap(), &signature)
        .unwrap();
}

#[test]
fn test_visible_signature_widget() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsigned.pdf");
    let output = dir.path().join("signed.pdf");
    let original = write_unsigned(&input);
    let p12 = common::write_pkcs12(dir.path());

    sign_pdf(&input, &output, &p12, Some(&passphrase(common::PASSPHRASE)), true).unwrap();

    let signed = std::fs::read(&output).unwrap();
    let appended = String::from_utf8_lossy(&signed[original.len()..]).to_string();
    assert!(appended.contains("/Rect [346 80 496 98]"));
    assert!(appended.contains(&format!("Firmado digitalmente por {}", common::SIGNER_CN)));
}

#[test]
fn test_wrong_passphrase_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsigned.pdf");
    let output = dir.path().join("signed.pdf");
    write_unsigned(&input);
    let p12 = common::write_pkcs12(dir.path());

    let err = sign_pdf(&input, &output, &p12, Some(&passphrase("wrong")), false).unwrap_err();
    assert!(matches!(err, Error::Credential(_)));
    assert!(!output.exists());
}

#[test]
fn test_passphrase_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsigned.pdf");
    let output = dir.path().join("signed.pdf");
    write_unsigned(&input);
    let p12 = common::write_pkcs12(dir.path());

    std::env::set_var("FNMT_CERTIFICATE_PASSWORD", common::PASSPHRASE);
    let result = sign_pdf(&input, &output, &p12, Some(&passphrase("")), false);
    std::env::remove_var("FNMT_CERTIFICATE_PASSWORD");

    result.unwrap();
    assert!(output.exists());
}

#[test]
fn test_credentials_pick_matching_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let p12 = common::write_pkcs12(dir.path());

    let credentials = SigningCredentials::from_pkcs12_file(&p12, &passphrase(common::PASSPHRASE)).unwrap();
    assert_eq!(credentials.signer_name().as_deref(), Some(common::SIGNER_CN));
    assert!(credentials.chain().is_empty());
    assert_eq!(credentials.key().algorithm_name(), "ECDSA P-256");

    let debug = format!("{:?}", credentials);
    assert!(debug.contains("REDACTED"));
}

#[test]
fn test_input_with_form_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsigned.pdf");
    let once = dir.path().join("once.pdf");
    let twice = dir.path().join("twice.pdf");
    write_unsigned(&input);
    let p12 = common::write_pkcs12(dir.path());
    let secret = passphrase(common::PASSPHRASE);

    sign_pdf(&input, &once, &p12, Some(&secret), false).unwrap();
    let err = sign_pdf(&once, &twice, &p12, Some(&secret), false).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
    assert!(!twice.exists());
}

#[test]
fn test_aes256_bundle_loads() {
    let credentials =
        SigningCredentials::from_pkcs12_file(common::rsa_aes256_pkcs12(), &passphrase(common::PASSPHRASE)).unwrap();

    assert_eq!(credentials.signer_name().as_deref(), Some(common::RSA_SIGNER_CN));
    assert_eq!(credentials.key().algorithm_name(), "RSA");
    assert_eq!(credentials.chain().len(), 1);
    assert_ne!(credentials.chain()[0], credentials.certificate());
}

#[test]
fn test_aes256_bundle_wrong_passphrase() {
    let err = SigningCredentials::from_pkcs12_file(common::rsa_aes256_pkcs12(), &passphrase("wrong")).unwrap_err();
    match err {
        Error::Credential(msg) => assert!(msg.contains("firma_rsa_aes256.p12")),
        other => panic!("expected credential error, got {:?}", other),
    }
}

#[test]
fn test_rsa_cms_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsigned.pdf");
    let output = dir.path().join("signed.pdf");
    let original = write_unsigned(&input);

    sign_pdf(
        &input,
        &output,
        common::rsa_aes256_pkcs12(),
        Some(&passphrase(common::PASSPHRASE)),
        true,
    )
    .unwrap();
    let signed = std::fs::read(&output).unwrap();
    assert!(signed.starts_with(&original));
    let appended = String::from_utf8_lossy(&signed[original.len()..]).to_string();
    assert!(appended.contains(&format!("Firmado digitalmente por {}", common::RSA_SIGNER_CN)));

    let range = byte_range(&signed);
    let sd = signed_data(&signed, &range);
    assert!(sd.encap_content_info.econtent.is_none());
    assert_eq!(sd.certificates.as_ref().unwrap().0.len(), 2);

    let signer_info = sd.signer_infos.0.get(0).unwrap();
    assert_eq!(signer_info.signature_algorithm.oid, SHA_256_WITH_RSA_ENCRYPTION);

    let mut covered = signed[..range[1]].to_vec();
    covered.extend_from_slice(&signed[range[2]..range[2] + range[3]]);
    let signed_attrs = signer_info.signed_attrs.as_ref().unwrap();
    let digest = signed_attrs
        .iter()
        .find(|a| a.oid == ID_MESSAGE_DIGEST)
        .unwrap()
        .values
        .get(0)
        .unwrap()
        .decode_as::<der::asn1::OctetString>()
        .unwrap();
    assert_eq!(digest.as_bytes(), Sha256::digest(&covered).as_slice());

    let spki = signer_certificate(&sd)
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .unwrap();
    let public_key = rsa::RsaPublicKey::from_public_key_der(&spki).unwrap();
    let verifying_key = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(public_key);
    let signature = rsa::pkcs1v15::Signature::try_from(signer_info.signature.as_bytes()).unwrap();
    verifying_key
        .verify(&signed_attrs.to_der().unwrap(), &signature)
        .unwrap();
}
