//! Integration tests for certificate composition.

mod common;

use chrono::{DateTime, FixedOffset};
use delivery_certificate::composer::{course_details, CertificateComposer, CourseHours, DocumentId};
use delivery_certificate::config::BackgroundAssets;
use delivery_certificate::xref::{find_xref_offset, parse_xref};
use delivery_certificate::Error;
use flate2::read::ZlibDecoder;
use std::io::Read;
use uuid::Uuid;

fn issued_at() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2025-04-16T10:30:00+02:00").unwrap()
}

fn id(text: &str) -> DocumentId {
    DocumentId::from_uuid(Uuid::parse_str(text).unwrap())
}

/// All Flate streams of `pdf`, inflated and concatenated.
fn inflated_streams(pdf: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rest = pdf;
    while let Some(start) = common::find(rest, b"\nstream\n") {
        let body = &rest[start + b"\nstream\n".len()..];
        let end = common::find(body, b"\nendstream").unwrap();
        let mut decoded = Vec::new();
        if ZlibDecoder::new(&body[..end]).read_to_end(&mut decoded).is_ok() {
            out.extend_from_slice(&decoded);
        }
        rest = &body[end..];
    }
    out
}

#[test]
fn test_compose_writes_single_page_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let (logo, assets) = common::write_assets(dir.path());
    let output = dir.path().join("certificate.pdf");
    let document_id = id("6b117545-c2e4-43ec-b74b-ab8c62a6aec2");
    let request = common::request(logo, output.clone(), document_id);

    CertificateComposer::new(assets).compose_at(&request, issued_at()).unwrap();

    let pdf = std::fs::read(&output).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
    assert!(pdf.ends_with(b"%%EOF\n"));
    assert!(common::find(&pdf, b"/Count 1").is_some());
    assert!(common::find(&pdf, b"(6b117545-c2e4-43ec-b74b-ab8c62a6aec2)").is_some());
    assert!(common::find(&pdf, b"(3P Ventures S.L.)").is_some());

    // The signer reads this file back, so its xref must be readable
    let xref = parse_xref(&pdf, find_xref_offset(&pdf).unwrap()).unwrap();
    assert!(xref.trailer().contains_key("Root"));
}

#[test]
fn test_render_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let (logo, assets) = common::write_assets(dir.path());
    let document_id = id("00000000-0000-4000-8000-000000000001");
    let request = common::request(logo, dir.path().join("a.pdf"), document_id);
    let composer = CertificateComposer::new(assets);

    let first = composer.render(&request, issued_at()).unwrap();
    let second = composer.render(&request, issued_at()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_documents_differ_only_by_identifier() {
    let dir = tempfile::tempdir().unwrap();
    let (logo, assets) = common::write_assets(dir.path());
    let composer = CertificateComposer::new(assets);

    let a = common::request(logo.clone(), dir.path().join("a.pdf"), id("00000000-0000-4000-8000-00000000000a"));
    let b = common::request(logo, dir.path().join("b.pdf"), id("00000000-0000-4000-8000-00000000000b"));

    let pdf_a = composer.render(&a, issued_at()).unwrap();
    let pdf_b = composer.render(&b, issued_at()).unwrap();
    assert_ne!(pdf_a, pdf_b);
    assert!(common::find(&pdf_a, b"00000000-0000-4000-8000-00000000000a").is_some());
    assert!(common::find(&pdf_a, b"00000000-0000-4000-8000-00000000000b").is_none());
    assert!(common::find(&pdf_b, b"00000000-0000-4000-8000-00000000000b").is_some());
}

#[test]
fn test_380_hour_scenario_details() {
    let entries = course_details(&common::course());
    assert_eq!(entries.iter().filter(|e| e.level == 0).count(), 4);
    assert_eq!(entries.iter().filter(|e| e.level == 1).count(), 3);
    assert!(!entries.iter().any(|e| e.text.starts_with("Familia Profesional")));
    assert!(!entries.iter().any(|e| e.text.starts_with("Área Profesional")));
    assert!(!entries.iter().any(|e| e.text.contains("(<b>")));
}

#[test]
fn test_modality_hours_printed_as_given() {
    let dir = tempfile::tempdir().unwrap();
    let (logo, assets) = common::write_assets(dir.path());
    let output = dir.path().join("certificate.pdf");
    let mut request = common::request(logo, output.clone(), DocumentId::generate());
    request.course.hours = CourseHours {
        total: 999,
        presential: 10,
        webinar: 10,
        online: 10,
    };

    CertificateComposer::new(assets).compose_at(&request, issued_at()).unwrap();

    let content = inflated_streams(&std::fs::read(&output).unwrap());
    assert!(common::find(&content, b"( 999) Tj").is_some());
    assert!(common::find(&content, b"(Presencial: 10 horas) Tj").is_some());
    assert!(common::find(&content, b"(Webinar/presencial virtual: 10 horas) Tj").is_some());
    assert!(common::find(&content, b"(Tutor\xEDzaci\xF3n online: 10 horas) Tj").is_some());
    assert!(common::find(&content, b"30 horas").is_none());
}

#[test]
fn test_missing_header_logo() {
    let dir = tempfile::tempdir().unwrap();
    let (_, assets) = common::write_assets(dir.path());
    let output = dir.path().join("certificate.pdf");
    let request = common::request(dir.path().join("missing.png"), output.clone(), DocumentId::generate());

    let err = CertificateComposer::new(assets).compose_at(&request, issued_at()).unwrap_err();
    assert!(matches!(err, Error::Image(_)));
    assert!(!output.exists());
}

#[test]
fn test_missing_background_asset() {
    let dir = tempfile::tempdir().unwrap();
    let (logo, _) = common::write_assets(dir.path());
    let assets = BackgroundAssets::in_dir(dir.path().join("nowhere"));
    let request = common::request(logo, dir.path().join("certificate.pdf"), DocumentId::generate());

    let err = CertificateComposer::new(assets).render(&request, issued_at()).unwrap_err();
    assert!(matches!(err, Error::Image(_)));
}
