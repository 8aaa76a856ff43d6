//! Integration tests for the compose → sign → cleanup run.

mod common;

use delivery_certificate::config::RunConfig;
use delivery_certificate::orchestrator::{CleanupOutcome, RunOrchestrator};
use delivery_certificate::Error;
use std::path::Path;

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn config(dir: &Path, password: &str) -> (RunConfig, std::path::PathBuf) {
    let (logo, assets) = common::write_assets(dir);
    let p12 = common::write_pkcs12(dir);
    let config = RunConfig::new()
        .with_working_dir(dir)
        .with_certificate_path(p12)
        .with_certificate_password(password)
        .with_assets(assets);
    (config, logo)
}

#[test]
fn test_full_run() {
    let dir = tempfile::tempdir().unwrap();
    let (config, logo) = config(dir.path(), common::PASSPHRASE);
    let orchestrator = RunOrchestrator::new(config);

    let report = orchestrator.run(common::issuance(logo)).unwrap();
    let id = report.document_id.to_string();

    assert_eq!(report.cleanup, CleanupOutcome::Success);
    assert!(!report.unsigned_path.exists());
    assert!(report.signed_path.exists());
    assert_eq!(
        report.signed_path,
        dir.path().join(format!("wekab_certificate_{}_signed.pdf", id))
    );
    assert_eq!(
        report.unsigned_path,
        dir.path().join(format!("tmp_{}_certificate.pdf", id))
    );

    let signed = std::fs::read(&report.signed_path).unwrap();
    assert!(signed.starts_with(b"%PDF-"));
    assert!(common::find(&signed, b"/SubFilter /adbe.pkcs7.detached").is_some());
    assert!(common::find(&signed, id.as_bytes()).is_some());
}

#[test]
fn test_runs_get_distinct_documents() {
    let dir = tempfile::tempdir().unwrap();
    let (config, logo) = config(dir.path(), common::PASSPHRASE);
    let orchestrator = RunOrchestrator::new(config);

    let first = orchestrator.run(common::issuance(logo.clone())).unwrap();
    let second = orchestrator.run(common::issuance(logo)).unwrap();
    assert_ne!(first.document_id, second.document_id);
    assert_ne!(first.signed_path, second.signed_path);
}

#[test]
fn test_compose_failure_stops_run() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = config(dir.path(), common::PASSPHRASE);
    let before = file_names(dir.path());

    let err = RunOrchestrator::new(config)
        .run(common::issuance(dir.path().join("missing-logo.png")))
        .unwrap_err();
    assert!(matches!(err, Error::Image(_)));
    assert_eq!(file_names(dir.path()), before);
}

#[test]
fn test_sign_failure_keeps_unsigned_file() {
    let dir = tempfile::tempdir().unwrap();
    let (config, logo) = config(dir.path(), "not the passphrase");

    let err = RunOrchestrator::new(config).run(common::issuance(logo)).unwrap_err();
    assert!(matches!(err, Error::Credential(_)));

    let names = file_names(dir.path());
    assert!(names.iter().any(|n| n.starts_with("tmp_") && n.ends_with("_certificate.pdf")));
    assert!(!names.iter().any(|n| n.ends_with("_signed.pdf")));
}

#[test]
fn test_cleanup_warning_on_missing_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = config(dir.path(), common::PASSPHRASE);
    let orchestrator = RunOrchestrator::new(config);

    let outcome = orchestrator.cleanup(&dir.path().join("tmp_missing_certificate.pdf"));
    match outcome {
        CleanupOutcome::SuccessWithWarning(reason) => {
            assert!(reason.contains("tmp_missing_certificate.pdf"));
        },
        CleanupOutcome::Success => panic!("removing a missing file must warn"),
    }
}
