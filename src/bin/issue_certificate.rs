//! Issue one signed delivery certificate.
//!
//! Runs a single compose → sign → cleanup cycle for the sample issuance with
//! the default [`RunConfig`]. The PKCS#12 passphrase is read from
//! `FNMT_CERTIFICATE_PASSWORD`; verbosity follows `RUST_LOG` (default `info`).
//!
//! Usage:
//!   cargo run --release --bin issue_certificate

use delivery_certificate::composer::{CourseDescriptor, CourseHours, ParticipantIdentity, SignerIdentity};
use delivery_certificate::config::RunConfig;
use delivery_certificate::orchestrator::{CleanupOutcome, Issuance, RunOrchestrator};
use std::path::PathBuf;
use std::process::ExitCode;

fn sample_issuance() -> Issuance {
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
        course: CourseDescriptor {
            title: "Creación automatizada de certificados desde Python".to_string(),
            code: None,
            professional_family: Some("Lenguajes de programación".to_string()),
            professional_area: Some("Tecnologías de la información".to_string()),
            start_date: "04/03/2025".to_string(),
            end_date: "15/04/2025".to_string(),
            hours: CourseHours {
                total: 380,
                presential: 380,
                webinar: 0,
                online: 0,
            },
        },
        header_logo_path: PathBuf::from("media/tu-formacion-importa-logo.png"),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let orchestrator = RunOrchestrator::new(RunConfig::default());
    log::info!(
        "Working in {}, signing with {}",
        orchestrator.config().working_dir.display(),
        orchestrator.config().certificate_path.display()
    );
    match orchestrator.run(sample_issuance()) {
        Ok(report) => {
            println!("🚀 Generated document {}", report.document_id);
            println!("✅ Signed certificate: {}", report.signed_path.display());
            match report.cleanup {
                CleanupOutcome::Success => {
                    println!("✅ TMP PDF deleted: {}", report.unsigned_path.display());
                },
                CleanupOutcome::SuccessWithWarning(reason) => {
                    eprintln!("❌ Error deleting tmp PDF: {}", reason);
                },
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        },
    }
}
