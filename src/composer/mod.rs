//! Certificate composition.
//!
//! Turns a [`CertificateRequest`] into a one-page A4 PDF: header with the
//! organization logo and title, the certifying text, the course details
//! list, the signature block and footer, plus first-page background logos
//! and a rotated DocID watermark.
//!
//! ```no_run
//! use delivery_certificate::composer::CertificateComposer;
//! use delivery_certificate::config::BackgroundAssets;
//! # fn request() -> delivery_certificate::composer::CertificateRequest { unimplemented!() }
//!
//! let composer = CertificateComposer::new(BackgroundAssets::default());
//! composer.compose(&request())?;
//! # Ok::<(), delivery_certificate::Error>(())
//! ```

mod decorations;
mod request;
mod story;

pub use decorations::FirstPageDecorator;
pub use request::{
    CertificateRequest, CourseDescriptor, CourseHours, DocumentId, ParticipantIdentity,
    SignerIdentity,
};
pub use story::{course_details, ListEntry};

use crate::config::{expand_home, BackgroundAssets};
use crate::error::Result;
use crate::geometry::{cm, A4};
use crate::layout::{DocTemplate, Margins};
use crate::writer::{ImageData, PdfWriter, PdfWriterConfig};
use chrono::{DateTime, FixedOffset, Local};
use log::{debug, info};
use story::HeaderLogo;

/// Document title stored in the info dictionary.
pub const DOCUMENT_TITLE: &str = "Certificado de impartición";

/// Format of the issue timestamp printed in the signature block.
pub const ISSUED_AT_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Lays out and writes certificates.
#[derive(Debug, Clone, Default)]
pub struct CertificateComposer {
    assets: BackgroundAssets,
}

impl CertificateComposer {
    /// Composer drawing the given background images on the first page.
    pub fn new(assets: BackgroundAssets) -> Self {
        Self { assets }
    }

    /// Page template: A4, 2.2 cm side margins, 0.6 cm top, 0.2 cm bottom,
    /// and a 6 pt horizontal frame padding.
    pub fn template() -> DocTemplate {
        DocTemplate::new(
            A4,
            Margins {
                left: cm(2.2),
                right: cm(2.2),
                top: cm(0.6),
                bottom: cm(0.2),
            },
        )
        .with_frame_padding(6.0, 0.0)
    }

    /// Compose the certificate stamped with the current local time.
    pub fn compose(&self, request: &CertificateRequest) -> Result<()> {
        self.compose_at(request, Local::now().fixed_offset())
    }

    /// Compose the certificate stamped with `issued_at` and write it to
    /// `request.output_path`.
    pub fn compose_at(&self, request: &CertificateRequest, issued_at: DateTime<FixedOffset>) -> Result<()> {
        let output = expand_home(&request.output_path)?;
        let bytes = self.render(request, issued_at)?;
        std::fs::write(&output, &bytes)?;
        info!("Certificate {} written to {}", request.document_id, output.display());
        Ok(())
    }

    /// Compose the certificate into memory.
    pub fn render(&self, request: &CertificateRequest, issued_at: DateTime<FixedOffset>) -> Result<Vec<u8>> {
        let document_id = request.document_id.to_string();
        let config = PdfWriterConfig::default()
            .with_title(DOCUMENT_TITLE)
            .with_author(request.signer.organization.clone())
            .with_subject(document_id.clone())
            .with_creation_date(issued_at);
        let mut writer = PdfWriter::with_config(config);

        let logo = ImageData::from_file(expand_home(&request.header_logo_path)?)?;
        let (logo_width, logo_height) = logo.fit_to_box(cm(6.0), cm(3.8));
        debug!(
            "Header logo {}x{} px scaled to {:.1}x{:.1} pt",
            logo.width, logo.height, logo_width, logo_height
        );
        let logo = HeaderLogo {
            image: writer.add_image(logo),
            width: logo_width,
            height: logo_height,
        };

        let seal = writer.add_image(ImageData::from_file(expand_home(&self.assets.verified_seal)?)?);
        let emblem = writer.add_image(ImageData::from_file(expand_home(&self.assets.keystore_emblem)?)?);
        let decorator = FirstPageDecorator::new(seal, emblem, document_id);

        let stamp = issued_at.format(ISSUED_AT_FORMAT).to_string();
        let story = story::build_story(request, logo, &stamp);

        let template = Self::template();
        let (page_width, page_height) = template.page_size();
        for page in template.render(story, Some(&decorator)) {
            writer.add_page(page_width, page_height, page);
        }
        if writer.page_count() > 1 {
            log::warn!("Certificate {} spilled onto {} pages", request.document_id, writer.page_count());
        }

        writer.finish()
    }
}
