//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer.
//!
//! Object numbers are assigned in a fixed order (catalog, page tree, info,
//! fonts, images, then each page with its content stream), so identical
//! input always produces identical bytes.

use super::content_stream::ContentStreamBuilder;
use super::font_manager::Base14Font;
use super::image_handler::ImageData;
use super::object_serializer::ObjectSerializer;
use crate::error::Result;
use crate::object::{Object, ObjectRef};
use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::Path;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.4")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Producer application
    pub producer: Option<String>,
    /// `/CreationDate` of the info dictionary
    pub creation_date: Option<DateTime<FixedOffset>>,
    /// Whether to compress content streams
    pub compress: bool,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.4".to_string(),
            title: None,
            author: None,
            subject: None,
            creator: None,
            producer: Some(concat!("delivery_certificate ", env!("CARGO_PKG_VERSION")).to_string()),
            creation_date: None,
            compress: true,
        }
    }
}

impl PdfWriterConfig {
    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set creator application.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Set the creation date.
    pub fn with_creation_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.creation_date = Some(date);
        self
    }

    /// Enable or disable content stream compression.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Format a date as a PDF date string, `D:YYYYMMDDHHmmSS+HH'mm'`.
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use delivery_certificate::writer::format_pdf_date;
///
/// let tz = FixedOffset::east_opt(2 * 3600).unwrap();
/// let dt = tz.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap();
/// assert_eq!(format_pdf_date(&dt), "D:20250514093000+02'00'");
/// ```
pub fn format_pdf_date(date: &DateTime<FixedOffset>) -> String {
    let offset = date.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();
    format!(
        "D:{}{}{:02}'{:02}'",
        date.format("%Y%m%d%H%M%S"),
        sign,
        offset / 3600,
        (offset % 3600) / 60
    )
}

/// Compress data using Flate/Deflate compression.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Handle to an image registered with [`PdfWriter::add_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// XObject resource name used by `Do`
    pub resource_name: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

/// Internal page data.
struct PageData {
    width: f32,
    height: f32,
    content: ContentStreamBuilder,
}

/// PDF document writer.
///
/// Pages share one resource dictionary holding every font any page uses and
/// every registered image.
pub struct PdfWriter {
    config: PdfWriterConfig,
    images: Vec<ImageData>,
    pages: Vec<PageData>,
}

impl PdfWriter {
    /// Create a new PDF writer with default config.
    pub fn new() -> Self {
        Self::with_config(PdfWriterConfig::default())
    }

    /// Create a PDF writer with custom config.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        Self {
            config,
            images: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Register an image and get the name pages draw it under.
    pub fn add_image(&mut self, image: ImageData) -> ImageRef {
        let image_ref = ImageRef {
            resource_name: format!("Im{}", self.images.len() + 1),
            width: image.width,
            height: image.height,
        };
        self.images.push(image);
        image_ref
    }

    /// Append a page with the given dimensions and content.
    pub fn add_page(&mut self, width: f32, height: f32, mut content: ContentStreamBuilder) {
        content.end_text();
        self.pages.push(PageData {
            width,
            height,
            content,
        });
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn info_dict(&self) -> Object {
        let mut entries = Vec::new();
        let text_fields = [
            ("Title", &self.config.title),
            ("Author", &self.config.author),
            ("Subject", &self.config.subject),
            ("Creator", &self.config.creator),
            ("Producer", &self.config.producer),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value {
                entries.push((key, ObjectSerializer::text_string(value)));
            }
        }
        if let Some(date) = &self.config.creation_date {
            entries.push(("CreationDate", ObjectSerializer::string(&format_pdf_date(date))));
        }
        ObjectSerializer::dict(entries)
    }

    /// Build the complete PDF document.
    pub fn finish(self) -> Result<Vec<u8>> {
        let serializer = ObjectSerializer::compact();
        let mut objects: Vec<Object> = Vec::new();

        // 1 catalog, 2 page tree, 3 info; filled in below
        let catalog_id = 1;
        let pages_id = 2;
        let info_id = 3;
        let mut next_id = 4;

        let fonts: BTreeSet<Base14Font> = self
            .pages
            .iter()
            .flat_map(|p| p.content.fonts_used().iter().copied())
            .collect();

        let mut font_resources = HashMap::new();
        let mut font_objects = Vec::new();
        for font in &fonts {
            font_resources.insert(
                font.resource_name().to_string(),
                Object::Reference(ObjectRef::new(next_id, 0)),
            );
            font_objects.push(ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Font")),
                ("Subtype", ObjectSerializer::name("Type1")),
                ("BaseFont", ObjectSerializer::name(font.base_font())),
                ("Encoding", ObjectSerializer::name("WinAnsiEncoding")),
            ]));
            next_id += 1;
        }

        let mut xobject_resources = HashMap::new();
        let mut image_objects = Vec::new();
        for (index, image) in self.images.iter().enumerate() {
            let image_id = next_id;
            next_id += 1;
            let smask = image.soft_mask_xobject().map(|mask| {
                let mask_id = next_id;
                next_id += 1;
                (mask_id, mask)
            });
            let smask_ref = smask.as_ref().map(|(id, _)| ObjectSerializer::reference(*id, 0));
            image_objects.push(image.to_xobject(smask_ref));
            if let Some((_, mask)) = smask {
                image_objects.push(mask);
            }
            xobject_resources.insert(
                format!("Im{}", index + 1),
                Object::Reference(ObjectRef::new(image_id, 0)),
            );
        }

        let mut resources = vec![("Font", Object::Dictionary(font_resources))];
        if !xobject_resources.is_empty() {
            resources.push(("XObject", Object::Dictionary(xobject_resources)));
        }
        let resources = ObjectSerializer::dict(resources);

        let mut page_refs = Vec::with_capacity(self.pages.len());
        let mut page_objects = Vec::with_capacity(self.pages.len() * 2);
        for page in &self.pages {
            let page_id = next_id;
            let content_id = next_id + 1;
            next_id += 2;

            let raw_content = page.content.build()?;
            let mut content_dict = HashMap::new();
            let content_bytes = if self.config.compress {
                content_dict.insert("Filter".to_string(), ObjectSerializer::name("FlateDecode"));
                compress_data(&raw_content)?
            } else {
                raw_content
            };

            page_refs.push(ObjectSerializer::reference(page_id, 0));
            page_objects.push(ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Page")),
                ("Parent", ObjectSerializer::reference(pages_id, 0)),
                (
                    "MediaBox",
                    ObjectSerializer::rect(0.0, 0.0, page.width as f64, page.height as f64),
                ),
                ("Contents", ObjectSerializer::reference(content_id, 0)),
                ("Resources", resources.clone()),
            ]));
            page_objects.push(Object::Stream {
                dict: content_dict,
                data: bytes::Bytes::from(content_bytes),
            });
        }

        objects.push(ObjectSerializer::dict(vec![
            ("Type", ObjectSerializer::name("Catalog")),
            ("Pages", ObjectSerializer::reference(pages_id, 0)),
        ]));
        objects.push(ObjectSerializer::dict(vec![
            ("Type", ObjectSerializer::name("Pages")),
            ("Count", ObjectSerializer::integer(self.pages.len() as i64)),
            ("Kids", ObjectSerializer::array(page_refs)),
        ]));
        objects.push(self.info_dict());
        objects.extend(font_objects);
        objects.extend(image_objects);
        objects.extend(page_objects);
        debug_assert_eq!(objects.len() as u32 + 1, next_id);

        let mut output = Vec::new();
        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (index, object) in objects.iter().enumerate() {
            offsets.push(output.len());
            output.extend_from_slice(&serializer.serialize_indirect(index as u32 + 1, 0, object));
        }

        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", next_id)?;
        // Object 0 is always free
        writeln!(output, "0000000000 65535 f ")?;
        for offset in &offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let trailer = ObjectSerializer::dict(vec![
            ("Size", ObjectSerializer::integer(next_id as i64)),
            ("Root", ObjectSerializer::reference(catalog_id, 0)),
            ("Info", ObjectSerializer::reference(info_id, 0)),
        ]);

        writeln!(output, "trailer")?;
        output.extend_from_slice(&serializer.serialize(&trailer));
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        writeln!(output, "%%EOF")?;

        log::debug!(
            "Wrote PDF: {} pages, {} objects, {} bytes",
            self.pages.len(),
            objects.len(),
            output.len()
        );
        Ok(output)
    }

    /// Save the PDF to a file.
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}
