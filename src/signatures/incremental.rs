//! Incremental update carrying the signature.
//!
//! The original bytes are kept unchanged. The update appends the signature
//! value, the field/widget annotation, an optional appearance stream, new
//! revisions of the catalog and first page, and a classic xref section whose
//! trailer points back at the original one.

use super::byterange::{ByteRangeCalculator, BYTE_RANGE_PLACEHOLDER};
use super::signer::PdfSigner;
use super::types::{SignatureAppearance, SIGNATURE_FILTER, SIGNATURE_SUB_FILTER};
use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use crate::parser::parse_indirect_object_at;
use crate::writer::{format_pdf_date, Base14Font, ContentStreamBuilder, ObjectSerializer};
use crate::xref::{find_xref_offset, parse_xref, CrossRefTable};
use std::collections::HashMap;
use std::io::Write;

/// Annotation flags of the widget: Print | Locked.
const WIDGET_FLAGS: i64 = 132;

/// SignaturesExist | AppendOnly.
const SIG_FLAGS: i64 = 3;

/// Page tree depth after which the document is treated as malformed.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Format of the date line in the visible appearance.
const APPEARANCE_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// An assembled update, ready to receive the signature.
#[derive(Debug, Clone)]
pub struct IncrementalSignature {
    data: Vec<u8>,
    original_len: usize,
    byte_range_offset: usize,
    contents_offset: usize,
}

impl IncrementalSignature {
    /// Append the signature objects to `original` with both placeholders
    /// still unfilled.
    pub fn prepare(original: &[u8], signer: &PdfSigner) -> Result<Self> {
        let xref_offset = find_xref_offset(original)?;
        let xref = parse_xref(original, xref_offset)?;

        let root_ref = xref
            .trailer()
            .get("Root")
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::InvalidPdf("trailer has no /Root".to_string()))?;
        let mut catalog = load_dict(original, &xref, root_ref)?;
        if catalog.contains_key("AcroForm") {
            return Err(Error::Unsupported(
                "documents that already have an interactive form cannot be signed".to_string(),
            ));
        }

        let pages_ref = catalog
            .get("Pages")
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::InvalidPdf("catalog has no /Pages".to_string()))?;
        let (page_ref, mut page) = first_page(original, &xref, pages_ref)?;
        let mut annots = match page.get("Annots") {
            None => Vec::new(),
            Some(Object::Array(items)) => items.clone(),
            Some(_) => {
                return Err(Error::Unsupported("indirect page /Annots cannot be extended".to_string()))
            },
        };

        let declared_size = xref
            .trailer()
            .get("Size")
            .and_then(Object::as_integer)
            .and_then(|size| u32::try_from(size).ok())
            .unwrap_or(0);
        let first_new = declared_size.max(xref.max_object_number() + 1);
        let sig_id = first_new;
        let widget_id = first_new + 1;
        let options = signer.options();
        let appearance_id = options.appearance.as_ref().map(|_| first_new + 2);
        let new_size = first_new + if appearance_id.is_some() { 3 } else { 2 };

        let signer_name = signer.credentials().signer_name().unwrap_or_default();
        let serializer = ObjectSerializer::compact();

        let mut data = original.to_vec();
        if !data.ends_with(b"\n") {
            data.push(b'\n');
        }
        let mut offsets: Vec<(ObjectRef, usize)> = Vec::new();

        // Signature value, written by hand so both placeholder offsets are known
        offsets.push((ObjectRef::new(sig_id, 0), data.len()));
        write!(
            data,
            "{} 0 obj\n<< /Type /Sig /Filter /{} /SubFilter /{} /ByteRange ",
            sig_id, SIGNATURE_FILTER, SIGNATURE_SUB_FILTER
        )?;
        let byte_range_offset = data.len();
        data.extend_from_slice(BYTE_RANGE_PLACEHOLDER.as_bytes());
        data.extend_from_slice(b" /Contents ");
        let contents_offset = data.len();
        data.extend_from_slice(signer.byte_range().generate_placeholder().as_bytes());
        data.extend_from_slice(b" /M ");
        data.extend_from_slice(&serializer.serialize(&ObjectSerializer::string(&format_pdf_date(
            &options.signing_time,
        ))));
        data.extend_from_slice(b" /Name ");
        data.extend_from_slice(&serializer.serialize(&ObjectSerializer::text_string(&signer_name)));
        data.extend_from_slice(b" >>\nendobj\n");

        let rect = options.widget_rect().to_corners();
        let mut widget = vec![
            ("Type", ObjectSerializer::name("Annot")),
            ("Subtype", ObjectSerializer::name("Widget")),
            ("FT", ObjectSerializer::name("Sig")),
            ("T", ObjectSerializer::text_string(&options.field_name)),
            ("V", ObjectSerializer::reference(sig_id, 0)),
            ("P", Object::Reference(page_ref)),
            ("Rect", ObjectSerializer::array(rect.iter().map(|&v| ObjectSerializer::real(v as f64)).collect())),
            ("F", ObjectSerializer::integer(WIDGET_FLAGS)),
        ];
        if let Some(id) = appearance_id {
            widget.push(("AP", ObjectSerializer::dict(vec![("N", ObjectSerializer::reference(id, 0))])));
        }
        offsets.push((ObjectRef::new(widget_id, 0), data.len()));
        data.extend_from_slice(&serializer.serialize_indirect(widget_id, 0, &ObjectSerializer::dict(widget)));

        if let (Some(id), Some(appearance)) = (appearance_id, options.appearance.as_ref()) {
            let date = options.signing_time.format(APPEARANCE_DATE_FORMAT).to_string();
            let stream = appearance_stream(appearance, &signer_name, &date)?;
            offsets.push((ObjectRef::new(id, 0), data.len()));
            data.extend_from_slice(&serializer.serialize_indirect(id, 0, &stream));
        }

        let widget_ref = ObjectSerializer::reference(widget_id, 0);
        catalog.insert(
            "AcroForm".to_string(),
            ObjectSerializer::dict(vec![
                ("Fields", ObjectSerializer::array(vec![widget_ref.clone()])),
                ("SigFlags", ObjectSerializer::integer(SIG_FLAGS)),
            ]),
        );
        offsets.push((root_ref, data.len()));
        data.extend_from_slice(&serializer.serialize_indirect(root_ref.id, root_ref.gen, &Object::Dictionary(catalog)));

        annots.push(widget_ref);
        page.insert("Annots".to_string(), Object::Array(annots));
        offsets.push((page_ref, data.len()));
        data.extend_from_slice(&serializer.serialize_indirect(page_ref.id, page_ref.gen, &Object::Dictionary(page)));

        let xref_start = data.len();
        offsets.sort_by_key(|(r, _)| r.id);
        data.extend_from_slice(b"xref\n");
        for (reference, offset) in &offsets {
            write!(data, "{} 1\n{:010} {:05} n\r\n", reference.id, offset, reference.gen)?;
        }

        let mut trailer = vec![
            ("Size", ObjectSerializer::integer(new_size.max(declared_size) as i64)),
            ("Root", Object::Reference(root_ref)),
            ("Prev", ObjectSerializer::integer(xref_offset as i64)),
        ];
        for key in ["Info", "ID"] {
            if let Some(value) = xref.trailer().get(key) {
                trailer.push((key, value.clone()));
            }
        }
        data.extend_from_slice(b"trailer\n");
        data.extend_from_slice(&serializer.serialize(&ObjectSerializer::dict(trailer)));
        write!(data, "\nstartxref\n{}\n%%EOF\n", xref_start)?;

        log::debug!(
            "Prepared incremental update: {} objects, signature {}, widget {} on page {}",
            offsets.len(),
            sig_id,
            widget_id,
            page_ref
        );

        Ok(Self {
            data,
            original_len: original.len(),
            byte_range_offset,
            contents_offset,
        })
    }

    /// Length of the untouched original prefix.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Offset of the `/ByteRange` array.
    pub fn byte_range_offset(&self) -> usize {
        self.byte_range_offset
    }

    /// Offset of the `<` opening the `/Contents` string.
    pub fn contents_offset(&self) -> usize {
        self.contents_offset
    }

    /// Bytes of the assembled document.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Fill in the ByteRange, sign the covered bytes and embed the CMS blob.
    pub fn sign(mut self, signer: &PdfSigner) -> Result<Vec<u8>> {
        let calc: &ByteRangeCalculator = signer.byte_range();
        let byte_range = calc.calculate_byte_range(self.data.len(), self.contents_offset);
        ByteRangeCalculator::validate_byte_range(&byte_range, self.data.len())?;

        let formatted = ByteRangeCalculator::format_byte_range(&byte_range)?;
        let end = self.byte_range_offset + formatted.len();
        self.data[self.byte_range_offset..end].copy_from_slice(formatted.as_bytes());

        let signed_bytes = ByteRangeCalculator::extract_signed_bytes(&self.data, &byte_range)?;
        let cms = signer.sign(&signed_bytes)?;
        log::debug!("CMS signature is {} of {} reserved bytes", cms.len(), signer.options().estimated_size);
        calc.insert_signature(&mut self.data, self.contents_offset, &cms)?;
        Ok(self.data)
    }
}

fn load_dict(data: &[u8], xref: &CrossRefTable, reference: ObjectRef) -> Result<HashMap<String, Object>> {
    let entry = xref
        .get(reference.id)
        .ok_or_else(|| Error::InvalidPdf(format!("object {} is not in the xref table", reference)))?;
    let (_, object) = parse_indirect_object_at(data, entry.offset as usize)?;
    match object {
        Object::Dictionary(dict) => Ok(dict),
        other => Err(Error::InvalidPdf(format!(
            "object {} is a {}, expected a dictionary",
            reference,
            other.type_name()
        ))),
    }
}

/// Descend `/Kids[0]` from the page tree root to the first leaf page.
fn first_page(
    data: &[u8],
    xref: &CrossRefTable,
    root: ObjectRef,
) -> Result<(ObjectRef, HashMap<String, Object>)> {
    let mut current = root;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = load_dict(data, xref, current)?;
        if node.get("Type").and_then(Object::as_name) == Some("Page") {
            return Ok((current, node));
        }
        current = node
            .get("Kids")
            .and_then(Object::as_array)
            .and_then(|kids| kids.first())
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::InvalidPdf(format!("page tree node {} has no kids", current)))?;
    }
    Err(Error::InvalidPdf("page tree is too deep".to_string()))
}

/// Form XObject showing the signer and signing date.
fn appearance_stream(appearance: &SignatureAppearance, signer_name: &str, date: &str) -> Result<Object> {
    let width = appearance.rect.width;
    let height = appearance.rect.height;
    let size = appearance.font_size;
    let font = Base14Font::Helvetica;

    let mut content = ContentStreamBuilder::new();
    content
        .set_font(font, size)
        .text(&format!("Firmado digitalmente por {}", signer_name), 2.0, height - size - 1.0)
        .text(date, 2.0, 2.0)
        .end_text();

    let font_dict = ObjectSerializer::dict(vec![
        ("Type", ObjectSerializer::name("Font")),
        ("Subtype", ObjectSerializer::name("Type1")),
        ("BaseFont", ObjectSerializer::name(font.base_font())),
        ("Encoding", ObjectSerializer::name("WinAnsiEncoding")),
    ]);
    let mut fonts = HashMap::new();
    fonts.insert(font.resource_name().to_string(), font_dict);

    let dict: HashMap<String, Object> = [
        ("Type", ObjectSerializer::name("XObject")),
        ("Subtype", ObjectSerializer::name("Form")),
        ("BBox", ObjectSerializer::rect(0.0, 0.0, width as f64, height as f64)),
        ("Resources", ObjectSerializer::dict(vec![("Font", Object::Dictionary(fonts))])),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect();

    Ok(Object::Stream {
        dict,
        data: bytes::Bytes::from(content.build()?),
    })
}
