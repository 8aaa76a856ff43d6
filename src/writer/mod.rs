//! PDF writing module for generating PDF files.
//!
//! ## Architecture
//!
//! ```text
//! Flowables (crate::layout)
//!     ↓
//! [ContentStreamBuilder] (operators → content stream bytes)
//!     ↓
//! [PdfWriter] (assembles complete PDF structure)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Example
//!
//! ```
//! use delivery_certificate::writer::{Base14Font, ContentStreamBuilder, PdfWriter};
//!
//! let mut content = ContentStreamBuilder::new();
//! content
//!     .set_font(Base14Font::Helvetica, 12.0)
//!     .text("Hello, World!", 72.0, 720.0);
//!
//! let mut writer = PdfWriter::new();
//! writer.add_page(612.0, 792.0, content);
//! let bytes = writer.finish()?;
//! assert!(bytes.starts_with(b"%PDF-1.4"));
//! # Ok::<(), delivery_certificate::Error>(())
//! ```

mod content_stream;
mod font_manager;
mod image_handler;
mod object_serializer;
mod pdf_writer;

pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use font_manager::{encode_win_ansi, Base14Font, HELVETICA_ASCENT, HELVETICA_DESCENT};
pub use image_handler::{fit_to_box, ColorSpace, ImageData};
pub use object_serializer::{format_real, ObjectSerializer};
pub use pdf_writer::{format_pdf_date, ImageRef, PdfWriter, PdfWriterConfig};
