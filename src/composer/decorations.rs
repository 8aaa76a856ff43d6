//! First-page furniture: background logos and the rotated DocID watermark.

use crate::geometry::cm;
use crate::layout::{Color, PageContext, PageDecorator};
use crate::writer::{Base14Font, ContentStreamBuilder, ImageRef};

/// Red of the brackets around the identifier.
const BRACKET_RED: u32 = 0xD32F2F;

const WATERMARK_LABEL: &str = "DocID: ";
const WATERMARK_SIZE: f32 = 12.0;

/// Paints the first page background before the story.
#[derive(Debug, Clone)]
pub struct FirstPageDecorator {
    verified_seal: ImageRef,
    keystore_emblem: ImageRef,
    document_id: String,
}

impl FirstPageDecorator {
    /// Decorator for the given images and identifier text.
    pub fn new(verified_seal: ImageRef, keystore_emblem: ImageRef, document_id: impl Into<String>) -> Self {
        Self {
            verified_seal,
            keystore_emblem,
            document_id: document_id.into(),
        }
    }

    /// Horizontal offsets of the four watermark runs along the rotated baseline.
    ///
    /// ```
    /// use delivery_certificate::composer::FirstPageDecorator;
    /// use delivery_certificate::writer::ImageRef;
    ///
    /// let image = ImageRef { resource_name: "Im1".into(), width: 1, height: 1 };
    /// let deco = FirstPageDecorator::new(image.clone(), image, "x");
    /// let [label, open, id, _close] = deco.watermark_offsets();
    /// assert_eq!(label, 0.0);
    /// assert_eq!(id, open + 8.0);
    /// ```
    pub fn watermark_offsets(&self) -> [f32; 4] {
        let font = Base14Font::HelveticaOblique;
        let label_width = font.text_width(WATERMARK_LABEL, WATERMARK_SIZE);
        let id_width = font.text_width(&self.document_id, WATERMARK_SIZE);
        [
            0.0,
            label_width,
            label_width + 8.0,
            label_width + 8.0 + id_width + 2.0,
        ]
    }

    fn draw_watermark(&self, canvas: &mut ContentStreamBuilder) {
        let [label_x, open_x, id_x, close_x] = self.watermark_offsets();
        let red = Color::hex(BRACKET_RED);

        canvas
            .save_state()
            .translate(cm(1.0), cm(3.5))
            .rotate_degrees(90.0)
            .set_font(Base14Font::HelveticaOblique, WATERMARK_SIZE)
            .fill_color(Color::black())
            .text(WATERMARK_LABEL, label_x, 0.0)
            .fill_color(red)
            .text("[", open_x, 0.0)
            .fill_color(Color::black())
            .text(&self.document_id, id_x, 0.0)
            .fill_color(red)
            .text("]", close_x, 0.0)
            .end_text()
            .restore_state();
    }

    fn draw_background_logos(&self, canvas: &mut ContentStreamBuilder) {
        canvas.draw_image(
            &self.verified_seal.resource_name,
            cm(13.0),
            cm(2.5),
            cm(4.0),
            cm(4.0),
        );
        canvas.draw_image(
            &self.keystore_emblem.resource_name,
            cm(4.0),
            cm(3.75),
            cm(1.5),
            cm(2.0),
        );
    }
}

impl PageDecorator for FirstPageDecorator {
    fn decorate(&self, canvas: &mut ContentStreamBuilder, ctx: &PageContext) {
        log::debug!("Decorating page {} with DocID {}", ctx.page_number, self.document_id);
        self.draw_watermark(canvas);
        self.draw_background_logos(canvas);
    }
}
