//! Bulleted lists.

use super::{Color, Flowable, Paragraph, ParagraphStyle};
use crate::writer::{Base14Font, ContentStreamBuilder};

/// WinAnsi code of the bullet glyph.
const BULLET: u8 = 0x95;

/// One list entry: markup text and its left indent in points.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Inline markup of the entry
    pub markup: String,
    /// Left indent of the text; the bullet hangs to its left
    pub indent: f32,
}

impl ListItem {
    /// Top-level item.
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            indent: ListFlowable::ITEM_INDENT,
        }
    }

    /// Nested item.
    pub fn nested(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            indent: ListFlowable::NESTED_INDENT,
        }
    }
}

/// A vertical list of bulleted paragraphs.
///
/// Items are stacked without gaps; the bullet sits just left of the item
/// text on its first baseline.
#[derive(Debug, Clone)]
pub struct ListFlowable {
    items: Vec<(f32, Paragraph)>,
    bullet_font: Base14Font,
    bullet_size: f32,
    bullet_color: Color,
    space_before: f32,
    heights: Vec<f32>,
}

impl ListFlowable {
    /// Indent of top-level items.
    pub const ITEM_INDENT: f32 = 10.0;
    /// Indent of nested items.
    pub const NESTED_INDENT: f32 = 30.0;

    /// Build a list; every item uses `style`.
    pub fn new(items: Vec<ListItem>, style: ParagraphStyle) -> Self {
        let items = items
            .into_iter()
            .map(|item| (item.indent, Paragraph::new(&item.markup, style.clone())))
            .collect();
        Self {
            items,
            bullet_font: Base14Font::HelveticaBold,
            bullet_size: 12.0,
            bullet_color: Color::black(),
            space_before: 6.0,
            heights: Vec::new(),
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn bullet_width(&self) -> f32 {
        self.bullet_font.encoded_width(&[BULLET], self.bullet_size)
    }
}

impl Flowable for ListFlowable {
    fn wrap(&mut self, avail_width: f32, avail_height: f32) -> (f32, f32) {
        self.heights = self
            .items
            .iter_mut()
            .map(|(indent, paragraph)| {
                paragraph
                    .wrap((avail_width - *indent).max(0.0), avail_height)
                    .1
            })
            .collect();
        (avail_width, self.heights.iter().sum())
    }

    fn draw(&self, canvas: &mut ContentStreamBuilder, x: f32, y: f32) {
        let bullet_width = self.bullet_width();
        let mut top = y + self.heights.iter().sum::<f32>();

        for ((indent, paragraph), height) in self.items.iter().zip(&self.heights) {
            let baseline = top - paragraph.first_baseline_offset();
            canvas
                .fill_color(self.bullet_color)
                .begin_text()
                .set_font(self.bullet_font, self.bullet_size)
                .encoded_text(vec![BULLET], x + indent - bullet_width, baseline)
                .end_text();
            paragraph.draw(canvas, x + indent, top - height);
            top -= height;
        }
    }

    fn space_before(&self) -> f32 {
        self.space_before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ContentStreamOp;

    fn style() -> ParagraphStyle {
        ParagraphStyle::default().with_size(12.0, 18.0)
    }

    #[test]
    fn test_items_stack_without_gaps() {
        let mut list = ListFlowable::new(
            vec![ListItem::new("uno"), ListItem::nested("dos"), ListItem::new("tres")],
            style(),
        );
        assert_eq!(list.len(), 3);
        assert_eq!(list.wrap(400.0, 800.0), (400.0, 54.0));
        assert_eq!(list.space_before(), 6.0);
    }

    #[test]
    fn test_bullets_drawn_per_item() {
        let mut list = ListFlowable::new(vec![ListItem::new("uno"), ListItem::nested("dos")], style());
        list.wrap(400.0, 800.0);
        let mut canvas = ContentStreamBuilder::new();
        list.draw(&mut canvas, 0.0, 0.0);

        let bullets = canvas
            .operations()
            .iter()
            .filter(|op| **op == ContentStreamOp::ShowText(vec![BULLET]))
            .count();
        assert_eq!(bullets, 2);
        assert!(canvas.fonts_used().contains(&Base14Font::HelveticaBold));
    }

    #[test]
    fn test_nested_item_narrower() {
        let mut list = ListFlowable::new(vec![ListItem::nested("x")], style());
        list.wrap(100.0, 800.0);
        assert_eq!(list.items[0].0, 30.0);
    }
}
