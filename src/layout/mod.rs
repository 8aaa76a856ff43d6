//! Flow layout for single-column documents.
//!
//! A story is a list of [`Flowable`]s stacked top-down inside the page
//! frame, the way a typesetting template places paragraphs, spacers, rules,
//! tables and lists. Each flowable is measured with [`Flowable::wrap`] and
//! then painted with [`Flowable::draw`] at its lower-left corner.
//!
//! - [`Paragraph`]: styled, wrapped text from inline markup
//! - [`Spacer`], [`HorizontalRule`], [`ImageFlowable`]: simple blocks
//! - [`Table`]: fixed or measured grid of cells
//! - [`ListFlowable`]: bulleted items with per-item indent
//! - [`DocTemplate`]: page frame, pagination and page decoration

pub mod color;
pub mod doc_template;
pub mod flowables;
pub mod list;
pub mod markup;
pub mod paragraph;
pub mod table;

use crate::writer::ContentStreamBuilder;

pub use color::Color;
pub use doc_template::{DocTemplate, Margins, PageContext, PageDecorator};
pub use flowables::{HorizontalRule, ImageFlowable, Spacer};
pub use list::{ListFlowable, ListItem};
pub use markup::{escape_markup, parse_markup, Inline, InlineStyle};
pub use paragraph::{Paragraph, ParagraphStyle, TextAlign};
pub use table::{CellPadding, Table, VAlign};

/// Horizontal placement of a block inside the space it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    /// Flush left
    #[default]
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
}

impl HAlign {
    /// Offset of a block of `width` inside `available`.
    pub fn offset(self, available: f32, width: f32) -> f32 {
        match self {
            HAlign::Left => 0.0,
            HAlign::Center => (available - width) / 2.0,
            HAlign::Right => available - width,
        }
    }
}

/// A block that can be measured and drawn.
pub trait Flowable {
    /// Lay out for the available space and return `(width, height)`.
    fn wrap(&mut self, avail_width: f32, avail_height: f32) -> (f32, f32);

    /// Paint with the lower-left corner at `(x, y)`; called after `wrap`.
    fn draw(&self, canvas: &mut ContentStreamBuilder, x: f32, y: f32);

    /// Vertical space above the block (skipped at the top of a frame).
    fn space_before(&self) -> f32 {
        0.0
    }

    /// Vertical space below the block.
    fn space_after(&self) -> f32 {
        0.0
    }

    /// Placement when the block is narrower than the frame.
    fn h_align(&self) -> HAlign {
        HAlign::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halign_offset() {
        assert_eq!(HAlign::Left.offset(100.0, 40.0), 0.0);
        assert_eq!(HAlign::Center.offset(100.0, 40.0), 30.0);
        assert_eq!(HAlign::Right.offset(100.0, 40.0), 60.0);
    }
}
