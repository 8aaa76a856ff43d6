//! Page template: one frame per page, flowables stacked top-down.

use log::{debug, warn};

use super::Flowable;
use crate::writer::ContentStreamBuilder;

const EPSILON: f32 = 1e-3;

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Left margin
    pub left: f32,
    /// Right margin
    pub right: f32,
    /// Top margin
    pub top: f32,
    /// Bottom margin
    pub bottom: f32,
}

/// What a decorator knows about the page it paints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageContext {
    /// 1-based page number
    pub page_number: usize,
    /// Page width in points
    pub page_width: f32,
    /// Page height in points
    pub page_height: f32,
}

/// Paints page furniture below the story content.
pub trait PageDecorator {
    /// Draw onto `canvas` before the page's story content.
    fn decorate(&self, canvas: &mut ContentStreamBuilder, ctx: &PageContext);
}

/// Single-frame page template.
#[derive(Debug, Clone, PartialEq)]
pub struct DocTemplate {
    page_width: f32,
    page_height: f32,
    margins: Margins,
    horizontal_padding: f32,
    vertical_padding: f32,
}

impl DocTemplate {
    /// Template for a page of the given size, with no frame padding.
    pub fn new(page_size: (f32, f32), margins: Margins) -> Self {
        Self {
            page_width: page_size.0,
            page_height: page_size.1,
            margins,
            horizontal_padding: 0.0,
            vertical_padding: 0.0,
        }
    }

    /// Inset the frame by `horizontal` on the left and right and by
    /// `vertical` on the top and bottom.
    pub fn with_frame_padding(mut self, horizontal: f32, vertical: f32) -> Self {
        self.horizontal_padding = horizontal;
        self.vertical_padding = vertical;
        self
    }

    /// Page size in points.
    pub fn page_size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    /// Usable width inside the frame.
    pub fn frame_width(&self) -> f32 {
        self.page_width - self.margins.left - self.margins.right - 2.0 * self.horizontal_padding
    }

    /// Usable height inside the frame.
    pub fn frame_height(&self) -> f32 {
        self.frame_top() - self.frame_bottom()
    }

    fn frame_left(&self) -> f32 {
        self.margins.left + self.horizontal_padding
    }

    fn frame_top(&self) -> f32 {
        self.page_height - self.margins.top - self.vertical_padding
    }

    fn frame_bottom(&self) -> f32 {
        self.margins.bottom + self.vertical_padding
    }

    fn start_page(
        &self,
        page_number: usize,
        decorator: Option<&dyn PageDecorator>,
    ) -> ContentStreamBuilder {
        let mut canvas = ContentStreamBuilder::new();
        if let Some(decorator) = decorator {
            let ctx = PageContext {
                page_number,
                page_width: self.page_width,
                page_height: self.page_height,
            };
            canvas.save_state();
            decorator.decorate(&mut canvas, &ctx);
            canvas.end_text().restore_state();
        }
        canvas
    }

    /// Lay out `story` and return one content stream per page.
    ///
    /// `first_page` paints the first page before any story content. A
    /// flowable that does not fit in the remaining space moves to a new
    /// page; one taller than an empty frame is drawn anyway and overflows.
    pub fn render(
        &self,
        story: Vec<Box<dyn Flowable>>,
        first_page: Option<&dyn PageDecorator>,
    ) -> Vec<ContentStreamBuilder> {
        let frame_width = self.frame_width();
        let frame_top = self.frame_top();
        let frame_bottom = self.frame_bottom();

        let mut pages = Vec::new();
        let mut page_number = 1;
        let mut canvas = self.start_page(page_number, first_page);
        let mut cursor = frame_top;

        for mut flowable in story {
            let at_top = frame_top - cursor < EPSILON;
            let mut before = if at_top { 0.0 } else { flowable.space_before() };
            let (mut width, mut height) = flowable.wrap(frame_width, cursor - before - frame_bottom);

            if cursor - before - height < frame_bottom - EPSILON {
                if at_top {
                    warn!(
                        "Flowable of height {:.1} overflows the frame on page {}",
                        height, page_number
                    );
                } else {
                    pages.push(std::mem::replace(
                        &mut canvas,
                        self.start_page(page_number + 1, None),
                    ));
                    page_number += 1;
                    cursor = frame_top;
                    before = 0.0;
                    (width, height) = flowable.wrap(frame_width, frame_top - frame_bottom);
                    debug!("Page break before flowable of height {:.1}, now on page {}", height, page_number);
                }
            }

            let x = self.frame_left() + flowable.h_align().offset(frame_width, width);
            cursor -= before + height;
            flowable.draw(&mut canvas, x, cursor);
            cursor -= flowable.space_after();
        }

        pages.push(canvas);
        debug!("Laid out {} page(s)", pages.len());
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Spacer;
    use crate::writer::ContentStreamOp;
    use std::cell::Cell;

    fn template() -> DocTemplate {
        DocTemplate::new(
            (200.0, 300.0),
            Margins {
                left: 10.0,
                right: 10.0,
                top: 20.0,
                bottom: 20.0,
            },
        )
    }

    fn spacer(height: f32) -> Box<dyn Flowable> {
        Box::new(Spacer::new(1.0, height))
    }

    struct Marker {
        calls: Cell<usize>,
    }

    impl PageDecorator for Marker {
        fn decorate(&self, canvas: &mut ContentStreamBuilder, ctx: &PageContext) {
            self.calls.set(self.calls.get() + 1);
            canvas
                .move_to(0.0, 0.0)
                .line_to(ctx.page_width, ctx.page_height)
                .stroke();
        }
    }

    #[test]
    fn test_frame_geometry() {
        let t = template();
        assert_eq!(t.frame_width(), 180.0);
        assert_eq!(t.frame_height(), 260.0);
    }

    #[test]
    fn test_frame_padding() {
        let t = template().with_frame_padding(6.0, 5.0);
        assert_eq!(t.frame_width(), 168.0);
        assert_eq!(t.frame_height(), 250.0);
        assert_eq!(t.page_size(), (200.0, 300.0));
    }

    #[test]
    fn test_single_page() {
        let pages = template().render(vec![spacer(100.0), spacer(160.0)], None);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_page_break_on_overflow() {
        let pages = template().render(vec![spacer(200.0), spacer(100.0)], None);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_oversized_flowable_stays() {
        let pages = template().render(vec![spacer(500.0)], None);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_decorator_first_page_only() {
        let marker = Marker { calls: Cell::new(0) };
        let pages = template().render(vec![spacer(200.0), spacer(200.0)], Some(&marker));
        assert_eq!(pages.len(), 2);
        assert_eq!(marker.calls.get(), 1);
        assert!(pages[0]
            .operations()
            .contains(&ContentStreamOp::LineTo(200.0, 300.0)));
        assert!(pages[1].is_empty());
    }
}
