//! Simple fixed-size flowables.

use super::{Color, Flowable, HAlign};
use crate::writer::{ContentStreamBuilder, ImageRef};

/// Empty vertical space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacer {
    width: f32,
    height: f32,
}

impl Spacer {
    /// Create a spacer of the given size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Flowable for Spacer {
    fn wrap(&mut self, _avail_width: f32, _avail_height: f32) -> (f32, f32) {
        (self.width, self.height)
    }

    fn draw(&self, _canvas: &mut ContentStreamBuilder, _x: f32, _y: f32) {}
}

/// Horizontal line spanning a fraction of the available width.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalRule {
    width_fraction: f32,
    thickness: f32,
    color: Color,
    space_before: f32,
    space_after: f32,
    width: f32,
}

impl HorizontalRule {
    /// Rule of `width_fraction` (0.0-1.0) of the frame width, 1pt space above and below.
    pub fn new(width_fraction: f32, thickness: f32, color: Color) -> Self {
        Self {
            width_fraction,
            thickness,
            color,
            space_before: 1.0,
            space_after: 1.0,
            width: 0.0,
        }
    }
}

impl Flowable for HorizontalRule {
    fn wrap(&mut self, avail_width: f32, _avail_height: f32) -> (f32, f32) {
        self.width = avail_width * self.width_fraction;
        (self.width, self.thickness)
    }

    fn draw(&self, canvas: &mut ContentStreamBuilder, x: f32, y: f32) {
        let line_y = y + self.thickness / 2.0;
        canvas
            .stroke_color(self.color)
            .set_line_width(self.thickness)
            .move_to(x, line_y)
            .line_to(x + self.width, line_y)
            .stroke();
    }

    fn space_before(&self) -> f32 {
        self.space_before
    }

    fn space_after(&self) -> f32 {
        self.space_after
    }

    fn h_align(&self) -> HAlign {
        HAlign::Center
    }
}

/// A registered image drawn at a fixed display size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFlowable {
    image: ImageRef,
    width: f32,
    height: f32,
}

impl ImageFlowable {
    /// Draw `image` at `width` x `height` points.
    pub fn new(image: ImageRef, width: f32, height: f32) -> Self {
        Self {
            image,
            width,
            height,
        }
    }
}

impl Flowable for ImageFlowable {
    fn wrap(&mut self, _avail_width: f32, _avail_height: f32) -> (f32, f32) {
        (self.width, self.height)
    }

    fn draw(&self, canvas: &mut ContentStreamBuilder, x: f32, y: f32) {
        canvas.draw_image(&self.image.resource_name, x, y, self.width, self.height);
    }

    fn h_align(&self) -> HAlign {
        HAlign::Center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ContentStreamOp;

    #[test]
    fn test_rule_spans_fraction() {
        let mut rule = HorizontalRule::new(0.9, 1.5, Color::hex(0x009CDE));
        let (w, h) = rule.wrap(400.0, 100.0);
        assert_eq!((w, h), (360.0, 1.5));

        let mut canvas = ContentStreamBuilder::new();
        rule.draw(&mut canvas, 20.0, 10.0);
        assert!(canvas.operations().contains(&ContentStreamOp::LineTo(380.0, 10.75)));
    }

    #[test]
    fn test_image_flowable_size() {
        let image = ImageRef {
            resource_name: "Im1".to_string(),
            width: 10,
            height: 20,
        };
        let mut flowable = ImageFlowable::new(image, 50.0, 100.0);
        assert_eq!(flowable.wrap(400.0, 400.0), (50.0, 100.0));

        let mut canvas = ContentStreamBuilder::new();
        flowable.draw(&mut canvas, 1.0, 2.0);
        assert!(canvas
            .operations()
            .contains(&ContentStreamOp::PaintXObject("Im1".to_string())));
    }

    #[test]
    fn test_spacer_draws_nothing() {
        let mut spacer = Spacer::new(1.0, 25.0);
        assert_eq!(spacer.wrap(400.0, 10.0), (1.0, 25.0));
        let mut canvas = ContentStreamBuilder::new();
        spacer.draw(&mut canvas, 0.0, 0.0);
        assert!(canvas.is_empty());
    }
}
