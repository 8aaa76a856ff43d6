//! Geometric primitives and page units.
//!
//! All coordinates are PDF user-space points with the origin at the
//! bottom-left corner of the page.

/// One centimetre in points.
pub const CM: f32 = 72.0 / 2.54;

/// A4 portrait page size in points (210 x 297 mm).
pub const A4: (f32, f32) = (595.2756, 841.8898);

/// Convert centimetres to points.
pub fn cm(value: f32) -> f32 {
    value * CM
}

/// A rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the lower-left corner
    pub x: f32,
    /// Y coordinate of the lower-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// ```
    /// use delivery_certificate::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.right(), 100.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from lower-left and upper-right corners.
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// `[llx lly urx ury]`, the form used by `/Rect` and `/BBox`.
    pub fn to_corners(&self) -> [f32; 4] {
        [self.x, self.y, self.right(), self.top()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cm_conversion() {
        assert!((cm(2.54) - 72.0).abs() < 1e-4);
        assert!((cm(21.0) - A4.0).abs() < 1e-2);
        assert!((cm(29.7) - A4.1).abs() < 1e-2);
    }

    #[test]
    fn test_from_points_normalizes() {
        let r = Rect::from_points(496.0, 98.0, 346.0, 80.0);
        assert_eq!(r.to_corners(), [346.0, 80.0, 496.0, 98.0]);
        assert_eq!(r.width, 150.0);
    }
}
