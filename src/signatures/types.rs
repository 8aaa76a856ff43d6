//! Signature options and appearance.

use crate::geometry::Rect;
use chrono::{DateTime, FixedOffset, Local};

/// Name of the signature form field.
pub const SIGNATURE_FIELD_NAME: &str = "signature";

/// `/Filter` of the signature dictionary.
pub const SIGNATURE_FILTER: &str = "Adobe.PPKLite";

/// `/SubFilter` of the signature dictionary (detached PKCS#7/CMS).
pub const SIGNATURE_SUB_FILTER: &str = "adbe.pkcs7.detached";

/// Bytes reserved for the DER-encoded CMS signature.
pub const DEFAULT_SIGNATURE_SIZE: usize = 8192;

/// Visible signature widget on the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureAppearance {
    /// Widget rectangle in page space
    pub rect: Rect,
    /// Font size of the two appearance lines
    pub font_size: f32,
}

impl Default for SignatureAppearance {
    fn default() -> Self {
        Self {
            rect: Rect::from_points(346.0, 80.0, 496.0, 98.0),
            font_size: 7.0,
        }
    }
}

/// Options for signing a PDF.
#[derive(Debug, Clone)]
pub struct SignOptions {
    /// Form field name
    pub field_name: String,
    /// Visible widget; `None` signs with an invisible `[0 0 0 0]` widget
    pub appearance: Option<SignatureAppearance>,
    /// Estimated signature size in bytes (for ByteRange calculation)
    pub estimated_size: usize,
    /// Time written to `/M` and the appearance
    pub signing_time: DateTime<FixedOffset>,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            field_name: SIGNATURE_FIELD_NAME.to_string(),
            appearance: None,
            estimated_size: DEFAULT_SIGNATURE_SIZE,
            signing_time: Local::now().fixed_offset(),
        }
    }
}

impl SignOptions {
    /// Show or hide the signature widget.
    pub fn with_signature_info(mut self, show: bool) -> Self {
        self.appearance = show.then(SignatureAppearance::default);
        self
    }

    /// Set a custom visible appearance.
    pub fn with_appearance(mut self, appearance: SignatureAppearance) -> Self {
        self.appearance = Some(appearance);
        self
    }

    /// Set the signing time.
    pub fn with_signing_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.signing_time = time;
        self
    }

    /// Widget rectangle: the appearance rect, or an empty one when invisible.
    pub fn widget_rect(&self) -> Rect {
        self.appearance
            .as_ref()
            .map(|a| a.rect)
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_options_default() {
        let opts = SignOptions::default();
        assert_eq!(opts.field_name, "signature");
        assert_eq!(opts.estimated_size, 8192);
        assert!(opts.appearance.is_none());
        assert_eq!(opts.widget_rect().to_corners(), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_visible_widget_rect() {
        let opts = SignOptions::default().with_signature_info(true);
        assert_eq!(opts.widget_rect().to_corners(), [346.0, 80.0, 496.0, 98.0]);
        let opts = opts.with_signature_info(false);
        assert!(opts.appearance.is_none());
    }
}
