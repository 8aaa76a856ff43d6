//! Image handling for PDF generation.
//!
//! Images are represented as XObjects (PDF spec Section 8.9). PNG and JPEG
//! sources are decoded to 8-bit samples and stored Flate-compressed; an
//! alpha channel becomes a separate DeviceGray `/SMask` image.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::object::Object;

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
}

impl ColorSpace {
    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
        }
    }
}

/// Decoded image ready for embedding.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space
    pub color_space: ColorSpace,
    /// Flate-compressed samples
    pub data: Vec<u8>,
    /// Flate-compressed alpha channel, if the source had one
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    /// Decode PNG or JPEG bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        use image::GenericImageView;

        let img = image::load_from_memory(data).map_err(|e| Error::Image(e.to_string()))?;
        let (width, height) = img.dimensions();
        let pixel_count = (width as usize) * (height as usize);

        let (color_space, pixels, alpha) = match img.color() {
            image::ColorType::L8 | image::ColorType::L16 => {
                (ColorSpace::DeviceGray, img.to_luma8().into_raw(), None)
            },
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = img.to_luma_alpha8();
                let mut gray = Vec::with_capacity(pixel_count);
                let mut alpha_channel = Vec::with_capacity(pixel_count);
                for pixel in la.pixels() {
                    gray.push(pixel.0[0]);
                    alpha_channel.push(pixel.0[1]);
                }
                (ColorSpace::DeviceGray, gray, Some(alpha_channel))
            },
            color if color.has_alpha() => {
                let rgba = img.to_rgba8();
                let mut rgb = Vec::with_capacity(pixel_count * 3);
                let mut alpha_channel = Vec::with_capacity(pixel_count);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha_channel.push(pixel.0[3]);
                }
                (ColorSpace::DeviceRGB, rgb, Some(alpha_channel))
            },
            _ => (ColorSpace::DeviceRGB, img.to_rgb8().into_raw(), None),
        };

        // A fully opaque alpha channel adds nothing
        let alpha = alpha.filter(|a| a.iter().any(|&v| v != 0xFF));

        Ok(Self {
            width,
            height,
            color_space,
            data: compress_image_data(&pixels)?,
            soft_mask: alpha.map(|a| compress_image_data(&a)).transpose()?,
        })
    }

    /// Load an image from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::Image(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_bytes(&data)
            .map_err(|e| Error::Image(format!("cannot decode {}: {}", path.display(), e)))
    }

    /// Build the image XObject stream.
    ///
    /// `smask` is the reference to this image's soft mask object, if any.
    pub fn to_xobject(&self, smask: Option<Object>) -> Object {
        let mut dict = image_dict(self.width, self.height, self.color_space);
        if let Some(smask) = smask {
            dict.insert("SMask".to_string(), smask);
        }
        Object::Stream {
            dict,
            data: bytes::Bytes::from(self.data.clone()),
        }
    }

    /// Build the soft mask (alpha channel) XObject stream.
    pub fn soft_mask_xobject(&self) -> Option<Object> {
        self.soft_mask.as_ref().map(|mask_data| Object::Stream {
            dict: image_dict(self.width, self.height, ColorSpace::DeviceGray),
            data: bytes::Bytes::from(mask_data.clone()),
        })
    }

    /// Get the aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Scale to fit within a bounding box while keeping the aspect ratio.
    ///
    /// ```
    /// use delivery_certificate::writer::fit_to_box;
    ///
    /// let (w, h) = fit_to_box(400, 100, 170.0, 107.0);
    /// assert!((w - 170.0).abs() < 1e-3);
    /// assert!((h - 42.5).abs() < 1e-3);
    /// ```
    pub fn fit_to_box(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        fit_to_box(self.width, self.height, max_width, max_height)
    }
}

/// `ratio = min(max_width / w, max_height / h)` applied to both sides.
pub fn fit_to_box(width: u32, height: u32, max_width: f32, max_height: f32) -> (f32, f32) {
    let (w, h) = (width as f32, height as f32);
    let ratio = (max_width / w).min(max_height / h);
    (w * ratio, h * ratio)
}

fn image_dict(width: u32, height: u32, color_space: ColorSpace) -> HashMap<String, Object> {
    let mut dict = HashMap::new();
    dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
    dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
    dict.insert("Width".to_string(), Object::Integer(width as i64));
    dict.insert("Height".to_string(), Object::Integer(height as i64));
    dict.insert("ColorSpace".to_string(), Object::Name(color_space.pdf_name().to_string()));
    dict.insert("BitsPerComponent".to_string(), Object::Integer(8));
    dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
    dict
}

/// Compress image samples with Flate.
fn compress_image_data(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_rgb_png_has_no_mask() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 2));
        let data = ImageData::from_bytes(&png_bytes(img)).unwrap();
        assert_eq!((data.width, data.height), (4, 2));
        assert_eq!(data.color_space, ColorSpace::DeviceRGB);
        assert!(data.soft_mask.is_none());
        assert!(data.soft_mask_xobject().is_none());
    }

    #[test]
    fn test_transparent_png_gets_soft_mask() {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            3,
            3,
            image::Rgba([10, 20, 30, 128]),
        ));
        let data = ImageData::from_bytes(&png_bytes(img)).unwrap();
        assert!(data.soft_mask.is_some());

        let xobject = data.to_xobject(Some(Object::Integer(7)));
        let dict = xobject.as_dict().unwrap();
        assert_eq!(dict.get("SMask"), Some(&Object::Integer(7)));
        assert!(dict.get("DecodeParms").is_none());
    }

    #[test]
    fn test_garbage_is_image_error() {
        let err = ImageData::from_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let err = ImageData::from_file("/nonexistent/logo.png").unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }

    #[test]
    fn test_fit_tall_image() {
        let (w, h) = fit_to_box(100, 400, 170.0, 107.0);
        assert!((h - 107.0).abs() < 1e-3);
        assert!((w - 26.75).abs() < 1e-3);
    }
}
