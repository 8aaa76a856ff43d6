//! ByteRange bookkeeping for detached signatures.
//!
//! The signature dictionary is written with two fixed-width placeholders:
//! `/ByteRange` and the hex `/Contents` string. Once the whole update is
//! assembled the real ranges are written over the first placeholder, the
//! covered bytes are signed, and the CMS blob is written over the second.
//!
//! ## ByteRange Format
//!
//! `[0 before_contents after_contents remaining]`, covering everything
//! except the `<...>` contents string.

use crate::error::{Error, Result};

/// `/ByteRange` value written before the offsets are known.
///
/// Each number has room for ten digits, which covers files below 10 GB.
pub const BYTE_RANGE_PLACEHOLDER: &str = "[0 0000000000 0000000000 0000000000]";

/// Calculator for PDF signature byte ranges.
#[derive(Debug, Clone)]
pub struct ByteRangeCalculator {
    /// Size of the `/Contents` value (hex digits + 2 for angle brackets)
    placeholder_size: usize,
}

impl ByteRangeCalculator {
    /// Reserve room for a DER signature of `estimated_signature_size` bytes.
    ///
    /// The placeholder is `(signature_size * 2) + 2` characters: each byte
    /// becomes two hex digits and the string is enclosed in `<` and `>`.
    pub fn new(estimated_signature_size: usize) -> Self {
        Self {
            placeholder_size: estimated_signature_size * 2 + 2,
        }
    }

    /// Get the placeholder size (for the /Contents value).
    pub fn placeholder_size(&self) -> usize {
        self.placeholder_size
    }

    /// `<000...000>` filling the whole placeholder.
    pub fn generate_placeholder(&self) -> String {
        format!("<{}>", "0".repeat(self.placeholder_size - 2))
    }

    /// ByteRange for a file of `file_size` bytes whose `/Contents` string
    /// starts (at its `<`) at `contents_offset`.
    pub fn calculate_byte_range(&self, file_size: usize, contents_offset: usize) -> [usize; 4] {
        let after_contents = contents_offset + self.placeholder_size;
        [0, contents_offset, after_contents, file_size - after_contents]
    }

    /// Format a ByteRange, space-padded to the width of [`BYTE_RANGE_PLACEHOLDER`].
    pub fn format_byte_range(byte_range: &[usize; 4]) -> Result<String> {
        let formatted = format!(
            "[{} {} {} {}]",
            byte_range[0], byte_range[1], byte_range[2], byte_range[3]
        );
        if formatted.len() > BYTE_RANGE_PLACEHOLDER.len() {
            return Err(Error::Signature(format!(
                "ByteRange {} does not fit its placeholder",
                formatted
            )));
        }
        Ok(format!("{:<width$}", formatted, width = BYTE_RANGE_PLACEHOLDER.len()))
    }

    /// Concatenation of the two covered spans.
    pub fn extract_signed_bytes(pdf_data: &[u8], byte_range: &[usize; 4]) -> Result<Vec<u8>> {
        let [offset1, length1, offset2, length2] = *byte_range;

        if offset1 + length1 > pdf_data.len() || offset2 + length2 > pdf_data.len() {
            return Err(Error::Signature(format!(
                "ByteRange {:?} exceeds file size {}",
                byte_range,
                pdf_data.len()
            )));
        }

        let mut signed_bytes = Vec::with_capacity(length1 + length2);
        signed_bytes.extend_from_slice(&pdf_data[offset1..offset1 + length1]);
        signed_bytes.extend_from_slice(&pdf_data[offset2..offset2 + length2]);
        Ok(signed_bytes)
    }

    /// Check that a ByteRange starts at 0, ends at the file end and only
    /// skips the contents string.
    pub fn validate_byte_range(byte_range: &[usize; 4], file_size: usize) -> Result<()> {
        let [offset1, length1, offset2, length2] = *byte_range;

        if offset1 != 0 {
            return Err(Error::Signature(format!("ByteRange must start at 0, got {}", offset1)));
        }
        if offset2 + length2 != file_size {
            return Err(Error::Signature(format!(
                "ByteRange must end at file size {}, got {}",
                file_size,
                offset2 + length2
            )));
        }
        if length1 > offset2 {
            return Err(Error::Signature(format!(
                "ByteRange first range ({}) overlaps with second range start ({})",
                length1, offset2
            )));
        }
        Ok(())
    }

    /// Write the hex-encoded `signature` over the placeholder at
    /// `contents_offset`, zero-padding the rest.
    pub fn insert_signature(&self, pdf_data: &mut [u8], contents_offset: usize, signature: &[u8]) -> Result<()> {
        let hex = bytes_to_hex(signature);
        if hex.len() + 2 > self.placeholder_size {
            return Err(Error::Signature(format!(
                "Signature ({} bytes) exceeds placeholder size ({} bytes)",
                signature.len(),
                (self.placeholder_size - 2) / 2
            )));
        }

        let end = contents_offset + self.placeholder_size;
        let slot = pdf_data
            .get_mut(contents_offset..end)
            .ok_or_else(|| Error::Signature("Signature insertion would exceed file bounds".to_string()))?;
        if slot.first() != Some(&b'<') || slot.last() != Some(&b'>') {
            return Err(Error::Signature(format!(
                "No /Contents placeholder at offset {}",
                contents_offset
            )));
        }

        slot[1..1 + hex.len()].copy_from_slice(hex.as_bytes());
        Ok(())
    }
}

impl Default for ByteRangeCalculator {
    fn default() -> Self {
        Self::new(super::types::DEFAULT_SIGNATURE_SIZE)
    }
}

/// Convert bytes to uppercase hex string.
fn bytes_to_hex(bytes: &[u8]) -> String {
    const HEX_CHARS: &[u8] = b"0123456789ABCDEF";
    let mut hex = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
        hex.push(HEX_CHARS[(byte & 0x0F) as usize] as char);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_placeholder_size() {
        assert_eq!(ByteRangeCalculator::default().placeholder_size(), 16386);
    }

    #[test]
    fn test_generate_placeholder() {
        let calc = ByteRangeCalculator::new(4);
        assert_eq!(calc.generate_placeholder(), "<00000000>");
    }

    #[test]
    fn test_calculate_byte_range() {
        let calc = ByteRangeCalculator::new(49);
        assert_eq!(calc.calculate_byte_range(1000, 400), [0, 400, 500, 500]);
    }

    #[test]
    fn test_format_byte_range_padded() {
        let formatted = ByteRangeCalculator::format_byte_range(&[0, 100, 200, 300]).unwrap();
        assert_eq!(formatted.len(), BYTE_RANGE_PLACEHOLDER.len());
        assert_eq!(formatted.trim_end(), "[0 100 200 300]");
    }

    #[test]
    fn test_extract_signed_bytes() {
        let signed = ByteRangeCalculator::extract_signed_bytes(b"AAABBBCCC", &[0, 3, 6, 3]).unwrap();
        assert_eq!(signed, b"AAACCC");
        assert!(ByteRangeCalculator::extract_signed_bytes(b"AAA", &[0, 3, 6, 3]).is_err());
    }

    #[test]
    fn test_validate_byte_range() {
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 100, 150, 50], 200).is_ok());
        assert!(ByteRangeCalculator::validate_byte_range(&[10, 100, 150, 50], 200).is_err());
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 100, 150, 100], 200).is_err());
    }

    #[test]
    fn test_insert_signature() {
        let calc = ByteRangeCalculator::new(4);
        let mut pdf_data = b"XX<00000000>YY".to_vec();
        calc.insert_signature(&mut pdf_data, 2, &[0xAB, 0xCD]).unwrap();
        assert_eq!(&pdf_data, b"XX<ABCD0000>YY");
    }

    #[test]
    fn test_insert_signature_too_large() {
        let calc = ByteRangeCalculator::new(4);
        let mut pdf_data = b"XX<00000000>YY".to_vec();
        let result = calc.insert_signature(&mut pdf_data, 2, &[1, 2, 3, 4, 5]);
        assert!(matches!(result, Err(Error::Signature(_))));
    }
}
