//! Base-14 font metrics for PDF generation.
//!
//! The certificate is set entirely in the Helvetica family, which every
//! conforming reader ships, so no font program is embedded. Text is encoded
//! with WinAnsiEncoding and measured with the standard AFM advance widths
//! (units of 1/1000 em).

/// Helvetica family members used by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Base14Font {
    /// Helvetica
    Helvetica,
    /// Helvetica-Bold
    HelveticaBold,
    /// Helvetica-Oblique
    HelveticaOblique,
    /// Helvetica-BoldOblique
    HelveticaBoldOblique,
}

/// Ascender of the Helvetica family (1/1000 em).
pub const HELVETICA_ASCENT: f32 = 718.0;
/// Descender of the Helvetica family (1/1000 em).
pub const HELVETICA_DESCENT: f32 = -207.0;

impl Base14Font {
    /// Every font in resource-name order.
    pub const ALL: [Base14Font; 4] = [
        Base14Font::Helvetica,
        Base14Font::HelveticaBold,
        Base14Font::HelveticaOblique,
        Base14Font::HelveticaBoldOblique,
    ];

    /// Pick the family member for a bold/italic combination.
    pub fn select(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Base14Font::Helvetica,
            (true, false) => Base14Font::HelveticaBold,
            (false, true) => Base14Font::HelveticaOblique,
            (true, true) => Base14Font::HelveticaBoldOblique,
        }
    }

    /// PostScript name written as `/BaseFont`.
    pub fn base_font(self) -> &'static str {
        match self {
            Base14Font::Helvetica => "Helvetica",
            Base14Font::HelveticaBold => "Helvetica-Bold",
            Base14Font::HelveticaOblique => "Helvetica-Oblique",
            Base14Font::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Key under `/Resources /Font` used by `Tf`.
    pub fn resource_name(self) -> &'static str {
        match self {
            Base14Font::Helvetica => "F1",
            Base14Font::HelveticaBold => "F2",
            Base14Font::HelveticaOblique => "F3",
            Base14Font::HelveticaBoldOblique => "F4",
        }
    }

    /// Whether this is one of the bold faces.
    pub fn is_bold(self) -> bool {
        matches!(self, Base14Font::HelveticaBold | Base14Font::HelveticaBoldOblique)
    }

    /// Advance width of a WinAnsi code in 1/1000 em.
    ///
    /// Oblique faces share the widths of their upright counterparts.
    pub fn code_width(self, code: u8) -> u16 {
        let bold = self.is_bold();
        match code {
            32..=126 => {
                let table = if bold { &HELVETICA_BOLD_ASCII } else { &HELVETICA_ASCII };
                table[(code - 32) as usize]
            },
            0x80..=0x9F => punctuation_width(code, bold),
            0xA0..=0xBF => latin1_symbol_width(code, bold),
            0xC0..=0xFF => match ACCENTED_BASE[(code - 0xC0) as usize] {
                b'*' => accented_special_width(code),
                base => self.code_width(base),
            },
            _ => 0,
        }
    }

    /// Width of `text` in points at `size`.
    ///
    /// ```
    /// use delivery_certificate::writer::Base14Font;
    ///
    /// let w = Base14Font::Helvetica.text_width("DocID: ", 12.0);
    /// assert!((w - 40.008).abs() < 1e-3);
    /// ```
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        self.encoded_width(&encode_win_ansi(text), size)
    }

    /// Width of already encoded bytes in points at `size`.
    pub fn encoded_width(self, encoded: &[u8], size: f32) -> f32 {
        let units: u32 = encoded.iter().map(|&c| self.code_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }
}

/// Encode text as WinAnsiEncoding bytes.
///
/// Latin-1 maps straight through; the typographic punctuation WinAnsi keeps
/// in 0x80-0x9F is remapped; anything else becomes `?`.
///
/// ```
/// use delivery_certificate::writer::encode_win_ansi;
///
/// assert_eq!(encode_win_ansi("Título"), b"T\xEDtulo");
/// assert_eq!(encode_win_ansi("• €"), b"\x95 \x80");
/// assert_eq!(encode_win_ansi("→"), b"?");
/// ```
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            cp @ 0x00..=0x7F => cp as u8,
            cp @ 0xA0..=0xFF => cp as u8,
            _ => win_ansi_punctuation(ch).unwrap_or(b'?'),
        })
        .collect()
}

fn win_ansi_punctuation(ch: char) -> Option<u8> {
    let code = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Accented letters 0xC0-0xFF measure like their base letter; `*` marks
/// codes with their own width.
const ACCENTED_BASE: &[u8; 64] =
    b"AAAAAA*CEEEEIIIIDNOOOOO*OUUUUYP*aaaaaa*ceeee****onooooo**uuuuypy";

fn accented_special_width(code: u8) -> u16 {
    match code {
        0xC6 => 1000,
        0xD7 | 0xF7 => 584,
        0xDF | 0xF8 => 611,
        0xE6 => 889,
        _ => 278,
    }
}

fn latin1_symbol_width(code: u8, bold: bool) -> u16 {
    match code {
        0xA0 => 278,
        0xA1 | 0xA8 | 0xAD | 0xAF | 0xB2..=0xB4 | 0xB8 | 0xB9 => 333,
        0xA2..=0xA5 | 0xA7 | 0xAB | 0xBB => 556,
        0xA6 => {
            if bold {
                280
            } else {
                260
            }
        },
        0xA9 | 0xAE => 737,
        0xAA => 370,
        0xAC | 0xB1 => 584,
        0xB0 => 400,
        0xB5 => {
            if bold {
                611
            } else {
                556
            }
        },
        0xB6 => {
            if bold {
                556
            } else {
                537
            }
        },
        0xB7 => 278,
        0xBA => 365,
        0xBC..=0xBE => 834,
        _ => 611,
    }
}

fn punctuation_width(code: u8, bold: bool) -> u16 {
    let (regular, heavy) = match code {
        0x80 | 0x83 | 0x86 | 0x87 | 0x96 => (556, 556),
        0x82 | 0x91 | 0x92 => (222, 278),
        0x84 | 0x93 | 0x94 => (333, 500),
        0x85 | 0x89 | 0x8C | 0x97 | 0x99 => (1000, 1000),
        0x88 | 0x8B | 0x98 | 0x9B => (333, 333),
        0x8A | 0x9F => (667, 667),
        0x8E => (611, 611),
        0x95 => (350, 350),
        0x9A => (500, 556),
        0x9C => (944, 944),
        0x9E => (500, 500),
        _ => (0, 0),
    };
    if bold {
        heavy
    } else {
        regular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_and_names() {
        assert_eq!(Base14Font::select(true, false), Base14Font::HelveticaBold);
        assert_eq!(Base14Font::select(false, true).base_font(), "Helvetica-Oblique");
        assert_eq!(Base14Font::HelveticaBoldOblique.resource_name(), "F4");
    }

    #[test]
    fn test_ascii_widths() {
        assert_eq!(Base14Font::Helvetica.code_width(b' '), 278);
        assert_eq!(Base14Font::Helvetica.code_width(b'W'), 944);
        assert_eq!(Base14Font::Helvetica.code_width(b'i'), 222);
        assert_eq!(Base14Font::HelveticaBold.code_width(b'i'), 278);
        assert_eq!(Base14Font::HelveticaOblique.code_width(b'~'), 584);
    }

    #[test]
    fn test_accented_widths_follow_base_letter() {
        let regular = Base14Font::Helvetica;
        assert_eq!(regular.code_width(0xC1), regular.code_width(b'A'));
        assert_eq!(regular.code_width(0xF3), regular.code_width(b'o'));
        assert_eq!(regular.code_width(0xF1), regular.code_width(b'n'));
        // iacute is wider than the dotted i
        assert_eq!(regular.code_width(0xED), 278);
        assert_eq!(regular.code_width(0xDF), 611);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w12 = Base14Font::Helvetica.text_width("abc", 12.0);
        let w24 = Base14Font::Helvetica.text_width("abc", 24.0);
        assert!((w24 - 2.0 * w12).abs() < 1e-4);
        assert!((w12 - (556.0 + 556.0 + 500.0) * 0.012).abs() < 1e-4);
    }

    #[test]
    fn test_encode_replaces_unmappable() {
        assert_eq!(encode_win_ansi("a\u{4E2D}b"), b"a?b");
        assert_eq!(encode_win_ansi("ÁÉÍÓÚÑ"), vec![0xC1, 0xC9, 0xCD, 0xD3, 0xDA, 0xD1]);
        assert_eq!(encode_win_ansi("“x”"), vec![0x93, b'x', 0x94]);
    }
}
