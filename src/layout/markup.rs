//! Inline paragraph markup.
//!
//! Paragraph text uses a small subset of XML-like markup: `<b>`, `<i>`,
//! `<u>`, `<br/>` and the entities `&amp;`, `&lt;`, `&gt;`, `&quot;`.
//! Unknown tags are kept as literal text. Values that come from the caller
//! must go through [`escape_markup`] before being interpolated.

use regex::Regex;
use std::sync::OnceLock;

/// Inline style flags of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineStyle {
    /// Inside `<b>`
    pub bold: bool,
    /// Inside `<i>`
    pub italic: bool,
    /// Inside `<u>`
    pub underline: bool,
}

/// A piece of parsed markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Text with its style; entities already decoded
    Text(InlineStyle, String),
    /// Forced line break (`<br/>`)
    LineBreak,
}

static TAG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn tag_regex() -> Option<&'static Regex> {
    TAG_REGEX
        .get_or_init(|| Regex::new(r"<(/?)([biu])>|<br\s*/?>").ok())
        .as_ref()
}

/// Escape text so it is shown literally inside markup.
///
/// ```
/// use delivery_certificate::layout::escape_markup;
///
/// assert_eq!(escape_markup("R&D <S.L.>"), "R&amp;D &lt;S.L.&gt;");
/// ```
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[derive(Default)]
struct Depths {
    bold: u32,
    italic: u32,
    underline: u32,
}

impl Depths {
    fn style(&self) -> InlineStyle {
        InlineStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
        }
    }

    fn counter(&mut self, tag: &str) -> &mut u32 {
        match tag {
            "b" => &mut self.bold,
            "i" => &mut self.italic,
            _ => &mut self.underline,
        }
    }
}

/// Parse markup into styled runs and line breaks.
///
/// ```
/// use delivery_certificate::layout::{parse_markup, Inline};
///
/// let runs = parse_markup("a <b>b</b><br/>c");
/// assert_eq!(runs.len(), 4);
/// assert_eq!(runs[2], Inline::LineBreak);
/// ```
pub fn parse_markup(markup: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut depths = Depths::default();
    let mut last = 0;

    let push_text = |out: &mut Vec<Inline>, style: InlineStyle, raw: &str| {
        if !raw.is_empty() {
            out.push(Inline::Text(style, decode_entities(raw)));
        }
    };

    if let Some(re) = tag_regex() {
        for caps in re.captures_iter(markup) {
            let Some(whole) = caps.get(0) else { continue };
            push_text(&mut out, depths.style(), &markup[last..whole.start()]);
            last = whole.end();

            match caps.get(2) {
                Some(tag) => {
                    let counter = depths.counter(tag.as_str());
                    if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
                        *counter = counter.saturating_sub(1);
                    } else {
                        *counter += 1;
                    }
                },
                None => out.push(Inline::LineBreak),
            }
        }
    }

    push_text(&mut out, depths.style(), &markup[last..]);
    out
}
