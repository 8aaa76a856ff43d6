//! Cross-reference table reader.
//!
//! Maps object numbers to byte offsets so the signer can locate the catalog
//! and the first page of an existing document. Only classic `xref` tables
//! are read; a document whose `startxref` points at a cross-reference stream
//! is reported as unsupported.

use crate::error::{Error, Result};
use crate::object::Object;
use crate::parser::parse_object;
use std::collections::HashMap;

/// Cross-reference table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    /// Byte offset of the object definition
    pub offset: u64,
    /// Generation number
    pub generation: u16,
    /// Whether the object is in use (`n`) or free (`f`)
    pub in_use: bool,
}

/// Cross-reference table that maps object numbers to their locations.
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: HashMap<u32, XRefEntry>,
    trailer: HashMap<String, Object>,
}

impl CrossRefTable {
    /// Trailer dictionary of the newest section.
    pub fn trailer(&self) -> &HashMap<String, Object> {
        &self.trailer
    }

    /// Get an in-use entry by object number.
    pub fn get(&self, object_number: u32) -> Option<&XRefEntry> {
        self.entries.get(&object_number).filter(|e| e.in_use)
    }

    /// Highest object number mentioned by any section.
    pub fn max_object_number(&self) -> u32 {
        self.entries.keys().copied().max().unwrap_or(0)
    }

    /// Get the number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in `self` win over those in `older` (incremental updates).
    fn merge_older(&mut self, older: CrossRefTable) {
        for (obj_num, entry) in older.entries {
            self.entries.entry(obj_num).or_insert(entry);
        }
    }
}

fn find_last(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

fn find_first(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Find the byte offset named by the last `startxref` keyword.
pub fn find_xref_offset(data: &[u8]) -> Result<u64> {
    let tail_start = data.len().saturating_sub(2048);
    let tail = &data[tail_start..];

    let keyword = find_last(tail, b"startxref")
        .ok_or_else(|| Error::InvalidPdf("startxref not found".to_string()))?;

    let digits: String = tail[keyword + b"startxref".len()..]
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();

    digits
        .parse()
        .map_err(|_| Error::InvalidPdf("startxref is not followed by an offset".to_string()))
}

/// Parse the cross-reference table at `offset`, following `/Prev` links.
pub fn parse_xref(data: &[u8], offset: u64) -> Result<CrossRefTable> {
    parse_xref_recursive(data, offset, 0)
}

fn parse_xref_recursive(data: &[u8], offset: u64, depth: u32) -> Result<CrossRefTable> {
    if depth > 100 {
        return Err(Error::InvalidPdf("xref /Prev chain depth exceeded 100".to_string()));
    }

    let start = usize::try_from(offset)
        .ok()
        .filter(|&o| o < data.len())
        .ok_or_else(|| Error::InvalidPdf(format!("xref offset {} beyond end of file", offset)))?;

    let section = &data[start..];
    let leading_ws = section.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let section = &section[leading_ws..];

    if !section.starts_with(b"xref") {
        if section.first().is_some_and(u8::is_ascii_digit) {
            return Err(Error::Unsupported(
                "documents with cross-reference streams cannot be signed".to_string(),
            ));
        }
        return Err(Error::InvalidPdf(format!("no xref table at offset {}", offset)));
    }

    log::debug!("Parsing xref table at offset {}", offset);
    let mut xref = parse_traditional_xref(section, start + leading_ws)?;

    if let Some(prev) = xref.trailer.get("Prev").and_then(Object::as_integer) {
        let older = parse_xref_recursive(data, prev as u64, depth + 1)?;
        xref.merge_older(older);
    }

    Ok(xref)
}

/// Parse `xref`, its subsections and the following `trailer` dictionary.
fn parse_traditional_xref(section: &[u8], absolute: usize) -> Result<CrossRefTable> {
    let trailer_pos = find_first(section, b"trailer")
        .ok_or_else(|| Error::InvalidPdf(format!("xref at {} has no trailer", absolute)))?;

    let table_text = String::from_utf8_lossy(&section[b"xref".len()..trailer_pos]);
    let mut words = table_text.split_whitespace();
    let mut xref = CrossRefTable::default();

    let bad_entry = || Error::ParseError {
        offset: absolute,
        reason: "malformed xref subsection".to_string(),
    };

    while let Some(first) = words.next() {
        let start_obj: u32 = first.parse().map_err(|_| bad_entry())?;
        let count: u32 = words.next().and_then(|w| w.parse().ok()).ok_or_else(bad_entry)?;

        for i in 0..count {
            let entry_offset: u64 = words.next().and_then(|w| w.parse().ok()).ok_or_else(bad_entry)?;
            let generation: u16 = words.next().and_then(|w| w.parse().ok()).ok_or_else(bad_entry)?;
            let in_use = match words.next() {
                Some("n") => true,
                Some("f") => false,
                _ => return Err(bad_entry()),
            };
            xref.entries.insert(
                start_obj + i,
                XRefEntry {
                    offset: entry_offset,
                    generation,
                    in_use,
                },
            );
        }
    }

    let (_, trailer) = parse_object(&section[trailer_pos + b"trailer".len()..]).map_err(|_| {
        Error::ParseError {
            offset: absolute + trailer_pos,
            reason: "malformed trailer dictionary".to_string(),
        }
    })?;

    xref.trailer = match trailer {
        Object::Dictionary(dict) => dict,
        other => {
            return Err(Error::InvalidPdf(format!("trailer is a {}, not a dictionary", other.type_name())))
        },
    };

    Ok(xref)
}
