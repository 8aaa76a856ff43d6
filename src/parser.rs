//! PDF object parser.
//!
//! Recursive descent over lexer tokens: primitives, arrays, dictionaries,
//! references and indirect object headers. Streams are recognised by their
//! `/Length` so a stream dictionary can be read back without decoding it.

use crate::error::{Error, Result};
use crate::lexer::{token, Token};
use crate::object::{Object, ObjectRef};
use nom::IResult;
use std::collections::HashMap;

/// Decode escape sequences in PDF literal strings.
///
/// ```
/// # use delivery_certificate::parser::decode_literal_string_escapes;
/// assert_eq!(decode_literal_string_escapes(b"a\\(b\\) \\101"), b"a(b) A");
/// ```
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' || i + 1 >= raw.len() {
            result.push(raw[i]);
            i += 1;
            continue;
        }

        let escaped = raw[i + 1];
        i += 2;
        match escaped {
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'b' => result.push(8),
            b'f' => result.push(12),
            b'(' | b')' | b'\\' => result.push(escaped),
            // Line continuation
            b'\n' => {},
            b'\r' => {
                if raw.get(i) == Some(&b'\n') {
                    i += 1;
                }
            },
            b'0'..=b'7' => {
                let mut octal = (escaped - b'0') as u32;
                let mut digits = 1;
                while digits < 3 && matches!(raw.get(i), Some(b'0'..=b'7')) {
                    octal = octal * 8 + (raw[i] - b'0') as u32;
                    i += 1;
                    digits += 1;
                }
                result.push((octal & 0xFF) as u8);
            },
            other => result.push(other),
        }
    }

    result
}

fn tag_error(input: &[u8]) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))
}

/// Parse a PDF object from input bytes.
///
/// ```
/// use delivery_certificate::parser::parse_object;
///
/// let (_, obj) = parse_object(b"<< /Type /Page /Parent 3 0 R >>").unwrap();
/// assert!(obj.as_dict().is_some());
/// ```
pub fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    let (input, tok) = token(input)?;

    match tok {
        Token::Null => Ok((input, Object::Null)),
        Token::True => Ok((input, Object::Boolean(true))),
        Token::False => Ok((input, Object::Boolean(false))),
        Token::Integer(i) => {
            // `obj gen R` is a reference; anything else is a plain integer
            if let Ok((after_gen, Token::Integer(gen))) = token(input) {
                if let Ok((after_r, Token::R)) = token(after_gen) {
                    return Ok((after_r, Object::Reference(ObjectRef::new(i as u32, gen as u16))));
                }
            }
            Ok((input, Object::Integer(i)))
        },
        Token::Real(r) => Ok((input, Object::Real(r))),
        Token::LiteralString(bytes) => Ok((input, Object::String(decode_literal_string_escapes(bytes)))),
        Token::HexString(hex) => match decode_hex(hex) {
            Ok(decoded) => Ok((input, Object::String(decoded))),
            Err(_) => Err(nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::HexDigit))),
        },
        Token::Name(name) => Ok((input, Object::Name(name))),
        Token::ArrayStart => parse_array(input),
        Token::DictStart => {
            let (remaining, dict) = parse_dictionary(input)?;
            match token(remaining) {
                Ok((stream_input, Token::StreamStart)) => {
                    let (rest, data) = parse_stream_data(stream_input, &dict)?;
                    Ok((
                        rest,
                        Object::Stream {
                            dict,
                            data: bytes::Bytes::copy_from_slice(data),
                        },
                    ))
                },
                _ => Ok((remaining, Object::Dictionary(dict))),
            }
        },
        _ => Err(tag_error(input)),
    }
}

/// Read `/Length` bytes after the `stream` keyword's end-of-line marker.
fn parse_stream_data<'a>(
    input: &'a [u8],
    dict: &HashMap<String, Object>,
) -> IResult<&'a [u8], &'a [u8]> {
    let input = input
        .strip_prefix(b"\r\n")
        .or_else(|| input.strip_prefix(b"\n"))
        .unwrap_or(input);

    let length = dict
        .get("Length")
        .and_then(Object::as_integer)
        .filter(|&len| len >= 0 && (len as usize) <= input.len())
        .ok_or_else(|| tag_error(input))? as usize;

    let (data, rest) = input.split_at(length);
    match token(rest) {
        Ok((after, Token::StreamEnd)) => Ok((after, data)),
        _ => Err(tag_error(rest)),
    }
}

fn parse_array(mut input: &[u8]) -> IResult<&[u8], Object> {
    let mut objects = Vec::new();
    loop {
        if let Ok((rest, Token::ArrayEnd)) = token(input) {
            return Ok((rest, Object::Array(objects)));
        }
        let (rest, obj) = parse_object(input)?;
        objects.push(obj);
        input = rest;
    }
}

fn parse_dictionary(mut input: &[u8]) -> IResult<&[u8], HashMap<String, Object>> {
    let mut dict = HashMap::new();
    loop {
        let (rest, tok) = token(input)?;
        match tok {
            Token::DictEnd => return Ok((rest, dict)),
            Token::Name(key) => {
                let (rest, value) = parse_object(rest)?;
                dict.insert(key, value);
                input = rest;
            },
            _ => return Err(tag_error(input)),
        }
    }
}

/// Parse an indirect object definition: `{id} {gen} obj {object} endobj`.
pub fn parse_indirect_object(input: &[u8]) -> IResult<&[u8], (ObjectRef, Object)> {
    let (input, id) = match token(input)? {
        (rest, Token::Integer(id)) => (rest, id),
        _ => return Err(tag_error(input)),
    };
    let (input, gen) = match token(input)? {
        (rest, Token::Integer(gen)) => (rest, gen),
        _ => return Err(tag_error(input)),
    };
    let (input, _) = match token(input)? {
        (rest, Token::ObjStart) => (rest, ()),
        _ => return Err(tag_error(input)),
    };
    let (input, object) = parse_object(input)?;
    let input = match token(input) {
        Ok((rest, Token::ObjEnd)) => rest,
        _ => input,
    };
    Ok((input, (ObjectRef::new(id as u32, gen as u16), object)))
}

/// Parse the indirect object that starts at `offset` in `data`.
pub fn parse_indirect_object_at(data: &[u8], offset: usize) -> Result<(ObjectRef, Object)> {
    let slice = data.get(offset..).ok_or_else(|| Error::ParseError {
        offset,
        reason: "object offset beyond end of file".to_string(),
    })?;

    parse_indirect_object(slice)
        .map(|(_, parsed)| parsed)
        .map_err(|e| {
            let reason = match e {
                nom::Err::Error(inner) | nom::Err::Failure(inner) => {
                    format!("malformed indirect object ({:?})", inner.code)
                },
                nom::Err::Incomplete(_) => "truncated indirect object".to_string(),
            };
            Error::ParseError { offset, reason }
        })
}

/// Decode a hex string to bytes; an odd trailing digit is padded with 0.
///
/// ```
/// use delivery_certificate::parser::decode_hex;
///
/// assert_eq!(decode_hex(b"48656C6C6F").unwrap(), b"Hello");
/// ```
pub fn decode_hex(hex_bytes: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = hex_bytes
        .iter()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|&c| match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(Error::ParseError {
                offset: 0,
                reason: format!("invalid hex digit {:?}", c as char),
            }),
        })
        .collect::<Result<_>>()?;

    Ok(digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_vs_integers() {
        let (_, obj) = parse_object(b"12 0 R").unwrap();
        assert_eq!(obj, Object::Reference(ObjectRef::new(12, 0)));

        let (_, obj) = parse_object(b"[1 2 3]").unwrap();
        assert_eq!(
            obj,
            Object::Array(vec![Object::Integer(1), Object::Integer(2), Object::Integer(3)])
        );
    }

    #[test]
    fn test_parse_nested_dictionary() {
        let input = b"<< /Type /Catalog /Pages 2 0 R /Names << /Dests 9 0 R >> >>";
        let (_, obj) = parse_object(input).unwrap();
        let dict = obj.as_dict().unwrap();
        assert_eq!(dict.get("Type").and_then(Object::as_name), Some("Catalog"));
        assert_eq!(
            dict.get("Pages").and_then(Object::as_reference),
            Some(ObjectRef::new(2, 0))
        );
        assert!(dict.get("Names").and_then(Object::as_dict).is_some());
    }

    #[test]
    fn test_parse_stream() {
        let input = b"<< /Length 5 >>\nstream\nq 1 Q\nendstream";
        let (_, obj) = parse_object(input).unwrap();
        match obj {
            Object::Stream { data, .. } => assert_eq!(&data[..], b"q 1 Q"),
            other => panic!("expected stream, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_parse_indirect_object_at_offset() {
        let data = b"%PDF-1.4\n3 0 obj\n<< /Type /Page >>\nendobj\n";
        let (reference, obj) = parse_indirect_object_at(data, 9).unwrap();
        assert_eq!(reference, ObjectRef::new(3, 0));
        assert_eq!(obj.as_dict().unwrap().get("Type").and_then(Object::as_name), Some("Page"));
    }

    #[test]
    fn test_parse_indirect_object_bad_offset() {
        let err = parse_indirect_object_at(b"xx", 10).unwrap_err();
        assert!(matches!(err, Error::ParseError { offset: 10, .. }));
    }

    #[test]
    fn test_decode_hex_odd_length() {
        assert_eq!(decode_hex(b"4 8 6").unwrap(), vec![0x48, 0x60]);
        assert!(decode_hex(b"4G").is_err());
    }

    #[test]
    fn test_literal_escapes() {
        assert_eq!(decode_literal_string_escapes(b"a\\nb"), b"a\nb");
        assert_eq!(decode_literal_string_escapes(b"\\351"), vec![0xE9]);
    }
}
