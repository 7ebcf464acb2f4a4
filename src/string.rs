//! Decoded string storage.
//!
//! Strings are held in modified UTF-8: code point 0 is stored as the overlong
//! pair `0xC0 0x80`, so the storage never contains a zero byte and always ends
//! with a single NUL terminator. [`JsonString::len`] reports the logical
//! decoded length, counting each overlong pair as one byte.

use crate::classify::{hex_value, is_backslash};
use std::fmt;

const OVERLONG_NUL: [u8; 2] = [0xc0, 0x80];

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonString {
    // modified UTF-8 followed by one terminating NUL
    bytes: Vec<u8>,
}

impl JsonString {
    /// Builds a string from decoded bytes. Zero bytes are stored overlong.
    pub fn new(value: impl AsRef<[u8]>) -> Self {
        let value = value.as_ref();
        let mut bytes = Vec::with_capacity(value.len() + 1);
        for &b in value {
            if b == 0 {
                bytes.extend_from_slice(&OVERLONG_NUL);
            } else {
                bytes.push(b);
            }
        }
        bytes.push(0);
        Self { bytes }
    }

    /// Decodes the raw text found between the quotes of a string literal.
    ///
    /// Escapes must already have been validated; a malformed `\u` sequence or
    /// a dangling backslash yields `None`.
    pub(crate) fn unescape(raw: &[u8]) -> Option<Self> {
        let mut bytes = Vec::with_capacity(raw.len() + 1);
        let mut read = 0;
        while read < raw.len() {
            let b = raw[read];
            if !is_backslash(b) {
                bytes.push(b);
                read += 1;
                continue;
            }
            let escaped = *raw.get(read + 1)?;
            read += 2;
            match escaped {
                b'n' => bytes.push(b'\n'),
                b'r' => bytes.push(b'\r'),
                b't' => bytes.push(b'\t'),
                b'b' => bytes.push(0x08),
                b'f' => bytes.push(0x0c),
                b'"' | b'\\' | b'/' => bytes.push(escaped),
                b'u' => {
                    let digits = raw.get(read..read + 4)?;
                    let mut code_point = 0u16;
                    for &digit in digits {
                        code_point = (code_point << 4) | u16::from(hex_value(digit)?);
                    }
                    encode_code_point(code_point, &mut bytes);
                    read += 4;
                }
                _ => return None,
            }
        }
        bytes.push(0);
        Some(Self { bytes })
    }

    /// Stored bytes without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }

    /// Logical length: overlong NUL pairs count once.
    pub fn len(&self) -> usize {
        let stored = self.as_bytes();
        stored.len() - stored.windows(2).filter(|w| *w == OVERLONG_NUL).count()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.len() == 1
    }

    /// Bytes with every overlong NUL collapsed back to a zero byte.
    pub fn to_decoded(&self) -> Vec<u8> {
        let stored = self.as_bytes();
        let mut out = Vec::with_capacity(stored.len());
        let mut i = 0;
        while i < stored.len() {
            if stored[i..].starts_with(&OVERLONG_NUL) {
                out.push(0);
                i += 2;
            } else {
                out.push(stored[i]);
                i += 1;
            }
        }
        out
    }

    /// The decoded text, if it is valid UTF-8.
    pub fn to_text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.to_decoded())
    }
}

// Code point 0 is deliberately overlong so decoded text never holds a raw NUL.
fn encode_code_point(code_point: u16, out: &mut Vec<u8>) {
    match code_point {
        0 => out.extend_from_slice(&OVERLONG_NUL),
        0x01..=0x7f => out.push(code_point as u8),
        0x80..=0x7ff => {
            out.push(0xc0 | (code_point >> 6) as u8);
            out.push(0x80 | (code_point & 0x3f) as u8);
        }
        _ => {
            out.push(0xe0 | (code_point >> 12) as u8);
            out.push(0x80 | ((code_point >> 6) & 0x3f) as u8);
            out.push(0x80 | (code_point & 0x3f) as u8);
        }
    }
}

impl Default for JsonString {
    fn default() -> Self {
        Self { bytes: vec![0] }
    }
}

impl fmt::Display for JsonString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_decoded()))
    }
}

impl fmt::Debug for JsonString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl From<&str> for JsonString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for JsonString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for JsonString {
    fn eq(&self, other: &str) -> bool {
        self.to_decoded() == other.as_bytes()
    }
}

impl PartialEq<&str> for JsonString {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(raw: &str) -> JsonString {
        JsonString::unescape(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_unescape_short_escapes() {
        #[rustfmt::skip]
        let tests = vec![
            (r#"abc"#, "abc"),
            (r#"a\nb"#, "a\nb"),
            (r#"\r\t"#, "\r\t"),
            (r#"\b\f"#, "\u{8}\u{c}"),
            (r#"\"\\\/"#, "\"\\/"),
        ];
        for (input, expected) in tests {
            assert_eq!(unescape(input).as_bytes(), expected.as_bytes());
        }
    }

    #[test]
    fn test_unescape_unicode() {
        assert_eq!(unescape(r"\u0041").as_bytes(), b"A");
        assert_eq!(unescape(r"\u00e9").as_bytes(), "\u{e9}".as_bytes());
        assert_eq!(unescape(r"\u00E9").as_bytes(), "\u{e9}".as_bytes());
        assert_eq!(unescape(r"\u20ac").as_bytes(), "\u{20ac}".as_bytes());
        assert_eq!(unescape(r"\u07ff").as_bytes(), [0xdf, 0xbf]);
        assert_eq!(unescape(r"\u0800").as_bytes(), [0xe0, 0xa0, 0x80]);
    }

    #[test]
    fn test_unescape_nul_is_overlong() {
        let s = unescape(r"\u0000");
        assert_eq!(s.as_bytes(), [0xc0, 0x80]);
        assert_eq!(s.as_bytes_with_nul(), [0xc0, 0x80, 0x00]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.to_decoded(), vec![0]);

        let s = unescape(r"a\u0000b");
        assert_eq!(s.len(), 3);
        assert_eq!(s.to_text().unwrap(), "a\0b");
    }

    #[test]
    fn test_unescape_rejects_truncated_sequences() {
        assert!(JsonString::unescape(br"\u00").is_none());
        assert!(JsonString::unescape(br"\u00zz").is_none());
        assert!(JsonString::unescape(br"abc\").is_none());
        assert!(JsonString::unescape(br"\q").is_none());
    }

    #[test]
    fn test_new_encodes_nul() {
        let s = JsonString::new("x\0y");
        assert_eq!(s.as_bytes(), [b'x', 0xc0, 0x80, b'y']);
        assert_eq!(s.len(), 3);
        assert_eq!(s, "x\0y");
        assert!(!s.as_bytes().contains(&0));
    }

    #[test]
    fn test_empty() {
        let s = JsonString::default();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(s, JsonString::new(""));
        assert_eq!(s.as_bytes_with_nul(), [0]);
    }
}
