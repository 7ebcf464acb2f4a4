//! Canonical text output.
//!
//! Serialization runs in two passes: [`Formatter::length`] computes the exact
//! number of bytes a value renders to, and [`Formatter::write`] fills a buffer
//! of that size. Both passes render numbers through the same scratch buffer
//! and strings through the same [`Escapes`] iterator, so a rule changed in
//! one place changes in both.

use crate::array::Array;
use crate::ast::Value;
use crate::classify::is_control;
use crate::error::WriteError;
use crate::object::Object;
use crate::stream::Stream;
use crate::string::JsonString;
use std::fmt::{self, Write as _};
use tracing::trace;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

// Longest rendering of an f64 with six decimals is 317 bytes (-1.8e308).
const SCRATCH_LEN: usize = 328;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Raw(u8),
    Short(u8),
    Unicode(u8),
}

impl Piece {
    fn len(self) -> usize {
        match self {
            Piece::Raw(_) => 1,
            Piece::Short(_) => 2,
            Piece::Unicode(_) => 6,
        }
    }
}

/// Splits stored string bytes into their escaped output pieces.
struct Escapes<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Escapes<'a> {
    fn new(s: &'a JsonString) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }
}

impl Iterator for Escapes<'_> {
    type Item = Piece;

    fn next(&mut self) -> Option<Piece> {
        let rest = self.bytes.get(self.pos..)?;
        let b = *rest.first()?;
        if rest.starts_with(&[0xc0, 0x80]) {
            self.pos += 2;
            return Some(Piece::Unicode(0));
        }
        self.pos += 1;
        Some(match b {
            b'"' | b'\\' => Piece::Short(b),
            b'\n' => Piece::Short(b'n'),
            b'\r' => Piece::Short(b'r'),
            b'\t' => Piece::Short(b't'),
            0x08 => Piece::Short(b'b'),
            0x0c => Piece::Short(b'f'),
            b if is_control(b) => Piece::Unicode(b),
            b => Piece::Raw(b),
        })
    }
}

/// Fixed-size buffer numbers are rendered into before being measured or copied.
struct Scratch {
    bytes: [u8; SCRATCH_LEN],
    len: usize,
}

impl Scratch {
    fn render(args: fmt::Arguments) -> Self {
        let mut scratch = Self {
            bytes: [0; SCRATCH_LEN],
            len: 0,
        };
        // cannot fail: SCRATCH_LEN covers every i64 and f64 rendering
        let _ = scratch.write_fmt(args);
        scratch
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl fmt::Write for Scratch {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > SCRATCH_LEN {
            return Err(fmt::Error);
        }
        self.bytes[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

fn render_int(i: i64) -> Scratch {
    Scratch::render(format_args!("{}", i))
}

// Infinities are spelled as a literal that overflows back to the same value
// when parsed. NaN has no spelling.
fn render_float(f: f64) -> Result<Scratch, WriteError> {
    if f.is_nan() {
        return Err(WriteError::NotANumber);
    }
    Ok(if f == f64::INFINITY {
        Scratch::render(format_args!("1.0e999"))
    } else if f == f64::NEG_INFINITY {
        Scratch::render(format_args!("-1.0e999"))
    } else {
        Scratch::render(format_args!("{:.6}", f))
    })
}

/// Cursor over the exactly sized output buffer.
struct Output<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Output<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(WriteError::BufferTooSmall {
                needed: end,
                capacity: self.buf.len(),
            });
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn put_piece(&mut self, piece: Piece) -> Result<(), WriteError> {
        match piece {
            Piece::Raw(b) => self.put(&[b]),
            Piece::Short(b) => self.put(&[b'\\', b]),
            Piece::Unicode(b) => self.put(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX_DIGITS[usize::from(b >> 4)],
                HEX_DIGITS[usize::from(b & 0x0f)],
            ]),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Formatter;

impl Formatter {
    pub fn new() -> Self {
        Self
    }

    /// Exact number of bytes [`Formatter::write`] produces for `v`.
    ///
    /// A NaN float counts as zero bytes; writing it fails.
    pub fn length(&self, v: &Value) -> usize {
        match v {
            Value::Null => 4,
            Value::Bool(true) => 4,
            Value::Bool(false) => 5,
            Value::Int(i) => render_int(*i).len,
            Value::Float(f) => render_float(*f).map_or(0, |s| s.len),
            Value::String(s) => self.string_length(s),
            Value::Object(o) => self.object_length(o),
            Value::Array(a) => self.array_length(a),
        }
    }

    fn string_length(&self, s: &JsonString) -> usize {
        2 + Escapes::new(s).map(Piece::len).sum::<usize>()
    }

    fn object_length(&self, o: &Object) -> usize {
        let members: usize = o
            .iter_sorted()
            .map(|(k, v)| self.string_length(k) + 2 + self.length(v))
            .sum();
        2 + members + separators(o.len())
    }

    fn array_length(&self, a: &Array) -> usize {
        let elements: usize = a.iter().map(|v| self.length(v)).sum();
        2 + elements + separators(a.len())
    }

    /// Writes `v` into `buf` and returns the number of bytes written.
    ///
    /// `buf` must hold at least [`Formatter::length`] bytes.
    pub fn write(&self, v: &Value, buf: &mut [u8]) -> Result<usize, WriteError> {
        let mut out = Output { buf, pos: 0 };
        self.write_value(v, &mut out)?;
        Ok(out.pos)
    }

    fn write_value(&self, v: &Value, out: &mut Output) -> Result<(), WriteError> {
        match v {
            Value::Null => out.put(b"null"),
            Value::Bool(true) => out.put(b"true"),
            Value::Bool(false) => out.put(b"false"),
            Value::Int(i) => out.put(render_int(*i).as_bytes()),
            Value::Float(f) => out.put(render_float(*f)?.as_bytes()),
            Value::String(s) => self.write_string(s, out),
            Value::Object(o) => self.write_object(o, out),
            Value::Array(a) => self.write_array(a, out),
        }
    }

    fn write_string(&self, s: &JsonString, out: &mut Output) -> Result<(), WriteError> {
        out.put(b"\"")?;
        for piece in Escapes::new(s) {
            out.put_piece(piece)?;
        }
        out.put(b"\"")
    }

    fn write_object(&self, o: &Object, out: &mut Output) -> Result<(), WriteError> {
        out.put(b"{")?;
        for (i, (k, v)) in o.iter_sorted().enumerate() {
            if i > 0 {
                out.put(b", ")?;
            }
            self.write_string(k, out)?;
            out.put(b": ")?;
            self.write_value(v, out)?;
        }
        out.put(b"}")
    }

    fn write_array(&self, a: &Array, out: &mut Output) -> Result<(), WriteError> {
        out.put(b"[")?;
        for (i, v) in a.iter().enumerate() {
            if i > 0 {
                out.put(b", ")?;
            }
            self.write_value(v, out)?;
        }
        out.put(b"]")
    }

    /// Renders `v` into a buffer allocated at exactly its computed length.
    pub fn format(&self, v: &Value) -> Result<Vec<u8>, WriteError> {
        let expected = self.length(v);
        trace!(len = expected, "computed output length");
        let mut buf = vec![0; expected];
        let written = self.write(v, &mut buf)?;
        if written != expected {
            return Err(WriteError::LengthMismatch { expected, written });
        }
        Ok(buf)
    }
}

// ", " between each pair of members or elements
fn separators(count: usize) -> usize {
    count.saturating_sub(1) * 2
}

pub fn length(v: &Value) -> usize {
    Formatter::new().length(v)
}

pub fn to_vec(v: &Value) -> Result<Vec<u8>, WriteError> {
    Formatter::new().format(v)
}

pub fn to_string(v: &Value) -> Result<String, WriteError> {
    Ok(String::from_utf8(to_vec(v)?)?)
}

/// Serializes `v` onto a transport and flushes it.
pub fn write_to<S: Stream + ?Sized>(stream: &mut S, v: &Value) -> Result<(), WriteError> {
    let text = to_vec(v)?;
    stream.write(&text)?;
    stream.write_sync()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::from_str;
    use crate::stream::MemoryStream;

    fn format(text: &str) -> String {
        let v = from_str(text).unwrap();
        to_string(&v).unwrap()
    }

    fn format_value(v: &Value) -> String {
        let text = to_string(v).unwrap();
        assert_eq!(text.len(), length(v));
        text
    }

    #[test]
    fn test_format_scalars() {
        #[rustfmt::skip]
        let tests = vec![
            (Value::Null, "null"),
            (Value::Bool(true), "true"),
            (Value::Bool(false), "false"),
            (Value::Int(8192), "8192"),
            (Value::Int(-42), "-42"),
            (Value::Int(i64::MIN), "-9223372036854775808"),
            (Value::Float(8192.016384), "8192.016384"),
            (Value::Float(-150.0), "-150.000000"),
            (Value::Float(0.0), "0.000000"),
            (Value::Float(f64::INFINITY), "1.0e999"),
            (Value::Float(f64::NEG_INFINITY), "-1.0e999"),
        ];
        for (v, expected) in tests {
            assert_eq!(format_value(&v), expected);
        }
    }

    #[test]
    fn test_nan_cannot_be_written() {
        let mut v = Value::Float(1.0);
        v.set_float(f64::NAN).unwrap();
        assert!(matches!(to_vec(&v), Err(WriteError::NotANumber)));
        let mut buf = [0u8; 16];
        assert!(matches!(
            Formatter::new().write(&v, &mut buf),
            Err(WriteError::NotANumber)
        ));
    }

    #[test]
    fn test_infinities_read_back() {
        let v = from_str("[1.0e400, -1.0e400]").unwrap();
        let text = format_value(&v);
        assert_eq!(text, "[1.0e999, -1.0e999]");
        assert_eq!(from_str(&text).unwrap(), v);
    }

    // The integer part is read back in wrapping u64 arithmetic, so floats only
    // survive a round trip below 2^64.
    #[test]
    fn test_float_magnitude_bound() {
        let below = Value::Float(2f64.powi(63));
        let text = format_value(&below);
        assert_eq!(text, "9223372036854775808.000000");
        assert_eq!(from_str(&format!("[{}]", text)).unwrap(), wrap(below));

        let above = Value::Float(1e20);
        let text = format_value(&above);
        assert_eq!(text, "100000000000000000000.000000");
        let back = from_str(&format!("[{}]", text)).unwrap();
        assert_eq!(back, wrap(Value::Float(7766279631452241920.0)));
    }

    fn wrap(v: Value) -> Value {
        Value::Array(Array::try_from(vec![v]).unwrap())
    }

    #[test]
    fn test_format_large_float() {
        let text = format_value(&Value::Float(f64::MAX));
        assert!(text.ends_with(".000000"));
        let text = format_value(&Value::Float(-f64::MAX));
        assert_eq!(text.len(), 317);
    }

    #[test]
    fn test_format_string() {
        #[rustfmt::skip]
        let tests = vec![
            ("abc", r#""abc""#),
            ("  a bc   def", r#""  a bc   def""#),
            ("a\"b", r#""a\"b""#),
            ("a\\b", r#""a\\b""#),
            ("a/b", r#""a/b""#),
            ("\n\r\t\u{8}\u{c}", r#""\n\r\t\b\f""#),
            ("\u{1}\u{1f}\u{7f}", r#""\u0001\u001f\u007f""#),
            ("x\0y", r#""x\u0000y""#),
            ("caf\u{e9}", "\"caf\u{e9}\""),
            ("", r#""""#),
        ];
        for (input, expected) in tests {
            assert_eq!(format_value(&Value::from(input)), expected);
        }
    }

    #[test]
    fn test_format_object() {
        #[rustfmt::skip]
        let tests = vec![
            ("{}", "{}"),
            ("{    }", "{}"),
            (r#"{"a":123}"#, r#"{"a": 123}"#),
            (r#"{"bc":45,"a":123}"#, r#"{"a": 123, "bc": 45}"#),
            (
                r#"{"a":123,"b":{"d":6789,"c":45}}"#,
                r#"{"a": 123, "b": {"c": 45, "d": 6789}}"#,
            ),
            (r#"{"a": {}}"#, r#"{"a": {}}"#),
            (r#"{"a": []}"#, r#"{"a": []}"#),
        ];
        for (input, expected) in tests {
            assert_eq!(format(input), String::from(expected));
        }
    }

    #[test]
    fn test_format_array() {
        #[rustfmt::skip]
        let tests = vec![
            ("[]", "[]"),
            ("[    ]", "[]"),
            ("[123]", "[123]"),
            ("[1,23,4]", "[1, 23, 4]"),
            (r#"[{"a": 1}, {"b": 23}]"#, r#"[{"a": 1}, {"b": 23}]"#),
            (r#"[{"a": []}]"#, r#"[{"a": []}]"#),
            ("[0x1F, -1.5e2, true, null]", "[31, -150.000000, true, null]"),
        ];
        for (input, expected) in tests {
            assert_eq!(format(input), String::from(expected));
        }
    }

    #[test]
    fn test_object_built_in_place() {
        let mut o = Object::new();
        let mut v = Value::Object(Object::new());
        assert_eq!(format_value(&v), "{}");
        o.add("test", Value::Null).unwrap();
        v = Value::Object(o.clone());
        assert_eq!(format_value(&v), r#"{"test": null}"#);
        o.add("array", Value::Array(Array::new())).unwrap();
        v = Value::Object(o);
        assert_eq!(format_value(&v), r#"{"array": [], "test": null}"#);
    }

    #[test]
    fn test_array_built_in_place() {
        let mut a = Array::new();
        assert_eq!(format_value(&Value::Array(a.clone())), "[]");
        a.add(Value::Null).unwrap();
        assert_eq!(format_value(&Value::Array(a.clone())), "[null]");
        a.add(Value::Bool(true)).unwrap();
        assert_eq!(format_value(&Value::Array(a)), "[null, true]");
    }

    #[test]
    fn test_canonical_text_is_stable() {
        let texts = [
            r#"{"a": [1, 2.500000, "x\u0000y"], "b": {"c": null}}"#,
            r#"[{}, [], "\"\\\n", -7, false]"#,
        ];
        for text in texts {
            assert_eq!(format(text), text);
        }
    }

    #[test]
    fn test_write_into_short_buffer_fails() {
        let v = from_str("[1, 2, 3]").unwrap();
        let mut buf = vec![0u8; length(&v) - 1];
        let e = Formatter::new().write(&v, &mut buf).unwrap_err();
        assert!(matches!(
            e,
            WriteError::BufferTooSmall {
                needed: 9,
                capacity: 8
            }
        ));
    }

    #[test]
    fn test_write_reports_bytes_written() {
        let v = from_str(r#"{"k": "v"}"#).unwrap();
        let mut buf = [0u8; 64];
        let n = Formatter::new().write(&v, &mut buf).unwrap();
        assert_eq!(n, length(&v));
        assert_eq!(&buf[..n], br#"{"k": "v"}"#);
    }

    #[test]
    fn test_write_to_stream() {
        let mut stream = MemoryStream::owned(Vec::new());
        write_to(&mut stream, &from_str("[true]").unwrap()).unwrap();
        assert_eq!(stream.into_inner(), b"[true]".to_vec());
    }
}
