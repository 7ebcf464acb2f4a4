use crate::array::Array;
use crate::ast::Value;
use crate::classify::{
    hex_value, is_allowed_alpha, is_array_begin, is_array_end, is_backslash, is_base_prefix,
    is_bin, is_digit, is_exponent, is_hex, is_lower_alpha, is_minus, is_object_begin,
    is_object_end, is_oct, is_quote, is_whitespace,
};
use crate::error::{ParseError, ParseErrorKind};
use crate::limits::Limits;
use crate::object::Object;
use crate::stream::{MemoryStream, Stream};
use crate::string::JsonString;
use tracing::debug;

type Result<T> = std::result::Result<T, ParseError>;

// How a run of digits is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Digits {
    // a leading `0` stands alone or introduces a base prefix
    Integer,
    // a leading `0` stands alone
    Exponent,
    Fraction,
}

/// Recursive-descent parser pulling one byte of lookahead from a [`Stream`].
///
/// The lookahead is filled lazily, so after the closing delimiter of a
/// top-level document no further byte has been taken from the stream.
pub struct Parser<S> {
    stream: S,
    next: Option<u8>,
    last_was_comma: bool,
    line_number: usize,
    depth: usize,
    limits: Limits,
}

impl<S: Stream> Parser<S> {
    pub fn new(stream: S) -> Self {
        Self::with_limits(stream, Limits::default())
    }

    pub fn with_limits(stream: S, limits: Limits) -> Self {
        Self {
            stream,
            next: None,
            last_was_comma: false,
            line_number: 1,
            depth: 0,
            limits,
        }
    }

    /// Parses one document, which must be an object or an array.
    ///
    /// The stream is resynchronised afterwards whether or not parsing succeeded.
    pub fn parse_document(&mut self) -> Result<Value> {
        let result = self.parse_top_level();
        self.stream.resync();
        match &result {
            Ok(value) => debug!(
                line = self.line_number,
                kind = %value.value_type(),
                "parsed document"
            ),
            Err(e) => debug!(error = %e, "rejected document"),
        }
        result
    }

    /// Skips whitespace and reports whether the input is exhausted.
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.peek().is_none()
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn parse_top_level(&mut self) -> Result<Value> {
        self.last_was_comma = false;
        self.depth = 0;
        self.skip_whitespace();
        let ch = self.get_cur_char()?;
        if !is_object_begin(ch) && !is_array_begin(ch) {
            return Err(self.malformed(format!(
                "a document must be an object or an array, found: `{}`",
                ch.escape_ascii()
            )));
        }
        self.parse_value()
    }

    fn peek(&mut self) -> Option<u8> {
        if self.next.is_none() && !self.stream.at_eof() {
            self.next = self.stream.read_byte();
        }
        self.next
    }

    fn succ(&mut self) {
        if self.next.take() == Some(b'\n') {
            self.line_number += 1;
        }
    }

    fn get_cur_char(&mut self) -> Result<u8> {
        match self.peek() {
            Some(ch) => Ok(ch),
            None => Err(ParseError::new(
                ParseErrorKind::UnexpectedEndOfInput,
                "input ended inside a document".to_string(),
                self.line_number,
            )),
        }
    }

    fn malformed(&self, message: String) -> ParseError {
        ParseError::new(ParseErrorKind::MalformedGrammar, message, self.line_number)
    }

    // check current token and skip it, along with any whitespace after it
    fn consume_char(&mut self, expect: u8, skip: bool) -> Result<()> {
        let actual = self.get_cur_char()?;
        if actual != expect {
            return Err(self.malformed(format!(
                "expected: `{}`, found: `{}`",
                expect.escape_ascii(),
                actual.escape_ascii()
            )));
        }
        self.last_was_comma = expect == b',';
        self.succ();
        if skip {
            self.skip_whitespace();
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, is_whitespace) {
            self.succ();
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_nesting_depth {
            return Err(self.malformed(format!(
                "nesting deeper than {} levels",
                self.limits.max_nesting_depth
            )));
        }
        Ok(())
    }

    // Whitespace after the outermost closing delimiter belongs to whatever
    // follows the document, so it is left in the stream.
    fn leave(&mut self, close: u8) -> Result<()> {
        if self.last_was_comma {
            return Err(self.malformed(format!(
                "trailing comma before `{}`",
                close.escape_ascii()
            )));
        }
        self.depth -= 1;
        let skip = self.depth > 0;
        self.consume_char(close, skip)
    }

    fn parse_string(&mut self) -> Result<JsonString> {
        self.consume_char(b'"', false)?; // left quotes
        let mut raw = Vec::new();
        let mut slash = false;
        loop {
            let ch = self.get_cur_char()?;
            if slash {
                match ch {
                    b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {}
                    b'u' => {
                        raw.push(ch);
                        self.succ();
                        self.parse_unicode_escape(&mut raw)?;
                        slash = false;
                        continue;
                    }
                    other => {
                        return Err(self.malformed(format!(
                            "invalid escape sequence: `\\{}`",
                            other.escape_ascii()
                        )))
                    }
                }
                slash = false;
            } else if is_quote(ch) {
                break;
            } else {
                slash = is_backslash(ch);
                if !slash && !is_allowed_alpha(ch) {
                    return Err(self.malformed(format!(
                        "control character `{}` in string",
                        ch.escape_ascii()
                    )));
                }
            }
            raw.push(ch);
            self.succ();
            if raw.len() > self.limits.max_string_length {
                return Err(self.malformed(format!(
                    "string longer than {} bytes",
                    self.limits.max_string_length
                )));
            }
        }
        self.consume_char(b'"', true)?; // right quotes
        JsonString::unescape(&raw).ok_or_else(|| self.malformed("invalid escape sequence".into()))
    }

    fn parse_unicode_escape(&mut self, raw: &mut Vec<u8>) -> Result<()> {
        for _ in 0..4 {
            let ch = self.get_cur_char()?;
            if !is_hex(ch) {
                return Err(self.malformed(format!(
                    "`\\u` must be followed by four hex digits, found: `{}`",
                    ch.escape_ascii()
                )));
            }
            raw.push(ch);
            self.succ();
        }
        Ok(())
    }

    fn parse_string_value(&mut self) -> Result<Value> {
        let s = self.parse_string()?;
        Ok(Value::String(s))
    }

    fn parse_natural(&mut self, kind: Digits, mut digits: Option<&mut u32>) -> Result<u64> {
        let first = self.get_cur_char()?;
        if !is_digit(first) {
            return Err(self.malformed(format!(
                "expected a digit, found: `{}`",
                first.escape_ascii()
            )));
        }
        let mut base = 10u64;
        let mut valid: fn(u8) -> bool = is_digit;
        if kind != Digits::Fraction && first == b'0' {
            self.succ();
            match self.peek() {
                Some(prefix) if kind == Digits::Integer && is_base_prefix(prefix) => {
                    let (b, v): (u64, fn(u8) -> bool) = match prefix {
                        b'x' => (16, is_hex),
                        b'o' => (8, is_oct),
                        _ => (2, is_bin),
                    };
                    base = b;
                    valid = v;
                    self.succ();
                    let ch = self.get_cur_char()?;
                    if !valid(ch) {
                        return Err(self.malformed(format!(
                            "expected a base-{} digit, found: `{}`",
                            base,
                            ch.escape_ascii()
                        )));
                    }
                }
                Some(ch) if is_digit(ch) => {
                    return Err(self.malformed("leading zero in number".into()));
                }
                _ => return Ok(0),
            }
        }
        let mut num = 0u64;
        while let Some(ch) = self.peek() {
            let digit = match hex_value(ch) {
                Some(d) if valid(ch) => u64::from(d),
                _ => break,
            };
            num = num.wrapping_mul(base).wrapping_add(digit);
            if let Some(count) = digits.as_deref_mut() {
                *count += 1;
            }
            self.succ();
        }
        Ok(num)
    }

    fn parse_number(&mut self) -> Result<Value> {
        let negative = self.get_cur_char()? == b'-';
        if negative {
            self.consume_char(b'-', false)?;
        }
        let integer = self.parse_natural(Digits::Integer, None)?;
        let mut fraction = None;
        if self.peek() == Some(b'.') {
            self.consume_char(b'.', false)?;
            let mut digits = 0;
            let value = self.parse_natural(Digits::Fraction, Some(&mut digits))?;
            fraction = Some((value, digits));
        }
        let mut exponent = 0u64;
        let mut negative_exponent = false;
        if self.peek().map_or(false, is_exponent) {
            self.succ();
            match self.get_cur_char()? {
                b'-' => {
                    self.consume_char(b'-', false)?;
                    negative_exponent = true;
                }
                b'+' => self.consume_char(b'+', false)?,
                _ => {}
            }
            exponent = self.parse_natural(Digits::Exponent, None)?;
        }
        self.skip_whitespace();

        // Integer arithmetic wraps and floats overflow to infinity; out-of-range
        // input is not corrected.
        let value = match fraction {
            None => {
                let exponent = u32::try_from(exponent).unwrap_or(u32::MAX);
                let magnitude = if negative_exponent {
                    10u64
                        .checked_pow(exponent)
                        .map_or(0, |scale| integer / scale)
                } else {
                    integer.wrapping_mul(10u64.wrapping_pow(exponent))
                };
                let magnitude = magnitude as i64;
                Value::Int(if negative {
                    magnitude.wrapping_neg()
                } else {
                    magnitude
                })
            }
            Some((fraction, digits)) => {
                let digits = i32::try_from(digits).unwrap_or(i32::MAX);
                let scale = 10f64.powi(i32::try_from(exponent).unwrap_or(i32::MAX));
                let mut num = fraction as f64 / 10f64.powi(digits) + integer as f64;
                // zero times an overflowed scale would be NaN
                if num != 0.0 {
                    if negative_exponent {
                        num /= scale;
                    } else {
                        num *= scale;
                    }
                }
                Value::Float(if negative { -num } else { num })
            }
        };
        Ok(value)
    }

    fn parse_literal(&mut self) -> Result<Value> {
        let first = self.get_cur_char()?;
        if !is_lower_alpha(first) {
            return Err(self.malformed(format!("invalid token: `{}`", first.escape_ascii())));
        }
        let mut word = Vec::with_capacity(5);
        while let Some(ch) = self.peek() {
            if !is_lower_alpha(ch) {
                break;
            }
            word.push(ch);
            self.succ();
            if word.len() > 5 {
                break;
            }
        }
        self.skip_whitespace();
        match word.as_slice() {
            b"true" => Ok(Value::Bool(true)),
            b"false" => Ok(Value::Bool(false)),
            b"null" => Ok(Value::Null),
            other => Err(self.malformed(format!(
                "invalid literal: `{}`",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    // After a member or element either the closing delimiter or a comma must
    // follow.
    fn parse_separator(&mut self, close: u8) -> Result<()> {
        match self.get_cur_char()? {
            b',' => self.consume_char(b',', true),
            ch if ch == close => {
                self.last_was_comma = false;
                Ok(())
            }
            other => Err(self.malformed(format!(
                "expected: `,` or `{}`, found: `{}`",
                close.escape_ascii(),
                other.escape_ascii()
            ))),
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.consume_char(b'{', true)?;
        self.enter()?;
        let mut object = Object::new();
        while !is_object_end(self.get_cur_char()?) {
            let ch = self.get_cur_char()?;
            if !is_quote(ch) {
                return Err(self.malformed(format!(
                    "expected: `\"`, found: `{}`",
                    ch.escape_ascii()
                )));
            }
            let key = self.parse_string()?;
            self.consume_char(b':', true)?;
            let value = self.parse_value()?;
            self.parse_separator(b'}')?;
            object
                .add(key, value)
                .map_err(|e| self.malformed(e.to_string()))?;
        }
        self.leave(b'}')?;
        Ok(Value::Object(object))
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.consume_char(b'[', true)?;
        self.enter()?;
        let mut array = Array::new();
        while !is_array_end(self.get_cur_char()?) {
            let value = self.parse_value()?;
            self.parse_separator(b']')?;
            array
                .add(value)
                .map_err(|e| self.malformed(e.to_string()))?;
        }
        self.leave(b']')?;
        Ok(Value::Array(array))
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.get_cur_char()? {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b'"' => self.parse_string_value(),
            ch if is_minus(ch) || is_digit(ch) => self.parse_number(),
            _ => self.parse_literal(),
        }
    }
}

/// Sequential documents read from one stream.
///
/// Ends when only whitespace remains, and stops after the first error.
pub struct Documents<S> {
    parser: Parser<S>,
    done: bool,
}

impl<S: Stream> Documents<S> {
    pub fn new(stream: S) -> Self {
        Self::with_limits(stream, Limits::default())
    }

    pub fn with_limits(stream: S, limits: Limits) -> Self {
        Self {
            parser: Parser::with_limits(stream, limits),
            done: false,
        }
    }
}

impl<S: Stream> Iterator for Documents<S> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.parser.at_end() {
            self.done = true;
            return None;
        }
        let result = self.parser.parse_document();
        self.done = result.is_err();
        Some(result)
    }
}

/// Parses one document from `stream` with the default [`Limits`].
pub fn parse<S: Stream + ?Sized>(stream: &mut S) -> Result<Value> {
    parse_with_limits(stream, Limits::default())
}

pub fn parse_with_limits<S: Stream + ?Sized>(stream: &mut S, limits: Limits) -> Result<Value> {
    Parser::with_limits(stream, limits).parse_document()
}

/// Parses a complete in-memory document; only whitespace may follow it.
pub fn from_slice(json: &[u8]) -> Result<Value> {
    let mut parser = Parser::new(MemoryStream::new(json));
    let value = parser.parse_document()?;
    if !parser.at_end() {
        return Err(parser.malformed("trailing characters after document".into()));
    }
    Ok(value)
}

pub fn from_str(json: &str) -> Result<Value> {
    from_slice(json.as_bytes())
}
