use crate::ast::ValueType;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedEndOfInput,
    MalformedGrammar,
}

impl ParseErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedEndOfInput => "unexpected end of input",
            ParseErrorKind::MalformedGrammar => "malformed JSON",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error at line {line_number}: {}: {message}", .kind.as_str())]
pub struct ParseError {
    kind: ParseErrorKind,
    message: String,
    line_number: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: String, line_number: usize) -> Self {
        Self {
            kind,
            message,
            line_number,
        }
    }
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn line_number(&self) -> usize {
        self.line_number
    }
    pub fn is_eof(&self) -> bool {
        self.kind == ParseErrorKind::UnexpectedEndOfInput
    }
}

/// A typed accessor or setter was used on a node of another type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Expecting {expected}, found {actual}")]
pub struct TypeError {
    pub actual: ValueType,
    pub expected: ValueType,
}

impl TypeError {
    pub fn new(actual: ValueType, expected: ValueType) -> Self {
        Self { actual, expected }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("key `{0}` is not present in the object")]
    InvalidKey(String),
    #[error("NaN cannot be stored under key `{0}`")]
    InvalidValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("index {index} is out of bounds for an array of {len} elements")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("NaN cannot be stored at index {0}")]
    InvalidElement(usize),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("output buffer holds {capacity} bytes, {needed} needed")]
    BufferTooSmall { needed: usize, capacity: usize },
    #[error("NaN has no text representation")]
    NotANumber,
    #[error("length pass computed {expected} bytes but {written} were written")]
    LengthMismatch { expected: usize, written: usize },
    #[error("serialized text is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Object(#[from] ObjectError),
    #[error(transparent)]
    Array(#[from] ArrayError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
