//! Parser and canonical serializer for an extended JSON dialect.
//!
//! On top of standard JSON the parser accepts `0x`, `0o` and `0b` integer
//! prefixes and keeps integers (`Int`) apart from numbers with a fractional
//! part (`Float`). A document must be an object or an array.
//!
//! ```
//! use rson::{from_str, to_string};
//!
//! let v = from_str(r#"{"b": 0x1F, "a": [1.5, null]}"#).unwrap();
//! assert_eq!(v.as_object().unwrap().get("b").unwrap().as_int(), Ok(31));
//! assert_eq!(to_string(&v).unwrap(), r#"{"a": [1.500000, null], "b": 31}"#);
//! ```
//!
//! Documents can also be read one after another from any [`Stream`]:
//!
//! ```
//! use rson::{Documents, MemoryStream};
//!
//! let docs = Documents::new(MemoryStream::new(b"[1] [2] {}"));
//! assert_eq!(docs.count(), 3);
//! ```

mod array;
mod ast;
pub mod classify;
mod error;
mod formatter;
mod limits;
mod object;
mod parser;
mod stream;
mod string;

pub use array::Array;
pub use ast::{type_name, Value, ValueType};
pub use error::{
    ArrayError, Error, ObjectError, ParseError, ParseErrorKind, Result, TypeError, WriteError,
};
pub use formatter::{length, to_string, to_vec, write_to, Formatter};
pub use limits::Limits;
pub use object::Object;
pub use parser::{from_slice, from_str, parse, parse_with_limits, Documents, Parser};
pub use stream::{IoStream, MemoryStream, Stream};
pub use string::JsonString;
