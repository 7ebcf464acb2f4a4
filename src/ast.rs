use crate::array::Array;
use crate::error::TypeError;
use crate::object::Object;
use crate::string::JsonString;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    String,
    Object,
    Array,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        type_name(self as u8)
    }
}

/// Human-readable name of a raw type tag.
pub fn type_name(tag: u8) -> &'static str {
    match ValueType::try_from(tag) {
        Ok(ValueType::Null) => "null",
        Ok(ValueType::Bool) => "bool",
        Ok(ValueType::Int) => "int",
        Ok(ValueType::Float) => "float",
        Ok(ValueType::String) => "string",
        Ok(ValueType::Object) => "object",
        Ok(ValueType::Array) => "array",
        Err(_) => "unknown",
    }
}

impl TryFrom<u8> for ValueType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => ValueType::Null,
            1 => ValueType::Bool,
            2 => ValueType::Int,
            3 => ValueType::Float,
            4 => ValueType::String,
            5 => ValueType::Object,
            6 => ValueType::Array,
            other => return Err(other),
        })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(JsonString),
    Object(Object),
    Array(Array),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Object(_) => ValueType::Object,
            Value::Array(_) => ValueType::Array,
        }
    }

    // NaN is the one float with no text form; containers refuse it.
    pub(crate) fn is_nan(&self) -> bool {
        matches!(*self, Value::Float(f) if f.is_nan())
    }

    fn mismatch(&self, expected: ValueType) -> TypeError {
        TypeError::new(self.value_type(), expected)
    }

    pub fn as_null(&self) -> Result<(), TypeError> {
        match self {
            Value::Null => Ok(()),
            _ => Err(self.mismatch(ValueType::Null)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, TypeError> {
        match *self {
            Value::Bool(b) => Ok(b),
            _ => Err(self.mismatch(ValueType::Bool)),
        }
    }

    pub fn as_int(&self) -> Result<i64, TypeError> {
        match *self {
            Value::Int(i) => Ok(i),
            _ => Err(self.mismatch(ValueType::Int)),
        }
    }

    pub fn as_float(&self) -> Result<f64, TypeError> {
        match *self {
            Value::Float(f) => Ok(f),
            _ => Err(self.mismatch(ValueType::Float)),
        }
    }

    pub fn as_string(&self) -> Result<&JsonString, TypeError> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.mismatch(ValueType::String)),
        }
    }

    pub fn as_object(&self) -> Result<&Object, TypeError> {
        match self {
            Value::Object(o) => Ok(o),
            _ => Err(self.mismatch(ValueType::Object)),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut Object, TypeError> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(other.mismatch(ValueType::Object)),
        }
    }

    pub fn as_array(&self) -> Result<&Array, TypeError> {
        match self {
            Value::Array(a) => Ok(a),
            _ => Err(self.mismatch(ValueType::Array)),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Array, TypeError> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(other.mismatch(ValueType::Array)),
        }
    }

    // Setters replace the payload only; the tag stays what it was built with.

    pub fn set_bool(&mut self, value: bool) -> Result<(), TypeError> {
        match self {
            Value::Bool(b) => {
                *b = value;
                Ok(())
            }
            other => Err(other.mismatch(ValueType::Bool)),
        }
    }

    pub fn set_int(&mut self, value: i64) -> Result<(), TypeError> {
        match self {
            Value::Int(i) => {
                *i = value;
                Ok(())
            }
            other => Err(other.mismatch(ValueType::Int)),
        }
    }

    pub fn set_float(&mut self, value: f64) -> Result<(), TypeError> {
        match self {
            Value::Float(f) => {
                *f = value;
                Ok(())
            }
            other => Err(other.mismatch(ValueType::Float)),
        }
    }

    pub fn set_string(&mut self, value: impl Into<JsonString>) -> Result<(), TypeError> {
        match self {
            Value::String(s) => {
                *s = value.into();
                Ok(())
            }
            other => Err(other.mismatch(ValueType::String)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match crate::formatter::Formatter::new().format(self) {
            Ok(text) => write!(f, "{}", String::from_utf8_lossy(&text)),
            // a tree holding NaN has no canonical text
            Err(e) => write!(f, "<{}>", e),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(JsonString::new(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(JsonString::new(s))
    }
}

impl From<JsonString> for Value {
    fn from(s: JsonString) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}
