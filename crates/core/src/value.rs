//! Typed values produced by coercion.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value as JsonValue};
use std::fmt;

/// A value of some [`TargetType`](crate::TargetType).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (unset reference, empty nullable).
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer value.
    Int(i64),

    /// Unsigned integer value.
    UInt(u64),

    /// Float value (64-bit).
    Float(f64),

    /// Single character.
    Char(char),

    /// String value.
    String(String),

    /// Enum member.
    Enum { name: String, value: i64 },

    /// Ordered sequence.
    List(Vec<Value>),

    /// String-keyed dictionary (insertion ordered).
    Map(IndexMap<String, Value>),

    /// Instance of a custom struct type.
    Object {
        type_name: String,
        fields: IndexMap<String, Value>,
    },
}

impl Value {
    /// Check if value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get as integer if the value is an in-range integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Get as float if possible.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            Self::UInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Get as string slice if the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the elements of a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the named fields of a map or object.
    #[must_use]
    pub fn as_fields(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(fields) | Self::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Convert to a JSON value.
    ///
    /// Enum members become their name; non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::from(*n),
            Self::UInt(n) => JsonValue::from(*n),
            Self::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Self::Char(c) => JsonValue::String(c.to_string()),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Enum { name, .. } => JsonValue::String(name.clone()),
            Self::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(fields) | Self::Object { fields, .. } => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, JsonValue>>(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::String(s) => f.write_str(s),
            Self::Enum { name, .. } => f.write_str(name),
            Self::List(_) | Self::Map(_) | Self::Object { .. } => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
