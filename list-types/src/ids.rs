//! Record and identifier types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// An opaque, schema-free record as returned by the remote service.
pub type Record = Value;

/// Identifier of a record inside a collection.
///
/// Services key their records by either a number or a string. Matching is
/// strict: a numeric id never matches a string field and vice versa. A
/// numeric id matches a float field of the same value (`1` and `1.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric identifier.
    Int(i64),
    /// String identifier.
    Str(String),
}

impl RecordId {
    /// Returns true for identifiers that cannot name a record (`0` or `""`).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Int(value) => *value == 0,
            Self::Str(value) => value.is_empty(),
        }
    }

    /// Check whether a JSON field value holds this identifier.
    pub fn matches(&self, field: &Value) -> bool {
        match (self, field) {
            (Self::Int(id), Value::Number(n)) => match n.as_i64() {
                Some(value) => value == *id,
                None => n.as_f64() == Some(*id as f64),
            },
            (Self::Str(id), Value::String(s)) => id == s,
            _ => false,
        }
    }

    /// Read an identifier out of a record field, if it has a usable shape.
    pub fn from_value(field: &Value) -> Option<Self> {
        match field {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    /// Convert back into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(id) => Value::from(*id),
            Self::Str(id) => Value::from(id.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Str(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// Parses integers as [`RecordId::Int`], anything else as [`RecordId::Str`].
impl FromStr for RecordId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(Self::Int)
            .unwrap_or_else(|_| Self::Str(s.to_string())))
    }
}
