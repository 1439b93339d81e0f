//! Bound parameter values and conversions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// SQL parameter values.
///
/// Deserializes from plain JSON/TOML scalars and arrays, so request payloads
/// can carry `"A"`, `42`, `1.5`, `true`, `null` or `[1, 2]` directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Text value.
    String(String),
    /// Sequence, bound as one list parameter (`IN (:p)`).
    Array(Vec<Value>),
}

/// Named parameter map, in insertion order.
pub type Params = IndexMap<String, Value>;

impl Value {
    /// Whether this is `Null` or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the value as plain text, used for wildcard wrapping.
    ///
    /// Arrays are joined with commas, `Null` renders as an empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
            Self::Array(values) => values
                .iter()
                .map(Self::to_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Interpret the value as a non-negative row count.
    ///
    /// Drivers report `COUNT(*)` as integers, floats or numeric strings
    /// depending on the database, so all three are accepted.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Self::Int(i) => u64::try_from(*i).ok(),
            Self::Float(f) if f.is_finite() && *f >= 0.0 => Some(f.trunc() as u64),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(values) => {
                Self::Array(values.into_iter().map(Self::from).collect())
            },
            // Objects have no SQL parameter form; keep the JSON text.
            obj @ serde_json::Value::Object(_) => Self::String(obj.to_string()),
        }
    }
}
