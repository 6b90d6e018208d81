//! Owned metadata trees.
//!
//! A metadata document is a tree of objects, lists and scalars. Objects keep
//! their keys in insertion order: that order is what numeric addresses are
//! derived from, so it must survive every transformation.

use core::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// YAML `~` / JSON null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer that fits in i64
    Int(i64),
    /// Integer above `i64::MAX`
    UInt(u64),
    /// Floating-point number
    Float(f64),
    /// String
    String(String),
}

impl Scalar {
    /// Create a string scalar.
    pub fn string(s: impl Into<String>) -> Self {
        Scalar::String(s.into())
    }

    /// Get the type name of this scalar.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) | Scalar::UInt(_) | Scalar::Float(_) => "number",
            Scalar::String(_) => "string",
        }
    }

    /// Convert to a string reference, if possible.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this scalar is an empty string.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, Scalar::String(s) if s.is_empty())
    }

    /// Convert a JSON value into a scalar.
    ///
    /// Arrays and objects have no scalar form and are rendered as compact
    /// JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Scalar::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Scalar::UInt(u)
                } else {
                    n.as_f64().map(Scalar::Float).unwrap_or(Scalar::Null)
                }
            }
            serde_json::Value::String(s) => Scalar::String(s.clone()),
            other => Scalar::String(other.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    /// Text form used in tabular output.
    ///
    /// Null renders as an empty cell. Whole floats keep a trailing `.0` so
    /// that they read back as floats rather than integers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::UInt(n) => write!(f, "{}", n),
            Scalar::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Scalar::UInt(n), Scalar::Int)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

/// A metadata tree node.
///
/// Deserializes directly from YAML or JSON documents; mappings become
/// [`Value::Object`] with their key order preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Mapping with insertion-ordered keys
    Object(IndexMap<String, Value>),
    /// Sequence
    List(Vec<Value>),
    /// Leaf
    Scalar(Scalar),
}

impl Value {
    /// Create a null value.
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    /// Create a boolean value.
    pub fn bool(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }

    /// Create an integer value.
    pub fn int(n: i64) -> Self {
        Value::Scalar(Scalar::Int(n))
    }

    /// Create a float value.
    pub fn float(x: f64) -> Self {
        Value::Scalar(Scalar::Float(x))
    }

    /// Create a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::String(s.into()))
    }

    /// Create an empty object.
    pub fn object() -> Self {
        Value::Object(IndexMap::new())
    }

    /// Create an object from key-value pairs.
    pub fn object_from<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create a list from a vector of values.
    pub fn list_from(values: Vec<Value>) -> Self {
        Value::List(values)
    }

    /// Get the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Scalar(s) => s.type_name(),
        }
    }

    /// Convert to a scalar reference, if possible.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a list reference, if possible.
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to an object reference, if possible.
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up a field of an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Check whether this node is a container.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::List(_))
    }

    /// Number of leaf scalars in this tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Value::Object(obj) => obj.values().map(Value::leaf_count).sum(),
            Value::List(items) => items.iter().map(Value::leaf_count).sum(),
            Value::Scalar(_) => 1,
        }
    }

    /// Nesting depth: 0 for a scalar, 1 + deepest child for containers.
    pub fn depth(&self) -> usize {
        match self {
            Value::Object(obj) => 1 + obj.values().map(Value::depth).max().unwrap_or(0),
            Value::List(items) => 1 + items.iter().map(Value::depth).max().unwrap_or(0),
            Value::Scalar(_) => 0,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(Scalar::Int(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Scalar(Scalar::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(Scalar::Float(x))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::String(s))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::String(s.to_string()))
    }
}
