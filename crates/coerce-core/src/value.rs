//! # Dynamic Values and Parameter Records
//!
//! Defines [`Value`], the tagged union that flows through the coercion
//! engine, and [`Record`], the field-name → value mapping that callers
//! hand to it.
//!
//! Raw request parameters arrive as [`Value::Text`] (or [`Value::List`] of
//! text for repeated parameters). The engine replaces them with the typed
//! variants. Because input and output share one type, a coerced record can
//! be validated again against the same schema.
//!
//! ## JSON Interop
//!
//! `From<serde_json::Value>` maps JSON objects to [`Value::Structured`]
//! (an opaque tree) and JSON arrays to [`Value::List`]. Integers that do not
//! fit in `i64` become floats. `Serialize`/`Deserialize` go through the same
//! mapping, so a record serializes as a plain JSON object.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field-name → value mapping: the unit of input and output for validation.
pub type Record = BTreeMap<String, Value>;

/// A dynamically typed parameter value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit null. Treated as absent by the engine.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text. Raw request parameters use this variant.
    Text(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Opaque JSON tree produced by the `json` and `json_array` kinds.
    Structured(serde_json::Value),
}

impl Value {
    /// Construct a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Structured(_) => "structured",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float view. Integers widen to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether the value counts as "empty" for the purposes of list
    /// coercion and boolean parsing.
    ///
    /// Falsy values: null, `false`, `0`, `0.0`, the empty string, the
    /// string `"0"`, the empty list, and a structured JSON `null`.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty() || s == "0",
            Value::List(items) => items.is_empty(),
            Value::Structured(tree) => tree.is_null(),
        }
    }

    /// Render a scalar as text. Lists, structured trees and null yield `None`.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::List(_) | Value::Structured(_) => None,
        }
    }

    /// Convert to a `serde_json::Value`. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Structured(tree) => tree.clone(),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            tree @ serde_json::Value::Object(_) => Value::Structured(tree),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Build a record from a JSON object. Returns `None` for any other JSON shape.
pub fn record_from_json(json: serde_json::Value) -> Option<Record> {
    match json {
        serde_json::Value::Object(map) => {
            Some(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
        }
        _ => None,
    }
}

/// Render a record as a JSON object.
pub fn record_to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}
