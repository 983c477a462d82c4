//! Runtime values held by controls
//!
//! A value is either a leaf (number, text, bool, null) or a composite
//! (object of named fields, list of positional items). Composite values
//! mirror the shape of composite controls: every named sub-control owns
//! the field of the same name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value held by a control, in either canonical or display units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    /// Build an object value from `(name, value)` pairs
    pub fn object<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // ========== Field Access ==========

    /// Get a named field. Lists are addressed by their decimal index.
    ///
    /// A missing field, or a field requested from a leaf value, is `Null`:
    /// absent sub-values are legal input for every converter.
    pub fn field(&self, name: &str) -> Value {
        match self {
            Value::Object(map) => map.get(name).cloned().unwrap_or_default(),
            Value::List(items) => name
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// Numeric field with a fallback for absent or null fields.
    ///
    /// Returns `None` when the field is present but holds something other
    /// than a number.
    pub fn number_or(&self, name: &str, default: f64) -> Option<f64> {
        match self.field(name) {
            Value::Null => Some(default),
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::Text(_) => "Text",
            Value::List(_) => "List",
            Value::Object(_) => "Object",
        }
    }

    // ========== Structural Mapping ==========

    /// Apply `f` to every numeric leaf, keeping the shape of composites.
    ///
    /// `Null` leaves are passed through untouched; any other leaf type is
    /// handed to `f` through `on_other` so callers can reject it.
    pub fn try_map_numbers<E, F, O>(&self, f: &F, on_other: &O) -> Result<Value, E>
    where
        F: Fn(f64) -> Result<f64, E>,
        O: Fn(&Value) -> Result<Value, E>,
    {
        match self {
            Value::Null => Ok(Value::Null),
            Value::Number(n) => f(*n).map(Value::Number),
            Value::List(items) => items
                .iter()
                .map(|v| v.try_map_numbers(f, on_other))
                .collect::<Result<Vec<_>, E>>()
                .map(Value::List),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| v.try_map_numbers(f, on_other).map(|v| (k.clone(), v)))
                .collect::<Result<HashMap<_, _>, E>>()
                .map(Value::Object),
            other => on_other(other),
        }
    }

    // ========== JSON Interop ==========

    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or_default(),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(arr) => Value::List(arr.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(obj) => Value::Object(
                obj.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect(),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            // Non-finite numbers have no JSON form
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(l) => serde_json::Value::Array(l.iter().map(Value::to_json).collect()),
            Value::Object(o) => serde_json::Value::Object(
                o.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                let contents: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", contents.join(", "))
            }
            Value::Object(obj) => {
                let mut keys: Vec<&String> = obj.keys().collect();
                keys.sort();
                let fields: Vec<String> = keys
                    .into_iter()
                    .map(|k| format!("{}: {}", k, obj[k]))
                    .collect();
                write!(f, "{{{}}}", fields.join(", "))
            }
        }
    }
}

// From implementations for convenience
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
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

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
