//! Raw stored records and the value coercions used to read them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored proposal document exactly as it came out of the store.
///
/// No field is guaranteed to exist or to have any particular type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Get a field, treating JSON `null` as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    /// Set a field.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Builder-style variant of [`RawRecord::insert`].
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.insert(field, value);
        self
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the record, returning the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render any value as a string.
///
/// Strings are taken verbatim, scalars use their natural form and
/// containers fall back to compact JSON.
pub(crate) fn string_form(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// String form of a truthy value, `None` otherwise.
pub(crate) fn truthy_string(value: Option<&Value>) -> Option<String> {
    value.filter(|v| is_truthy(v)).map(string_form)
}

/// Identifier form: strings, numbers, or `{"$oid": "..."}` wrappers.
pub(crate) fn id_form(value: Option<&Value>) -> Option<String> {
    let id = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => match map.get("$oid") {
            Some(Value::String(s)) => s.clone(),
            _ => return None,
        },
        _ => return None,
    };

    if id.trim().is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Timestamp form: plain strings, or `{"$date": ...}` wrappers.
pub(crate) fn timestamp_form(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Object(map) => map.get("$date").and_then(|inner| truthy_string(Some(inner))),
        other => truthy_string(Some(other)),
    }
}
