//! Pickled catalog columns.
//!
//! Recorders pickle their name maps and variable metadata. Files written by
//! a Python 2 recorder store the pickle as TEXT and use byte strings for
//! names, so every column is decoded through one of two explicit paths.

use rusqlite::types::ValueRef;
use serde::Serialize;
use serde_pickle::{DeOptions, HashableValue, Value as PickleValue};
use serde_json::{Map, Number, Value as JsonValue};

/// Which decode path produced a column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePath {
    /// Column was NULL.
    Absent,
    /// BLOB decoded directly.
    Current,
    /// Stored text reinterpreted as raw bytes, Python 2 strings promoted.
    Legacy,
}

impl std::fmt::Display for DecodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DecodePath::Absent => "absent",
            DecodePath::Current => "current",
            DecodePath::Legacy => "legacy",
        };
        f.write_str(name)
    }
}

/// Result of decoding one catalog column.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogDecode<T> {
    Absent,
    Current(T),
    Legacy(T),
}

impl<T> CatalogDecode<T> {
    pub fn path(&self) -> DecodePath {
        match self {
            CatalogDecode::Absent => DecodePath::Absent,
            CatalogDecode::Current(_) => DecodePath::Current,
            CatalogDecode::Legacy(_) => DecodePath::Legacy,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            CatalogDecode::Absent => None,
            CatalogDecode::Current(v) | CatalogDecode::Legacy(v) => Some(v),
        }
    }
}

fn current_options() -> DeOptions {
    DeOptions::new().replace_unresolved_globals()
}

fn legacy_options() -> DeOptions {
    DeOptions::new().replace_unresolved_globals().decode_strings()
}

/// Decode raw pickle bytes with the current options.
pub(crate) fn decode_pickle(bytes: &[u8]) -> Result<PickleValue, String> {
    serde_pickle::value_from_slice(bytes, current_options()).map_err(|e| e.to_string())
}

/// Decode one catalog column value.
///
/// A BLOB is tried with the current scheme first; TEXT, or a BLOB the current
/// scheme rejects, is retried as raw bytes under the legacy scheme. The error
/// carries both failure messages.
pub fn decode_column(value: ValueRef<'_>) -> Result<CatalogDecode<PickleValue>, String> {
    let (bytes, current_err) = match value {
        ValueRef::Null => return Ok(CatalogDecode::Absent),
        ValueRef::Blob(bytes) => match decode_pickle(bytes) {
            Ok(decoded) => return Ok(CatalogDecode::Current(decoded)),
            Err(e) => (bytes, e),
        },
        ValueRef::Text(bytes) => (bytes, "stored as text, not a binary pickle".to_string()),
        ValueRef::Integer(_) | ValueRef::Real(_) => {
            return Err(format!("expected a pickled blob, found {:?}", value.data_type()))
        }
    };

    serde_pickle::value_from_slice(bytes, legacy_options())
        .map(CatalogDecode::Legacy)
        .map_err(|legacy_err| format!("{current_err}; legacy decode: {legacy_err}"))
}

/// Render a dict key the way a JSON encoder would.
pub(crate) fn key_to_string(key: &HashableValue) -> String {
    match key {
        HashableValue::String(s) => s.clone(),
        HashableValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        HashableValue::I64(n) => n.to_string(),
        HashableValue::Int(n) => n.to_string(),
        HashableValue::F64(f) => f.to_string(),
        HashableValue::Bool(b) => b.to_string(),
        HashableValue::None => "null".to_string(),
        HashableValue::Tuple(items) => format!(
            "({})",
            items.iter().map(key_to_string).collect::<Vec<_>>().join(", ")
        ),
        HashableValue::FrozenSet(items) => format!(
            "{{{}}}",
            items.iter().map(key_to_string).collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Text content of a string-like pickle value.
pub(crate) fn as_text(value: &PickleValue) -> Option<String> {
    match value {
        PickleValue::String(s) => Some(s.clone()),
        PickleValue::Bytes(b) => String::from_utf8(b.clone()).ok(),
        _ => None,
    }
}

fn hashable_as_text(value: &HashableValue) -> Option<String> {
    match value {
        HashableValue::String(s) => Some(s.clone()),
        HashableValue::Bytes(b) => String::from_utf8(b.clone()).ok(),
        _ => None,
    }
}

/// Strings held by a str, list, tuple, set or frozenset value.
pub(crate) fn string_items(value: &PickleValue) -> Vec<String> {
    match value {
        PickleValue::String(_) | PickleValue::Bytes(_) => as_text(value).into_iter().collect(),
        PickleValue::List(items) | PickleValue::Tuple(items) => {
            items.iter().filter_map(as_text).collect()
        }
        PickleValue::Set(items) | PickleValue::FrozenSet(items) => {
            items.iter().filter_map(hashable_as_text).collect()
        }
        _ => Vec::new(),
    }
}

/// Look up a string key in a pickled dict, accepting byte-string keys.
pub(crate) fn dict_get<'a>(value: &'a PickleValue, key: &str) -> Option<&'a PickleValue> {
    match value {
        PickleValue::Dict(map) => map
            .get(&HashableValue::String(key.to_string()))
            .or_else(|| map.get(&HashableValue::Bytes(key.as_bytes().to_vec()))),
        _ => None,
    }
}

fn float_to_json(f: f64) -> JsonValue {
    Number::from_f64(f).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

fn bigint_to_json(text: String) -> JsonValue {
    text.parse::<Number>().map(JsonValue::Number).unwrap_or(JsonValue::String(text))
}

fn bytes_to_json(bytes: &[u8]) -> JsonValue {
    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect()),
    }
}

fn hashable_to_json(value: &HashableValue) -> JsonValue {
    match value {
        HashableValue::None => JsonValue::Null,
        HashableValue::Bool(b) => JsonValue::Bool(*b),
        HashableValue::I64(n) => JsonValue::from(*n),
        HashableValue::Int(n) => bigint_to_json(n.to_string()),
        HashableValue::F64(f) => float_to_json(*f),
        HashableValue::Bytes(b) => bytes_to_json(b),
        HashableValue::String(s) => JsonValue::String(s.clone()),
        HashableValue::Tuple(items) => JsonValue::Array(items.iter().map(hashable_to_json).collect()),
        HashableValue::FrozenSet(items) => {
            JsonValue::Array(items.iter().map(hashable_to_json).collect())
        }
    }
}

/// Convert a decoded pickle into JSON.
///
/// Tuples and sets become arrays, dict keys are stringified, non-finite
/// floats become `null`.
pub fn pickle_to_json(value: &PickleValue) -> JsonValue {
    match value {
        PickleValue::None => JsonValue::Null,
        PickleValue::Bool(b) => JsonValue::Bool(*b),
        PickleValue::I64(n) => JsonValue::from(*n),
        PickleValue::Int(n) => bigint_to_json(n.to_string()),
        PickleValue::F64(f) => float_to_json(*f),
        PickleValue::Bytes(b) => bytes_to_json(b),
        PickleValue::String(s) => JsonValue::String(s.clone()),
        PickleValue::List(items) | PickleValue::Tuple(items) => {
            JsonValue::Array(items.iter().map(pickle_to_json).collect())
        }
        PickleValue::Set(items) | PickleValue::FrozenSet(items) => {
            JsonValue::Array(items.iter().map(hashable_to_json).collect())
        }
        PickleValue::Dict(map) => {
            let object: Map<String, JsonValue> =
                map.iter().map(|(k, v)| (key_to_string(k), pickle_to_json(v))).collect();
            JsonValue::Object(object)
        }
    }
}
