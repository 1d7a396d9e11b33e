//! Tolerant navigation of semi-structured upstream payloads
//!
//! The registry API returns the same logical field under different keys and
//! nesting depths depending on endpoint and entity type. Callers describe each
//! logical field as an ordered list of [`FieldPath`]s and resolve it with
//! [`pick_first`]; numeric fields go through [`leading_int`].

use serde_json::Value;

/// Keys probed, in order, for a list of records inside a response object
pub const CONTAINER_KEYS: &[&str] = &[
    "items",
    "data",
    "result",
    "results",
    "rows",
    "Результат",
    "Результаты",
];

/// A path of object keys from a record root to one field
pub type FieldPath = &'static [&'static str];

/// Walk `path` through nested objects. Absent when a key is missing or an
/// intermediate value is not an object.
pub fn pick<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

/// First present value among `paths`, in priority order
pub fn pick_first<'a>(value: &'a Value, paths: &[FieldPath]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| pick(value, path))
        .find(|candidate| is_present(candidate))
}

/// Upstream uses null, zero and empty strings interchangeably for "unknown"
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(false, |n| n != 0.0),
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Render a scalar as trimmed text. Arrays of scalars are joined with ", ";
/// objects and booleans become empty.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_array())
            .map(text_of)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Bool(_) | Value::Object(_) => String::new(),
    }
}

/// Text of the first present value among `paths`, or empty
pub fn text_at(value: &Value, paths: &[FieldPath]) -> String {
    pick_first(value, paths).map(text_of).unwrap_or_default()
}

/// Leading integer of the first present value among `paths`, or 0
pub fn int_at(value: &Value, paths: &[FieldPath]) -> u64 {
    pick_first(value, paths).map_or(0, |found| int_of(found, 0))
}

/// Integer reading of a JSON value with digit-extraction semantics for text
pub fn int_of(value: &Value, default: u64) -> u64 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
            .unwrap_or(default),
        Value::String(text) => leading_int(text, default),
        _ => default,
    }
}

/// First run of ASCII digits in `text`, e.g. `"150+"` is 150 and
/// `"100-200"` is 100. Returns `default` when there are no digits or the run
/// overflows.
pub fn leading_int(text: &str, default: u64) -> u64 {
    let digits: String = text
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return default;
    }
    digits.parse().unwrap_or(default)
}

/// Resolve the record list of a response: a bare array, an array under one of
/// [`CONTAINER_KEYS`], or `data.items`. Only object entries are returned;
/// anything unrecognized yields no records.
pub fn extract_items(payload: &Value) -> Vec<&Value> {
    let list = match payload {
        Value::Array(items) => Some(items),
        Value::Object(fields) => CONTAINER_KEYS
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_array))
            .or_else(|| pick(payload, &["data", "items"]).and_then(Value::as_array)),
        _ => None,
    };

    list.map(|items| items.iter().filter(|item| item.is_object()).collect())
        .unwrap_or_default()
}
