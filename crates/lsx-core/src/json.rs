//! Helpers for the source API's loosely shaped JSON
//!
//! The Lightspeed API represents a nested relation with one entry as a bare
//! object and a relation with many entries as an array; an absent relation
//! is simply missing. [`normalize_to_list`] makes every caller see a list.

use serde_json::Value;

/// Normalize an optional object-or-array value to a list
///
/// Total over the three shapes the API produces: absent/null -> empty,
/// single object -> one-element list, array -> its elements. Scalar values
/// normalize to empty rather than erroring.
pub fn normalize_to_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(object @ Value::Object(_)) => vec![object.clone()],
        _ => Vec::new(),
    }
}

/// Trimmed string form of a record field; missing or non-scalar -> ""
///
/// Numeric and boolean values are stringified because the API is
/// inconsistent about quoting (e.g. `"tax": true` vs `"tax": "true"`).
pub fn text(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
