//! Field maps: the named-value shape records are populated from.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use std::collections::BTreeMap;

/// Named attribute values, ordered by name.
pub type FieldMap = BTreeMap<String, Value>;

/// Convert a JSON object into a field map.
///
/// Returns an error if `json` is not an object.
pub fn field_map_from_json(json: &serde_json::Value) -> CodecResult<FieldMap> {
    match json {
        serde_json::Value::Object(obj) => Ok(obj
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect()),
        other => Err(CodecError::invalid_json(format!(
            "expected an object, found {}",
            json_kind(other)
        ))),
    }
}

/// Convert a field map into a JSON object.
pub fn field_map_to_json(fields: &FieldMap) -> serde_json::Value {
    serde_json::Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

/// Convert a map value with text keys into a field map.
///
/// Entries whose key is not text are dropped.
pub fn field_map_from_value(value: &Value) -> Option<FieldMap> {
    let pairs = value.as_map()?;
    Some(
        pairs
            .iter()
            .filter_map(|(k, v)| k.as_text().map(|name| (name.to_string(), v.clone())))
            .collect(),
    )
}

pub(crate) fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
