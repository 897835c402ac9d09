//! Conversion between [`Value`] and `serde_json::Value`.

use crate::error::CodecResult;
use crate::value::Value;
use serde_json::{Map, Number};

impl Value {
    /// Convert a JSON value.
    ///
    /// Numbers become integers when they fit in an `i64` and floats
    /// otherwise. Objects become maps with text keys, in document order.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => number_to_value(n),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (Value::Text(k.clone()), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Parse JSON text into a value.
    pub fn parse_json(text: &str) -> CodecResult<Value> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from_json(&json))
    }

    /// Convert to a JSON value for export.
    ///
    /// Temporal values are rendered in ISO 8601, decimals as strings to keep
    /// their precision, durations as fractional seconds and bytes as an array
    /// of octets. Non-text map keys use their JSON rendering as the key.
    ///
    /// The rendering is one-way: [`Value::from_json`] reads those forms back
    /// as text, numbers and lists.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::Number((*n).into()),
            Value::Float(f) => float_to_json(*f),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => {
                serde_json::Value::Array(b.iter().map(|octet| (*octet).into()).collect())
            }
            Value::Date(d) => serde_json::Value::String(d.to_string()),
            Value::Time(t) => serde_json::Value::String(t.to_string()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            Value::Duration(d) => {
                #[allow(clippy::cast_precision_loss)]
                let secs = d.num_seconds() as f64 + f64::from(d.subsec_nanos()) / 1e9;
                float_to_json(secs)
            }
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(pairs) => {
                let mut obj = Map::new();
                for (k, v) in pairs {
                    let key = match k {
                        Value::Text(s) => s.clone(),
                        other => other.to_json().to_string(),
                    };
                    obj.insert(key, v.to_json());
                }
                serde_json::Value::Object(obj)
            }
        }
    }
}

fn number_to_value(n: &Number) -> Value {
    match n.as_i64() {
        Some(i) => Value::Integer(i),
        None => n.as_f64().map_or(Value::Null, Value::Float),
    }
}

fn float_to_json(f: f64) -> serde_json::Value {
    Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Decimal;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn numbers_prefer_integers() {
        assert_eq!(Value::from_json(&json!(5)), Value::Integer(5));
        assert_eq!(Value::from_json(&json!(2.5)), Value::Float(2.5));
        assert_eq!(Value::from_json(&json!(-3)), Value::Integer(-3));
    }

    #[test]
    fn objects_keep_document_order_keys() {
        let value = Value::from_json(&json!({"title": "a", "count": 3}));
        assert_eq!(value.get("title"), Some(&Value::from("a")));
        assert_eq!(value.get("count"), Some(&Value::Integer(3)));
    }

    #[test]
    fn parse_json_rejects_garbage() {
        assert!(Value::parse_json("{not json").is_err());
        assert_eq!(Value::parse_json("[1, 2]").unwrap().as_list().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn export_renders_temporal_and_decimal_as_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(date).to_json(), json!("2024-02-29"));
        let price: Decimal = "12.50".parse().unwrap();
        assert_eq!(Value::Decimal(price).to_json(), json!("12.50"));
    }

    #[test]
    fn export_of_json_shaped_values_is_lossless() {
        let source = json!({"tags": ["x", "y"], "flag": true, "n": 7});
        assert_eq!(Value::from_json(&source).to_json(), source);
    }
}
