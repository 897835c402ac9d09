//! Closed value model for record attributes.

use crate::decimal::Decimal;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A dynamic attribute value.
///
/// `Value` is the complete set of shapes an incoming field can take. Only a
/// subset is *storable* on a record (see [`Value::is_storable`]): scalars,
/// and homogeneous lists or maps of scalars. Anything else (nulls, nested
/// collections, mixed collections) can be represented but is never copied
/// onto a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Fixed-point decimal.
    Decimal(Decimal),
    /// Text string (UTF-8).
    Text(String),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without zone.
    DateTime(NaiveDateTime),
    /// Signed duration.
    Duration(#[serde(with = "duration_parts")] Duration),
    /// Sequence of values.
    List(Vec<Value>),
    /// Key/value pairs in insertion order.
    Map(Vec<(Value, Value)>),
}

/// Coarse classification of scalar values.
///
/// Collections are homogeneous when every element shares one kind.
/// Integers, floats and decimals all count as [`ScalarKind::Number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Boolean.
    Bool,
    /// Integer, float or decimal.
    Number,
    /// Text string.
    Text,
    /// Byte string.
    Bytes,
    /// Date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    DateTime,
    /// Duration.
    Duration,
}

impl Value {
    /// Returns the scalar kind, or `None` for nulls and collections.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Bool(_) => Some(ScalarKind::Bool),
            Value::Integer(_) | Value::Float(_) | Value::Decimal(_) => Some(ScalarKind::Number),
            Value::Text(_) => Some(ScalarKind::Text),
            Value::Bytes(_) => Some(ScalarKind::Bytes),
            Value::Date(_) => Some(ScalarKind::Date),
            Value::Time(_) => Some(ScalarKind::Time),
            Value::DateTime(_) => Some(ScalarKind::DateTime),
            Value::Duration(_) => Some(ScalarKind::Duration),
            Value::Null | Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Returns true for non-null, non-collection values.
    pub fn is_scalar(&self) -> bool {
        self.scalar_kind().is_some()
    }

    /// Returns true if this value may be copied onto a record.
    ///
    /// Storable values are scalars, lists whose elements are scalars of one
    /// kind, and maps whose keys share one scalar kind and whose values share
    /// one scalar kind. Empty collections are storable.
    pub fn is_storable(&self) -> bool {
        match self {
            Value::List(items) => homogeneous(items.iter()),
            Value::Map(pairs) => {
                homogeneous(pairs.iter().map(|(k, _)| k))
                    && homogeneous(pairs.iter().map(|(_, v)| v))
            }
            other => other.is_scalar(),
        }
    }

    /// Returns true if both values hold the same data.
    ///
    /// Numbers compare by value across integers, floats and decimals, so
    /// `Integer(1)`, `Float(1.0)` and `Decimal(1.00)` are equivalent. Lists
    /// and maps compare element-wise; every other pairing uses `==`.
    pub fn equivalent(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => {
                float_equals_integer(*f, *i)
            }
            (Value::Integer(i), Value::Decimal(d)) | (Value::Decimal(d), Value::Integer(i)) => {
                let d = d.normalized();
                d.scale() == 0 && d.mantissa() == i128::from(*i)
            }
            (Value::Float(f), Value::Decimal(d)) | (Value::Decimal(d), Value::Float(f)) => {
                d.to_f64() == *f
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equivalent(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka.equivalent(kb) && va.equivalent(vb))
            }
            _ => self == other,
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Duration(_) => "duration",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a float; integers and decimals are widened.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            Value::Decimal(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a text string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as bytes, if it is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up a text key in this map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_text() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

// Exact: integers beyond 2^53 never match a float that merely rounds to them.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_equals_integer(f: f64, i: i64) -> bool {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    f.fract() == 0.0 && (-BOUND..BOUND).contains(&f) && f as i64 == i
}

fn homogeneous<'a>(mut items: impl Iterator<Item = &'a Value>) -> bool {
    let Some(first) = items.next() else {
        return true;
    };
    let Some(kind) = first.scalar_kind() else {
        return false;
    };
    items.all(|v| v.scalar_kind() == Some(kind))
}

mod duration_parts {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        (d.num_seconds(), d.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let (secs, nanos) = <(i64, i32)>::deserialize(deserializer)?;
        Duration::try_seconds(secs)
            .map(|d| d + Duration::nanoseconds(i64::from(nanos)))
            .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {secs}s")))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}
