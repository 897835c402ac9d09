//! Ordered index keys.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use recordstore_codec::Value;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A totally ordered, hashable projection of a [`Value`].
///
/// Numbers are normalized so that `1`, `1.0` and the decimal `1.00` share a
/// key: integral floats and decimals become [`IndexKey::Integer`], every other
/// decimal becomes a [`IndexKey::Float`]. Integers and floats compare
/// numerically; keys of different kinds order by kind.
#[derive(Debug, Clone)]
pub enum IndexKey {
    /// Boolean.
    Bool(bool),
    /// Integral number.
    Integer(i64),
    /// Non-integral number.
    Float(f64),
    /// Text.
    Text(String),
    /// Bytes.
    Bytes(Vec<u8>),
    /// Date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time.
    DateTime(NaiveDateTime),
    /// Duration.
    Duration(Duration),
    /// Sequence of keys, compared lexicographically.
    List(Vec<IndexKey>),
}

impl IndexKey {
    /// Projects a value to a key.
    ///
    /// Returns `None` for nulls, maps, and lists containing either.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null | Value::Map(_) => return None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Integer(i) => Self::Integer(*i),
            Value::Float(f) => Self::from_float(*f),
            Value::Decimal(d) => {
                let normalized = d.normalized();
                match i64::try_from(normalized.mantissa()) {
                    Ok(i) if normalized.scale() == 0 => Self::Integer(i),
                    _ => Self::from_float(normalized.to_f64()),
                }
            }
            Value::Text(s) => Self::Text(s.clone()),
            Value::Bytes(b) => Self::Bytes(b.clone()),
            Value::Date(d) => Self::Date(*d),
            Value::Time(t) => Self::Time(*t),
            Value::DateTime(dt) => Self::DateTime(*dt),
            Value::Duration(d) => Self::Duration(*d),
            Value::List(items) => Self::List(
                items
                    .iter()
                    .map(Self::from_value)
                    .collect::<Option<Vec<_>>>()?,
            ),
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_float(f: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, which is out of range.
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Self::Integer(f as i64)
        } else {
            Self::Float(f)
        }
    }

    /// Converts the key back to a value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => Value::Integer(*i),
            Self::Float(f) => Value::Float(*f),
            Self::Text(s) => Value::Text(s.clone()),
            Self::Bytes(b) => Value::Bytes(b.clone()),
            Self::Date(d) => Value::Date(*d),
            Self::Time(t) => Value::Time(*t),
            Self::DateTime(dt) => Value::DateTime(*dt),
            Self::Duration(d) => Value::Duration(*d),
            Self::List(items) => Value::List(items.iter().map(Self::to_value).collect()),
        }
    }

    /// Returns the text of a text key.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if both keys are of the same kind, counting integers and
    /// floats as one kind.
    pub fn same_kind(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Integer(_) | Self::Float(_) => 1,
            Self::Text(_) => 2,
            Self::Bytes(_) => 3,
            Self::Date(_) => 4,
            Self::Time(_) => 5,
            Self::DateTime(_) => 6,
            Self::Duration(_) => 7,
            Self::List(_) => 8,
        }
    }
}

impl Ord for IndexKey {
    #[allow(clippy::cast_precision_loss)]
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            // Integers and floats never share a value, so ties break by variant.
            (Self::Integer(a), Self::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Self::Float(a), Self::Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Duration(a), Self::Duration(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexKey {}

impl Hash for IndexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Bool(b) => b.hash(state),
            Self::Integer(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            Self::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state);
            }
            Self::Text(s) => s.hash(state),
            Self::Bytes(b) => b.hash(state),
            Self::Date(d) => d.hash(state),
            Self::Time(t) => t.hash(state),
            Self::DateTime(dt) => dt.hash(state),
            Self::Duration(d) => d.hash(state),
            Self::List(items) => items.hash(state),
        }
    }
}

impl From<&str> for IndexKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for IndexKey {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordstore_codec::Decimal;

    #[test]
    fn numbers_normalize_to_one_key() {
        let int = IndexKey::from_value(&Value::Integer(3)).unwrap();
        let float = IndexKey::from_value(&Value::Float(3.0)).unwrap();
        let decimal = IndexKey::from_value(&Value::Decimal(Decimal::new(300, 2))).unwrap();
        assert_eq!(int, float);
        assert_eq!(int, decimal);
        assert_eq!(float, IndexKey::Integer(3));
    }

    #[test]
    fn mixed_numbers_order_numerically() {
        let mut keys = vec![
            IndexKey::Float(2.5),
            IndexKey::Integer(3),
            IndexKey::Integer(-1),
            IndexKey::Float(0.5),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                IndexKey::Integer(-1),
                IndexKey::Float(0.5),
                IndexKey::Float(2.5),
                IndexKey::Integer(3),
            ]
        );
    }

    #[test]
    fn kinds_order_by_rank() {
        assert!(IndexKey::Bool(true) < IndexKey::Integer(0));
        assert!(IndexKey::Integer(i64::MAX) < IndexKey::Text(String::new()));
        assert!(IndexKey::Text("z".into()) < IndexKey::Bytes(vec![]));
    }

    #[test]
    fn unindexable_values() {
        assert!(IndexKey::from_value(&Value::Null).is_none());
        assert!(IndexKey::from_value(&Value::Map(vec![])).is_none());
        assert!(IndexKey::from_value(&Value::List(vec![Value::Null])).is_none());
        assert_eq!(
            IndexKey::from_value(&Value::List(vec![Value::from("a")])),
            Some(IndexKey::List(vec![IndexKey::from("a")]))
        );
    }

    #[test]
    fn to_value_inverts_projection() {
        let key = IndexKey::Text("hello".into());
        assert_eq!(key.to_value(), Value::from("hello"));
    }
}
