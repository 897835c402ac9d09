//! Property-based test generators using proptest.
//!
//! Provides strategies for record UIDs, attribute values, field maps, bulk
//! sync batches and container operation sequences.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use recordstore_codec::{Decimal, FieldMap, Value};
use recordstore_core::{CoreResult, RecordContainer, RecordUid, UID_KEY};
use std::collections::HashSet;
use uuid::Uuid;

/// Strategy for generating non-nil record UIDs.
pub fn record_uid_strategy() -> impl Strategy<Value = RecordUid> {
    any::<u128>()
        .prop_filter("UID must not be nil", |bits| *bits != 0)
        .prop_map(|bits| RecordUid::from_uuid(Uuid::from_u128(bits)))
}

/// Strategy for generating copyable field names.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}")
        .expect("Invalid regex")
        .prop_filter("Reserved key", |s| s != UID_KEY)
}

/// Strategy for generating private field names, which are never copied.
pub fn private_field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("_[a-z0-9_]{1,8}").expect("Invalid regex")
}

/// Strategy for generating scalar values of every storable kind.
///
/// Floats are finite so that equality-based change detection is
/// well defined.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9..1.0e9f64).prop_map(Value::Float),
        (any::<i64>(), 0u32..6)
            .prop_map(|(m, scale)| Value::Decimal(Decimal::new(i128::from(m), scale))),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::Text),
        vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
        date_strategy().prop_map(Value::Date),
        time_strategy().prop_map(Value::Time),
        (date_strategy(), time_strategy())
            .prop_map(|(d, t)| Value::DateTime(NaiveDateTime::new(d, t))),
        (-1_000_000i64..1_000_000)
            .prop_filter_map("Duration out of range", |s| Duration::try_seconds(s).map(Value::Duration)),
    ]
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1i32..3000, 1u32..13, 1u32..29)
        .prop_filter_map("Invalid date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

fn time_strategy() -> impl Strategy<Value = NaiveTime> {
    (0u32..86_400)
        .prop_filter_map("Invalid time", |s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0))
}

/// Strategy for generating values a record will store.
pub fn storable_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        6 => scalar_value_strategy(),
        1 => vec(any::<i64>().prop_map(Value::Integer), 0..4).prop_map(Value::List),
        1 => vec("[a-z]{1,6}".prop_map(Value::Text), 0..4).prop_map(Value::List),
        1 => vec(("[a-z]{1,6}", any::<i32>()), 0..4).prop_map(|pairs| {
            Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (Value::Text(k), Value::from(v)))
                    .collect(),
            )
        }),
    ]
}

/// Strategy for generating values a record refuses to store.
pub fn unstorable_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        ("[a-z]{1,6}", any::<i64>())
            .prop_map(|(s, i)| Value::List(vec![Value::Text(s), Value::Integer(i)])),
        vec(any::<i64>().prop_map(Value::Integer), 1..3)
            .prop_map(|inner| Value::List(vec![Value::List(inner)])),
        ("[a-z]{1,6}", any::<bool>()).prop_map(|(k, b)| {
            Value::Map(vec![
                (Value::Text(k), Value::Bool(b)),
                (Value::Integer(1), Value::Bool(b)),
            ])
        }),
    ]
}

/// Strategy for generating field maps of storable values.
pub fn field_map_strategy() -> impl Strategy<Value = FieldMap> {
    btree_map(field_name_strategy(), storable_value_strategy(), 0..6)
}

/// Strategy for generating field maps mixing copyable and skipped fields.
pub fn mixed_field_map_strategy() -> impl Strategy<Value = FieldMap> {
    let entry = prop_oneof![
        3 => (field_name_strategy(), storable_value_strategy()),
        1 => (field_name_strategy(), unstorable_value_strategy()),
        1 => (private_field_name_strategy(), storable_value_strategy()),
    ];
    vec(entry, 0..8).prop_map(|pairs| pairs.into_iter().collect())
}

/// Strategy for generating one bulk sync entry carrying a UID.
pub fn entry_strategy() -> impl Strategy<Value = FieldMap> {
    (record_uid_strategy(), field_map_strategy()).prop_map(|(uid, mut fields)| {
        fields.insert(UID_KEY.to_string(), uid.into());
        fields
    })
}

/// Strategy for generating bulk sync batches with distinct UIDs.
pub fn batch_strategy(max_entries: usize) -> impl Strategy<Value = Vec<FieldMap>> {
    vec(entry_strategy(), 0..max_entries).prop_map(|entries| {
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .filter(|entry| seen.insert(entry.get(UID_KEY).and_then(Value::as_text).map(str::to_string)))
            .collect()
    })
}

/// Container operations for testing.
///
/// Targets are positions taken modulo the container length at apply time,
/// so every generated sequence is meaningful whatever the container holds.
#[derive(Debug, Clone)]
pub enum ContainerOperation {
    /// Update-or-add a new record.
    Add {
        /// Record fields.
        fields: FieldMap,
    },
    /// Update the record at a position.
    Update {
        /// Target position.
        target: usize,
        /// Fields to copy.
        fields: FieldMap,
    },
    /// Remove the record at a position.
    Remove {
        /// Target position.
        target: usize,
    },
    /// Move the record at a position.
    Reorder {
        /// Target position.
        target: usize,
        /// New position, clamped by the container.
        offset: isize,
    },
    /// Replace the contents with a batch.
    Sync {
        /// Batch entries.
        entries: Vec<FieldMap>,
    },
}

impl ContainerOperation {
    /// Applies the operation.
    ///
    /// Positional operations on an empty container do nothing.
    pub fn apply(&self, container: &mut RecordContainer) -> CoreResult<()> {
        match self {
            Self::Add { fields } => {
                let mut data = fields.clone();
                data.insert(UID_KEY.to_string(), RecordUid::new().into());
                container.update(&data, false)?;
            }
            Self::Update { target, fields } => {
                if let Some(uid) = uid_at(container, *target) {
                    let mut data = fields.clone();
                    data.insert(UID_KEY.to_string(), uid.into());
                    container.update(&data, false)?;
                }
            }
            Self::Remove { target } => {
                if let Some(uid) = uid_at(container, *target) {
                    container.remove(&uid)?;
                }
            }
            Self::Reorder { target, offset } => {
                if let Some(uid) = uid_at(container, *target) {
                    container.reorder(&uid, *offset)?;
                }
            }
            Self::Sync { entries } => container.update_all(entries.clone())?,
        }
        Ok(())
    }
}

fn uid_at(container: &RecordContainer, target: usize) -> Option<RecordUid> {
    let keys = container.keys();
    (!keys.is_empty()).then(|| keys[target % keys.len()])
}

/// Strategy for generating container operations.
pub fn container_operation_strategy() -> impl Strategy<Value = ContainerOperation> {
    prop_oneof![
        4 => field_map_strategy().prop_map(|fields| ContainerOperation::Add { fields }),
        3 => (any::<usize>(), field_map_strategy())
            .prop_map(|(target, fields)| ContainerOperation::Update { target, fields }),
        2 => any::<usize>().prop_map(|target| ContainerOperation::Remove { target }),
        2 => (any::<usize>(), -3isize..12)
            .prop_map(|(target, offset)| ContainerOperation::Reorder { target, offset }),
        1 => batch_strategy(6).prop_map(|entries| ContainerOperation::Sync { entries }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<ContainerOperation>> {
    vec(container_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
