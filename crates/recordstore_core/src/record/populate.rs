//! Field-copy whitelist.

use super::uid::UID_KEY;
use recordstore_codec::{FieldMap, Value};
use tracing::trace;

/// Returns true if a field may be copied onto a record.
///
/// Names starting with `_` and the reserved UID key are never copied; other
/// names are copied when their value is storable (see
/// [`Value::is_storable`]).
#[must_use]
pub fn is_copyable_field(name: &str, value: &Value) -> bool {
    !name.starts_with('_') && name != UID_KEY && value.is_storable()
}

/// Copies whitelisted fields from `data` into `target`.
///
/// Disallowed fields are skipped silently. Returns the names whose value
/// changed, in `data` order; an unchanged value is not rewritten. Numbers
/// are compared by value (see [`Value::equivalent`]), so re-sending `1.0`
/// for a stored `1` keeps the stored integer.
pub fn populate_fields(target: &mut FieldMap, data: &FieldMap) -> Vec<String> {
    let mut changelog = Vec::new();
    for (name, value) in data {
        if !is_copyable_field(name, value) {
            trace!(field = %name, kind = value.type_name(), "skipping field");
            continue;
        }
        if !target.get(name).is_some_and(|old| old.equivalent(value)) {
            target.insert(name.clone(), value.clone());
            changelog.push(name.clone());
        }
    }
    changelog
}

/// Returns the storable attributes of `attributes`.
///
/// Used to copy a stand-in record's data through the same whitelist as a
/// field map.
#[must_use]
pub fn storable_attributes(attributes: &FieldMap) -> FieldMap {
    attributes
        .iter()
        .filter(|(name, value)| is_copyable_field(name, value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn skips_private_and_uid_keys() {
        let mut target = FieldMap::new();
        let data = fields(&[
            ("_bad_name", Value::Bool(true)),
            (UID_KEY, Value::from("00000000-0000-0000-0000-000000000001")),
            ("count", Value::Integer(2)),
        ]);
        let changed = populate_fields(&mut target, &data);
        assert_eq!(changed, vec!["count".to_string()]);
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn skips_disallowed_values() {
        let mut target = FieldMap::new();
        let data = fields(&[
            ("nothing", Value::Null),
            ("mixed", Value::List(vec![Value::Integer(1), Value::from("a")])),
            ("tags", Value::List(vec![Value::from("a"), Value::from("b")])),
        ]);
        let changed = populate_fields(&mut target, &data);
        assert_eq!(changed, vec!["tags".to_string()]);
        assert!(!target.contains_key("nothing"));
        assert!(!target.contains_key("mixed"));
    }

    #[test]
    fn changelog_names_exactly_changed_keys() {
        let mut target = fields(&[("a", Value::Integer(1)), ("b", Value::Integer(2))]);
        let data = fields(&[("a", Value::Integer(1)), ("b", Value::Integer(3)), ("c", Value::Integer(4))]);
        let changed = populate_fields(&mut target, &data);
        assert_eq!(changed, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn numerically_equal_values_are_unchanged() {
        let mut target = fields(&[("n", Value::Integer(1)), ("xs", Value::List(vec![Value::Float(2.0)]))]);
        let data = fields(&[("n", Value::Float(1.0)), ("xs", Value::List(vec![Value::Integer(2)]))]);
        assert!(populate_fields(&mut target, &data).is_empty());
        assert_eq!(target["n"], Value::Integer(1));

        let data = fields(&[("n", Value::Float(1.5))]);
        assert_eq!(populate_fields(&mut target, &data), vec!["n".to_string()]);
        assert_eq!(target["n"], Value::Float(1.5));
    }

    #[test]
    fn storable_attributes_filters() {
        let attrs = fields(&[("ok", Value::Integer(1)), ("bad", Value::Null), ("_hidden", Value::Integer(2))]);
        let kept = storable_attributes(&attrs);
        assert_eq!(kept.keys().collect::<Vec<_>>(), vec!["ok"]);
    }
}
