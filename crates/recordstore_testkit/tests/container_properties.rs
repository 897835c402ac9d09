//! Property tests for record containers.

use proptest::prelude::*;
use recordstore_codec::FieldMap;
use recordstore_core::{EventKind, Record, RecordContainer, RecordUid, UID_KEY};
use recordstore_testkit::prelude::*;
use std::collections::BTreeSet;

fn filled(entries: &[FieldMap]) -> TestContainer {
    let mut test = TestContainer::new();
    test.update_all(entries.to_vec()).unwrap();
    test.drain_events();
    test
}

fn order_of(container: &RecordContainer) -> Vec<RecordUid> {
    container.iter().copied().collect()
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn operations_keep_order_and_entries_consistent(
        ops in operation_sequence_strategy(1, 40)
    ) {
        let mut container = RecordContainer::new();
        for op in &ops {
            op.apply(&mut container).unwrap();
            assert_container_consistent(&container);
        }
        let values: Vec<RecordUid> = container.values().map(Record::uid).collect();
        prop_assert_eq!(values, order_of(&container));
    }

    #[test]
    fn adding_the_same_record_twice_keeps_one_entry(
        batch in batch_strategy(6),
        fields in field_map_strategy(),
    ) {
        let mut test = filled(&batch);
        let mut record = Record::new();
        record.populate(&fields);
        let uid = record.uid();

        test.add(record.clone()).unwrap();
        let position = test.position(&uid);
        let len = test.len();
        test.add(record).unwrap();

        prop_assert_eq!(test.len(), len);
        prop_assert_eq!(test.position(&uid), position);
        prop_assert_eq!(position, Some(len - 1));
    }

    #[test]
    fn reorder_can_be_undone(
        batch in batch_strategy(10),
        target in any::<usize>(),
        offset in 0isize..12,
    ) {
        prop_assume!(!batch.is_empty());
        let mut test = filled(&batch);
        let original = order_of(&test);
        let uid = original[target % original.len()];
        let from = test.position(&uid).unwrap();

        test.reorder(&uid, offset).unwrap();
        let clamped = usize::try_from(offset).unwrap().min(original.len() - 1);
        prop_assert_eq!(test.position(&uid), Some(clamped));

        test.reorder(&uid, isize::try_from(from).unwrap()).unwrap();
        prop_assert_eq!(order_of(&test), original);
        prop_assert!(test.drain_events().is_empty());
    }

    #[test]
    fn bulk_sync_is_idempotent(
        initial in batch_strategy(6),
        batch in batch_strategy(8),
    ) {
        let mut test = filled(&initial);
        test.update_all(batch.clone()).unwrap();
        let expected: Vec<RecordUid> = batch
            .iter()
            .map(|entry| RecordUid::from_value(&entry[UID_KEY]).unwrap())
            .collect();
        prop_assert_eq!(order_of(&test), expected);
        let state = test.to_json();
        test.drain_events();

        test.update_all(batch).unwrap();
        prop_assert!(test.drain_events().is_empty());
        prop_assert_eq!(test.to_json(), state);
    }

    #[test]
    fn removal_preserves_relative_order(
        batch in batch_strategy(10),
        target in any::<usize>(),
    ) {
        prop_assume!(!batch.is_empty());
        let mut test = filled(&batch);
        let mut expected = order_of(&test);
        let uid = expected.remove(target % expected.len());

        let removed = test.remove(&uid).unwrap();
        prop_assert_eq!(removed.uid(), uid);
        prop_assert_eq!(order_of(&test), expected);
        prop_assert!(test.get(&uid).is_none());
        prop_assert_eq!(test.drain_kinds(), vec![EventKind::Removed]);
    }

    #[test]
    fn only_whitelisted_fields_are_stored(data in mixed_field_map_strategy()) {
        let mut record = Record::new();
        record.populate(&data);

        let expected: FieldMap = data
            .iter()
            .filter(|(name, value)| {
                !name.starts_with('_') && name.as_str() != UID_KEY && value.is_storable()
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        prop_assert_eq!(record.attributes(), &expected);
    }

    #[test]
    fn modified_event_names_exactly_the_changed_fields(
        before in field_map_strategy(),
        after in mixed_field_map_strategy(),
    ) {
        let mut test = TestContainer::new();
        let uid = RecordUid::new();
        let mut first = before.clone();
        first.insert(UID_KEY.to_string(), uid.into());
        test.update(&first, true).unwrap();
        test.drain_events();

        let expected: BTreeSet<String> = after
            .iter()
            .filter(|(name, value)| {
                !name.starts_with('_')
                    && value.is_storable()
                    && !before.get(name.as_str()).is_some_and(|old| old.equivalent(value))
            })
            .map(|(name, _)| name.clone())
            .collect();

        let mut second = after.clone();
        second.insert(UID_KEY.to_string(), uid.into());
        test.update(&second, false).unwrap();
        let events = test.drain_events();

        let record_events: Vec<_> = events.iter().filter(|e| !e.is_container_event()).collect();
        if expected.is_empty() {
            prop_assert!(events.is_empty());
        } else {
            prop_assert_eq!(record_events.len(), 1);
            prop_assert_eq!(record_events[0].kind, EventKind::Modified);
            let named: BTreeSet<String> = record_events[0].changed_fields.iter().cloned().collect();
            prop_assert_eq!(named, expected);
            prop_assert_eq!(events.len(), 2);
            prop_assert!(events[1].is_container_event());
        }
    }
}
