//! Fuzz testing harnesses for recordstore.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks. Every target must return normally for any
//! input; invariant violations panic.

use crate::generators::ContainerOperation;
use recordstore_codec::{FieldMap, Value};
use recordstore_core::{
    ChangeFeed, ContainerConfig, ContainerSnapshot, RecordContainer, RecordUid, UID_KEY,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Checks the order/entries invariants of a container.
///
/// # Panics
///
/// Panics if the order and the stored records disagree.
pub fn assert_container_consistent(container: &RecordContainer) {
    let keys = container.keys();
    assert_eq!(keys.len(), container.len(), "Order length differs from entries");
    let unique: HashSet<&RecordUid> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len(), "Duplicate UID in order");
    for uid in keys {
        let record = container.get(uid).expect("Ordered UID has no record");
        assert_eq!(record.uid(), *uid, "Record stored under a foreign UID");
        assert_eq!(record.parent(), Some(container.id()), "Record has wrong parent");
    }
}

/// Fuzz target for bulk sync payloads.
///
/// Arbitrary bytes are read as JSON text. The sync either applies or fails
/// without touching the container.
pub fn fuzz_bulk_payload(data: &[u8]) {
    let text = String::from_utf8_lossy(data);
    let mut container = RecordContainer::new();
    let seed = RecordUid::new();
    let mut entry = FieldMap::new();
    entry.insert(UID_KEY.to_string(), seed.into());
    if container.update(&entry, true).is_err() {
        return;
    }

    match container.update_all(&*text) {
        Ok(()) => assert_container_consistent(&container),
        Err(_) => {
            assert_eq!(container.keys(), &[seed], "Failed sync changed the container");
        }
    }
}

/// Fuzz target for UID parsing.
///
/// Accepted keys round-trip through their string form.
pub fn fuzz_record_uid(data: &[u8]) {
    let text = String::from_utf8_lossy(data);
    if let Ok(uid) = RecordUid::parse(&text) {
        let reparsed = RecordUid::parse(&uid.to_string()).expect("Formatted UID must parse");
        assert_eq!(uid, reparsed, "UID roundtrip mismatch");
    }
}

/// Fuzz target for snapshot decoding.
///
/// Decoded snapshots that validate can always be restored.
pub fn fuzz_snapshot_decode(data: &[u8]) {
    let Ok(snapshot) = ContainerSnapshot::from_cbor(data) else {
        return;
    };
    if snapshot.validate().is_err() {
        return;
    }
    let expected = snapshot.records.len();
    let container: RecordContainer = snapshot
        .into_container(ContainerConfig::default(), Arc::new(ChangeFeed::new()))
        .expect("Validated snapshot must restore");
    assert_eq!(container.len(), expected);
}

/// Fuzz target for container operations.
///
/// Bytes are decoded into an operation sequence; the container stays
/// consistent after every step.
pub fn fuzz_container_operations(data: &[u8]) {
    let mut container = RecordContainer::new();
    for op in decode_operations(data) {
        // Errors are acceptable; inconsistency is not.
        let _ = op.apply(&mut container);
        assert_container_consistent(&container);
    }
}

fn decode_operations(data: &[u8]) -> Vec<ContainerOperation> {
    data.chunks_exact(3)
        .map(|chunk| {
            let (op, raw_target, payload) = (chunk[0], chunk[1], chunk[2]);
            let target = usize::from(raw_target);
            match op % 5 {
                0 => ContainerOperation::Add {
                    fields: fields_from(payload),
                },
                1 => ContainerOperation::Update {
                    target,
                    fields: fields_from(payload),
                },
                2 => ContainerOperation::Remove { target },
                3 => ContainerOperation::Reorder {
                    target,
                    offset: isize::from(i8::from_ne_bytes([payload])),
                },
                _ => ContainerOperation::Sync {
                    entries: (0..payload % 4)
                        .map(|i| {
                            let mut entry = fields_from(payload.wrapping_add(i));
                            let bits = (u128::from(raw_target) << 8) | (u128::from(i) + 1);
                            let uid = RecordUid::from_uuid(Uuid::from_u128(bits));
                            entry.insert(UID_KEY.to_string(), uid.into());
                            entry
                        })
                        .collect(),
                },
            }
        })
        .collect()
}

fn fields_from(byte: u8) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(format!("f{}", byte % 4), Value::Integer(i64::from(byte)));
    if byte % 3 == 0 {
        fields.insert("_private".to_string(), Value::Bool(true));
    }
    if byte % 7 == 0 {
        fields.insert("nothing".to_string(), Value::Null);
    }
    fields
}
