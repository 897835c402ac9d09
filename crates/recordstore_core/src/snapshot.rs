//! Container snapshots.
//!
//! A snapshot captures a container's records in order plus its metadata, so
//! that a host persistence engine can store the container as opaque CBOR
//! bytes and rebuild it later. Restoring fires no events.

use crate::config::ContainerConfig;
use crate::container::RecordContainer;
use crate::error::{CoreError, CoreResult};
use crate::event::EventSink;
use crate::record::{Record, RecordUid};
use crate::types::ContainerId;
use recordstore_codec::{from_cbor, to_cbor, FieldMap};
use recordstore_storage::EntryStorage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Serializable image of a record container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// Identifier of the captured container.
    pub id: ContainerId,
    /// Records in container order.
    pub records: Vec<Record>,
    /// Container metadata.
    #[serde(default)]
    pub metadata: FieldMap,
}

impl ContainerSnapshot {
    /// Encodes the snapshot as CBOR.
    pub fn to_cbor(&self) -> CoreResult<Vec<u8>> {
        Ok(to_cbor(self)?)
    }

    /// Decodes a snapshot from CBOR.
    pub fn from_cbor(bytes: &[u8]) -> CoreResult<Self> {
        Ok(from_cbor(bytes)?)
    }

    /// Checks that every record has a distinct, non-empty UID.
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen: HashSet<RecordUid> = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            let uid = record.uid();
            if uid.is_nil() {
                return Err(CoreError::EmptyUid);
            }
            if !seen.insert(uid) {
                return Err(CoreError::DuplicateUid {
                    uid: uid.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Rebuilds a container with the captured identity, order and metadata.
    pub fn into_container<S>(
        self,
        config: ContainerConfig,
        sink: Arc<dyn EventSink>,
    ) -> CoreResult<RecordContainer<S>>
    where
        S: EntryStorage<RecordUid, Record>,
    {
        self.validate()?;
        let mut container = RecordContainer::from_parts(self.id, config, sink);
        container.restore_parts(self.records, self.metadata);
        Ok(container)
    }
}

impl<S: EntryStorage<RecordUid, Record>> RecordContainer<S> {
    /// Captures the container's records, order and metadata.
    #[must_use]
    pub fn snapshot(&self) -> ContainerSnapshot {
        ContainerSnapshot {
            id: self.id(),
            records: self.values().cloned().collect(),
            metadata: self.metadata().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeFeed;
    use crate::record::UID_KEY;
    use crate::BTreeRecordContainer;
    use chrono::NaiveDate;
    use recordstore_codec::{Decimal, Value};

    fn populated() -> RecordContainer {
        let mut container = RecordContainer::new();
        for n in 0..3 {
            let mut data = FieldMap::new();
            data.insert(UID_KEY.to_string(), RecordUid::new().into());
            data.insert("n".to_string(), Value::Integer(n));
            data.insert("price".to_string(), Value::Decimal(Decimal::new(1999, 2)));
            data.insert(
                "born".to_string(),
                Value::Date(NaiveDate::from_ymd_opt(1977, 6, 1).unwrap()),
            );
            container.update(&data, true).unwrap();
        }
        let entries: Vec<Value> = container
            .values()
            .map(|r| {
                Value::Map(
                    r.to_field_map()
                        .into_iter()
                        .map(|(k, v)| (Value::Text(k), v))
                        .collect(),
                )
            })
            .collect();
        let mut envelope = FieldMap::new();
        envelope.insert("notes".to_string(), Value::from("restored"));
        envelope.insert("entries".to_string(), Value::List(entries));
        container.update_all(envelope).unwrap();
        container
    }

    #[test]
    fn cbor_snapshot_restores_container() {
        let container = populated();
        let bytes = container.snapshot().to_cbor().unwrap();

        let snapshot = ContainerSnapshot::from_cbor(&bytes).unwrap();
        let restored: RecordContainer = snapshot
            .into_container(ContainerConfig::default(), Arc::new(ChangeFeed::new()))
            .unwrap();

        assert_eq!(restored.id(), container.id());
        assert_eq!(restored.keys(), container.keys());
        assert_eq!(restored.metadata(), container.metadata());
        for (uid, record) in container.items() {
            assert_eq!(restored.get(&uid), Some(record));
        }
    }

    #[test]
    fn restore_into_other_layout() {
        let container = populated();
        let restored: BTreeRecordContainer = container
            .snapshot()
            .into_container(ContainerConfig::default(), Arc::new(ChangeFeed::new()))
            .unwrap();
        assert_eq!(restored.keys(), container.keys());
    }

    #[test]
    fn restore_fires_no_events() {
        let container = populated();
        let feed = Arc::new(ChangeFeed::new());
        let _restored: RecordContainer = container
            .snapshot()
            .into_container(ContainerConfig::default(), feed.clone())
            .unwrap();
        assert_eq!(feed.history_len(), 0);
    }

    #[test]
    fn duplicate_records_are_rejected() {
        let record = Record::new();
        let snapshot = ContainerSnapshot {
            id: ContainerId::new(),
            records: vec![record.clone(), record],
            metadata: FieldMap::new(),
        };
        assert!(matches!(snapshot.validate(), Err(CoreError::DuplicateUid { .. })));
    }

    #[test]
    fn garbage_is_a_codec_error() {
        assert!(matches!(
            ContainerSnapshot::from_cbor(&[0xff, 0x00]),
            Err(CoreError::Codec(_))
        ));
    }
}
