//! Ordered record containers.

use crate::bulk::{Batch, BulkInput};
use crate::config::{ContainerConfig, DuplicateUidPolicy};
use crate::error::{CoreError, CoreResult};
use crate::event::{ChangeFeed, EventSink, RecordEvent};
use crate::record::{populate_fields, storable_attributes, Record, RecordKey, RecordUid, UID_KEY};
use crate::types::ContainerId;
use recordstore_codec::FieldMap;
use recordstore_storage::{BTreeEntries, EntryStorage, HashEntries};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Record container backed by a B-tree map, for containers with many entries.
pub type BTreeRecordContainer = RecordContainer<BTreeEntries<RecordUid, Record>>;

/// An ordered CRUD store of records keyed by UID.
///
/// A container owns its records exclusively and keeps two structures in
/// lockstep: the entry storage `S` (UID to record) and `order`, the sequence
/// of UIDs that defines iteration order.
///
/// # Invariants
///
/// - `order` contains no duplicates
/// - every UID in `order` is stored, and every stored UID is in `order`
/// - `len() == order.len() == entries.len()`
///
/// # Events
///
/// Mutations report lifecycle events to the container's [`EventSink`]:
/// `create` fires *modified* (when fields were copied) then *created*, `add`
/// fires *added*, `remove` fires *removed*, and `update` fires *modified* for
/// the record plus, when something changed, one container-level *modified*.
///
/// # Example
///
/// ```rust
/// use recordstore_codec::{FieldMap, Value};
/// use recordstore_core::RecordContainer;
///
/// let mut container = RecordContainer::new();
/// let data = FieldMap::from([("count".to_string(), Value::Integer(5))]);
/// let record = container.create(Some(&data)).unwrap();
/// let uid = record.uid();
/// container.add(record).unwrap();
///
/// assert_eq!(container.len(), 1);
/// assert_eq!(container.get(&uid).unwrap().get("count"), Some(&Value::Integer(5)));
/// ```
pub struct RecordContainer<S = HashEntries<RecordUid, Record>>
where
    S: EntryStorage<RecordUid, Record>,
{
    id: ContainerId,
    entries: S,
    order: Vec<RecordUid>,
    metadata: FieldMap,
    config: ContainerConfig,
    sink: Arc<dyn EventSink>,
}

impl RecordContainer {
    /// Creates an empty hash-backed container with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// Creates an empty hash-backed container reporting to its own
    /// [`ChangeFeed`].
    #[must_use]
    pub fn with_config(config: ContainerConfig) -> Self {
        Self::with_sink(config, Arc::new(ChangeFeed::new()))
    }

    /// Creates an empty hash-backed container reporting to `sink`.
    #[must_use]
    pub fn with_sink(config: ContainerConfig, sink: Arc<dyn EventSink>) -> Self {
        Self::with_storage(config, sink)
    }
}

impl Default for RecordContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EntryStorage<RecordUid, Record>> RecordContainer<S> {
    /// Creates an empty container with storage layout `S`.
    ///
    /// ```rust
    /// use recordstore_core::{BTreeRecordContainer, ChangeFeed, ContainerConfig};
    /// use std::sync::Arc;
    ///
    /// let container = BTreeRecordContainer::with_storage(
    ///     ContainerConfig::default(),
    ///     Arc::new(ChangeFeed::new()),
    /// );
    /// assert_eq!(container.layout(), "btree");
    /// ```
    #[must_use]
    pub fn with_storage(config: ContainerConfig, sink: Arc<dyn EventSink>) -> Self {
        Self::from_parts(ContainerId::new(), config, sink)
    }

    pub(crate) fn from_parts(
        id: ContainerId,
        config: ContainerConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            id,
            entries: S::default(),
            order: Vec::new(),
            metadata: FieldMap::new(),
            config,
            sink,
        }
    }

    /// Returns the container identifier.
    #[must_use]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Returns the container configuration.
    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Returns the event sink.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Returns container-level metadata taken from bulk sync envelopes.
    #[must_use]
    pub fn metadata(&self) -> &FieldMap {
        &self.metadata
    }

    /// Returns the storage layout name.
    #[must_use]
    pub fn layout(&self) -> &'static str {
        self.entries.layout()
    }

    // ----- factory and insertion -----

    /// Creates a record bound to this container, without storing it.
    ///
    /// The UID is taken from `data["record_uid"]` when present, else freshly
    /// generated. Whitelisted fields are copied from `data`; if any were
    /// copied a *modified* event naming them fires, then *created* always
    /// fires.
    pub fn create(&self, data: Option<&FieldMap>) -> CoreResult<Record> {
        let uid = match data.and_then(|d| d.get(UID_KEY)) {
            Some(value) => RecordUid::from_value(value)?,
            None => RecordUid::new(),
        };
        let mut record = Record::with_uid(uid);
        record.set_parent(Some(self.id));
        for schema in &self.config.schemas {
            record.provide(schema.clone());
        }

        if let Some(data) = data {
            let changed = record.populate(data);
            if !changed.is_empty() {
                self.sink
                    .emit(RecordEvent::modified(&record, Some(self.id), changed));
            }
        }
        self.sink.emit(RecordEvent::created(&record, Some(self.id)));
        Ok(record)
    }

    /// Stores a record.
    ///
    /// A new UID is appended to the order; an existing UID is overwritten in
    /// place and keeps its position. Fails on an empty (nil) UID. Fires
    /// *added*.
    pub fn add(&mut self, mut record: Record) -> CoreResult<()> {
        let uid = record.uid();
        if uid.is_nil() {
            return Err(CoreError::EmptyUid);
        }
        record.set_parent(Some(self.id));
        let event = RecordEvent::added(&record, self.id);
        let replaced = self.entries.insert(uid, record).is_some();
        if !replaced {
            self.order.push(uid);
        }
        debug!(container = %self.id, uid = %uid, replaced, "record added");
        self.sink.emit(event);
        Ok(())
    }

    // ----- updates -----

    /// Updates the record named by `data["record_uid"]`, adding it if absent.
    ///
    /// For a contained UID, whitelisted fields are copied (record-level
    /// *modified* when anything changed). For an unknown UID, the record is
    /// created and added (*modified*, *created*, *added*). Unless
    /// `suppress_notify` is set, a container-level *modified* fires when the
    /// call changed something.
    pub fn update(&mut self, data: &FieldMap, suppress_notify: bool) -> CoreResult<&Record> {
        let uid = match data.get(UID_KEY) {
            Some(value) => RecordUid::from_value(value)?,
            None => return Err(CoreError::MissingUid),
        };
        if uid.is_nil() {
            return Err(CoreError::EmptyUid);
        }

        let changed = self.apply(uid, data)?;
        if changed && !suppress_notify {
            self.notify_container(Vec::new());
        }
        self.entries.get(&uid).ok_or_else(|| CoreError::not_found(uid))
    }

    /// Updates the stored record with the same UID as `stand_in`.
    ///
    /// The stand-in's whitelisted attributes are copied as if they had been
    /// given as a field map; the stand-in itself is never stored.
    pub fn update_record(&mut self, stand_in: &Record, suppress_notify: bool) -> CoreResult<&Record> {
        let mut data = storable_attributes(stand_in.attributes());
        data.insert(UID_KEY.to_string(), stand_in.uid().into());
        self.update(&data, suppress_notify)
    }

    // Copies `data` onto the stored record, or creates and adds it.
    // Returns true if the container changed.
    fn apply(&mut self, uid: RecordUid, data: &FieldMap) -> CoreResult<bool> {
        if let Some(record) = self.entries.get_mut(&uid) {
            let changed = record.populate(data);
            if changed.is_empty() {
                return Ok(false);
            }
            trace!(uid = %uid, fields = ?changed, "record modified");
            self.sink
                .emit(RecordEvent::modified(record, Some(self.id), changed));
            return Ok(true);
        }
        let record = self.create(Some(data))?;
        self.add(record)?;
        Ok(true)
    }

    /// Synchronizes the container with a bulk payload.
    ///
    /// Every entry's UID is validated before anything changes. Entries are
    /// then applied with [`Self::update`] (container notifications
    /// suppressed), every contained UID absent from the payload is removed,
    /// and the order is replaced by the payload's UID sequence. Envelope
    /// metadata is copied into [`Self::metadata`] through the field
    /// whitelist. One container-level *modified* event fires if anything
    /// changed.
    pub fn update_all(&mut self, input: impl Into<BulkInput>) -> CoreResult<()> {
        let batch = Batch::parse(input.into())?;
        let uids = self.validate_batch(&batch)?;

        let mut changed_metadata = Vec::new();
        if let Some(metadata) = &batch.metadata {
            changed_metadata = populate_fields(&mut self.metadata, metadata);
        }
        let mut modified = !changed_metadata.is_empty();

        for (uid, entry) in uids.iter().zip(&batch.entries) {
            modified |= self.apply(*uid, entry)?;
        }

        let incoming: HashSet<RecordUid> = uids.iter().copied().collect();
        let stale: Vec<RecordUid> = self
            .order
            .iter()
            .filter(|uid| !incoming.contains(uid))
            .copied()
            .collect();
        for uid in &stale {
            self.remove_uid(*uid)?;
        }
        modified |= !stale.is_empty();

        let mut seen = HashSet::with_capacity(uids.len());
        let new_order: Vec<RecordUid> = uids.into_iter().filter(|uid| seen.insert(*uid)).collect();
        if new_order != self.order {
            self.order = new_order;
            modified = true;
        }

        debug!(
            container = %self.id,
            entries = batch.entries.len(),
            removed = stale.len(),
            modified,
            "bulk sync applied"
        );
        if modified {
            self.notify_container(changed_metadata);
        }
        Ok(())
    }

    // Resolves every entry's UID, rejecting the batch before any mutation.
    fn validate_batch(&self, batch: &Batch) -> CoreResult<Vec<RecordUid>> {
        let mut seen = HashSet::with_capacity(batch.entries.len());
        let mut uids = Vec::with_capacity(batch.entries.len());
        for entry in &batch.entries {
            let uid = match entry.get(UID_KEY) {
                Some(value) => RecordUid::from_value(value)?,
                None => return Err(CoreError::MissingUid),
            };
            if uid.is_nil() {
                return Err(CoreError::EmptyUid);
            }
            if !seen.insert(uid) && self.config.duplicate_uids == DuplicateUidPolicy::Reject {
                return Err(CoreError::DuplicateUid {
                    uid: uid.to_string(),
                });
            }
            uids.push(uid);
        }
        Ok(uids)
    }

    fn notify_container(&self, changed: Vec<String>) {
        if self.config.emit_container_events {
            self.sink
                .emit(RecordEvent::container_modified(self.id, changed));
        }
    }

    // ----- ordering -----

    /// Moves one record to position `offset`.
    ///
    /// The offset is clamped to `[0, len - 1]`. Fails if the record is not
    /// contained.
    pub fn reorder<K: RecordKey + ?Sized>(&mut self, key: &K, offset: isize) -> CoreResult<()> {
        let uid = key.to_record_uid()?;
        let from = self
            .order
            .iter()
            .position(|u| *u == uid)
            .ok_or_else(|| CoreError::not_found(uid))?;
        let last = self.order.len() - 1;
        let to = usize::try_from(offset).map_or(0, |o| o.min(last));
        let moved = self.order.remove(from);
        self.order.insert(to, moved);
        debug!(container = %self.id, uid = %uid, from, to, "record reordered");
        Ok(())
    }

    /// Replaces the order.
    ///
    /// `new_order` must be a permutation of the current order: the length,
    /// then duplicates, then unknown keys are checked, in that order.
    pub fn update_order<I>(&mut self, new_order: I) -> CoreResult<()>
    where
        I: IntoIterator,
        I::Item: RecordKey,
    {
        let new_order = new_order
            .into_iter()
            .map(|key| key.to_record_uid())
            .collect::<CoreResult<Vec<_>>>()?;
        if new_order.len() != self.order.len() {
            return Err(CoreError::invalid_order("invalid number of keys"));
        }
        let unique: HashSet<&RecordUid> = new_order.iter().collect();
        if unique.len() != new_order.len() {
            return Err(CoreError::invalid_order("duplicate keys in order"));
        }
        if unique.iter().any(|uid| !self.entries.contains_key(uid)) {
            return Err(CoreError::invalid_order("unknown key(s) provided in order"));
        }
        self.order = new_order;
        debug!(container = %self.id, len = self.order.len(), "order replaced");
        Ok(())
    }

    // ----- removal -----

    /// Removes a record by UID or by record, returning it.
    ///
    /// Fires *removed*. Fails when the record is not contained.
    pub fn remove<K: RecordKey + ?Sized>(&mut self, key: &K) -> CoreResult<Record> {
        let uid = key.to_record_uid()?;
        self.remove_uid(uid)
    }

    fn remove_uid(&mut self, uid: RecordUid) -> CoreResult<Record> {
        let record = self
            .entries
            .remove(&uid)
            .ok_or_else(|| CoreError::not_found(uid))?;
        self.order.retain(|u| *u != uid);
        debug!(container = %self.id, uid = %uid, "record removed");
        self.sink.emit(RecordEvent::removed(&record, self.id));
        Ok(record)
    }

    /// Removes every record, firing *removed* for each in order.
    pub fn clear(&mut self) {
        for uid in std::mem::take(&mut self.order) {
            if let Some(record) = self.entries.remove(&uid) {
                self.sink.emit(RecordEvent::removed(&record, self.id));
            }
        }
        self.entries.clear();
    }

    // ----- read surface -----

    /// Returns the record for `key`, if contained.
    ///
    /// Keys that are not valid UIDs are simply not found.
    pub fn get<K: RecordKey + ?Sized>(&self, key: &K) -> Option<&Record> {
        let uid = key.to_record_uid().ok()?;
        self.entries.get(&uid)
    }

    /// Returns a mutable reference for direct, low-level modification.
    ///
    /// Changes made this way fire no events.
    pub fn get_mut<K: RecordKey + ?Sized>(&mut self, key: &K) -> Option<&mut Record> {
        let uid = key.to_record_uid().ok()?;
        self.entries.get_mut(&uid)
    }

    /// Returns the record for `key`, or a not-found error.
    pub fn item<K: RecordKey + ?Sized>(&self, key: &K) -> CoreResult<&Record> {
        let uid = key.to_record_uid()?;
        self.entries.get(&uid).ok_or_else(|| CoreError::not_found(uid))
    }

    /// Returns the record at `position` in the order.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&Record> {
        self.order.get(position).and_then(|uid| self.entries.get(uid))
    }

    /// Returns true if a record with this UID is contained.
    ///
    /// Passing a record checks containment by its UID, not by identity.
    pub fn contains<K: RecordKey + ?Sized>(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the UIDs in order.
    #[must_use]
    pub fn keys(&self) -> &[RecordUid] {
        &self.order
    }

    /// Returns the records in order.
    pub fn values(&self) -> impl Iterator<Item = &Record> + '_ {
        self.order.iter().filter_map(|uid| self.entries.get(uid))
    }

    /// Returns `(uid, record)` pairs in order.
    pub fn items(&self) -> impl Iterator<Item = (RecordUid, &Record)> + '_ {
        self.order
            .iter()
            .filter_map(|uid| self.entries.get(uid).map(|record| (*uid, record)))
    }

    /// Iterates over the UIDs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, RecordUid> {
        self.order.iter()
    }

    /// Position of a record in the order.
    pub fn position<K: RecordKey + ?Sized>(&self, key: &K) -> Option<usize> {
        let uid = key.to_record_uid().ok()?;
        self.order.iter().position(|u| *u == uid)
    }

    /// Exports the container as a bulk sync envelope.
    ///
    /// Values are rendered by [`recordstore_codec::Value::to_json`]. Feeding
    /// the result back to [`Self::update_all`] is a no-op only while every
    /// field holds JSON-native data (booleans, numbers, text and their
    /// collections). Bytes, decimals, dates, times and durations come back
    /// as lists, text or numbers and fire *modified*; use
    /// [`Self::snapshot`] for a lossless copy.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut envelope = serde_json::Map::new();
        for (name, value) in &self.metadata {
            envelope.insert(name.clone(), value.to_json());
        }
        let entries = self
            .values()
            .map(|record| recordstore_codec::field_map_to_json(&record.to_field_map()))
            .collect();
        envelope.insert(
            crate::bulk::ENTRIES_KEY.to_string(),
            serde_json::Value::Array(entries),
        );
        serde_json::Value::Object(envelope)
    }

    pub(crate) fn restore_parts(&mut self, records: Vec<Record>, metadata: FieldMap) {
        self.metadata = metadata;
        for mut record in records {
            record.set_parent(Some(self.id));
            let uid = record.uid();
            if self.entries.insert(uid, record).is_none() {
                self.order.push(uid);
            }
        }
    }
}

impl<'a, S: EntryStorage<RecordUid, Record>> IntoIterator for &'a RecordContainer<S> {
    type Item = &'a RecordUid;
    type IntoIter = std::slice::Iter<'a, RecordUid>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

impl<S: EntryStorage<RecordUid, Record>> fmt::Debug for RecordContainer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordContainer")
            .field("id", &self.id)
            .field("layout", &self.entries.layout())
            .field("len", &self.order.len())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, SequencedEvent};
    use recordstore_codec::Value;
    use std::sync::mpsc::Receiver;

    fn observed() -> (RecordContainer, Receiver<SequencedEvent>) {
        let feed = Arc::new(ChangeFeed::new());
        let rx = feed.subscribe();
        (RecordContainer::with_sink(ContainerConfig::default(), feed), rx)
    }

    fn kinds(rx: &Receiver<SequencedEvent>) -> Vec<(EventKind, bool)> {
        rx.try_iter()
            .map(|e| (e.event.kind, e.event.is_container_event()))
            .collect()
    }

    fn data(uid: Option<RecordUid>, pairs: &[(&str, Value)]) -> FieldMap {
        let mut map: FieldMap = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        if let Some(uid) = uid {
            map.insert(UID_KEY.to_string(), uid.into());
        }
        map
    }

    #[test]
    fn create_does_not_insert() {
        let container = RecordContainer::new();
        let record = container.create(None).unwrap();
        assert!(!container.contains(&record));
        assert_eq!(record.parent(), Some(container.id()));
    }

    #[test]
    fn create_takes_uid_from_data() {
        let container = RecordContainer::new();
        let uid = RecordUid::new();
        let record = container.create(Some(&data(Some(uid), &[]))).unwrap();
        assert_eq!(record.uid(), uid);
        assert!(record.get(UID_KEY).is_none());
    }

    #[test]
    fn create_rejects_malformed_uid() {
        let container = RecordContainer::new();
        let bad = data(None, &[(UID_KEY, Value::from("abc"))]);
        assert!(matches!(container.create(Some(&bad)), Err(CoreError::InvalidKey { .. })));
    }

    #[test]
    fn create_events() {
        let (container, rx) = observed();
        container.create(None).unwrap();
        assert_eq!(kinds(&rx), vec![(EventKind::Created, false)]);

        container
            .create(Some(&data(None, &[("count", Value::Integer(88))])))
            .unwrap();
        assert_eq!(
            kinds(&rx),
            vec![(EventKind::Modified, false), (EventKind::Created, false)]
        );
    }

    #[test]
    fn create_stamps_configured_schemas() {
        let container = RecordContainer::with_config(ContainerConfig::new().schema("app.Person"));
        let record = container.create(None).unwrap();
        assert!(record.provides("app.Person"));
    }

    #[test]
    fn add_appends_and_overwrites_in_place() {
        let mut container = RecordContainer::new();
        let first = container.create(None).unwrap();
        let second = container.create(None).unwrap();
        let first_uid = first.uid();
        container.add(first).unwrap();
        container.add(second).unwrap();

        let mut replacement = Record::with_uid(first_uid);
        replacement.set("title", "Curious George");
        container.add(replacement).unwrap();

        assert_eq!(container.len(), 2);
        assert_eq!(container.keys()[0], first_uid);
        assert_eq!(
            container.get(&first_uid).unwrap().get("title"),
            Some(&Value::from("Curious George"))
        );
    }

    #[test]
    fn add_rejects_nil_uid() {
        let mut container = RecordContainer::new();
        let err = container.add(Record::with_uid(RecordUid::nil())).unwrap_err();
        assert!(matches!(err, CoreError::EmptyUid));
        assert!(container.is_empty());
    }

    #[test]
    fn containment_by_uid_string_and_record() {
        let mut container = RecordContainer::new();
        let record = container.create(None).unwrap();
        let uid = record.uid();
        container.add(record.clone()).unwrap();

        assert!(container.contains(&uid));
        assert!(container.contains(uid.to_string().as_str()));
        assert!(container.contains(&record));
        assert!(!container.contains(&RecordUid::new()));
        assert!(!container.contains("not a uuid"));
    }

    #[test]
    fn update_existing_fires_one_record_modified() {
        let (mut container, rx) = observed();
        let record = container
            .create(Some(&data(None, &[("count", Value::Integer(5))])))
            .unwrap();
        let uid = record.uid();
        container.add(record).unwrap();
        assert_eq!(container.len(), 1);
        let _ = kinds(&rx);

        let updated = container
            .update(&data(Some(uid), &[("count", Value::Integer(9))]), false)
            .unwrap();
        assert_eq!(updated.get("count"), Some(&Value::Integer(9)));
        assert_eq!(container.len(), 1);
        assert_eq!(
            kinds(&rx),
            vec![(EventKind::Modified, false), (EventKind::Modified, true)]
        );
    }

    #[test]
    fn update_unknown_uid_creates_and_adds() {
        let (mut container, rx) = observed();
        let uid = RecordUid::new();
        container
            .update(&data(Some(uid), &[("title", Value::from("Bananas"))]), true)
            .unwrap();
        assert!(container.contains(&uid));
        assert_eq!(
            kinds(&rx),
            vec![
                (EventKind::Modified, false),
                (EventKind::Created, false),
                (EventKind::Added, false)
            ]
        );
    }

    #[test]
    fn update_names_changed_fields() {
        let (mut container, rx) = observed();
        let uid = RecordUid::new();
        container
            .update(&data(Some(uid), &[("title", Value::from("Me"))]), true)
            .unwrap();
        let _ = kinds(&rx);

        container
            .update(
                &data(Some(uid), &[("title", Value::from("Hello")), ("count", Value::Integer(0))]),
                true,
            )
            .unwrap();
        let event = rx.try_recv().unwrap().event;
        assert_eq!(event.changed_fields, vec!["count".to_string(), "title".to_string()]);
    }

    #[test]
    fn unchanged_update_is_silent() {
        let (mut container, rx) = observed();
        let uid = RecordUid::new();
        let entry = data(Some(uid), &[("count", Value::Integer(1))]);
        container.update(&entry, false).unwrap();
        let _ = kinds(&rx);

        container.update(&entry, false).unwrap();
        assert!(kinds(&rx).is_empty());
    }

    #[test]
    fn update_without_uid_fails() {
        let mut container = RecordContainer::new();
        let err = container
            .update(&data(None, &[("count", Value::Integer(1))]), false)
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingUid));
    }

    #[test]
    fn update_record_copies_stand_in() {
        let mut container = RecordContainer::new();
        let uid = RecordUid::new();
        container
            .update(&data(Some(uid), &[("title", Value::from("George"))]), false)
            .unwrap();

        let mut stand_in = Record::with_uid(uid);
        stand_in.set("title", "Monkey jumping on the bed");
        stand_in.set("count", 0);
        stand_in.set("_scratch", 1);
        container.update_record(&stand_in, false).unwrap();

        let stored = container.get(&uid).unwrap();
        assert_eq!(stored.get("title"), Some(&Value::from("Monkey jumping on the bed")));
        assert_eq!(stored.get("count"), Some(&Value::Integer(0)));
        assert!(stored.get("_scratch").is_none());
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn reorder_moves_and_clamps() {
        let mut container = RecordContainer::new();
        let uids: Vec<RecordUid> = (0..3)
            .map(|_| {
                let record = container.create(None).unwrap();
                let uid = record.uid();
                container.add(record).unwrap();
                uid
            })
            .collect();

        container.reorder(&uids[2], 0).unwrap();
        assert_eq!(container.keys(), &[uids[2], uids[0], uids[1]]);

        container.reorder(&uids[2], 99).unwrap();
        assert_eq!(container.keys(), &[uids[0], uids[1], uids[2]]);

        container.reorder(&uids[1], -4).unwrap();
        assert_eq!(container.keys(), &[uids[1], uids[0], uids[2]]);

        assert!(matches!(
            container.reorder(&RecordUid::new(), 0),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn update_order_checks() {
        let mut container = RecordContainer::new();
        let a = container.create(None).unwrap();
        let b = container.create(None).unwrap();
        let (ua, ub) = (a.uid(), b.uid());
        container.add(a).unwrap();
        container.add(b).unwrap();

        let message = |r: CoreResult<()>| match r {
            Err(CoreError::InvalidOrder { message }) => message,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(message(container.update_order(vec![ua])), "invalid number of keys");
        assert_eq!(message(container.update_order(vec![ua, ua])), "duplicate keys in order");
        assert_eq!(
            message(container.update_order(vec![ua, RecordUid::new()])),
            "unknown key(s) provided in order"
        );

        container.update_order(vec![ub, ua]).unwrap();
        assert_eq!(container.keys(), &[ub, ua]);
    }

    #[test]
    fn remove_by_uid_and_record() {
        let (mut container, rx) = observed();
        let a = container.create(None).unwrap();
        let b = container.create(None).unwrap();
        let ua = a.uid();
        container.add(a).unwrap();
        container.add(b.clone()).unwrap();
        let _ = kinds(&rx);

        container.remove(&b).unwrap();
        container.remove(ua.to_string().as_str()).unwrap();
        assert!(container.is_empty());
        assert_eq!(
            kinds(&rx),
            vec![(EventKind::Removed, false), (EventKind::Removed, false)]
        );

        assert!(matches!(container.remove(&ua), Err(CoreError::NotFound { .. })));
    }

    #[test]
    fn item_raises_not_found() {
        let container = RecordContainer::new();
        assert!(matches!(
            container.item(&RecordUid::new()),
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(container.item("bogus"), Err(CoreError::InvalidKey { .. })));
    }

    #[test]
    fn get_mut_is_silent() {
        let (mut container, rx) = observed();
        let record = container.create(None).unwrap();
        let uid = record.uid();
        container.add(record).unwrap();
        let _ = kinds(&rx);

        container.get_mut(&uid).unwrap().set("title", "Curious George");
        assert_eq!(
            container.get(&uid).unwrap().get("title"),
            Some(&Value::from("Curious George"))
        );
        assert!(kinds(&rx).is_empty());
    }

    #[test]
    fn update_all_replaces_contents_and_order() {
        let mut container = RecordContainer::new();
        let keep = RecordUid::new();
        let drop = RecordUid::new();
        container.update(&data(Some(keep), &[]), false).unwrap();
        container.update(&data(Some(drop), &[]), false).unwrap();

        let fresh = RecordUid::new();
        let payload = serde_json::json!([
            {"record_uid": fresh.to_string(), "name": "new"},
            {"record_uid": keep.to_string(), "name": "kept"},
        ]);
        container.update_all(payload).unwrap();

        assert_eq!(container.keys(), &[fresh, keep]);
        assert!(!container.contains(&drop));
        assert_eq!(
            container.get(&keep).unwrap().get("name"),
            Some(&Value::from("kept"))
        );
    }

    #[test]
    fn update_all_is_idempotent() {
        let (mut container, rx) = observed();
        let payload = serde_json::json!({
            "notes": "something changed",
            "entries": [{"record_uid": RecordUid::new().to_string(), "count": 1}],
        })
        .to_string();

        container.update_all(payload.as_str()).unwrap();
        let first: Vec<_> = kinds(&rx);
        assert_eq!(first.last(), Some(&(EventKind::Modified, true)));
        assert_eq!(first.iter().filter(|(_, c)| *c).count(), 1);
        assert_eq!(container.metadata()["notes"], Value::from("something changed"));

        container.update_all(payload.as_str()).unwrap();
        assert!(kinds(&rx).is_empty());
    }

    #[test]
    fn update_all_validates_before_mutating() {
        let mut container = RecordContainer::new();
        let existing = RecordUid::new();
        container.update(&data(Some(existing), &[]), false).unwrap();

        let payload = serde_json::json!([
            {"record_uid": RecordUid::new().to_string()},
            {"name": "no uid"},
        ]);
        assert!(matches!(container.update_all(payload), Err(CoreError::MissingUid)));
        assert_eq!(container.keys(), &[existing]);
    }

    #[test]
    fn update_all_duplicate_policy() {
        let uid = RecordUid::new();
        let payload = serde_json::json!([
            {"record_uid": uid.to_string(), "n": 1},
            {"record_uid": uid.to_string(), "n": 2},
        ]);

        let mut strict = RecordContainer::new();
        assert!(matches!(
            strict.update_all(payload.clone()),
            Err(CoreError::DuplicateUid { .. })
        ));
        assert!(strict.is_empty());

        let mut lenient = RecordContainer::with_config(
            ContainerConfig::new().duplicate_uids(DuplicateUidPolicy::LastWins),
        );
        lenient.update_all(payload).unwrap();
        assert_eq!(lenient.len(), 1);
        assert_eq!(lenient.get(&uid).unwrap().get("n"), Some(&Value::Integer(2)));
    }

    #[test]
    fn update_all_empty_batch_clears() {
        let (mut container, rx) = observed();
        container.update(&data(Some(RecordUid::new()), &[]), true).unwrap();
        let _ = kinds(&rx);

        container.update_all(Vec::<FieldMap>::new()).unwrap();
        assert!(container.is_empty());
        assert_eq!(
            kinds(&rx),
            vec![(EventKind::Removed, false), (EventKind::Modified, true)]
        );
    }

    #[test]
    fn container_events_can_be_disabled() {
        let feed = Arc::new(ChangeFeed::new());
        let rx = feed.subscribe();
        let mut container = RecordContainer::with_sink(
            ContainerConfig::new().emit_container_events(false),
            feed,
        );
        container.update(&data(Some(RecordUid::new()), &[]), false).unwrap();
        assert!(rx.try_iter().all(|e| !e.event.is_container_event()));
    }

    #[test]
    fn json_export_feeds_back_as_no_op() {
        let (mut container, rx) = observed();
        container
            .update_all(serde_json::json!({
                "notes": "n",
                "entries": [
                    {"record_uid": RecordUid::new().to_string(), "title": "a"},
                    {"record_uid": RecordUid::new().to_string(), "title": "b"},
                ],
            }))
            .unwrap();
        let _ = kinds(&rx);

        let exported = container.to_json();
        container.update_all(exported).unwrap();
        assert!(kinds(&rx).is_empty());
    }

    #[test]
    fn json_export_flattens_typed_scalars() {
        let (mut container, rx) = observed();
        let uid = RecordUid::new();
        let born = chrono::NaiveDate::from_ymd_opt(1977, 6, 1).unwrap();
        let price: recordstore_codec::Decimal = "19.99".parse().unwrap();
        container
            .update(
                &data(
                    Some(uid),
                    &[
                        ("title", Value::from("typed")),
                        ("count", Value::Integer(3)),
                        ("born", Value::Date(born)),
                        ("price", Value::Decimal(price)),
                        ("blob", Value::from(&[1u8, 2][..])),
                    ],
                ),
                false,
            )
            .unwrap();
        let restored = container.snapshot();
        let _ = kinds(&rx);

        let exported = container.to_json();
        container.update_all(exported).unwrap();
        let events: Vec<SequencedEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        let mut changed = events[0].event.changed_fields.clone();
        changed.sort();
        assert_eq!(changed, vec!["blob", "born", "price"]);
        assert!(events[1].event.is_container_event());

        let record = container.get(&uid).unwrap();
        assert_eq!(record.get("born"), Some(&Value::from("1977-06-01")));
        assert_eq!(record.get("price"), Some(&Value::from("19.99")));
        assert_eq!(record.get("count"), Some(&Value::Integer(3)));

        let copy: RecordContainer = restored
            .into_container(ContainerConfig::default(), Arc::new(ChangeFeed::new()))
            .unwrap();
        let copied = copy.get(&uid).unwrap();
        assert_eq!(copied.get("born"), Some(&Value::Date(born)));
        assert_eq!(copied.get("price"), Some(&Value::Decimal(price)));
    }

    #[test]
    fn btree_variant_behaves_the_same() {
        let mut container = BTreeRecordContainer::with_storage(
            ContainerConfig::default(),
            Arc::new(ChangeFeed::new()),
        );
        assert_eq!(container.layout(), "btree");
        let uids: Vec<RecordUid> = (0..5).map(|_| RecordUid::new()).collect();
        for uid in uids.iter().rev() {
            container.update(&data(Some(*uid), &[]), false).unwrap();
        }
        let expected: Vec<RecordUid> = uids.iter().rev().copied().collect();
        assert_eq!(container.keys(), expected.as_slice());
        assert_eq!(container.values().count(), 5);
    }
}
