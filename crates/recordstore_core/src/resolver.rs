//! Record resolution.
//!
//! A [`RecordResolver`] maps a record UID back to the container holding it
//! and to the record itself. The catalog depends on this capability to turn
//! search hits into objects; hosts provide an implementation backed by their
//! own lookup. [`ContainerRegistry`] is an in-memory implementation over
//! shared containers.

use crate::container::RecordContainer;
use crate::record::{Record, RecordUid};
use crate::types::ContainerId;
use parking_lot::RwLock;
use recordstore_storage::{EntryStorage, HashEntries};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maps record UIDs to their containers and records.
pub trait RecordResolver: Send + Sync {
    /// Returns the container holding `uid`, if any.
    fn context(&self, uid: &RecordUid) -> Option<ContainerId>;

    /// Returns the record for `uid` from a known container.
    fn resolve_in(&self, uid: &RecordUid, context: ContainerId) -> Option<Record>;

    /// Returns the record for `uid`, looking up its container first.
    fn resolve(&self, uid: &RecordUid) -> Option<Record> {
        let context = self.context(uid)?;
        self.resolve_in(uid, context)
    }

    /// Returns both the container and the record for `uid`.
    fn contained(&self, uid: &RecordUid) -> (Option<ContainerId>, Option<Record>) {
        match self.context(uid) {
            Some(context) => (Some(context), self.resolve_in(uid, context)),
            None => (None, None),
        }
    }
}

/// A container shared between threads.
pub type SharedContainer<S = HashEntries<RecordUid, Record>> = Arc<RwLock<RecordContainer<S>>>;

/// In-memory registry of shared containers.
///
/// Containers are wrapped in a `parking_lot` lock on registration, so hosts
/// with concurrent writers go through the returned handle.
pub struct ContainerRegistry<S = HashEntries<RecordUid, Record>>
where
    S: EntryStorage<RecordUid, Record>,
{
    containers: RwLock<HashMap<ContainerId, SharedContainer<S>>>,
}

impl<S: EntryStorage<RecordUid, Record>> ContainerRegistry<S> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a container, returning its shared handle.
    ///
    /// A container with the same id replaces the previous registration.
    pub fn register(&self, container: RecordContainer<S>) -> SharedContainer<S> {
        let id = container.id();
        let shared = Arc::new(RwLock::new(container));
        self.containers.write().insert(id, Arc::clone(&shared));
        debug!(container = %id, "container registered");
        shared
    }

    /// Returns the shared handle for a container.
    pub fn get(&self, id: ContainerId) -> Option<SharedContainer<S>> {
        self.containers.read().get(&id).cloned()
    }

    /// Unregisters a container, returning its handle.
    pub fn unregister(&self, id: ContainerId) -> Option<SharedContainer<S>> {
        let removed = self.containers.write().remove(&id);
        if removed.is_some() {
            debug!(container = %id, "container unregistered");
        }
        removed
    }

    /// Returns the ids of all registered containers.
    pub fn ids(&self) -> Vec<ContainerId> {
        self.containers.read().keys().copied().collect()
    }

    /// Returns the number of registered containers.
    pub fn len(&self) -> usize {
        self.containers.read().len()
    }

    /// Returns true if no container is registered.
    pub fn is_empty(&self) -> bool {
        self.containers.read().is_empty()
    }
}

impl<S: EntryStorage<RecordUid, Record>> Default for ContainerRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EntryStorage<RecordUid, Record>> RecordResolver for ContainerRegistry<S> {
    fn context(&self, uid: &RecordUid) -> Option<ContainerId> {
        self.containers
            .read()
            .iter()
            .find(|(_, container)| container.read().contains(uid))
            .map(|(id, _)| *id)
    }

    fn resolve_in(&self, uid: &RecordUid, context: ContainerId) -> Option<Record> {
        let container = self.get(context)?;
        let guard = container.read();
        guard.get(uid).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BTreeRecordContainer;
    use crate::{ChangeFeed, ContainerConfig};

    fn container_with_record() -> (RecordContainer, RecordUid) {
        let mut container = RecordContainer::new();
        let record = container.create(None).unwrap();
        let uid = record.uid();
        container.add(record).unwrap();
        (container, uid)
    }

    #[test]
    fn resolves_record_and_context() {
        let registry: ContainerRegistry = ContainerRegistry::new();
        let (container, uid) = container_with_record();
        let id = container.id();
        registry.register(container);
        registry.register(RecordContainer::new());

        assert_eq!(registry.context(&uid), Some(id));
        assert_eq!(registry.resolve(&uid).map(|r| r.uid()), Some(uid));
        let (context, record) = registry.contained(&uid);
        assert_eq!(context, Some(id));
        assert_eq!(record.unwrap().parent(), Some(id));
    }

    #[test]
    fn unknown_uid_resolves_to_nothing() {
        let registry: ContainerRegistry = ContainerRegistry::new();
        registry.register(RecordContainer::new());
        assert_eq!(registry.contained(&RecordUid::new()), (None, None));
        assert!(registry.resolve(&RecordUid::new()).is_none());
    }

    #[test]
    fn shared_handle_sees_later_writes() {
        let registry: ContainerRegistry = ContainerRegistry::new();
        let shared = registry.register(RecordContainer::new());
        let uid = {
            let mut guard = shared.write();
            let record = guard.create(None).unwrap();
            let uid = record.uid();
            guard.add(record).unwrap();
            uid
        };
        assert!(registry.resolve(&uid).is_some());
    }

    #[test]
    fn unregister_hides_records() {
        let registry: ContainerRegistry = ContainerRegistry::new();
        let (container, uid) = container_with_record();
        let id = container.id();
        registry.register(container);
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister(id).is_some());
        assert!(registry.is_empty());
        assert!(registry.resolve(&uid).is_none());
    }

    #[test]
    fn btree_registry() {
        let registry: ContainerRegistry<_> = ContainerRegistry::new();
        let container = BTreeRecordContainer::with_storage(
            ContainerConfig::default(),
            Arc::new(ChangeFeed::new()),
        );
        let id = container.id();
        registry.register(container);
        assert_eq!(registry.ids(), vec![id]);
    }
}
