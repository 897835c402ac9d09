//! Cross-crate integration test helpers.
//!
//! Containers report changes through a [`ChangeFeed`]; [`CatalogSync`]
//! replays those events into a [`RecordCatalog`] so that the catalog
//! follows the containers it observes.

use crate::fixtures::scenarios;
use recordstore_catalog::{CatalogError, CatalogResult, RecordCatalog, Schema};
use recordstore_core::{
    ChangeFeed, ContainerConfig, ContainerRegistry, CoreError, EventKind, RecordContainer,
    RecordResolver, RecordUid, SequenceNumber, SharedContainer,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Replays change feed events into a catalog.
///
/// *added* events index the record snapshot they carry, record-level
/// *modified* events re-index records the catalog already knows and
/// *removed* events unindex. *created* and container-level events are
/// skipped.
///
/// The feed keeps a bounded history. If events the sync has not applied
/// were dropped, [`CatalogSync::apply`] fails with
/// [`CoreError::EventsDropped`] before touching the catalog.
#[derive(Debug)]
pub struct CatalogSync {
    feed: Arc<ChangeFeed>,
    cursor: SequenceNumber,
    batch_size: usize,
}

impl CatalogSync {
    /// Creates a sync starting after the feed's latest event.
    pub fn new(feed: Arc<ChangeFeed>) -> Self {
        let cursor = feed.latest_sequence();
        Self {
            feed,
            cursor,
            batch_size: 256,
        }
    }

    /// Sets how many events are polled at a time.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Returns the sequence of the last applied event.
    pub fn cursor(&self) -> SequenceNumber {
        self.cursor
    }

    /// Moves the cursor past every event the feed has emitted.
    pub fn skip_to_latest(&mut self) {
        self.cursor = self.feed.latest_sequence();
    }

    /// Applies every pending event to `catalog`.
    ///
    /// Returns the number of events that changed the catalog.
    pub fn apply(&mut self, catalog: &mut RecordCatalog) -> CatalogResult<usize> {
        let mut applied = 0;
        loop {
            let events = self.feed.poll(self.cursor, self.batch_size);
            let expected = self.cursor.next();
            match events.first() {
                Some(first) if first.sequence > expected => {
                    return Err(CoreError::events_dropped(self.cursor, first.sequence).into());
                }
                None if self.feed.latest_sequence() > self.cursor => {
                    let next = self.feed.latest_sequence().next();
                    return Err(CoreError::events_dropped(self.cursor, next).into());
                }
                None => return Ok(applied),
                Some(_) => {}
            }
            for sequenced in events {
                self.cursor = sequenced.sequence;
                let event = sequenced.event;
                let Some(record) = event.record() else {
                    continue;
                };
                let uid = record.uid();
                let changed = match event.kind {
                    EventKind::Added => {
                        catalog.index(record, None)?;
                        true
                    }
                    EventKind::Modified if catalog.mapper().doc_id(&uid).is_some() => {
                        catalog.reindex(record, None)?;
                        true
                    }
                    EventKind::Removed => catalog.unindex(&uid)?,
                    EventKind::Modified | EventKind::Created => false,
                };
                if changed {
                    trace!(sequence = %sequenced.sequence, uid = %uid, kind = ?event.kind, "event applied");
                    applied += 1;
                }
            }
        }
    }
}

/// A test harness wiring containers, a change feed and a catalog.
pub struct IntegrationHarness {
    /// Registry of the harness's containers; also the catalog's resolver.
    pub registry: Arc<ContainerRegistry>,
    /// Feed every harness container emits to.
    pub feed: Arc<ChangeFeed>,
    /// The catalog kept in step with the containers.
    pub catalog: RecordCatalog,
    sync: CatalogSync,
    containers: Vec<SharedContainer>,
}

impl IntegrationHarness {
    /// Creates a harness whose catalog binds `schemas` by default.
    pub fn new(schemas: &[Schema]) -> Self {
        let registry: Arc<ContainerRegistry> = Arc::new(ContainerRegistry::new());
        let feed = Arc::new(ChangeFeed::new());
        let catalog = scenarios::catalog_with(schemas)
            .with_resolver(registry.clone() as Arc<dyn RecordResolver>);
        let sync = CatalogSync::new(feed.clone());
        Self {
            registry,
            feed,
            catalog,
            sync,
            containers: Vec::new(),
        }
    }

    /// Creates and registers a container emitting to the harness feed.
    pub fn add_container(&mut self, config: ContainerConfig) -> SharedContainer {
        let container = RecordContainer::with_sink(config, self.feed.clone());
        let shared = self.registry.register(container);
        self.containers.push(shared.clone());
        shared
    }

    /// Returns the containers created through the harness.
    pub fn containers(&self) -> &[SharedContainer] {
        &self.containers
    }

    /// Applies pending events to the catalog.
    ///
    /// Falls back to [`Self::rebuild`] when the feed dropped events the
    /// catalog has not seen.
    ///
    /// # Panics
    ///
    /// Panics if an event cannot be applied.
    pub fn sync(&mut self) -> usize {
        match self.sync.apply(&mut self.catalog) {
            Ok(applied) => applied,
            Err(CatalogError::Core(err @ CoreError::EventsDropped { .. })) => {
                debug!(error = %err, "change feed gap, rebuilding catalog");
                self.rebuild()
            }
            Err(err) => panic!("Failed to apply events to catalog: {err}"),
        }
    }

    /// Re-indexes every record the containers hold and drops the rest.
    ///
    /// Returns the number of records indexed. The sync resumes after the
    /// feed's latest event.
    ///
    /// # Panics
    ///
    /// Panics if a record cannot be indexed.
    pub fn rebuild(&mut self) -> usize {
        self.sync.skip_to_latest();
        let mut held = HashSet::new();
        for container in &self.containers {
            let container = container.read();
            for record in container.values() {
                self.catalog
                    .reindex(record, None)
                    .expect("Failed to index record");
                held.insert(record.uid());
            }
        }
        let stale: Vec<RecordUid> = self
            .catalog
            .mapper()
            .doc_ids()
            .filter_map(|doc| self.catalog.mapper().uid(doc))
            .filter(|uid| !held.contains(uid))
            .collect();
        for uid in &stale {
            self.catalog.unindex(uid).expect("Failed to unindex record");
        }
        held.len()
    }

    /// Verifies the catalog indexes exactly the records the containers hold.
    pub fn verify_indexed(&self) {
        let mut expected = 0;
        for container in &self.containers {
            let container = container.read();
            for uid in container.keys() {
                assert!(
                    self.catalog.mapper().doc_id(uid).is_some(),
                    "Record {uid} is not indexed"
                );
            }
            expected += container.len();
        }
        assert_eq!(self.catalog.len(), expected, "Catalog holds stale records");
    }
}

impl std::fmt::Debug for IntegrationHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationHarness")
            .field("containers", &self.containers.len())
            .field("catalog", &self.catalog)
            .field("cursor", &self.sync.cursor())
            .finish_non_exhaustive()
    }
}
