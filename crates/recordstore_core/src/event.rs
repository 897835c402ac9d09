//! Lifecycle events and the change feed.
//!
//! Containers report every lifecycle transition of their records to an
//! [`EventSink`]. The state machine of a record, as seen through events, is:
//!
//! ```text
//! absent -> created -> added -> [modified]* -> removed
//! ```
//!
//! Containers also report container-level *modified* events after
//! [`crate::RecordContainer::update`] and
//! [`crate::RecordContainer::update_all`] change something.
//!
//! # Usage
//!
//! ```rust
//! use recordstore_core::{ChangeFeed, ContainerConfig, EventKind, RecordContainer};
//! use std::sync::Arc;
//!
//! let feed = Arc::new(ChangeFeed::new());
//! let mut container = RecordContainer::with_sink(ContainerConfig::default(), feed.clone());
//! let receiver = feed.subscribe();
//!
//! let record = container.create(None).unwrap();
//! container.add(record).unwrap();
//!
//! let kinds: Vec<_> = receiver.try_iter().map(|e| e.event.kind).collect();
//! assert_eq!(kinds, vec![EventKind::Created, EventKind::Added]);
//! ```

use crate::record::Record;
use crate::types::{ContainerId, SequenceNumber};
use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// Type of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A record was created by a container factory (not yet stored).
    Created,
    /// A record's fields, or a container's contents, changed.
    Modified,
    /// A record was stored in a container.
    Added,
    /// A record was removed from a container.
    Removed,
}

/// What an event is about.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSubject {
    /// A record; carries a snapshot taken when the event fired.
    Record(Box<Record>),
    /// A container, for container-level modified events.
    Container(ContainerId),
}

/// A single lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEvent {
    /// Type of event.
    pub kind: EventKind,
    /// The record or container the event is about.
    pub subject: EventSubject,
    /// Container the subject belongs to, if any.
    pub container: Option<ContainerId>,
    /// Names of the fields that changed, for field-level modified events.
    pub changed_fields: Vec<String>,
}

impl RecordEvent {
    fn for_record(kind: EventKind, record: &Record, container: Option<ContainerId>) -> Self {
        Self {
            kind,
            subject: EventSubject::Record(Box::new(record.clone())),
            container,
            changed_fields: Vec::new(),
        }
    }

    /// Creates a created event.
    pub fn created(record: &Record, container: Option<ContainerId>) -> Self {
        Self::for_record(EventKind::Created, record, container)
    }

    /// Creates a field-level modified event.
    pub fn modified(record: &Record, container: Option<ContainerId>, changed: Vec<String>) -> Self {
        Self {
            changed_fields: changed,
            ..Self::for_record(EventKind::Modified, record, container)
        }
    }

    /// Creates an added event.
    pub fn added(record: &Record, container: ContainerId) -> Self {
        Self::for_record(EventKind::Added, record, Some(container))
    }

    /// Creates a removed event.
    pub fn removed(record: &Record, container: ContainerId) -> Self {
        Self::for_record(EventKind::Removed, record, Some(container))
    }

    /// Creates a container-level modified event.
    pub fn container_modified(container: ContainerId, changed: Vec<String>) -> Self {
        Self {
            kind: EventKind::Modified,
            subject: EventSubject::Container(container),
            container: Some(container),
            changed_fields: changed,
        }
    }

    /// Returns the record snapshot, if the subject is a record.
    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        match &self.subject {
            EventSubject::Record(record) => Some(record),
            EventSubject::Container(_) => None,
        }
    }

    /// Returns true for container-level events.
    #[must_use]
    pub fn is_container_event(&self) -> bool {
        matches!(self.subject, EventSubject::Container(_))
    }
}

/// Receiver of lifecycle events.
///
/// Sinks are called synchronously from inside container mutations, in the
/// order events happen. They must not call back into the container.
pub trait EventSink: Send + Sync {
    /// Handles one event.
    fn emit(&self, event: RecordEvent);
}

/// An event with the sequence number the feed assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedEvent {
    /// Position of the event in the feed.
    pub sequence: SequenceNumber,
    /// The event itself.
    pub event: RecordEvent,
}

/// A channel-based event sink that distributes events to subscribers.
///
/// The change feed:
/// - Numbers events in emission order
/// - Supports multiple subscribers
/// - Keeps a bounded history for polling by sequence cursor
/// - Is thread-safe
pub struct ChangeFeed {
    subscribers: RwLock<Vec<Sender<SequencedEvent>>>,
    history: RwLock<Vec<SequencedEvent>>,
    last_sequence: RwLock<SequenceNumber>,
    max_history: usize,
}

impl ChangeFeed {
    /// Creates a new change feed.
    pub fn new() -> Self {
        Self::with_max_history(10_000)
    }

    /// Creates a change feed with a specific history limit.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
            last_sequence: RwLock::new(SequenceNumber::default()),
            max_history,
        }
    }

    /// Subscribes to the change feed.
    ///
    /// Returns a receiver that will receive all future events. The receiver
    /// should be drained regularly to avoid unbounded memory growth.
    pub fn subscribe(&self) -> Receiver<SequencedEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Polls events from a sequence cursor.
    ///
    /// Returns events with sequence > cursor, up to limit.
    pub fn poll(&self, cursor: SequenceNumber, limit: usize) -> Vec<SequencedEvent> {
        self.history
            .read()
            .iter()
            .filter(|e| e.sequence > cursor)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Returns the sequence number of the latest event.
    pub fn latest_sequence(&self) -> SequenceNumber {
        *self.last_sequence.read()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns the number of events in history.
    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    /// Clears history older than the given sequence.
    pub fn truncate_history(&self, min_sequence: SequenceNumber) {
        self.history.write().retain(|e| e.sequence >= min_sequence);
    }
}

impl EventSink for ChangeFeed {
    fn emit(&self, event: RecordEvent) {
        // History stays in sequence order while its lock is held.
        let sequenced = {
            let mut history = self.history.write();
            let mut last = self.last_sequence.write();
            *last = last.next();
            let sequenced = SequencedEvent {
                sequence: *last,
                event,
            };
            history.push(sequenced.clone());
            if history.len() > self.max_history {
                let to_remove = history.len() - self.max_history;
                history.drain(0..to_remove);
            }
            sequenced
        };

        // Disconnected subscribers are dropped here.
        self.subscribers
            .write()
            .retain(|tx| tx.send(sequenced.clone()).is_ok());
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("latest_sequence", &self.latest_sequence())
            .field("history_len", &self.history_len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
