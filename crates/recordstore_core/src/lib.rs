//! # recordstore core
//!
//! Ordered, UUID-keyed record containers with change events.
//!
//! This crate provides:
//! - [`Record`]: a UID, a non-owning parent handle, provided schema names and
//!   whitelisted attributes
//! - [`RecordContainer`]: ordered CRUD over records, bulk JSON sync and
//!   reordering, generic over the entry storage layout
//! - Lifecycle events through an [`EventSink`], with [`ChangeFeed`] as the
//!   default channel-based sink
//! - [`RecordResolver`] and the in-memory [`ContainerRegistry`]
//! - CBOR container snapshots
//!
//! Containers take no locks of their own: mutations need `&mut self` and run
//! inside whatever boundary the host provides.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bulk;
mod config;
mod container;
mod error;
mod event;
mod record;
mod resolver;
mod snapshot;
mod types;

pub use bulk::{Batch, BulkInput, ENTRIES_KEY};
pub use config::{ContainerConfig, DuplicateUidPolicy};
pub use container::{BTreeRecordContainer, RecordContainer};
pub use error::{CoreError, CoreResult};
pub use event::{ChangeFeed, EventKind, EventSink, EventSubject, RecordEvent, SequencedEvent};
pub use record::{
    is_copyable_field, populate_fields, storable_attributes, Record, RecordKey, RecordUid,
    UID_KEY, UID_LENGTH,
};
pub use resolver::{ContainerRegistry, RecordResolver, SharedContainer};
pub use snapshot::ContainerSnapshot;
pub use types::{ContainerId, SequenceNumber};
