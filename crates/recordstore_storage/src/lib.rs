//! # recordstore storage
//!
//! Associative storage primitives for recordstore containers.
//!
//! A record container keeps two structures: an associative map of entries and
//! an ordered sequence of keys. The sequence is a plain `Vec` owned by the
//! container; the map is pluggable through [`EntryStorage`] so that a host can
//! choose the layout that suits the expected container size.
//!
//! ## Design Principles
//!
//! - Storages are dumb maps: they never interpret keys or values
//! - Ordering of entries is NOT the storage's concern
//! - Implementations must be `Send + Sync` so containers can be shared
//!
//! ## Available Storages
//!
//! - [`HashEntries`] - hash map, suited to small containers
//! - [`BTreeEntries`] - B-tree map, suited to containers with many entries
//!
//! ## Example
//!
//! ```rust
//! use recordstore_storage::{EntryStorage, HashEntries};
//!
//! let mut entries: HashEntries<String, u32> = HashEntries::new();
//! entries.insert("a".to_string(), 1);
//! assert_eq!(entries.get(&"a".to_string()), Some(&1));
//! assert_eq!(entries.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod btree;
mod entries;
mod hash;

pub use btree::BTreeEntries;
pub use entries::EntryStorage;
pub use hash::HashEntries;
