//! Hash map entry storage.

use crate::entries::EntryStorage;
use std::collections::HashMap;
use std::hash::Hash;

/// Hash-based entry storage.
///
/// This is the default layout for record containers. It has the lowest
/// constant overhead and is the right choice for containers holding up to a
/// few hundred entries.
///
/// # Example
///
/// ```rust
/// use recordstore_storage::{EntryStorage, HashEntries};
///
/// let mut entries = HashEntries::new();
/// entries.insert(7u64, "seven");
/// assert!(entries.contains_key(&7));
/// ```
#[derive(Debug, Clone)]
pub struct HashEntries<K, V> {
    map: HashMap<K, V>,
}

impl<K, V> HashEntries<K, V> {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Creates an empty storage with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }
}

impl<K, V> Default for HashEntries<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EntryStorage<K, V> for HashEntries<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn layout(&self) -> &'static str {
        "hash"
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.map.iter())
    }
}
