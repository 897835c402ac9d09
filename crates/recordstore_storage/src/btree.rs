//! B-tree entry storage.

use crate::entries::EntryStorage;
use std::collections::BTreeMap;

/// B-tree-based entry storage.
///
/// `BTreeEntries` keeps insert cost logarithmic and avoids rehash spikes,
/// which matters for containers with thousands of records. Iteration is in
/// key order, which is unrelated to the container's own ordering.
#[derive(Debug, Clone)]
pub struct BTreeEntries<K, V> {
    map: BTreeMap<K, V>,
}

impl<K, V> BTreeEntries<K, V> {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Returns the smallest key, if any.
    pub fn first_key(&self) -> Option<&K> {
        self.map.keys().next()
    }

    /// Returns the largest key, if any.
    pub fn last_key(&self) -> Option<&K> {
        self.map.keys().next_back()
    }
}

impl<K, V> Default for BTreeEntries<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EntryStorage<K, V> for BTreeEntries<K, V>
where
    K: Ord + Send + Sync,
    V: Send + Sync,
{
    fn layout(&self) -> &'static str {
        "btree"
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
