//! Entry storage trait definition.

/// An associative storage primitive for container entries.
///
/// Entry storages are **plain maps**. They provide lookup, insertion and
/// removal by key and nothing else; the container that owns a storage keeps
/// the canonical ordering of its keys separately.
///
/// # Invariants
///
/// - `insert` replaces any previous value for the key and returns it
/// - `remove` returns the value that was stored, if any
/// - `len` equals the number of distinct keys currently stored
///
/// # Implementors
///
/// - [`super::HashEntries`] - for small containers
/// - [`super::BTreeEntries`] - for large containers
pub trait EntryStorage<K, V>: Default + Send + Sync {
    /// Short name of the storage layout, used in diagnostics.
    fn layout(&self) -> &'static str;

    /// Returns the value stored for `key`.
    fn get(&self, key: &K) -> Option<&V>;

    /// Returns a mutable reference to the value stored for `key`.
    fn get_mut(&mut self, key: &K) -> Option<&mut V>;

    /// Stores `value` under `key`, returning the previous value.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Removes and returns the value stored under `key`.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns the number of stored entries.
    fn len(&self) -> usize;

    /// Removes every entry.
    fn clear(&mut self);

    /// Iterates over all entries in storage order (not container order).
    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_>;

    /// Returns true if a value is stored for `key`.
    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns true if the storage holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
