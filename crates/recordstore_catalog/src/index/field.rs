//! Ordered value index.

use super::{unsupported, CatalogIndex, IndexKey, IndexType};
use crate::docmap::DocId;
use crate::error::CatalogResult;
use crate::query::{Comparator, Comparison};
use recordstore_codec::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ops::Bound;

const COMPARATORS: &[Comparator] = &[
    Comparator::Eq,
    Comparator::NotEq,
    Comparator::Gt,
    Comparator::Ge,
    Comparator::Lt,
    Comparator::Le,
    Comparator::InRange,
    Comparator::Any,
];

/// B-tree index over one value per document.
///
/// Supports equality and range comparisons. Range comparisons only match
/// values of the operand's kind, so `Gt(5)` never matches text.
///
/// # Example
///
/// ```rust
/// use recordstore_catalog::{CatalogIndex, Comparison, DocId, FieldIndex};
///
/// let mut index = FieldIndex::new("year");
/// index.index_doc(DocId(1), &1999.into());
/// index.index_doc(DocId(2), &2004.into());
///
/// let hits = index.apply(&Comparison::Gt(2000.into())).unwrap();
/// assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![DocId(2)]);
/// ```
#[derive(Debug)]
pub struct FieldIndex {
    discriminator: String,
    index_type: IndexType,
    /// Key to documents, ordered.
    entries: BTreeMap<IndexKey, HashSet<DocId>>,
    /// Document to its key.
    forward: HashMap<DocId, IndexKey>,
}

impl FieldIndex {
    /// Creates an empty field index.
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self::with_type(discriminator, IndexType::Field)
    }

    /// Creates an empty path index.
    pub fn path(discriminator: impl Into<String>) -> Self {
        Self::with_type(discriminator, IndexType::Path)
    }

    fn with_type(discriminator: impl Into<String>, index_type: IndexType) -> Self {
        Self {
            discriminator: discriminator.into(),
            index_type,
            entries: BTreeMap::new(),
            forward: HashMap::new(),
        }
    }

    /// Returns the documents indexed under exactly `key`.
    pub fn lookup(&self, key: &IndexKey) -> BTreeSet<DocId> {
        self.entries
            .get(key)
            .map(|docs| docs.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the documents with keys in the given bounds and of the same
    /// kind as `probe`.
    fn scan(&self, probe: &IndexKey, bounds: (Bound<&IndexKey>, Bound<&IndexKey>)) -> BTreeSet<DocId> {
        self.entries
            .range::<IndexKey, _>(bounds)
            .filter(|(key, _)| key.same_kind(probe))
            .flat_map(|(_, docs)| docs.iter().copied())
            .collect()
    }

    /// Returns the smallest indexed key.
    pub fn min_key(&self) -> Option<&IndexKey> {
        self.entries.keys().next()
    }

    /// Returns the largest indexed key.
    pub fn max_key(&self) -> Option<&IndexKey> {
        self.entries.keys().next_back()
    }
}

fn key_of(value: &Value) -> Option<IndexKey> {
    IndexKey::from_value(value)
}

impl CatalogIndex for FieldIndex {
    fn index_type(&self) -> IndexType {
        self.index_type
    }

    fn discriminator(&self) -> &str {
        &self.discriminator
    }

    fn index_doc(&mut self, doc: DocId, value: &Value) -> bool {
        self.unindex_doc(doc);
        let Some(key) = key_of(value) else {
            return false;
        };
        self.entries.entry(key.clone()).or_default().insert(doc);
        self.forward.insert(doc, key);
        true
    }

    fn unindex_doc(&mut self, doc: DocId) -> bool {
        let Some(key) = self.forward.remove(&doc) else {
            return false;
        };
        if let Some(docs) = self.entries.get_mut(&key) {
            docs.remove(&doc);
            if docs.is_empty() {
                self.entries.remove(&key);
            }
        }
        true
    }

    fn indexed_count(&self) -> usize {
        self.forward.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.forward.clear();
    }

    fn apply(&self, comparison: &Comparison) -> CatalogResult<BTreeSet<DocId>> {
        use Bound::{Excluded, Included, Unbounded};

        let result = match comparison {
            Comparison::Eq(value) => key_of(value)
                .map(|key| self.lookup(&key))
                .unwrap_or_default(),
            Comparison::NotEq(value) => {
                let key = key_of(value);
                self.forward
                    .iter()
                    .filter(|(_, indexed)| Some(*indexed) != key.as_ref())
                    .map(|(doc, _)| *doc)
                    .collect()
            }
            Comparison::Gt(value) => match key_of(value) {
                Some(key) => self.scan(&key, (Excluded(&key), Unbounded)),
                None => BTreeSet::new(),
            },
            Comparison::Ge(value) => match key_of(value) {
                Some(key) => self.scan(&key, (Included(&key), Unbounded)),
                None => BTreeSet::new(),
            },
            Comparison::Lt(value) => match key_of(value) {
                Some(key) => self.scan(&key, (Unbounded, Excluded(&key))),
                None => BTreeSet::new(),
            },
            Comparison::Le(value) => match key_of(value) {
                Some(key) => self.scan(&key, (Unbounded, Included(&key))),
                None => BTreeSet::new(),
            },
            Comparison::InRange(min, max) => match (key_of(min), key_of(max)) {
                // BTreeMap::range panics on inverted bounds.
                (Some(min), Some(max)) if min <= max && min.same_kind(&max) => {
                    self.scan(&min, (Included(&min), Included(&max)))
                }
                _ => BTreeSet::new(),
            },
            Comparison::Any(values) => values
                .iter()
                .filter_map(key_of)
                .flat_map(|key| self.lookup(&key))
                .collect(),
            other => return Err(unsupported(self.index_type, other.comparator())),
        };
        Ok(result)
    }

    fn comparators(&self) -> &'static [Comparator] {
        COMPARATORS
    }

    fn sort_key(&self, doc: DocId) -> Option<&IndexKey> {
        self.forward.get(&doc)
    }

    fn unique_values(&self) -> CatalogResult<Vec<IndexKey>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
