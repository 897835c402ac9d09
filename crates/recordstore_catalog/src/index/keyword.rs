//! Keyword collection index.

use super::{unsupported, CatalogIndex, IndexKey, IndexType};
use crate::docmap::DocId;
use crate::error::CatalogResult;
use crate::query::{Comparator, Comparison};
use recordstore_codec::Value;
use std::collections::{BTreeSet, HashMap, HashSet};

const COMPARATORS: &[Comparator] = &[
    Comparator::Contains,
    Comparator::Eq,
    Comparator::NotEq,
    Comparator::Any,
    Comparator::All,
];

/// Hash index from keywords to documents.
///
/// A document is indexed under every element of a collection value; a scalar
/// value counts as a single keyword. `Eq` and `Contains` both mean "has this
/// keyword".
#[derive(Debug)]
pub struct KeywordIndex {
    discriminator: String,
    /// Keyword to documents.
    inverted: HashMap<IndexKey, HashSet<DocId>>,
    /// Document to its keywords.
    forward: HashMap<DocId, HashSet<IndexKey>>,
}

impl KeywordIndex {
    /// Creates an empty keyword index.
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            inverted: HashMap::new(),
            forward: HashMap::new(),
        }
    }

    /// Returns the documents carrying `keyword`.
    pub fn lookup(&self, keyword: &IndexKey) -> HashSet<DocId> {
        self.inverted.get(keyword).cloned().unwrap_or_default()
    }

    /// Returns the keywords indexed for a document.
    pub fn keywords_for(&self, doc: DocId) -> Option<&HashSet<IndexKey>> {
        self.forward.get(&doc)
    }

    fn keywords(value: &Value) -> Option<HashSet<IndexKey>> {
        match value {
            Value::List(items) => Some(items.iter().filter_map(IndexKey::from_value).collect()),
            other => IndexKey::from_value(other).map(|key| HashSet::from([key])),
        }
    }

    fn matching(&self, value: &Value) -> HashSet<DocId> {
        IndexKey::from_value(value)
            .map(|key| self.lookup(&key))
            .unwrap_or_default()
    }
}

impl CatalogIndex for KeywordIndex {
    fn index_type(&self) -> IndexType {
        IndexType::Keyword
    }

    fn discriminator(&self) -> &str {
        &self.discriminator
    }

    fn index_doc(&mut self, doc: DocId, value: &Value) -> bool {
        self.unindex_doc(doc);
        let Some(keywords) = Self::keywords(value) else {
            return false;
        };
        for keyword in &keywords {
            self.inverted.entry(keyword.clone()).or_default().insert(doc);
        }
        self.forward.insert(doc, keywords);
        true
    }

    fn unindex_doc(&mut self, doc: DocId) -> bool {
        let Some(keywords) = self.forward.remove(&doc) else {
            return false;
        };
        for keyword in &keywords {
            if let Some(docs) = self.inverted.get_mut(keyword) {
                docs.remove(&doc);
                if docs.is_empty() {
                    self.inverted.remove(keyword);
                }
            }
        }
        true
    }

    fn indexed_count(&self) -> usize {
        self.forward.len()
    }

    fn clear(&mut self) {
        self.inverted.clear();
        self.forward.clear();
    }

    fn apply(&self, comparison: &Comparison) -> CatalogResult<BTreeSet<DocId>> {
        let result: BTreeSet<DocId> = match comparison {
            Comparison::Eq(value) | Comparison::Contains(value) => {
                self.matching(value).into_iter().collect()
            }
            Comparison::NotEq(value) => {
                let excluded = self.matching(value);
                self.forward
                    .keys()
                    .filter(|doc| !excluded.contains(doc))
                    .copied()
                    .collect()
            }
            Comparison::Any(values) => values
                .iter()
                .flat_map(|value| self.matching(value))
                .collect(),
            Comparison::All(values) => {
                let mut sets = values.iter().map(|value| self.matching(value));
                let Some(first) = sets.next() else {
                    return Ok(BTreeSet::new());
                };
                sets.fold(first, |acc, set| acc.intersection(&set).copied().collect())
                    .into_iter()
                    .collect()
            }
            other => return Err(unsupported(IndexType::Keyword, other.comparator())),
        };
        Ok(result)
    }

    fn comparators(&self) -> &'static [Comparator] {
        COMPARATORS
    }

    fn unique_values(&self) -> CatalogResult<Vec<IndexKey>> {
        let mut keys: Vec<IndexKey> = self.inverted.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Value {
        Value::List(items.iter().map(|s| Value::from(*s)).collect())
    }

    fn tagged() -> KeywordIndex {
        let mut index = KeywordIndex::new("tags");
        index.index_doc(DocId(1), &tags(&["rust", "db"]));
        index.index_doc(DocId(2), &tags(&["rust"]));
        index.index_doc(DocId(3), &tags(&["python", "db"]));
        index
    }

    fn ids(set: BTreeSet<DocId>) -> Vec<u64> {
        set.into_iter().map(DocId::as_u64).collect()
    }

    #[test]
    fn membership() {
        let index = tagged();
        assert_eq!(ids(index.apply(&Comparison::Contains("rust".into())).unwrap()), vec![1, 2]);
        assert_eq!(ids(index.apply(&Comparison::Eq("db".into())).unwrap()), vec![1, 3]);
        assert_eq!(ids(index.apply(&Comparison::NotEq("db".into())).unwrap()), vec![2]);
    }

    #[test]
    fn any_and_all() {
        let index = tagged();
        assert_eq!(
            ids(index
                .apply(&Comparison::Any(vec!["python".into(), "rust".into()]))
                .unwrap()),
            vec![1, 2, 3]
        );
        assert_eq!(
            ids(index
                .apply(&Comparison::All(vec!["rust".into(), "db".into()]))
                .unwrap()),
            vec![1]
        );
        assert!(index.apply(&Comparison::All(vec![])).unwrap().is_empty());
    }

    #[test]
    fn scalar_is_single_keyword() {
        let mut index = KeywordIndex::new("tags");
        assert!(index.index_doc(DocId(9), &Value::from("solo")));
        assert_eq!(
            index.keywords_for(DocId(9)),
            Some(&HashSet::from([IndexKey::from("solo")]))
        );
    }

    #[test]
    fn reindex_drops_old_keywords() {
        let mut index = tagged();
        index.index_doc(DocId(1), &tags(&["go"]));
        assert_eq!(ids(index.apply(&Comparison::Contains("rust".into())).unwrap()), vec![2]);
        assert_eq!(
            index.unique_values().unwrap(),
            vec![
                IndexKey::from("db"),
                IndexKey::from("go"),
                IndexKey::from("python"),
                IndexKey::from("rust"),
            ]
        );
    }

    #[test]
    fn ranges_are_unsupported() {
        let index = tagged();
        assert!(index.apply(&Comparison::Gt("a".into())).is_err());
    }
}
