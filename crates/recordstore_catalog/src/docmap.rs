//! UID ↔ document id mapping.

use recordstore_core::RecordUid;
use std::collections::HashMap;
use std::fmt;

/// Integer document id assigned by a [`DocumentMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(pub u64);

impl DocId {
    /// Returns the raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc:{}", self.0)
    }
}

/// Bidirectional map between record UIDs and document ids.
///
/// Ids are assigned in increasing order starting at 1 and are never reused,
/// so sorting by id gives indexing order.
#[derive(Debug, Default, Clone)]
pub struct DocumentMap {
    next: u64,
    by_uid: HashMap<RecordUid, DocId>,
    by_doc: HashMap<DocId, RecordUid>,
}

impl DocumentMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `uid`, assigning a new one if unmapped.
    pub fn add(&mut self, uid: RecordUid) -> DocId {
        if let Some(doc) = self.by_uid.get(&uid) {
            return *doc;
        }
        self.next += 1;
        let doc = DocId(self.next);
        self.by_uid.insert(uid, doc);
        self.by_doc.insert(doc, uid);
        doc
    }

    /// Returns the id mapped to `uid`.
    pub fn doc_id(&self, uid: &RecordUid) -> Option<DocId> {
        self.by_uid.get(uid).copied()
    }

    /// Returns the UID mapped to `doc`.
    pub fn uid(&self, doc: DocId) -> Option<RecordUid> {
        self.by_doc.get(&doc).copied()
    }

    /// Removes `uid`, returning its former id.
    pub fn remove(&mut self, uid: &RecordUid) -> Option<DocId> {
        let doc = self.by_uid.remove(uid)?;
        self.by_doc.remove(&doc);
        Some(doc)
    }

    /// Returns every mapped id.
    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.by_doc.keys().copied()
    }

    /// Returns the number of mapped records.
    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    /// Returns true if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }

    /// Removes every mapping. Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.by_uid.clear();
        self.by_doc.clear();
    }
}
