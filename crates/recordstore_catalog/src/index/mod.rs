//! Catalog index primitives.
//!
//! Every index reads one attribute (its *discriminator*) off indexed records
//! and answers [`Comparison`]s with sets of [`DocId`]s:
//!
//! - [`FieldIndex`]: ordered values, equality and range comparisons
//! - [`KeywordIndex`]: collections of keywords, membership comparisons
//! - [`TextIndex`]: tokenized text, word and prefix matching
//!
//! Path indexes are field indexes over the parent container id.

mod field;
mod key;
mod keyword;
mod text;

pub use field::FieldIndex;
pub use key::IndexKey;
pub use keyword::KeywordIndex;
pub use text::{TextIndex, TokenizerConfig};

use crate::docmap::DocId;
use crate::error::{CatalogError, CatalogResult};
use crate::query::{Comparator, Comparison};
use crate::schema::FieldKind;
use recordstore_codec::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Kind of index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexType {
    /// Ordered value index.
    Field,
    /// Full-text index.
    Text,
    /// Keyword collection index.
    Keyword,
    /// Container location index.
    Path,
}

impl IndexType {
    /// Tag used as the first segment of index names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Text => "text",
            Self::Keyword => "keyword",
            Self::Path => "path",
        }
    }

    /// Returns the index type encoded in an index name.
    pub fn from_index_name(name: &str) -> Option<Self> {
        name.split('.').next()?.parse().ok()
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "field" => Ok(Self::Field),
            "text" => Ok(Self::Text),
            "keyword" => Ok(Self::Keyword),
            "path" => Ok(Self::Path),
            other => Err(CatalogError::invalid_index_type(
                "",
                other,
                "unknown index type",
            )),
        }
    }
}

/// Builds the name of the index of `index_type` over a field.
pub fn index_name(index_type: IndexType, kind: &FieldKind, field: &str) -> String {
    format!("{}.{}.{}", index_type.as_str(), kind.tag(), field)
}

/// A secondary index over one record attribute.
pub trait CatalogIndex: Send + Sync + fmt::Debug {
    /// Returns the index type.
    fn index_type(&self) -> IndexType;

    /// Returns the attribute this index reads.
    fn discriminator(&self) -> &str;

    /// Indexes `value` for `doc`, replacing any previous entry.
    ///
    /// Returns false (and leaves `doc` unindexed) if the value cannot be
    /// indexed by this index.
    fn index_doc(&mut self, doc: DocId, value: &Value) -> bool;

    /// Removes `doc`. Returns true if it was indexed.
    fn unindex_doc(&mut self, doc: DocId) -> bool;

    /// Returns the number of indexed documents.
    fn indexed_count(&self) -> usize;

    /// Removes every entry.
    fn clear(&mut self);

    /// Evaluates a comparison.
    fn apply(&self, comparison: &Comparison) -> CatalogResult<BTreeSet<DocId>>;

    /// Comparators [`CatalogIndex::apply`] accepts.
    fn comparators(&self) -> &'static [Comparator];

    /// Returns the key `doc` sorts under, for indexes that keep one.
    fn sort_key(&self, _doc: DocId) -> Option<&IndexKey> {
        None
    }

    /// Returns the distinct indexed values in ascending order.
    fn unique_values(&self) -> CatalogResult<Vec<IndexKey>> {
        Err(CatalogError::NotImplemented {
            operation: "unique_values",
            index_type: self.index_type().as_str(),
        })
    }
}

pub(crate) fn unsupported(index_type: IndexType, comparator: Comparator) -> CatalogError {
    CatalogError::UnsupportedQuery {
        index_type: index_type.as_str(),
        comparator: comparator.name(),
    }
}

/// Creates an empty index of `index_type` over `discriminator`.
pub fn create_index(
    index_type: IndexType,
    discriminator: impl Into<String>,
    tokenizer: &TokenizerConfig,
) -> Box<dyn CatalogIndex> {
    match index_type {
        IndexType::Field => Box::new(FieldIndex::new(discriminator)),
        IndexType::Path => Box::new(FieldIndex::path(discriminator)),
        IndexType::Keyword => Box::new(KeywordIndex::new(discriminator)),
        IndexType::Text => Box::new(TextIndex::with_tokenizer(discriminator, tokenizer.clone())),
    }
}
