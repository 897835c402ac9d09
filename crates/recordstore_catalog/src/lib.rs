//! # recordstore_catalog
//!
//! Schema-driven secondary indexes over recordstore records.
//!
//! A [`RecordCatalog`] binds [`Schema`]s and derives one or more indexes per
//! field from its kind:
//!
//! | Field kind | Indexes |
//! |---|---|
//! | collection of text | keyword |
//! | single-line text or bytes | field, text |
//! | multi-line text | text |
//! | bytes | none |
//! | anything else | field |
//!
//! Indexes are named `"{type}.{kind}.{field}"` and shared between schemas
//! that declare the same field; an index is only removed once no bound
//! schema claims it.
//!
//! ## Example
//!
//! ```rust
//! use recordstore_catalog::{
//!     DottedNameResolver, Field, FieldKind, Query, QueryOptions, RecordCatalog,
//!     ResolverRegistry, Schema,
//! };
//! use recordstore_core::Record;
//! use std::sync::Arc;
//!
//! let schema = Schema::new("app.Article")
//!     .field(Field::new("title", FieldKind::TextLine))
//!     .field(Field::new("year", FieldKind::Int));
//!
//! let dotted = Arc::new(DottedNameResolver::new());
//! dotted.register(schema.clone());
//! let mut catalog = RecordCatalog::new(Arc::new(ResolverRegistry::with_dotted(dotted)));
//! catalog.bind(&schema, &[], None).unwrap();
//!
//! let mut record = Record::new();
//! record.provide("app.Article");
//! record.set("title", "Hello catalog");
//! record.set("year", 2024);
//! let uid = catalog.index(&record, None).unwrap();
//!
//! let (count, uids) = catalog
//!     .query(&Query::contains("text.TextLine.title", "hello"), &QueryOptions::new())
//!     .unwrap();
//! assert_eq!(count, 1);
//! assert_eq!(uids, vec![uid]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod docmap;
mod error;
mod index;
mod info;
mod query;
mod resolver;
mod schema;

pub use catalog::{IndexOverrides, IndexSelection, ObjectId, RecordCatalog, NAME_INDEX, PARENT_INDEX};
pub use config::CatalogConfig;
pub use docmap::{DocId, DocumentMap};
pub use error::{CatalogError, CatalogResult};
pub use index::{
    create_index, index_name, CatalogIndex, FieldIndex, IndexKey, IndexType, KeywordIndex,
    TextIndex, TokenizerConfig,
};
pub use info::{default_index_types, FieldInfo, SchemaInfo, SchemaRef};
pub use query::{Comparator, Comparison, Query, QueryOptions};
pub use resolver::{DottedNameResolver, ResolverRegistry, SchemaResolver, DOTTED_NAMESPACE};
pub use schema::{Field, FieldKind, Schema};
