//! The record catalog.
//!
//! A [`RecordCatalog`] maps schema fields to secondary indexes. Binding a
//! schema creates the indexes its fields need; indexing a record reads the
//! bound fields of every schema the record provides and updates those
//! indexes. Searches return `(count, uids)` pairs, and UIDs resolve back to
//! records through an injected [`RecordResolver`].
//!
//! Indexes can be shared between schemas. The catalog records which schemas
//! claim each index and only deletes an index once no schema claims it.

use crate::config::CatalogConfig;
use crate::docmap::{DocId, DocumentMap};
use crate::error::{CatalogError, CatalogResult};
use crate::index::{create_index, CatalogIndex, IndexKey, IndexType};
use crate::info::{FieldInfo, SchemaInfo};
use crate::query::{Comparator, Query, QueryOptions};
use crate::resolver::ResolverRegistry;
use crate::schema::Schema;
use recordstore_codec::{FieldMap, Value};
use recordstore_core::{Record, RecordKey, RecordResolver, RecordUid};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Name of the location index over parent container ids.
pub const PARENT_INDEX: &str = "path.__parent__";
/// Name of the location index over record names.
pub const NAME_INDEX: &str = "field.__name__";

const PARENT_ATTRIBUTE: &str = "__parent__";
const NAME_ATTRIBUTE: &str = "__name__";

/// Index selection for one field at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSelection {
    /// Do not index the field.
    Omit,
    /// Index the field with exactly these index types.
    Types(Vec<IndexType>),
}

impl From<IndexType> for IndexSelection {
    fn from(index_type: IndexType) -> Self {
        Self::Types(vec![index_type])
    }
}

impl From<Vec<IndexType>> for IndexSelection {
    fn from(types: Vec<IndexType>) -> Self {
        Self::Types(types)
    }
}

/// Per-field index overrides, keyed by field name.
pub type IndexOverrides = HashMap<String, IndexSelection>;

/// Identifies a record for [`RecordCatalog::get_object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectId {
    /// A document id assigned by the catalog.
    Doc(DocId),
    /// A record UID.
    Uid(RecordUid),
}

impl From<DocId> for ObjectId {
    fn from(doc: DocId) -> Self {
        Self::Doc(doc)
    }
}

impl From<RecordUid> for ObjectId {
    fn from(uid: RecordUid) -> Self {
        Self::Uid(uid)
    }
}

/// Schema-driven secondary index manager.
pub struct RecordCatalog {
    config: CatalogConfig,
    registry: Arc<ResolverRegistry>,
    /// Index name to index.
    indexer: BTreeMap<String, Box<dyn CatalogIndex>>,
    /// UID to document id.
    mapper: DocumentMap,
    /// Schema name to bound metadata.
    supported: BTreeMap<String, SchemaInfo>,
    /// Index name to the schemas claiming it.
    index_owners: BTreeMap<String, BTreeSet<String>>,
    resolver: Option<Arc<dyn RecordResolver>>,
}

impl RecordCatalog {
    /// Creates an empty catalog with default configuration.
    pub fn new(registry: Arc<ResolverRegistry>) -> Self {
        Self::with_config(registry, CatalogConfig::default())
    }

    /// Creates an empty catalog.
    pub fn with_config(registry: Arc<ResolverRegistry>, config: CatalogConfig) -> Self {
        Self {
            config,
            registry,
            indexer: BTreeMap::new(),
            mapper: DocumentMap::new(),
            supported: BTreeMap::new(),
            index_owners: BTreeMap::new(),
            resolver: None,
        }
    }

    /// Sets the record resolver used by [`RecordCatalog::get_object`].
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn RecordResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replaces the record resolver.
    pub fn set_resolver(&mut self, resolver: Option<Arc<dyn RecordResolver>>) {
        self.resolver = resolver;
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns the schema resolver registry.
    pub fn registry(&self) -> &Arc<ResolverRegistry> {
        &self.registry
    }

    /// Returns the UID ↔ document id map.
    pub fn mapper(&self) -> &DocumentMap {
        &self.mapper
    }

    /// Returns the number of indexed records.
    pub fn len(&self) -> usize {
        self.mapper.len()
    }

    /// Returns true if no record is indexed.
    pub fn is_empty(&self) -> bool {
        self.mapper.is_empty()
    }

    // ---- Schemas ----

    /// Binds a schema, creating the indexes its fields need.
    ///
    /// Fields named in `omit` are not indexed. `index_types` overrides the
    /// default index policy per field. Every override is validated before
    /// anything is created: a text index needs a text or bytes field (or a
    /// collection of them), a keyword index needs a collection field, and
    /// path indexes cannot be requested.
    ///
    /// Binding a schema again replaces its metadata and ownership claims.
    pub fn bind(
        &mut self,
        schema: &Schema,
        omit: &[&str],
        index_types: Option<&IndexOverrides>,
    ) -> CatalogResult<&SchemaInfo> {
        let mut info = SchemaInfo::with_config(Arc::clone(&self.registry), schema, &self.config);

        if let Some(overrides) = index_types {
            let mut fields: Vec<&String> = overrides.keys().collect();
            fields.sort();
            for name in &fields {
                let field = info.field(name).ok_or_else(|| CatalogError::UnknownField {
                    schema: info.name.clone(),
                    field: (*name).clone(),
                })?;
                if let Some(IndexSelection::Types(types)) = overrides.get(*name) {
                    for index_type in types {
                        validate_override(field, *index_type)?;
                    }
                }
            }
            for (name, selection) in overrides {
                if let Some(field) = info.field_mut(name) {
                    match selection {
                        IndexSelection::Omit => field.indexes.clear(),
                        IndexSelection::Types(types) => field.set_index_types(types),
                    }
                }
            }
        }

        for name in omit {
            if let Some(field) = info.field_mut(name) {
                field.indexes.clear();
            }
        }

        let mut names: Vec<String> = Vec::new();
        for field in &info.fields {
            for name in &field.indexes {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        info.indexes = names;

        if let Some(previous) = self.supported.remove(&info.name) {
            self.release(&previous, false);
        }

        for field in &info.fields {
            for name in &field.indexes {
                if self.indexer.contains_key(name) {
                    continue;
                }
                let Some(index_type) = IndexType::from_index_name(name) else {
                    continue;
                };
                let index = create_index(index_type, field.name.as_str(), &self.config.tokenizer);
                self.indexer.insert(name.clone(), index);
                debug!(index = %name, schema = %info.name, "index created");
            }
        }
        for name in &info.indexes {
            self.index_owners
                .entry(name.clone())
                .or_default()
                .insert(info.name.clone());
        }

        debug!(
            schema = %info.name,
            fields = info.fields.len(),
            indexes = info.indexes.len(),
            "schema bound"
        );
        let name = info.name.clone();
        Ok(self.supported.entry(name).or_insert(info))
    }

    /// Unbinds a schema, returning its metadata.
    ///
    /// The schema's ownership claims are released. With `remove_indexes`,
    /// indexes no other schema claims are deleted.
    pub fn unbind(&mut self, schema: &str, remove_indexes: bool) -> Option<SchemaInfo> {
        let info = self.supported.remove(schema)?;
        self.release(&info, remove_indexes);
        debug!(schema = %info.name, remove_indexes, "schema unbound");
        Some(info)
    }

    fn release(&mut self, info: &SchemaInfo, remove_indexes: bool) {
        for name in &info.indexes {
            let Some(owners) = self.index_owners.get_mut(name) else {
                continue;
            };
            owners.remove(&info.name);
            if owners.is_empty() && remove_indexes {
                self.index_owners.remove(name);
                if self.indexer.remove(name).is_some() {
                    debug!(index = %name, "index removed");
                }
            }
        }
    }

    /// Returns the metadata of a bound schema.
    pub fn schema_info(&self, schema: &str) -> Option<&SchemaInfo> {
        self.supported.get(schema)
    }

    /// Returns the metadata of every bound schema, by name.
    pub fn supported(&self) -> impl Iterator<Item = &SchemaInfo> + '_ {
        self.supported.values()
    }

    /// Returns the schemas claiming an index.
    pub fn owners(&self, index: &str) -> Option<&BTreeSet<String>> {
        self.index_owners.get(index)
    }

    /// Returns the fields of a bound schema that have at least one index.
    pub fn searchable(&self, schema: &str) -> CatalogResult<Vec<&FieldInfo>> {
        let info = self
            .supported
            .get(schema)
            .ok_or_else(|| CatalogError::schema_not_bound(schema))?;
        Ok(info
            .fields
            .iter()
            .filter(|field| field.indexes.iter().any(|name| self.indexer.contains_key(name)))
            .collect())
    }

    // ---- Indexes ----

    /// Returns the index registered under `name`.
    pub fn get(&self, name: &str) -> Option<&dyn CatalogIndex> {
        self.indexer.get(name).map(|index| index.as_ref())
    }

    /// Returns the index registered under `name`, or an error.
    pub fn index_for(&self, name: &str) -> CatalogResult<&dyn CatalogIndex> {
        self.get(name)
            .ok_or_else(|| CatalogError::index_not_found(name))
    }

    /// Registers an index explicitly, returning the one it replaces.
    ///
    /// Explicit indexes have no owner, so unbinding never removes them.
    pub fn set_index(
        &mut self,
        name: impl Into<String>,
        index: Box<dyn CatalogIndex>,
    ) -> Option<Box<dyn CatalogIndex>> {
        let name = name.into();
        debug!(index = %name, index_type = %index.index_type(), "index set");
        self.indexer.insert(name, index)
    }

    /// Returns every index name in ascending order.
    pub fn index_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.indexer.keys().map(String::as_str)
    }

    /// Returns the distinct values stored in an index.
    ///
    /// Fails for text indexes, which keep tokens rather than values.
    pub fn unique_values_for(&self, index: &str) -> CatalogResult<Vec<IndexKey>> {
        self.index_for(index)?.unique_values()
    }

    /// Returns the comparators an index accepts with their labels.
    pub fn comparators_for(&self, index: &str) -> CatalogResult<Vec<(Comparator, &'static str)>> {
        Ok(self
            .index_for(index)?
            .comparators()
            .iter()
            .map(|c| (*c, c.label()))
            .collect())
    }

    // ---- Indexing ----

    /// Indexes a record under `uid`, or under its own UID when `None`.
    ///
    /// Returns the UID used.
    pub fn index(&mut self, record: &Record, uid: Option<RecordUid>) -> CatalogResult<RecordUid> {
        self.index_with(record, |record| Some(uid.unwrap_or_else(|| record.uid())))
    }

    /// Indexes a record under the UID returned by `getuid`.
    ///
    /// Every index of every bound schema the record provides is updated.
    /// Records with a parent container are also indexed by location.
    pub fn index_with<F>(&mut self, record: &Record, getuid: F) -> CatalogResult<RecordUid>
    where
        F: FnOnce(&Record) -> Option<RecordUid>,
    {
        let uid = getuid(record)
            .filter(|uid| !uid.is_nil())
            .ok_or(CatalogError::MissingUid)?;
        let doc = self.mapper.add(uid);

        for index in self.indexer.values_mut() {
            index.unindex_doc(doc);
        }

        let mut updated = 0usize;
        for info in self.supported.values() {
            if !record.provides(&info.name) {
                continue;
            }
            for field in &info.fields {
                let Some(value) = record.get(&field.name) else {
                    continue;
                };
                for name in &field.indexes {
                    if let Some(index) = self.indexer.get_mut(name) {
                        if index.index_doc(doc, value) {
                            updated += 1;
                        }
                    }
                }
            }
        }

        if self.config.index_locations {
            if let Some(parent) = record.parent() {
                let tokenizer = &self.config.tokenizer;
                self.indexer
                    .entry(PARENT_INDEX.to_string())
                    .or_insert_with(|| create_index(IndexType::Path, PARENT_ATTRIBUTE, tokenizer))
                    .index_doc(doc, &Value::Text(parent.to_string()));
                self.indexer
                    .entry(NAME_INDEX.to_string())
                    .or_insert_with(|| create_index(IndexType::Field, NAME_ATTRIBUTE, tokenizer))
                    .index_doc(doc, &Value::Text(record.name()));
                updated += 2;
            }
        }

        trace!(uid = %uid, doc = %doc, updated, "record indexed");
        Ok(uid)
    }

    /// Re-indexes a record. Same as [`RecordCatalog::index`].
    pub fn reindex(&mut self, record: &Record, uid: Option<RecordUid>) -> CatalogResult<RecordUid> {
        self.index(record, uid)
    }

    /// Removes a record from every index and from the document map.
    ///
    /// Returns false if the record was not indexed.
    pub fn unindex<K: RecordKey + ?Sized>(&mut self, key: &K) -> CatalogResult<bool> {
        let uid = key.to_record_uid()?;
        let Some(doc) = self.mapper.remove(&uid) else {
            return Ok(false);
        };
        for index in self.indexer.values_mut() {
            index.unindex_doc(doc);
        }
        trace!(uid = %uid, doc = %doc, "record unindexed");
        Ok(true)
    }

    // ---- Searching ----

    /// Searches by index-name/value pairs, all of which must match.
    ///
    /// An empty search matches nothing.
    pub fn search(&self, terms: &FieldMap) -> CatalogResult<(usize, Vec<RecordUid>)> {
        let query = Query::And(
            terms
                .iter()
                .map(|(index, value)| Query::eq(index.as_str(), value.clone()))
                .collect(),
        );
        self.query(&query, &QueryOptions::default())
    }

    /// Evaluates a query.
    ///
    /// Returns the total number of matches and the matching UIDs after
    /// sorting, reversing and limiting. Unsorted results follow indexing
    /// order.
    pub fn query(
        &self,
        query: &Query,
        options: &QueryOptions,
    ) -> CatalogResult<(usize, Vec<RecordUid>)> {
        let matches = self.evaluate(query)?;
        let count = matches.len();
        let mut docs: Vec<DocId> = matches.into_iter().collect();

        if let Some(sort_index) = &options.sort_index {
            let index = self.index_for(sort_index)?;
            docs.sort_by(|a, b| match (index.sort_key(*a), index.sort_key(*b)) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        if options.reverse {
            docs.reverse();
        }
        if let Some(limit) = options.limit {
            docs.truncate(limit);
        }

        let uids: Vec<RecordUid> = docs
            .into_iter()
            .filter_map(|doc| self.mapper.uid(doc))
            .collect();
        debug!(count, returned = uids.len(), "query evaluated");
        Ok((count, uids))
    }

    fn evaluate(&self, query: &Query) -> CatalogResult<BTreeSet<DocId>> {
        match query {
            Query::Compare { index, comparison } => self.index_for(index)?.apply(comparison),
            Query::And(parts) => {
                let mut parts = parts.iter();
                let Some(first) = parts.next() else {
                    return Ok(BTreeSet::new());
                };
                let mut result = self.evaluate(first)?;
                for part in parts {
                    let docs = self.evaluate(part)?;
                    result.retain(|doc| docs.contains(doc));
                }
                Ok(result)
            }
            Query::Or(parts) => {
                let mut result = BTreeSet::new();
                for part in parts {
                    result.extend(self.evaluate(part)?);
                }
                Ok(result)
            }
            Query::Not(inner) => {
                let excluded = self.evaluate(inner)?;
                Ok(self
                    .mapper
                    .doc_ids()
                    .filter(|doc| !excluded.contains(doc))
                    .collect())
            }
        }
    }

    /// Resolves a document id or UID to a record through the record
    /// resolver. `None` without a resolver or when resolution fails.
    pub fn get_object(&self, identifier: impl Into<ObjectId>) -> Option<Record> {
        let uid = match identifier.into() {
            ObjectId::Doc(doc) => self.mapper.uid(doc)?,
            ObjectId::Uid(uid) => uid,
        };
        self.resolver.as_ref()?.resolve(&uid)
    }
}

fn validate_override(field: &FieldInfo, index_type: IndexType) -> CatalogResult<()> {
    let reject = |reason: &str| {
        Err(CatalogError::invalid_index_type(
            field.name.as_str(),
            index_type.as_str(),
            reason,
        ))
    };
    match index_type {
        IndexType::Field => Ok(()),
        IndexType::Text
            if field.kind.is_textual() || field.kind.element().is_some_and(|e| e.is_textual()) =>
        {
            Ok(())
        }
        IndexType::Text => reject("text index requires a text field or a collection of text"),
        IndexType::Keyword if field.kind.is_collection() => Ok(()),
        IndexType::Keyword => reject("keyword index requires a collection field"),
        IndexType::Path => reject("path indexes are reserved for location indexing"),
    }
}

impl fmt::Debug for RecordCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCatalog")
            .field("indexes", &self.indexer.keys().collect::<Vec<_>>())
            .field("supported", &self.supported.keys().collect::<Vec<_>>())
            .field("documents", &self.mapper.len())
            .field("has_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}
