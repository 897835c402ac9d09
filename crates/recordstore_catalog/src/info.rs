//! Bound schema metadata.
//!
//! [`SchemaInfo`] and [`FieldInfo`] describe a schema as the catalog sees it:
//! names, titles, kinds and the indexes each field maps to. They never hold
//! the schema itself; [`SchemaInfo::resolve`] and [`FieldInfo::resolve`] go
//! back through the [`ResolverRegistry`] by name.

use crate::config::CatalogConfig;
use crate::index::{index_name, IndexType};
use crate::resolver::{ResolverRegistry, DOTTED_NAMESPACE};
use crate::schema::{Field, FieldKind, Schema};
use std::fmt;
use std::sync::Arc;

/// A resolvable handle to a schema: its name, namespace and registry.
#[derive(Clone)]
pub struct SchemaRef {
    name: String,
    namespace: String,
    registry: Arc<ResolverRegistry>,
}

impl SchemaRef {
    /// Creates a handle.
    pub fn new(
        registry: Arc<ResolverRegistry>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            registry,
        }
    }

    /// Returns the schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace tag.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resolves the schema through the namespace's resolver.
    pub fn resolve(&self) -> Option<Arc<Schema>> {
        self.registry.resolve(&self.namespace, &self.name)
    }
}

impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRef")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// Index types a field of `kind` gets when no override is given.
pub fn default_index_types(kind: &FieldKind, config: &CatalogConfig) -> Vec<IndexType> {
    match kind {
        k if k.element().is_some_and(|e| e.is_text()) => vec![IndexType::Keyword],
        FieldKind::BytesLine if !config.text_index_bytes_line => vec![IndexType::Field],
        k if k.is_single_line() => vec![IndexType::Field, IndexType::Text],
        FieldKind::Text => vec![IndexType::Text],
        FieldKind::Bytes => vec![],
        _ => vec![IndexType::Field],
    }
}

/// Catalog metadata for one schema field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// Field title.
    pub title: String,
    /// Field description.
    pub description: String,
    /// Declared kind.
    pub kind: FieldKind,
    /// Names of the indexes this field maps to.
    pub indexes: Vec<String>,
    schema: SchemaRef,
}

impl FieldInfo {
    /// Creates field metadata with the default index policy.
    pub fn new(schema: SchemaRef, field: &Field, config: &CatalogConfig) -> Self {
        let mut info = Self {
            name: field.name.clone(),
            title: field.title.clone(),
            description: field.description.clone(),
            kind: field.kind.clone(),
            indexes: Vec::new(),
            schema,
        };
        info.set_index_types(&default_index_types(&field.kind, config));
        info
    }

    /// Replaces the field's indexes with one index per type.
    pub fn set_index_types(&mut self, types: &[IndexType]) {
        self.indexes.clear();
        for index_type in types {
            let name = index_name(*index_type, &self.kind, &self.name);
            if !self.indexes.contains(&name) {
                self.indexes.push(name);
            }
        }
    }

    /// Returns the index types encoded in the field's index names.
    pub fn index_types(&self) -> Vec<IndexType> {
        self.indexes
            .iter()
            .filter_map(|name| IndexType::from_index_name(name))
            .collect()
    }

    /// Returns the owning schema handle.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Resolves the live field definition through the owning schema.
    pub fn resolve(&self) -> Option<Field> {
        self.schema.resolve()?.get(&self.name).cloned()
    }
}

/// Catalog metadata for one schema.
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    /// Dotted schema name.
    pub name: String,
    /// Resolver namespace.
    pub namespace: String,
    /// One entry per declared field, in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Names of the indexes this schema uses. Filled in when bound.
    pub indexes: Vec<String>,
    handle: SchemaRef,
}

impl SchemaInfo {
    /// Creates schema metadata in the dotted namespace with the default
    /// index policy.
    pub fn new(registry: Arc<ResolverRegistry>, schema: &Schema) -> Self {
        Self::with_config(registry, schema, &CatalogConfig::default())
    }

    /// Creates schema metadata in the dotted namespace.
    pub fn with_config(
        registry: Arc<ResolverRegistry>,
        schema: &Schema,
        config: &CatalogConfig,
    ) -> Self {
        let handle = SchemaRef::new(registry, schema.name(), DOTTED_NAMESPACE);
        let fields = schema
            .fields()
            .iter()
            .map(|field| FieldInfo::new(handle.clone(), field, config))
            .collect();
        Self {
            name: schema.name().to_string(),
            namespace: DOTTED_NAMESPACE.to_string(),
            fields,
            indexes: Vec::new(),
            handle,
        }
    }

    /// Moves the metadata to another resolver namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.handle.namespace.clone_from(&namespace);
        for field in &mut self.fields {
            field.schema = self.handle.clone();
        }
        self.namespace = namespace;
        self
    }

    /// Returns the field metadata for `name`.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldInfo> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Returns the resolvable handle.
    pub fn handle(&self) -> &SchemaRef {
        &self.handle
    }

    /// Resolves the schema. `None` when the namespace has no resolver or
    /// the resolver does not know the name.
    pub fn resolve(&self) -> Option<Arc<Schema>> {
        self.handle.resolve()
    }
}
