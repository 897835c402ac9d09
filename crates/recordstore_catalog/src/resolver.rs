//! Schema resolution by name.
//!
//! Bound schema metadata never holds the schema itself, only its dotted name
//! and a namespace tag. Resolution goes through a [`ResolverRegistry`], which
//! maps each namespace to a [`SchemaResolver`].

use crate::schema::Schema;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Namespace of the built-in dotted-name resolver.
pub const DOTTED_NAMESPACE: &str = "dotted";

/// Resolves a schema name to its definition.
pub trait SchemaResolver: Send + Sync {
    /// Returns the schema registered under `name`.
    fn resolve(&self, name: &str) -> Option<Arc<Schema>>;
}

/// Resolves schemas by their dotted name.
#[derive(Default)]
pub struct DottedNameResolver {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl DottedNameResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its own name, replacing any previous one.
    pub fn register(&self, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        self.schemas
            .write()
            .insert(schema.name().to_string(), Arc::clone(&schema));
        schema
    }

    /// Removes a schema.
    pub fn unregister(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.write().remove(name)
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Returns true if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

impl SchemaResolver for DottedNameResolver {
    fn resolve(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.read().get(name).cloned()
    }
}

impl fmt::Debug for DottedNameResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DottedNameResolver")
            .field("schemas", &self.len())
            .finish()
    }
}

/// Maps namespace tags to resolvers.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: RwLock<HashMap<String, Arc<dyn SchemaResolver>>>,
}

impl ResolverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with `resolver` installed under [`DOTTED_NAMESPACE`].
    pub fn with_dotted(resolver: Arc<DottedNameResolver>) -> Self {
        let registry = Self::new();
        registry.register(DOTTED_NAMESPACE, resolver);
        registry
    }

    /// Installs a resolver for a namespace, replacing any previous one.
    pub fn register(&self, namespace: impl Into<String>, resolver: Arc<dyn SchemaResolver>) {
        let namespace = namespace.into();
        debug!(namespace = %namespace, "schema resolver registered");
        self.resolvers.write().insert(namespace, resolver);
    }

    /// Removes the resolver for a namespace.
    pub fn unregister(&self, namespace: &str) -> Option<Arc<dyn SchemaResolver>> {
        self.resolvers.write().remove(namespace)
    }

    /// Returns the resolver for a namespace.
    pub fn get(&self, namespace: &str) -> Option<Arc<dyn SchemaResolver>> {
        self.resolvers.read().get(namespace).cloned()
    }

    /// Resolves `name` in `namespace`.
    pub fn resolve(&self, namespace: &str, name: &str) -> Option<Arc<Schema>> {
        self.get(namespace)?.resolve(name)
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut namespaces: Vec<String> = self.resolvers.read().keys().cloned().collect();
        namespaces.sort();
        f.debug_struct("ResolverRegistry")
            .field("namespaces", &namespaces)
            .finish()
    }
}
