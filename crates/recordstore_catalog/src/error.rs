//! Error types for the record catalog.

use recordstore_core::CoreError;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur in catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Core error, e.g. an invalid record key.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// No index is registered under this name.
    #[error("index not found: {name}")]
    IndexNotFound {
        /// The requested index name.
        name: String,
    },

    /// A bind-time index override does not fit the field.
    #[error("invalid index type {index_type:?} for field {field:?}: {reason}")]
    InvalidIndexType {
        /// Field the override was given for.
        field: String,
        /// Requested index type.
        index_type: String,
        /// Why the override was rejected.
        reason: String,
    },

    /// A bind-time override names a field the schema does not declare.
    #[error("schema {schema:?} has no field {field:?}")]
    UnknownField {
        /// Schema being bound.
        schema: String,
        /// Field named by the override.
        field: String,
    },

    /// No UID could be determined for a record being indexed.
    #[error("could not determine UID for record")]
    MissingUid,

    /// The schema is not bound to this catalog.
    #[error("schema not bound: {schema}")]
    SchemaNotBound {
        /// Dotted schema name.
        schema: String,
    },

    /// An index cannot answer this comparison.
    #[error("{index_type} index does not support {comparator}")]
    UnsupportedQuery {
        /// Index type tag.
        index_type: &'static str,
        /// Comparator label.
        comparator: &'static str,
    },

    /// The operation is not available for this index type.
    #[error("{operation} is not implemented for {index_type} indexes")]
    NotImplemented {
        /// Operation name.
        operation: &'static str,
        /// Index type tag.
        index_type: &'static str,
    },
}

impl CatalogError {
    /// Creates an index-not-found error.
    pub fn index_not_found(name: impl Into<String>) -> Self {
        Self::IndexNotFound { name: name.into() }
    }

    /// Creates an invalid index type error.
    pub fn invalid_index_type(
        field: impl Into<String>,
        index_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidIndexType {
            field: field.into(),
            index_type: index_type.into(),
            reason: reason.into(),
        }
    }

    /// Creates a schema-not-bound error.
    pub fn schema_not_bound(schema: impl Into<String>) -> Self {
        Self::SchemaNotBound {
            schema: schema.into(),
        }
    }

    /// Returns true if the error was raised while binding a schema.
    pub fn is_binding(&self) -> bool {
        matches!(
            self,
            Self::InvalidIndexType { .. } | Self::UnknownField { .. }
        )
    }
}
