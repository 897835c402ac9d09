//! Catalog configuration.

use crate::index::TokenizerConfig;

/// Configuration for a [`crate::RecordCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Tokenizer used by text indexes the catalog creates.
    pub tokenizer: TokenizerConfig,
    /// Whether records with a parent container are indexed by location.
    pub index_locations: bool,
    /// Whether bytes-line fields get a text index alongside their field index.
    pub text_index_bytes_line: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            index_locations: true,
            text_index_bytes_line: true,
        }
    }
}

impl CatalogConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tokenizer for text indexes.
    #[must_use]
    pub fn tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Enables or disables location indexing.
    #[must_use]
    pub const fn index_locations(mut self, enabled: bool) -> Self {
        self.index_locations = enabled;
        self
    }

    /// Enables or disables text indexes on bytes-line fields.
    #[must_use]
    pub const fn text_index_bytes_line(mut self, enabled: bool) -> Self {
        self.text_index_bytes_line = enabled;
        self
    }
}
