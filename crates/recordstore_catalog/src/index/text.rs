//! Full-text index.
//!
//! `TextIndex` provides token-based text search:
//! - tokenization on whitespace, ASCII punctuation and configured separators
//! - optional case-insensitive matching
//! - multi-token queries with AND semantics
//! - prefix matching with a trailing `*` (`"data*"`)
//!
//! No ranking or fuzzy matching.

use super::{unsupported, CatalogIndex, IndexType};
use crate::docmap::DocId;
use crate::error::CatalogResult;
use crate::query::{Comparator, Comparison};
use recordstore_codec::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

const COMPARATORS: &[Comparator] = &[Comparator::Contains, Comparator::Eq, Comparator::Any];

/// Configuration for the text tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Minimum token length to index, in bytes.
    pub min_token_length: usize,
    /// Maximum token length to index, in bytes.
    pub max_token_length: usize,
    /// Whether to perform case-insensitive matching.
    pub case_insensitive: bool,
    /// Additional characters to treat as separators.
    pub extra_separators: Vec<char>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_length: 1,
            max_token_length: 256,
            case_insensitive: true,
            extra_separators: vec![],
        }
    }
}

impl TokenizerConfig {
    /// Creates a new tokenizer configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets minimum token length.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_token_length = len;
        self
    }

    /// Sets maximum token length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_token_length = len;
        self
    }

    /// Sets case sensitivity.
    #[must_use]
    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }

    /// Adds extra separator characters.
    #[must_use]
    pub fn with_separators(mut self, chars: &[char]) -> Self {
        self.extra_separators.extend_from_slice(chars);
        self
    }

    fn is_separator(&self, c: char) -> bool {
        c.is_whitespace() || c.is_ascii_punctuation() || self.extra_separators.contains(&c)
    }

    fn normalize(&self, token: &str) -> String {
        if self.case_insensitive {
            token.to_lowercase()
        } else {
            token.to_string()
        }
    }

    /// Splits text into normalized tokens, dropping those outside the
    /// configured length bounds.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| self.is_separator(c))
            .filter(|token| {
                !token.is_empty()
                    && token.len() >= self.min_token_length
                    && token.len() <= self.max_token_length
            })
            .map(|token| self.normalize(token))
            .collect()
    }
}

/// One term of a text query.
#[derive(Debug, PartialEq, Eq)]
struct Term {
    token: String,
    prefix: bool,
}

/// Inverted index from tokens to documents.
pub struct TextIndex {
    discriminator: String,
    tokenizer: TokenizerConfig,
    /// Normalized token to documents.
    inverted: HashMap<String, HashSet<DocId>>,
    /// Document to its tokens.
    forward: HashMap<DocId, HashSet<String>>,
}

impl TextIndex {
    /// Creates an empty text index with the default tokenizer.
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self::with_tokenizer(discriminator, TokenizerConfig::default())
    }

    /// Creates an empty text index.
    pub fn with_tokenizer(discriminator: impl Into<String>, tokenizer: TokenizerConfig) -> Self {
        Self {
            discriminator: discriminator.into(),
            tokenizer,
            inverted: HashMap::new(),
            forward: HashMap::new(),
        }
    }

    /// Returns the tokenizer configuration.
    pub fn tokenizer(&self) -> &TokenizerConfig {
        &self.tokenizer
    }

    /// Returns the number of unique tokens.
    pub fn unique_token_count(&self) -> usize {
        self.inverted.len()
    }

    /// Returns the tokens indexed for a document.
    pub fn tokens_for(&self, doc: DocId) -> Option<&HashSet<String>> {
        self.forward.get(&doc)
    }

    /// Returns the number of documents containing a token.
    pub fn token_frequency(&self, token: &str) -> usize {
        self.inverted
            .get(&self.tokenizer.normalize(token))
            .map_or(0, HashSet::len)
    }

    fn text_of(value: &Value) -> Option<String> {
        match value {
            Value::Text(s) => Some(s.clone()),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().filter_map(Self::text_of).collect();
                Some(parts.join(" "))
            }
            _ => None,
        }
    }

    fn terms(&self, query: &str) -> Vec<Term> {
        let mut terms = Vec::new();
        for word in query.split_whitespace() {
            let prefix = word.ends_with('*');
            let tokens = self.tokenizer.tokenize(word.trim_end_matches('*'));
            let last = tokens.len().saturating_sub(1);
            terms.extend(tokens.into_iter().enumerate().map(|(i, token)| Term {
                token,
                prefix: prefix && i == last,
            }));
        }
        terms
    }

    fn term_docs(&self, term: &Term) -> HashSet<DocId> {
        if term.prefix {
            self.inverted
                .iter()
                .filter(|(token, _)| token.starts_with(&term.token))
                .flat_map(|(_, docs)| docs.iter().copied())
                .collect()
        } else {
            self.inverted.get(&term.token).cloned().unwrap_or_default()
        }
    }

    /// Returns documents matching every term of `query`.
    pub fn search(&self, query: &str) -> BTreeSet<DocId> {
        let terms = self.terms(query);
        let mut iter = terms.iter();
        let Some(first) = iter.next() else {
            return BTreeSet::new();
        };
        let mut results = self.term_docs(first);
        for term in iter {
            if results.is_empty() {
                break;
            }
            let docs = self.term_docs(term);
            results.retain(|doc| docs.contains(doc));
        }
        results.into_iter().collect()
    }

    fn search_value(&self, value: &Value) -> BTreeSet<DocId> {
        Self::text_of(value)
            .map(|query| self.search(&query))
            .unwrap_or_default()
    }
}

impl CatalogIndex for TextIndex {
    fn index_type(&self) -> IndexType {
        IndexType::Text
    }

    fn discriminator(&self) -> &str {
        &self.discriminator
    }

    fn index_doc(&mut self, doc: DocId, value: &Value) -> bool {
        self.unindex_doc(doc);
        let Some(text) = Self::text_of(value) else {
            return false;
        };
        let tokens: HashSet<String> = self.tokenizer.tokenize(&text).into_iter().collect();
        for token in &tokens {
            self.inverted.entry(token.clone()).or_default().insert(doc);
        }
        self.forward.insert(doc, tokens);
        true
    }

    fn unindex_doc(&mut self, doc: DocId) -> bool {
        let Some(tokens) = self.forward.remove(&doc) else {
            return false;
        };
        for token in &tokens {
            if let Some(docs) = self.inverted.get_mut(token) {
                docs.remove(&doc);
                if docs.is_empty() {
                    self.inverted.remove(token);
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
        match comparison {
            Comparison::Eq(value) | Comparison::Contains(value) => Ok(self.search_value(value)),
            Comparison::Any(values) => Ok(values
                .iter()
                .flat_map(|value| self.search_value(value))
                .collect()),
            other => Err(unsupported(IndexType::Text, other.comparator())),
        }
    }

    fn comparators(&self) -> &'static [Comparator] {
        COMPARATORS
    }
}

impl fmt::Debug for TextIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextIndex")
            .field("discriminator", &self.discriminator)
            .field("documents", &self.forward.len())
            .field("unique_tokens", &self.inverted.len())
            .finish_non_exhaustive()
    }
}
