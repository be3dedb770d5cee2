//! Configuration for the search store and the search engine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Index used when nothing else is configured.
pub const DEFAULT_INDEX_NAME: &str = "seek-jobs";

/// Validated search index name.
///
/// Follows the Elasticsearch naming rules: lowercase, no path or wildcard
/// characters, and no leading `-`, `_` or `+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexName(String);

impl IndexName {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let name = raw.into();
        let invalid = |reason: &str| SearchError::InvalidIndexName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if name.len() > 255 {
            return Err(invalid("must be at most 255 bytes"));
        }
        if name == "." || name == ".." {
            return Err(invalid("must not be '.' or '..'"));
        }
        if name.starts_with(['-', '_', '+']) {
            return Err(invalid("must not start with '-', '_' or '+'"));
        }
        if name.chars().any(char::is_uppercase) {
            return Err(invalid("must be lowercase"));
        }
        if let Some(ch) = name
            .chars()
            .find(|ch| matches!(ch, '\\' | '/' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' | ',' | '#' | ':'))
        {
            return Err(invalid(&format!("must not contain {ch:?}")));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IndexName {
    fn default() -> Self {
        Self(DEFAULT_INDEX_NAME.to_string())
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IndexName {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<IndexName> for String {
    fn from(value: IndexName) -> Self {
        value.0
    }
}

/// Connection settings for the Elasticsearch-compatible store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the store.
    pub url: String,

    /// Index holding the job postings.
    pub index: IndexName,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Attempts for transient failures (429, 5xx, connect, timeout).
    pub max_retries: usize,

    /// Optional `ApiKey` credential sent on every request.
    pub api_key: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: IndexName::default(),
            timeout_secs: 30,
            max_retries: 5,
            api_key: None,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Search engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hits returned when the caller does not ask for a specific count.
    pub default_top_k: usize,

    /// Width of the dense vectors in the index.
    pub vector_dimension: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            vector_dimension: jobmatch_embeddings::EMBEDDING_DIMENSION,
        }
    }
}

impl SearchConfig {
    /// Set the default number of hits.
    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k.max(1);
        self
    }

    /// Set the vector dimension.
    pub fn with_vector_dimension(mut self, dimension: usize) -> Self {
        self.vector_dimension = dimension;
        self
    }
}
