//! Error types for indexing and search.

use jobmatch_embeddings::EmbeddingError;
use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while indexing or searching job postings.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Query text was empty or whitespace.
    #[error("query text must not be empty")]
    EmptyQuery,

    /// Index name rejected by validation.
    #[error("invalid index name {name:?}: {reason}")]
    InvalidIndexName { name: String, reason: String },

    /// The target index does not exist.
    #[error("index not found: {0}")]
    IndexNotFound(String),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {body}")]
    Store { status: u16, body: String },

    /// The store answered with a body we could not interpret.
    #[error("invalid store response: {0}")]
    InvalidResponse(String),

    /// A vector does not match the index's declared dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A source record could not be mapped onto the index schema.
    #[error("invalid job posting: {0}")]
    InvalidPosting(String),

    /// The in-process lexical index failed.
    #[error("lexical index error: {0}")]
    Lexical(#[from] tantivy::TantivyError),

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The source corpus is not a readable JSON array.
    #[error("unreadable corpus: {0}")]
    Corpus(#[from] json5::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SearchError {
    /// Whether the failure is transient and the call may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store { status, .. } => *status == 429 || *status >= 500,
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::Embedding(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Whether the failure concerns a single document, so a batch may skip
    /// it and continue.
    pub fn is_document_error(&self) -> bool {
        match self {
            Self::InvalidPosting(_) | Self::DimensionMismatch { .. } => true,
            Self::Store { status, .. } => *status == 400,
            Self::Embedding(err) => match err {
                EmbeddingError::DimensionMismatch { .. } | EmbeddingError::Inference(_) => true,
                // Auth and rate-limit failures hit every record alike.
                EmbeddingError::ApiRequest { status, .. } => {
                    (400..500).contains(status) && !matches!(status, 401 | 403 | 429)
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Whether the caller supplied bad input (as opposed to an upstream failure).
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }

    /// Whether the store could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::Store { status, .. } => *status == 503,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let rate_limited = SearchError::Store {
            status: 429,
            body: String::new(),
        };
        assert!(rate_limited.is_retryable());
        assert!(!rate_limited.is_document_error());

        let rejected = SearchError::Store {
            status: 400,
            body: "mapper_parsing_exception".to_string(),
        };
        assert!(!rejected.is_retryable());
        assert!(rejected.is_document_error());

        assert!(SearchError::EmptyQuery.is_input_error());
        assert!(!SearchError::IndexNotFound("seek-jobs".to_string()).is_document_error());
        assert!(SearchError::InvalidPosting("missing salary".to_string()).is_document_error());

        let too_long = SearchError::Embedding(EmbeddingError::ApiRequest {
            status: 400,
            body: "maximum context length".to_string(),
        });
        assert!(too_long.is_document_error());
        assert!(!too_long.is_retryable());
        for status in [401, 403, 429, 500] {
            let upstream = SearchError::Embedding(EmbeddingError::ApiRequest {
                status,
                body: String::new(),
            });
            assert!(!upstream.is_document_error(), "status {status}");
        }
    }
}
