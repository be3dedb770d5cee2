//! Error types for evaluation runs.

use jobmatch_embeddings::EmbeddingError;
use jobmatch_rag::{CompletionError, RagError};
use jobmatch_search::SearchError;
use thiserror::Error;

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Errors that abort an evaluation run.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("rag error: {0}")]
    Rag(#[from] RagError),

    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
