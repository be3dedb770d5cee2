//! Error types for configuration and service wiring.

use std::path::PathBuf;

use jobmatch_embeddings::EmbeddingError;
use jobmatch_rag::CompletionError;
use jobmatch_search::SearchError;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading configuration or building services.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::JobmatchConfig`].
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A value is inconsistent with the rest of the config.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A chat model was needed but no API key is available.
    #[error("completion client not configured: set OPENAI_API_KEY")]
    CompletionNotConfigured,

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}
