//! Error types for the RAG pipeline.

use jobmatch_search::SearchError;
use thiserror::Error;

/// Result type alias for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors from the chat-completion API.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// No API key or endpoint configured.
    #[error("completion client not configured: {0}")]
    NotConfigured(String),

    /// API answered with a non-success status.
    #[error("completion API returned {status}: {body}")]
    ApiRequest { status: u16, body: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// The response held no choices.
    #[error("completion API returned no choices")]
    EmptyResponse,

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CompletionError {
    /// 429, 5xx, timeouts and connection failures are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::ApiRequest { status, .. } => *status >= 500,
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

/// Errors reading a résumé.
#[derive(Error, Debug)]
pub enum ResumeError {
    /// The bytes are not a PDF we can parse.
    #[error("unreadable PDF: {0}")]
    UnreadablePdf(String),

    /// The PDF parsed but holds no text.
    #[error("no extractable text in resume")]
    NoText,

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while answering a résumé.
#[derive(Error, Debug)]
pub enum RagError {
    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
}

impl RagError {
    /// Whether the caller supplied bad input.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Resume(_) => true,
            Self::Search(err) => err.is_input_error(),
            Self::Completion(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(CompletionError::RateLimited { retry_after_secs: 1 }.is_retryable());
        assert!(
            CompletionError::ApiRequest {
                status: 502,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !CompletionError::ApiRequest {
                status: 401,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!CompletionError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_input_errors() {
        assert!(RagError::from(ResumeError::NoText).is_input_error());
        assert!(RagError::from(SearchError::EmptyQuery).is_input_error());
        assert!(!RagError::from(CompletionError::EmptyResponse).is_input_error());
    }
}
