//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobmatch_rag::{RagError, ResumeError};
use jobmatch_search::SearchError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    /// The request is not a usable multipart upload.
    #[error("{0}")]
    InvalidUpload(String),

    #[error(transparent)]
    Rag(#[from] RagError),
}

impl From<ResumeError> for AppError {
    fn from(err: ResumeError) -> Self {
        Self::Rag(err.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUpload(_) | Self::Rag(RagError::Resume(_)) => StatusCode::BAD_REQUEST,
            Self::Rag(RagError::Search(err)) if err.is_input_error() => StatusCode::BAD_REQUEST,
            Self::Rag(RagError::Search(err)) if err.is_unavailable() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Rag(RagError::Search(
                SearchError::Store { .. }
                | SearchError::Http(_)
                | SearchError::IndexNotFound(_)
                | SearchError::InvalidResponse(_)
                | SearchError::Embedding(_),
            ))
            | Self::Rag(RagError::Completion(_)) => StatusCode::BAD_GATEWAY,
            Self::Rag(RagError::Search(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUpload(_) => "invalid_upload",
            Self::Rag(RagError::Resume(_)) => "unreadable_resume",
            Self::Rag(RagError::Search(err)) if err.is_input_error() => "invalid_query",
            Self::Rag(RagError::Search(err)) if err.is_unavailable() => "store_unavailable",
            Self::Rag(RagError::Completion(_)) => "completion_failed",
            Self::Rag(RagError::Search(_)) => match self.status() {
                StatusCode::BAD_GATEWAY => "search_failed",
                _ => "internal",
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
        } else {
            warn!("Rejected request: {self}");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
