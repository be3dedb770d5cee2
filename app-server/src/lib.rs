//! HTTP front end for the recommendation pipeline.
//!
//! - `POST /predict`: multipart upload with a PDF résumé in the `file` field,
//!   answered with `{"result": "<recommendation>"}`.
//! - `GET /healthz`: liveness check.

pub mod error;

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use jobmatch_rag::{RagPipeline, load_resume_bytes};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::AppError;

/// Multipart field carrying the résumé.
pub const UPLOAD_FIELD: &str = "file";

/// Default cap on request bodies.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<RagPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<RagPipeline>) -> Self {
        Self { pipeline }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictResponse {
    pub result: String,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/predict", post(predict))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let mut multipart = multipart.map_err(|err| AppError::InvalidUpload(err.body_text()))?;
    let bytes = read_upload(&mut multipart).await?;
    info!("Received resume upload ({} bytes)", bytes.len());

    let resume = load_resume_bytes(bytes).await?;
    let answer = state.pipeline.recommend(&resume).await?;
    info!("Recommended from {} retrieved postings", answer.jobs.len());

    Ok(Json(PredictResponse {
        result: answer.answer,
    }))
}

/// Bytes of the first `file` field; other fields are ignored.
async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::InvalidUpload(err.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::InvalidUpload(err.body_text()))?;
        if bytes.is_empty() {
            return Err(AppError::InvalidUpload(
                "uploaded file is empty".to_string(),
            ));
        }
        return Ok(bytes.to_vec());
    }
    Err(AppError::InvalidUpload(format!(
        "missing multipart field `{UPLOAD_FIELD}`"
    )))
}
