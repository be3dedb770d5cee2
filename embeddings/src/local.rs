//! Local sentence-transformer inference with `all-MiniLM-L6-v2`.
//!
//! The model weights are loaded at most once per provider, on the first
//! embedding call, and shared by every later call. Inference is CPU bound and
//! runs on the blocking thread pool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{EmbeddingError, Result};
use crate::provider::{EmbeddingProvider, check_dimension};
use crate::{DEFAULT_LOCAL_MODEL, EMBEDDING_DIMENSION, Embedding};

/// Provider backed by fastembed's AllMiniLML6V2 (384 dimensions).
pub struct LocalMiniLmProvider {
    cache_dir: Option<PathBuf>,
    show_download_progress: bool,
    model: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl LocalMiniLmProvider {
    /// Create a provider. No weights are loaded until the first call.
    pub fn new() -> Self {
        Self {
            cache_dir: None,
            show_download_progress: false,
            model: OnceCell::new(),
        }
    }

    /// Directory where model weights are cached between runs.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Show a progress bar while weights download for the first time.
    pub fn with_download_progress(mut self, show: bool) -> Self {
        self.show_download_progress = show;
        self
    }

    /// Whether the model has already been loaded.
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<Arc<Mutex<TextEmbedding>>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let cache_dir = self.cache_dir.clone();
                let show_progress = self.show_download_progress;
                info!("Loading embedding model {DEFAULT_LOCAL_MODEL}");
                tokio::task::spawn_blocking(move || {
                    let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                        .with_show_download_progress(show_progress);
                    if let Some(dir) = cache_dir {
                        options = options.with_cache_dir(dir);
                    }
                    TextEmbedding::try_new(options)
                        .map(|model| Arc::new(Mutex::new(model)))
                        .map_err(|e| EmbeddingError::ModelInit(e.to_string()))
                })
                .await
                .map_err(|e| EmbeddingError::ModelInit(format!("model loader task failed: {e}")))?
            })
            .await?;
        Ok(Arc::clone(model))
    }
}

impl Default for LocalMiniLmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for LocalMiniLmProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn model(&self) -> &str {
        DEFAULT_LOCAL_MODEL
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.embed_batch(&[text])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::Inference("model returned no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model().await?;
        let inputs: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();
        debug!("Embedding {} texts locally", inputs.len());

        let embeddings = tokio::task::spawn_blocking(move || {
            model
                .lock()
                .map_err(|_| EmbeddingError::Inference("embedding model lock poisoned".to_string()))?
                .embed(inputs, None)
                .map_err(|e| EmbeddingError::Inference(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Inference(format!("embedding task failed: {e}")))??;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::Inference(format!(
                "{} embeddings returned for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }
        for embedding in &embeddings {
            check_dimension(EMBEDDING_DIMENSION, embedding)?;
        }
        Ok(embeddings)
    }
}
