//! Configuration for the embedding provider.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use jobmatch_utils_backoff::RetryPolicy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EmbeddingError, Result};
use crate::hashing::HashingProvider;
use crate::local::LocalMiniLmProvider;
use crate::provider::{EmbeddingProvider, OpenAIProvider};

/// Configuration for the embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which provider to use.
    pub provider: EmbeddingProviderType,

    /// Model override for remote providers.
    pub model: Option<String>,

    /// Where local model weights are cached.
    pub cache_dir: Option<PathBuf>,

    /// Base URL for OpenAI-compatible embedding APIs.
    pub base_url: String,

    /// Seconds before a remote embedding request times out.
    pub timeout_secs: u64,

    /// Attempts for transient remote failures.
    pub max_retries: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::Local,
            model: None,
            cache_dir: None,
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 30,
            max_retries: 5,
        }
    }
}

impl EmbeddingConfig {
    /// Set the provider type.
    pub fn with_provider(mut self, provider: EmbeddingProviderType) -> Self {
        self.provider = provider;
        self
    }

    /// Set the local model cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }
}

/// Type of embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    /// all-MiniLM-L6-v2 running in-process.
    Local,
    /// OpenAI embeddings API, truncated to the index dimension.
    #[serde(rename = "openai")]
    OpenAI,
    /// Deterministic feature hashing (no model).
    Hashing,
}

/// Construct the configured provider. Called once at startup; the returned
/// handle is shared by every component that embeds text.
pub fn build_provider(
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> Result<Arc<dyn EmbeddingProvider>> {
    info!("Using {:?} embedding provider", config.provider);
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderType::Local => {
            let mut provider = LocalMiniLmProvider::new();
            if let Some(dir) = &config.cache_dir {
                provider = provider.with_cache_dir(dir);
            }
            Arc::new(provider)
        }
        EmbeddingProviderType::OpenAI => {
            let api_key = api_key.ok_or_else(|| {
                EmbeddingError::ProviderNotConfigured(
                    "OPENAI_API_KEY must be set for the openai embedding provider".to_string(),
                )
            })?;
            let mut provider = OpenAIProvider::new(Duration::from_secs(config.timeout_secs.max(1)))?
                .with_api_key(api_key)
                .with_base_url(&config.base_url)
                .with_retry(RetryPolicy::new(config.max_retries));
            if let Some(model) = &config.model {
                provider = provider.with_model(model);
            }
            Arc::new(provider)
        }
        EmbeddingProviderType::Hashing => Arc::new(HashingProvider::new()),
    };
    Ok(provider)
}
