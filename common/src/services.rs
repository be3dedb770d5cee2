//! Process-wide components, built once at startup and shared by `Arc`.

use std::sync::Arc;

use jobmatch_embeddings::{EmbeddingProvider, build_provider};
use jobmatch_rag::{CompletionClient, OpenAiCompletionClient, RagPipeline};
use jobmatch_search::{DocumentStore, ElasticsearchStore, HybridSearchEngine, IndexManager};
use tracing::{info, warn};

use crate::config::JobmatchConfig;
use crate::error::{ConfigError, Result};

pub struct Services {
    pub config: JobmatchConfig,
    pub store: Arc<dyn DocumentStore>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub engine: Arc<HybridSearchEngine>,
    /// `None` when no API key was supplied.
    pub completion: Option<Arc<dyn CompletionClient>>,
    pub pipeline: Option<Arc<RagPipeline>>,
}

impl Services {
    /// Connect to the configured Elasticsearch store and providers.
    pub fn build(config: JobmatchConfig, api_key: Option<&str>) -> Result<Self> {
        let store = ElasticsearchStore::from_config(&config.store)?;
        info!(
            "Using document store at {} (index {})",
            config.store.url, config.store.index
        );

        let embedder = build_provider(&config.embedding, api_key)?;
        let completion: Option<Arc<dyn CompletionClient>> = match api_key {
            Some(key) => Some(Arc::new(OpenAiCompletionClient::from_config(
                &config.completion,
                Some(key),
            )?)),
            None => {
                warn!("OPENAI_API_KEY is not set; recommendations are disabled");
                None
            }
        };

        Self::from_parts(config, Arc::new(store), embedder, completion)
    }

    /// Assemble services from already-built components.
    pub fn from_parts(
        config: JobmatchConfig,
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        completion: Option<Arc<dyn CompletionClient>>,
    ) -> Result<Self> {
        if embedder.dimension() != config.search.vector_dimension {
            return Err(ConfigError::Invalid(format!(
                "embedding provider {} produces {} dimensions but the index expects {}",
                embedder.name(),
                embedder.dimension(),
                config.search.vector_dimension
            )));
        }

        let engine = Arc::new(HybridSearchEngine::new(
            store.clone(),
            embedder.clone(),
            config.store.index.clone(),
            config.search.clone(),
        ));
        let pipeline = completion.as_ref().map(|completion| {
            Arc::new(RagPipeline::new(
                engine.clone(),
                completion.clone(),
                config.rag.clone(),
            ))
        });

        Ok(Self {
            config,
            store,
            embedder,
            engine,
            completion,
            pipeline,
        })
    }

    pub fn index_manager(&self) -> IndexManager {
        IndexManager::new(self.store.clone(), self.embedder.clone())
    }

    pub fn require_completion(&self) -> Result<Arc<dyn CompletionClient>> {
        self.completion
            .clone()
            .ok_or(ConfigError::CompletionNotConfigured)
    }

    pub fn require_pipeline(&self) -> Result<Arc<RagPipeline>> {
        self.pipeline
            .clone()
            .ok_or(ConfigError::CompletionNotConfigured)
    }
}
