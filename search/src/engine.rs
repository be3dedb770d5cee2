//! Hybrid search engine.

use std::sync::Arc;

use jobmatch_embeddings::{EmbeddingProvider, check_dimension};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{IndexName, SearchConfig};
use crate::error::{Result, SearchError};
use crate::query::{SearchRequest, SearchResults, StoreQuery};
use crate::store::DocumentStore;

/// Which clauses a search issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Cosine script score only.
    Dense,
    /// Lexical `match` plus cosine script score.
    Hybrid,
}

impl SearchMode {
    /// Label used in evaluation reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dense => "Dense Vector Search",
            Self::Hybrid => "Hybrid Search",
        }
    }
}

/// Ranks job postings against free text.
///
/// The query text is embedded once per call with the same provider that
/// embedded the corpus; the store combines lexical and vector relevance.
pub struct HybridSearchEngine {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: IndexName,
    config: SearchConfig,
}

impl HybridSearchEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: IndexName,
        config: SearchConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
            config,
        }
    }

    pub fn index(&self) -> &IndexName {
        &self.index
    }

    pub fn default_top_k(&self) -> usize {
        self.config.default_top_k.max(1)
    }

    /// Lexical + dense search.
    pub async fn search(&self, query_text: &str, top_k: usize) -> Result<SearchResults> {
        self.search_with_mode(SearchMode::Hybrid, query_text, top_k).await
    }

    /// Dense-only search.
    pub async fn dense_search(&self, query_text: &str, top_k: usize) -> Result<SearchResults> {
        self.search_with_mode(SearchMode::Dense, query_text, top_k).await
    }

    pub async fn search_with_mode(
        &self,
        mode: SearchMode,
        query_text: &str,
        top_k: usize,
    ) -> Result<SearchResults> {
        if query_text.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let top_k = top_k.max(1);

        let vector = self.embedder.embed(query_text).await?;
        check_dimension(self.config.vector_dimension, &vector)?;

        let query = match mode {
            SearchMode::Hybrid => StoreQuery::Hybrid {
                text: query_text.to_string(),
                vector,
            },
            SearchMode::Dense => StoreQuery::Dense { vector },
        };
        let request = SearchRequest { query, size: top_k };

        debug!("Searching {} ({mode:?}, top_k={top_k})", self.index);
        let mut hits = self.store.search(&self.index, &request).await?;
        hits.sort_by_key(|hit| std::cmp::Reverse(OrderedFloat(hit.score)));
        hits.truncate(top_k);

        info!("{} returned {} hits", mode.label(), hits.len());
        Ok(SearchResults { hits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::query::{CompanyName, JobSummary, LocationName, SearchHit};
    use crate::schema::{IndexSchema, IndexedDocument};
    use async_trait::async_trait;
    use chrono::Utc;
    use jobmatch_embeddings::HashingProvider;
    use pretty_assertions::assert_eq;

    async fn engine_with(descriptions: &[(&str, &str)]) -> HybridSearchEngine {
        let store = Arc::new(MemoryStore::new());
        let embedder = HashingProvider::new();
        let index = IndexName::new("jobs").unwrap();
        store.create_index(&index, &IndexSchema::default()).await.unwrap();
        for (id, description) in descriptions {
            let document = IndexedDocument {
                id: (*id).to_string(),
                title: format!("Job {id}"),
                description: (*description).to_string(),
                description_vector: embedder.embed_sync(description),
                types: vec![],
                arrangement: None,
                url: format!("https://example.com/{id}"),
                listing_date: Utc::now(),
                company: Default::default(),
                location: Default::default(),
                salary: Default::default(),
            };
            store.upsert(&index, &document).await.unwrap();
        }
        HybridSearchEngine::new(store, Arc::new(embedder), index, SearchConfig::default())
    }

    #[tokio::test]
    async fn test_results_are_ranked_and_bounded() {
        let engine = engine_with(&[
            ("1", "registered nurse aged care"),
            ("2", "senior python data engineer spark airflow"),
            ("3", "forklift driver warehouse"),
            ("4", "python backend developer django"),
        ])
        .await;

        let results = engine
            .search("python data engineer with spark experience", 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.hits[0].job.id, "2");
        assert!(results.hits[0].score >= results.hits[1].score);
    }

    #[tokio::test]
    async fn test_dense_search_uses_vector_only() {
        let engine = engine_with(&[("1", "nurse"), ("2", "welder")]).await;
        let results = engine.dense_search("welder", 5).await.unwrap();
        assert_eq!(results.ids(), vec!["2", "1"]);
        for hit in &results.hits {
            assert!((0.0..=2.0 + 1e-5).contains(&hit.score));
        }
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let engine = engine_with(&[("1", "nurse")]).await;
        let err = engine.search("   ", 5).await.unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_top_k_is_at_least_one() {
        let engine = engine_with(&[("1", "nurse"), ("2", "welder")]).await;
        let results = engine.search("nurse", 0).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_hits() {
        let engine = engine_with(&[]).await;
        let results = engine.search("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    /// Store returning hits out of order with a tie.
    struct UnorderedStore;

    fn hit(id: &str, score: f32) -> SearchHit {
        SearchHit {
            score,
            job: JobSummary {
                id: id.to_string(),
                title: String::new(),
                description: String::new(),
                company: CompanyName::default(),
                location: LocationName::default(),
                url: String::new(),
            },
        }
    }

    #[async_trait]
    impl DocumentStore for UnorderedStore {
        fn name(&self) -> &str {
            "unordered"
        }
        async fn index_exists(&self, _: &IndexName) -> Result<bool> {
            Ok(true)
        }
        async fn delete_index(&self, _: &IndexName) -> Result<()> {
            Ok(())
        }
        async fn create_index(&self, _: &IndexName, _: &IndexSchema) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _: &IndexName, _: &IndexedDocument) -> Result<()> {
            Ok(())
        }
        async fn refresh(&self, _: &IndexName) -> Result<()> {
            Ok(())
        }
        async fn count(&self, _: &IndexName) -> Result<usize> {
            Ok(4)
        }
        async fn search(&self, _: &IndexName, _: &SearchRequest) -> Result<Vec<SearchHit>> {
            Ok(vec![hit("a", 1.0), hit("b", 3.0), hit("c", 1.0), hit("d", 2.0)])
        }
    }

    #[tokio::test]
    async fn test_resort_is_stable() {
        let engine = HybridSearchEngine::new(
            Arc::new(UnorderedStore),
            Arc::new(HashingProvider::new()),
            IndexName::default(),
            SearchConfig::default(),
        );
        let results = engine.search("anything", 4).await.unwrap();
        assert_eq!(results.ids(), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(SearchMode::Dense.label(), "Dense Vector Search");
        assert_eq!(SearchMode::Hybrid.label(), "Hybrid Search");
    }
}
