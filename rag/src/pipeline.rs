//! Retrieve, compose, complete.

use std::sync::Arc;

use jobmatch_search::{HybridSearchEngine, JobSummary};
use serde::Serialize;
use tracing::info;

use crate::completion::{CompletionClient, CompletionRequest};
use crate::config::RagConfig;
use crate::error::Result;
use crate::prompt::{PromptMode, compose_prompt};

/// Model answer plus the postings it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub jobs: Vec<JobSummary>,
}

/// Answers a résumé with a recommendation drawn from the job index.
pub struct RagPipeline {
    engine: Arc<HybridSearchEngine>,
    completion: Arc<dyn CompletionClient>,
    config: RagConfig,
}

impl RagPipeline {
    pub fn new(
        engine: Arc<HybridSearchEngine>,
        completion: Arc<dyn CompletionClient>,
        config: RagConfig,
    ) -> Self {
        Self {
            engine,
            completion,
            config,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Answer with the configured prompt mode and the client's default model.
    pub async fn recommend(&self, resume: &str) -> Result<RagAnswer> {
        self.answer(resume, self.config.mode, None).await
    }

    /// Hybrid search with the résumé text, then ask `model` (or the client's
    /// default) about the top postings.
    pub async fn answer(
        &self,
        resume: &str,
        mode: PromptMode,
        model: Option<&str>,
    ) -> Result<RagAnswer> {
        let results = self.engine.search(resume, self.config.top_k).await?;
        info!("Retrieved {} postings for resume", results.len());

        let prompt = compose_prompt(resume, results.jobs(), mode);
        let mut request = CompletionRequest::new(prompt);
        if let Some(model) = model {
            request = request.with_model(model);
        }
        let answer = self.completion.complete(&request).await?;

        Ok(RagAnswer {
            answer,
            jobs: results.hits.into_iter().map(|hit| hit.job).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompletionError, RagError};
    use async_trait::async_trait;
    use jobmatch_embeddings::HashingProvider;
    use jobmatch_search::{
        DocumentStore, IndexName, IndexSchema, IndexedDocument, JobPosting, MemoryStore,
        SearchConfig,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    fn document(id: &str, title: &str, description: &str) -> IndexedDocument {
        let posting = JobPosting::from_value(json!({
            "id": id,
            "title": title,
            "clean_description": description,
            "location": {"where": "Brisbane QLD"},
            "salary": {},
            "url": format!("https://example.com/{id}"),
            "listingDate": "2025-05-05T00:00:00Z",
            "company": {"id": "c", "name": "Acme"}
        }))
        .unwrap();
        let vector = HashingProvider::new().embed_sync(description);
        IndexedDocument::from_posting(posting, vector, 384).unwrap()
    }

    /// Records prompts and echoes a fixed answer.
    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, request: &CompletionRequest) -> std::result::Result<String, CompletionError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("Data Engineer at Acme".to_string())
        }
    }

    async fn pipeline(client: Arc<RecordingClient>) -> RagPipeline {
        let store = Arc::new(MemoryStore::new());
        let index = IndexName::new("jobs").unwrap();
        store.create_index(&index, &IndexSchema::default()).await.unwrap();
        for doc in [
            document("1", "Data Engineer", "python spark data pipelines"),
            document("2", "Chef", "kitchen cooking menu"),
        ] {
            store.upsert(&index, &doc).await.unwrap();
        }
        let engine = HybridSearchEngine::new(
            store,
            Arc::new(HashingProvider::new()),
            index,
            SearchConfig::default(),
        );
        RagPipeline::new(Arc::new(engine), client, RagConfig::default())
    }

    #[tokio::test]
    async fn test_answer_is_grounded_on_retrieved_jobs() {
        let client = Arc::new(RecordingClient::default());
        let pipeline = pipeline(client.clone()).await;

        let answer = pipeline
            .answer("python data engineer", PromptMode::Full, Some("gpt-4o"))
            .await
            .unwrap();
        assert_eq!(answer.answer, "Data Engineer at Acme");
        assert_eq!(answer.jobs[0].id, "1");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model.as_deref(), Some("gpt-4o"));
        assert!(requests[0].prompt.starts_with("Based on the following resume:\npython data engineer\n"));
        assert!(requests[0].prompt.contains("1. Data Engineer at Acme in Brisbane QLD"));
    }

    #[tokio::test]
    async fn test_recommend_uses_default_model() {
        let client = Arc::new(RecordingClient::default());
        let pipeline = pipeline(client.clone()).await;
        pipeline.recommend("chef cooking").await.unwrap();
        assert_eq!(client.requests.lock().unwrap()[0].model, None);
    }

    #[tokio::test]
    async fn test_blank_resume_is_input_error() {
        let pipeline = pipeline(Arc::new(RecordingClient::default())).await;
        let err = pipeline.recommend("  \n ").await.unwrap_err();
        assert!(matches!(err, RagError::Search(_)));
        assert!(err.is_input_error());
    }
}
