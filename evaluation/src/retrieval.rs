//! Dense vs hybrid retrieval comparison.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use jobmatch_search::{HybridSearchEngine, SearchMode};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::ground_truth::GroundTruthRecord;
use crate::metrics::RelevanceMatrix;

/// A search method under evaluation.
#[async_trait]
pub trait RankedSearch: Send + Sync {
    /// Name printed in reports.
    fn label(&self) -> &str;

    /// Job ids, best first, at most `top_k`.
    async fn ranked_ids(&self, query: &str, top_k: usize) -> Result<Vec<String>>;
}

/// The production engine in one of its modes.
pub struct EngineSearch {
    engine: Arc<HybridSearchEngine>,
    mode: SearchMode,
}

impl EngineSearch {
    pub fn new(engine: Arc<HybridSearchEngine>, mode: SearchMode) -> Self {
        Self { engine, mode }
    }

    pub fn dense(engine: Arc<HybridSearchEngine>) -> Self {
        Self::new(engine, SearchMode::Dense)
    }

    pub fn hybrid(engine: Arc<HybridSearchEngine>) -> Self {
        Self::new(engine, SearchMode::Hybrid)
    }
}

#[async_trait]
impl RankedSearch for EngineSearch {
    fn label(&self) -> &str {
        self.mode.label()
    }

    async fn ranked_ids(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        let results = self.engine.search_with_mode(self.mode, query, top_k).await?;
        Ok(results.hits.into_iter().map(|hit| hit.job.id).collect())
    }
}

/// Scores of one method over the ground truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodReport {
    pub label: String,
    pub hit_rate: f64,
    pub mrr: f64,
    pub queries: usize,
    /// Per record, in ground-truth order: 1-based rank of the expected job.
    pub first_relevant_ranks: Vec<Option<usize>>,
}

impl MethodReport {
    fn from_matrix(label: &str, matrix: &RelevanceMatrix) -> Self {
        Self {
            label: label.to_string(),
            hit_rate: matrix.hit_rate(),
            mrr: matrix.mrr(),
            queries: matrix.len(),
            first_relevant_ranks: matrix.first_relevant_ranks(),
        }
    }

    /// `"<label> - Hit Rate: 0.xxxx, MRR: 0.xxxx"`.
    pub fn summary_line(&self) -> String {
        format!(
            "{} - Hit Rate: {:.4}, MRR: {:.4}",
            self.label, self.hit_rate, self.mrr
        )
    }
}

/// Side-by-side results over identical ground truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub top_k: usize,
    pub methods: Vec<MethodReport>,
}

impl ComparisonReport {
    pub fn render(&self) -> String {
        self.methods
            .iter()
            .map(MethodReport::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Wrote retrieval report to {}", path.display());
        Ok(())
    }
}

/// Runs each ground-truth résumé through a search method and records where
/// the posting it was written for lands.
pub struct RetrievalEvaluator {
    top_k: usize,
}

impl Default for RetrievalEvaluator {
    fn default() -> Self {
        Self::new(5)
    }
}

impl RetrievalEvaluator {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k: top_k.max(1),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Relevance matrix of `search` over `records`. A résumé the engine
    /// rejects as input counts as a miss; other failures abort.
    pub async fn relevance_matrix(
        &self,
        search: &dyn RankedSearch,
        records: &[GroundTruthRecord],
    ) -> Result<RelevanceMatrix> {
        let mut matrix = RelevanceMatrix::new(self.top_k);
        for (position, record) in records.iter().enumerate() {
            match search.ranked_ids(&record.generated_resume, self.top_k).await {
                Ok(ids) => matrix.push_ranked(&ids, &record.job_id),
                Err(crate::EvaluationError::Search(err)) if err.is_input_error() => {
                    warn!("Record {position} (job {}) skipped as a miss: {err}", record.job_id);
                    matrix.push_miss();
                }
                Err(err) => return Err(err),
            }
        }
        Ok(matrix)
    }

    pub async fn evaluate(
        &self,
        search: &dyn RankedSearch,
        records: &[GroundTruthRecord],
    ) -> Result<MethodReport> {
        info!(
            "Evaluating {} over {} records (top_k={})",
            search.label(),
            records.len(),
            self.top_k
        );
        let matrix = self.relevance_matrix(search, records).await?;
        Ok(MethodReport::from_matrix(search.label(), &matrix))
    }

    /// Evaluate every method over the same records.
    pub async fn compare(
        &self,
        methods: &[&dyn RankedSearch],
        records: &[GroundTruthRecord],
    ) -> Result<ComparisonReport> {
        let mut reports = Vec::with_capacity(methods.len());
        for method in methods {
            reports.push(self.evaluate(*method, records).await?);
        }
        Ok(ComparisonReport {
            top_k: self.top_k,
            methods: reports,
        })
    }
}
