//! Answer-quality evaluation for the RAG pipeline.
//!
//! Each ground-truth résumé is answered in job-description-only mode and the
//! answer is compared, by embedding cosine similarity, with the description
//! the résumé was generated from.

use std::sync::Arc;

use jobmatch_embeddings::{EmbeddingProvider, cosine_similarity};
use jobmatch_rag::{PromptMode, RagPipeline};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::ground_truth::GroundTruthRecord;

/// Models compared when none are given.
pub const DEFAULT_RAG_MODELS: [&str; 3] = ["gpt-4o", "gpt-4.1", "gpt-5"];

/// Descriptive statistics of a similarity sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilaritySummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; undefined below two observations.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl SimilaritySummary {
    pub fn from_samples(samples: &[f64]) -> Self {
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();

        let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
        let std_dev = match mean {
            Some(mean) if count > 1 => {
                let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / (count - 1) as f64;
                Some(variance.sqrt())
            }
            _ => None,
        };

        Self {
            count,
            mean,
            std: std_dev,
            min: sorted.first().copied(),
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Similarity results for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSimilarity {
    pub model: String,
    pub similarities: Vec<f64>,
    /// Records whose pipeline run failed and were left out.
    pub failed: usize,
    pub summary: SimilaritySummary,
}

pub struct RagEvaluator {
    pipeline: Arc<RagPipeline>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RagEvaluator {
    pub fn new(pipeline: Arc<RagPipeline>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { pipeline, embedder }
    }

    pub async fn evaluate(
        &self,
        records: &[GroundTruthRecord],
        models: &[String],
    ) -> Result<Vec<ModelSimilarity>> {
        let descriptions: Vec<&str> = records
            .iter()
            .map(|record| record.job_description.as_str())
            .collect();
        let description_vectors = self.embedder.embed_batch(&descriptions).await?;

        let mut results = Vec::with_capacity(models.len());
        for model in models {
            info!("Evaluating answers from {model} over {} records", records.len());
            let mut similarities = Vec::with_capacity(records.len());
            let mut failed = 0;

            for (record, description_vector) in records.iter().zip(&description_vectors) {
                let answer = match self
                    .pipeline
                    .answer(&record.generated_resume, PromptMode::JobDescriptionOnly, Some(model.as_str()))
                    .await
                {
                    Ok(answer) => answer.answer,
                    Err(err) => {
                        warn!("{model} failed on job {}: {err}", record.job_id);
                        failed += 1;
                        continue;
                    }
                };
                let answer_vector = self.embedder.embed(&answer).await?;
                let similarity = cosine_similarity(&answer_vector, description_vector)?;
                similarities.push(f64::from(similarity));
            }

            results.push(ModelSimilarity {
                model: model.clone(),
                summary: SimilaritySummary::from_samples(&similarities),
                similarities,
                failed,
            });
        }
        Ok(results)
    }

    /// One row per model, `describe()`-style columns.
    pub fn render(results: &[ModelSimilarity]) -> String {
        fn cell(value: Option<f64>) -> String {
            value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.6}"))
        }

        let mut out = format!(
            "{:<12} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>7}\n",
            "model", "count", "mean", "std", "min", "25%", "50%", "75%", "max", "failed"
        );
        for result in results {
            let s = &result.summary;
            out.push_str(&format!(
                "{:<12} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>7}\n",
                result.model,
                s.count,
                cell(s.mean),
                cell(s.std),
                cell(s.min),
                cell(s.p25),
                cell(s.p50),
                cell(s.p75),
                cell(s.max),
                result.failed,
            ));
        }
        out
    }
}
