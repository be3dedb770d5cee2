//! # Evaluation
//!
//! Offline quality checks driven by synthetic ground truth: an LLM writes a
//! résumé for a known posting, and a good search should bring that posting
//! back near the top.
//!
//! - [`metrics`]: relevance matrices, Hit-Rate and MRR
//! - [`ground_truth`]: generating and storing `(job_id, résumé, description)`
//! - [`retrieval`]: dense vs hybrid comparison
//! - [`rag`]: similarity between generated answers and the true description
//!
//! The oracle is a language model, so scores are directional rather than
//! absolute.

pub mod error;
pub mod ground_truth;
pub mod metrics;
pub mod rag;
pub mod retrieval;

pub use error::{EvaluationError, Result};
pub use ground_truth::{
    DEFAULT_GROUND_TRUTH_MAX_TOKENS, DEFAULT_GROUND_TRUTH_MODEL, GenerationRun,
    GroundTruthGenerator, GroundTruthRecord, read_ground_truth, write_ground_truth,
};
pub use metrics::{RelevanceMatrix, hit_rate, mrr, relevance_row};
pub use rag::{DEFAULT_RAG_MODELS, ModelSimilarity, RagEvaluator, SimilaritySummary};
pub use retrieval::{
    ComparisonReport, EngineSearch, MethodReport, RankedSearch, RetrievalEvaluator,
};
