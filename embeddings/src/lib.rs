//! # Embeddings
//!
//! Dense vector embeddings for job descriptions and résumés.
//!
//! ## Features
//!
//! - **Local inference**: `all-MiniLM-L6-v2` through fastembed, loaded once per
//!   process on first use
//! - **Remote inference**: OpenAI-compatible `/embeddings` endpoints
//! - **Deterministic hashing**: a model-free embedder for offline runs and tests
//! - **Similarity**: cosine / dot-product helpers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingConfig ──► EmbeddingProvider ──► Embedding (384 f32) │
//! │                          │                                      │
//! │                          ▼                                      │
//! │          LocalMiniLm / OpenAI / Hashing     cosine_similarity   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod hashing;
pub mod local;
pub mod provider;
pub mod similarity;

pub use config::{EmbeddingConfig, EmbeddingProviderType, build_provider};
pub use error::{EmbeddingError, Result};
pub use hashing::HashingProvider;
pub use local::LocalMiniLmProvider;
pub use provider::{EmbeddingProvider, OpenAIProvider, check_dimension};
pub use similarity::{cosine_similarity, normalize};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of every embedding stored in the job index (all-MiniLM-L6-v2).
pub const EMBEDDING_DIMENSION: usize = 384;

/// Identifier of the local sentence-transformer model.
pub const DEFAULT_LOCAL_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
