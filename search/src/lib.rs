//! # Job Search
//!
//! Hybrid lexical + dense-vector retrieval over an index of job postings.
//!
//! - **Schema**: source [`JobPosting`] records, the stored [`IndexedDocument`]
//!   and the index mapping ([`IndexSchema`])
//! - **Stores**: the [`DocumentStore`] seam with an Elasticsearch client and an
//!   in-process [`MemoryStore`]
//! - **Index management**: destructive index creation and per-document ingest
//! - **Search**: [`HybridSearchEngine`], combining a `match` clause on the
//!   description with a cosine script score on `description_vector`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Job Search                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  JobPosting ──► IndexManager ──► DocumentStore ◄── HybridSearch │
//! │                     │            (ES / memory)        Engine    │
//! │                     ▼                                   │       │
//! │              EmbeddingProvider ◄────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jobmatch_search::{HybridSearchEngine, IndexName, SearchConfig};
//!
//! let engine = HybridSearchEngine::new(store, embedder, IndexName::new("seek-jobs")?, SearchConfig::default());
//! let results = engine.search(&resume_text, 5).await?;
//! for hit in &results.hits {
//!     println!("{:.3} {}", hit.score, hit.job.title);
//! }
//! ```

pub mod config;
pub mod elasticsearch;
pub mod engine;
pub mod error;
pub mod index;
pub mod memory;
pub mod query;
pub mod schema;
pub mod store;

pub use config::{DEFAULT_INDEX_NAME, IndexName, SearchConfig, StoreConfig};
pub use elasticsearch::ElasticsearchStore;
pub use engine::{HybridSearchEngine, SearchMode};
pub use error::{Result, SearchError};
pub use index::{IndexManager, IngestFailure, IngestReport, load_source_documents};
pub use memory::MemoryStore;
pub use query::{CompanyName, JobSummary, LocationName, SearchHit, SearchRequest, SearchResults, StoreQuery};
pub use schema::{Company, IndexSchema, IndexedDocument, JobPosting, Location, Salary};
pub use store::DocumentStore;
