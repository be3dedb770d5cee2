//! The document store seam.

use async_trait::async_trait;

use crate::config::IndexName;
use crate::error::Result;
use crate::query::{SearchHit, SearchRequest};
use crate::schema::{IndexSchema, IndexedDocument};

/// Storage backend for indexed job postings.
///
/// Implementations score hybrid queries as the sum of the lexical relevance
/// of `description` and `cosine(query, description_vector) + 1.0`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    async fn index_exists(&self, index: &IndexName) -> Result<bool>;

    async fn delete_index(&self, index: &IndexName) -> Result<()>;

    async fn create_index(&self, index: &IndexName, schema: &IndexSchema) -> Result<()>;

    /// Insert or replace the document with the same id.
    async fn upsert(&self, index: &IndexName, document: &IndexedDocument) -> Result<()>;

    /// Make every write so far visible to search.
    async fn refresh(&self, index: &IndexName) -> Result<()>;

    async fn count(&self, index: &IndexName) -> Result<usize>;

    /// Hits in the store's ranking order, at most `request.size` of them.
    async fn search(&self, index: &IndexName, request: &SearchRequest) -> Result<Vec<SearchHit>>;
}
