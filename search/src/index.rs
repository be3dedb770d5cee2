//! Index creation and corpus ingest.

use std::path::Path;
use std::sync::Arc;

use jobmatch_embeddings::EmbeddingProvider;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::IndexName;
use crate::error::Result;
use crate::schema::{IndexSchema, IndexedDocument, JobPosting};
use crate::store::DocumentStore;

/// Progress is logged after this many records.
const PROGRESS_INTERVAL: usize = 100;

/// A record skipped during ingest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestFailure {
    /// Position in the source corpus.
    pub position: usize,
    /// Source id, when the record had one.
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of an ingest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    fn record_failure(&mut self, failure: IngestFailure) {
        self.failed += 1;
        self.failures.push(failure);
    }
}

/// Read the source corpus: one JSON array of job posting objects.
///
/// Bare `NaN` and `Infinity` number literals are accepted and read as null.
pub async fn load_source_documents(path: &Path) -> Result<Vec<Value>> {
    let content = tokio::fs::read_to_string(path).await?;
    let documents: Vec<Value> = json5::from_str(&content)?;
    info!("Loaded {} source records from {}", documents.len(), path.display());
    Ok(documents)
}

/// Creates the job index and fills it from the source corpus.
pub struct IndexManager {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl IndexManager {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Create `name` with `schema`, deleting any existing index of that name.
    pub async fn create_index(&self, name: &IndexName, schema: &IndexSchema) -> Result<()> {
        if self.store.index_exists(name).await? {
            warn!("Index {name} already exists; deleting it");
            self.store.delete_index(name).await?;
        }
        self.store.create_index(name, schema).await?;
        info!(
            "Created index {name} on {} ({} dims)",
            self.store.name(),
            schema.vector_dimension
        );
        Ok(())
    }

    /// Embed and upsert every record, one at a time in corpus order.
    ///
    /// Records that fail on their own (unparseable, rejected by the store,
    /// wrong vector length) are logged and counted; anything else aborts the
    /// run. The index is refreshed once at the end.
    pub async fn ingest(&self, name: &IndexName, records: Vec<Value>) -> Result<IngestReport> {
        let total = records.len();
        let dimension = self.embedder.dimension();
        let mut report = IngestReport::default();
        info!("Ingesting {total} records into {name}");

        for (position, record) in records.into_iter().enumerate() {
            let id = record_id(&record);
            match self.ingest_one(name, record, dimension).await {
                Ok(()) => {
                    report.succeeded += 1;
                    debug!("Ingested record {position}");
                }
                Err(err) if err.is_document_error() => {
                    warn!("Skipping record {position} ({id:?}): {err}");
                    report.record_failure(IngestFailure {
                        position,
                        id,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }

            if (position + 1) % PROGRESS_INTERVAL == 0 {
                info!("Processed {}/{total} records", position + 1);
            }
        }

        self.store.refresh(name).await?;
        info!(
            "Ingest into {name} finished: {} succeeded, {} failed",
            report.succeeded, report.failed
        );
        Ok(report)
    }

    async fn ingest_one(&self, name: &IndexName, record: Value, dimension: usize) -> Result<()> {
        let posting = JobPosting::from_value(record)?;
        let vector = self.embedder.embed(&posting.clean_description).await?;
        let document = IndexedDocument::from_posting(posting, vector, dimension)?;
        self.store.upsert(name, &document).await
    }

    /// Number of documents currently searchable in `name`.
    pub async fn count(&self, name: &IndexName) -> Result<usize> {
        self.store.count(name).await
    }
}

fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
