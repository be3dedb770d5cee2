//! In-process document store for tests. The binaries always talk to
//! Elasticsearch.
//!
//! Scores like the Elasticsearch query it stands in for: tantivy BM25 over
//! the description for the `match` clause plus `cosine + 1.0` for the script
//! score. Writes are visible immediately.

use std::collections::HashMap;

use async_trait::async_trait;
use jobmatch_embeddings::cosine_similarity;
use ordered_float::OrderedFloat;
use tantivy::collector::TopDocs;
use tantivy::query::BooleanQuery;
use tantivy::schema::{Field, STORED, STRING, Schema, TEXT, Value as _};
use tantivy::tokenizer::TokenStream as _;
use tantivy::{Index, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::IndexName;
use crate::error::{Result, SearchError};
use crate::query::{CompanyName, JobSummary, LocationName, SearchHit, SearchRequest};
use crate::schema::{IndexSchema, IndexedDocument};
use crate::store::DocumentStore;

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// BM25 index over descriptions, keyed by document id.
#[derive(Debug)]
struct LexicalIndex {
    index: Index,
    id: Field,
    description: Field,
}

impl LexicalIndex {
    fn new() -> Self {
        let mut builder = Schema::builder();
        let id = builder.add_text_field("id", STRING | STORED);
        let description = builder.add_text_field("description", TEXT);
        Self {
            index: Index::create_in_ram(builder.build()),
            id,
            description,
        }
    }

    fn upsert(&self, id: &str, description: &str) -> Result<()> {
        let mut writer: IndexWriter = self.index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        writer.delete_term(Term::from_field_text(self.id, id));
        writer.add_document(doc!(self.id => id, self.description => description))?;
        writer.commit()?;
        Ok(())
    }

    /// BM25 score per id for every description matching any term of `text`.
    fn scores(&self, text: &str) -> Result<HashMap<String, f32>> {
        let mut analyzer = self.index.tokenizer_for_field(self.description)?;
        let mut terms = Vec::new();
        analyzer.token_stream(text).process(&mut |token| {
            terms.push(Term::from_field_text(self.description, &token.text));
        });
        if terms.is_empty() {
            return Ok(HashMap::new());
        }

        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let searcher = reader.searcher();
        let limit = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        if limit == 0 {
            return Ok(HashMap::new());
        }

        let query = BooleanQuery::new_multiterms_query(terms);
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;
        let mut scores = HashMap::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let document: TantivyDocument = searcher.doc(address)?;
            if let Some(id) = document.get_first(self.id).and_then(|value| value.as_str()) {
                scores.insert(id.to_string(), score);
            }
        }
        Ok(scores)
    }
}

#[derive(Debug)]
struct MemoryIndex {
    schema: IndexSchema,
    /// Insertion order; an upsert of an existing id keeps its slot.
    documents: Vec<IndexedDocument>,
    positions: HashMap<String, usize>,
    lexical: LexicalIndex,
}

impl MemoryIndex {
    fn new(schema: IndexSchema) -> Self {
        Self {
            schema,
            documents: Vec::new(),
            positions: HashMap::new(),
            lexical: LexicalIndex::new(),
        }
    }
}

/// [`DocumentStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    indices: RwLock<HashMap<IndexName, MemoryIndex>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn summarize(document: &IndexedDocument) -> JobSummary {
    JobSummary {
        id: document.id.clone(),
        title: document.title.clone(),
        description: document.description.clone(),
        company: CompanyName {
            name: document.company.name.clone(),
        },
        location: LocationName {
            where_: document.location.where_.clone(),
        },
        url: document.url.clone(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn index_exists(&self, index: &IndexName) -> Result<bool> {
        Ok(self.indices.read().await.contains_key(index))
    }

    async fn delete_index(&self, index: &IndexName) -> Result<()> {
        self.indices
            .write()
            .await
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))
    }

    async fn create_index(&self, index: &IndexName, schema: &IndexSchema) -> Result<()> {
        let mut indices = self.indices.write().await;
        if indices.contains_key(index) {
            return Err(SearchError::Store {
                status: 400,
                body: format!("resource_already_exists_exception: index [{index}] already exists"),
            });
        }
        indices.insert(index.clone(), MemoryIndex::new(*schema));
        Ok(())
    }

    async fn upsert(&self, index: &IndexName, document: &IndexedDocument) -> Result<()> {
        let mut indices = self.indices.write().await;
        let target = indices
            .get_mut(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?;

        let expected = target.schema.vector_dimension;
        if document.description_vector.len() != expected {
            return Err(SearchError::DimensionMismatch {
                expected,
                actual: document.description_vector.len(),
            });
        }

        target.lexical.upsert(&document.id, &document.description)?;
        match target.positions.get(&document.id) {
            Some(&position) => target.documents[position] = document.clone(),
            None => {
                target
                    .positions
                    .insert(document.id.clone(), target.documents.len());
                target.documents.push(document.clone());
            }
        }
        Ok(())
    }

    async fn refresh(&self, index: &IndexName) -> Result<()> {
        if self.index_exists(index).await? {
            Ok(())
        } else {
            Err(SearchError::IndexNotFound(index.to_string()))
        }
    }

    async fn count(&self, index: &IndexName) -> Result<usize> {
        self.indices
            .read()
            .await
            .get(index)
            .map(|target| target.documents.len())
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))
    }

    async fn search(&self, index: &IndexName, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let indices = self.indices.read().await;
        let target = indices
            .get(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?;

        let vector = request.query.vector();
        if vector.len() != target.schema.vector_dimension {
            return Err(SearchError::DimensionMismatch {
                expected: target.schema.vector_dimension,
                actual: vector.len(),
            });
        }

        let lexical = match request.query.text() {
            Some(text) => target.lexical.scores(text)?,
            None => HashMap::new(),
        };

        let mut scored = Vec::with_capacity(target.documents.len());
        for document in &target.documents {
            let bm25 = lexical.get(&document.id).copied().unwrap_or(0.0);
            let cosine = cosine_similarity(vector, &document.description_vector)?;
            scored.push((bm25 + cosine + 1.0, document));
        }
        scored.sort_by_key(|(score, _)| std::cmp::Reverse(OrderedFloat(*score)));
        scored.truncate(request.size);

        debug!("Memory store scored {} documents", target.documents.len());
        Ok(scored
            .into_iter()
            .map(|(score, document)| SearchHit {
                score,
                job: summarize(document),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StoreQuery;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn document(id: &str, description: &str, vector: Vec<f32>) -> IndexedDocument {
        IndexedDocument {
            id: id.to_string(),
            title: format!("Job {id}"),
            description: description.to_string(),
            description_vector: vector,
            types: vec![],
            arrangement: None,
            url: format!("https://example.com/{id}"),
            listing_date: Utc::now(),
            company: Default::default(),
            location: Default::default(),
            salary: Default::default(),
        }
    }

    async fn seeded() -> (MemoryStore, IndexName) {
        let store = MemoryStore::new();
        let index = IndexName::new("jobs").unwrap();
        store
            .create_index(&index, &IndexSchema::default().with_vector_dimension(2))
            .await
            .unwrap();
        for doc in [
            document("a", "python data pipelines", vec![1.0, 0.0]),
            document("b", "warehouse forklift driver", vec![0.0, 1.0]),
            document("c", "python web developer", vec![0.6, 0.8]),
        ] {
            store.upsert(&index, &doc).await.unwrap();
        }
        (store, index)
    }

    #[tokio::test]
    async fn test_dense_ranking() {
        let (store, index) = seeded().await;
        let request = SearchRequest {
            query: StoreQuery::Dense {
                vector: vec![1.0, 0.0],
            },
            size: 3,
        };
        let hits = store.search(&index, &request).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|hit| hit.job.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert!((hits[0].score - 2.0).abs() < 1e-6);
        assert!((hits[2].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_hybrid_adds_lexical_score() {
        let (store, index) = seeded().await;
        let request = SearchRequest {
            query: StoreQuery::Hybrid {
                text: "forklift".to_string(),
                vector: vec![0.6, 0.8],
            },
            size: 1,
        };
        let hits = store.search(&index, &request).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].job.id, "b");
        assert!(hits[0].score > 2.0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let (store, index) = seeded().await;
        store
            .upsert(&index, &document("a", "rewritten", vec![0.0, 1.0]))
            .await
            .unwrap();
        assert_eq!(store.count(&index).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_dimension_and_missing_index() {
        let (store, index) = seeded().await;
        let err = store
            .upsert(&index, &document("d", "bad", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { expected: 2, actual: 3 }));

        let missing = IndexName::new("missing").unwrap();
        assert!(matches!(
            store.count(&missing).await,
            Err(SearchError::IndexNotFound(_))
        ));
        assert!(!store.index_exists(&missing).await.unwrap());
    }

    #[test]
    fn test_lexical_scores_follow_bm25() {
        let lexical = LexicalIndex::new();
        for (id, description) in [
            ("a", "python python developer"),
            ("b", "python analyst"),
            ("c", "rust developer"),
        ] {
            lexical.upsert(id, description).unwrap();
        }

        let rust = lexical.scores("Rust").unwrap();
        assert_eq!(rust.len(), 1);
        assert!(rust["c"] > 0.0);

        let python = lexical.scores("python, please").unwrap();
        assert_eq!(python.len(), 2);
        assert!(python["a"] > python["b"]);

        assert!(lexical.scores("   ").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_lexical_entry() {
        let (store, index) = seeded().await;
        store
            .upsert(&index, &document("b", "python tutor", vec![0.0, 1.0]))
            .await
            .unwrap();
        let request = SearchRequest {
            query: StoreQuery::Hybrid {
                text: "forklift".to_string(),
                vector: vec![0.0, 1.0],
            },
            size: 3,
        };
        let hits = store.search(&index, &request).await.unwrap();
        assert!(hits.iter().all(|hit| hit.score <= 2.0 + 1e-6));
    }
}
