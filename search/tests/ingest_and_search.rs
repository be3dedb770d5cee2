use std::path::PathBuf;
use std::sync::Arc;

use jobmatch_embeddings::HashingProvider;
use jobmatch_search::{
    HybridSearchEngine, IndexManager, IndexName, IndexSchema, MemoryStore, SearchConfig,
    load_source_documents,
};
use pretty_assertions::assert_eq;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/seek_jobs.json")
}

async fn ingested() -> (Arc<MemoryStore>, IndexName) {
    let store = Arc::new(MemoryStore::new());
    let manager = IndexManager::new(store.clone(), Arc::new(HashingProvider::new()));
    let index = IndexName::new("seek-jobs").unwrap();

    manager
        .create_index(&index, &IndexSchema::default())
        .await
        .unwrap();
    let records = load_source_documents(&fixture()).await.unwrap();
    let report = manager.ingest(&index, records).await.unwrap();

    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].position, 3);
    assert_eq!(report.failures[0].id.as_deref(), Some("81000004"));
    (store, index)
}

#[tokio::test]
async fn test_fixture_corpus_is_searchable() {
    let (store, index) = ingested().await;
    let engine = HybridSearchEngine::new(
        store,
        Arc::new(HashingProvider::new()),
        index,
        SearchConfig::default(),
    );

    let results = engine
        .search("registered nurse with emergency department triage experience", 3)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results.hits[0].job.id, "81000001");
    assert_eq!(
        results.hits[0].job.location.where_.as_deref(),
        Some("Parramatta NSW")
    );
    for pair in results.hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let dense = engine.dense_search("MIG and TIG welding", 5).await.unwrap();
    assert_eq!(dense.ids()[0], "81000005");
    assert!(!dense.ids().contains(&"81000004"));
}

#[tokio::test]
async fn test_recreating_the_index_empties_it() {
    let (store, index) = ingested().await;
    let manager = IndexManager::new(store, Arc::new(HashingProvider::new()));
    assert_eq!(manager.count(&index).await.unwrap(), 4);

    manager
        .create_index(&index, &IndexSchema::default())
        .await
        .unwrap();
    manager
        .create_index(&index, &IndexSchema::default())
        .await
        .unwrap();
    assert_eq!(manager.count(&index).await.unwrap(), 0);
}
