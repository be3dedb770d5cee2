//! Elasticsearch REST client.

use std::time::Duration;

use async_trait::async_trait;
use jobmatch_utils_backoff::RetryPolicy;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{IndexName, StoreConfig};
use crate::error::{Result, SearchError};
use crate::query::{JobSummary, SearchHit, SearchRequest};
use crate::schema::{IndexSchema, IndexedDocument};
use crate::store::DocumentStore;

/// [`DocumentStore`] backed by an Elasticsearch 8.x cluster.
pub struct ElasticsearchStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl ElasticsearchStore {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(url).map_err(|err| SearchError::Config(format!("invalid store url {url:?}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SearchError::Config(format!("store url {url:?} cannot be a base")));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key: None,
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let mut store = Self::new(&config.url, config.timeout())?.with_retry(RetryPolicy::new(config.max_retries));
        if let Some(key) = &config.api_key {
            store = store.with_api_key(key);
        }
        Ok(store)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SearchError::Config(format!("store url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header(AUTHORIZATION, format!("ApiKey {key}")),
            None => builder,
        }
    }

    /// Send the request built by `build`, retrying transient failures.
    async fn execute<F>(&self, label: &str, index: &IndexName, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let build = &build;
        self.retry
            .retry(
                label,
                move || async move {
                    let response = build().send().await?;
                    if response.status().is_success() {
                        Ok(response)
                    } else {
                        Err(error_from_response(index, response).await)
                    }
                },
                SearchError::is_retryable,
            )
            .await
    }
}

async fn error_from_response(index: &IndexName, response: Response) -> SearchError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND && (body.is_empty() || body.contains("index_not_found_exception")) {
        return SearchError::IndexNotFound(index.to_string());
    }
    SearchError::Store {
        status: status.as_u16(),
        body,
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: JobSummary,
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn index_exists(&self, index: &IndexName) -> Result<bool> {
        let url = self.endpoint(&[index.as_str()])?;
        match self
            .execute("index exists", index, || self.request(Method::HEAD, url.clone()))
            .await
        {
            Ok(_) => Ok(true),
            Err(SearchError::IndexNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn delete_index(&self, index: &IndexName) -> Result<()> {
        let url = self.endpoint(&[index.as_str()])?;
        self.execute("delete index", index, || self.request(Method::DELETE, url.clone()))
            .await?;
        info!("Deleted index {index}");
        Ok(())
    }

    async fn create_index(&self, index: &IndexName, schema: &IndexSchema) -> Result<()> {
        let url = self.endpoint(&[index.as_str()])?;
        let body = schema.to_json();
        self.execute("create index", index, || {
            self.request(Method::PUT, url.clone()).json(&body)
        })
        .await?;
        info!("Created index {index}");
        Ok(())
    }

    async fn upsert(&self, index: &IndexName, document: &IndexedDocument) -> Result<()> {
        let url = self.endpoint(&[index.as_str(), "_doc", &document.id])?;
        self.execute("index document", index, || {
            self.request(Method::PUT, url.clone()).json(document)
        })
        .await?;
        debug!("Indexed document {}", document.id);
        Ok(())
    }

    async fn refresh(&self, index: &IndexName) -> Result<()> {
        let url = self.endpoint(&[index.as_str(), "_refresh"])?;
        self.execute("refresh index", index, || self.request(Method::POST, url.clone()))
            .await?;
        Ok(())
    }

    async fn count(&self, index: &IndexName) -> Result<usize> {
        let url = self.endpoint(&[index.as_str(), "_count"])?;
        let response = self
            .execute("count documents", index, || self.request(Method::GET, url.clone()))
            .await?;
        let body: CountResponse = response
            .json()
            .await
            .map_err(|err| SearchError::InvalidResponse(err.to_string()))?;
        Ok(body.count)
    }

    async fn search(&self, index: &IndexName, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let url = self.endpoint(&[index.as_str(), "_search"])?;
        let body = request.to_body();
        let response = self
            .execute("search", index, || {
                self.request(Method::POST, url.clone()).json(&body)
            })
            .await?;
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|err| SearchError::InvalidResponse(err.to_string()))?;

        debug!("Store returned {} hits", parsed.hits.hits.len());
        Ok(parsed
            .hits
            .hits
            .into_iter()
            .take(request.size)
            .map(|hit| SearchHit {
                score: hit.score.unwrap_or_default(),
                job: hit.source,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StoreQuery;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> ElasticsearchStore {
        ElasticsearchStore::new(&server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_retry(
                RetryPolicy::new(3)
                    .with_base_delay(Duration::ZERO)
                    .without_jitter(),
            )
    }

    fn index() -> IndexName {
        IndexName::new("seek-jobs").unwrap()
    }

    #[tokio::test]
    async fn test_index_exists() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/seek-jobs"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(store.index_exists(&index()).await.unwrap());
        assert!(
            !store
                .index_exists(&IndexName::new("missing").unwrap())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_search_parses_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/seek-jobs/_search"))
            .and(body_partial_json(json!({"size": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {"hits": [
                    {"_score": 3.5, "_source": {
                        "id": "1", "title": "Data Engineer", "description": "Spark",
                        "company": {"name": "Acme"}, "location": {"where": "Sydney"},
                        "url": "https://example.com/1"
                    }},
                    {"_score": 1.25, "_source": {
                        "id": "2", "title": "Nurse", "description": "Ward",
                        "company": {"name": "Health"}, "location": {},
                        "url": "https://example.com/2"
                    }}
                ]}
            })))
            .mount(&server)
            .await;

        let request = SearchRequest {
            query: StoreQuery::Dense {
                vector: vec![0.0; 4],
            },
            size: 2,
        };
        let hits = store(&server).search(&index(), &request).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, 3.5);
        assert_eq!(hits[0].job.location.where_.as_deref(), Some("Sydney"));
        assert_eq!(hits[1].job.location.where_, None);
    }

    #[tokio::test]
    async fn test_missing_index_on_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/seek-jobs/_search"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"type": "index_not_found_exception"},
                "status": 404
            })))
            .mount(&server)
            .await;

        let request = SearchRequest {
            query: StoreQuery::Dense { vector: vec![0.0] },
            size: 1,
        };
        let err = store(&server).search(&index(), &request).await.unwrap_err();
        assert!(matches!(err, SearchError::IndexNotFound(name) if name == "seek-jobs"));
    }

    #[tokio::test]
    async fn test_unavailable_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/seek-jobs/_count"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/seek-jobs/_count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 42})))
            .mount(&server)
            .await;

        assert_eq!(store(&server).count(&index()).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_rejected_document_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/seek-jobs/_doc/81234567"))
            .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
            .expect(1)
            .mount(&server)
            .await;

        let document = IndexedDocument {
            id: "81234567".to_string(),
            title: "Data Engineer".to_string(),
            description: "Spark".to_string(),
            description_vector: vec![0.0; 4],
            types: vec![],
            arrangement: None,
            url: "https://example.com".to_string(),
            listing_date: chrono::Utc::now(),
            company: Default::default(),
            location: Default::default(),
            salary: Default::default(),
        };
        let err = store(&server).upsert(&index(), &document).await.unwrap_err();
        assert!(err.is_document_error());
    }

    #[tokio::test]
    async fn test_api_key_and_mapping_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/seek-jobs"))
            .and(header("authorization", "ApiKey secret"))
            .and(body_partial_json(json!({"settings": {"number_of_shards": 1}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .with_api_key("secret")
            .create_index(&index(), &IndexSchema::default())
            .await
            .unwrap();
    }
}
