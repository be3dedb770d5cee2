//! Search requests and results.

use jobmatch_embeddings::Embedding;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Field matched lexically.
pub const LEXICAL_FIELD: &str = "description";

/// Field holding the dense description vector.
pub const VECTOR_FIELD: &str = "description_vector";

/// Painless source of the dense clause. `+ 1.0` keeps scores non-negative.
pub const COSINE_SCRIPT: &str = "cosineSimilarity(params.query_vector, 'description_vector') + 1.0";

/// Fields returned for every hit.
pub const SOURCE_FIELDS: [&str; 6] = [
    "id",
    "title",
    "description",
    "company.name",
    "location.where",
    "url",
];

/// What to match.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreQuery {
    /// `match` on the description plus the cosine script score, summed.
    Hybrid { text: String, vector: Embedding },
    /// The cosine script score alone.
    Dense { vector: Embedding },
}

impl StoreQuery {
    pub fn vector(&self) -> &[f32] {
        match self {
            Self::Hybrid { vector, .. } | Self::Dense { vector } => vector,
        }
    }

    /// Lexical query text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Hybrid { text, .. } => Some(text),
            Self::Dense { .. } => None,
        }
    }
}

/// A bounded search against one index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: StoreQuery,
    pub size: usize,
}

impl SearchRequest {
    /// Elasticsearch `_search` body.
    pub fn to_body(&self) -> Value {
        let script_score = json!({
            "script_score": {
                "query": {"match_all": {}},
                "script": {
                    "source": COSINE_SCRIPT,
                    "params": {"query_vector": self.query.vector()}
                }
            }
        });

        let query = match &self.query {
            StoreQuery::Hybrid { text, .. } => json!({
                "bool": {
                    "should": [
                        {"match": {(LEXICAL_FIELD): text}},
                        script_score
                    ]
                }
            }),
            StoreQuery::Dense { .. } => script_score,
        };

        json!({
            "size": self.size,
            "query": query,
            "_source": SOURCE_FIELDS,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyName {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationName {
    #[serde(rename = "where", default)]
    pub where_: Option<String>,
}

/// Projection of a stored posting returned with each hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub company: CompanyName,
    #[serde(default)]
    pub location: LocationName,
    pub url: String,
}

/// One scored hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub score: f32,
    pub job: JobSummary,
}

/// Ranked hits, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Job ids in rank order.
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.job.id.as_str()).collect()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobSummary> {
        self.hits.iter().map(|hit| &hit.job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hybrid_body() {
        let request = SearchRequest {
            query: StoreQuery::Hybrid {
                text: "python developer".to_string(),
                vector: vec![0.25, -0.5],
            },
            size: 5,
        };
        assert_eq!(
            request.to_body(),
            json!({
                "size": 5,
                "query": {"bool": {"should": [
                    {"match": {"description": "python developer"}},
                    {"script_score": {
                        "query": {"match_all": {}},
                        "script": {
                            "source": "cosineSimilarity(params.query_vector, 'description_vector') + 1.0",
                            "params": {"query_vector": [0.25, -0.5]}
                        }
                    }}
                ]}},
                "_source": ["id", "title", "description", "company.name", "location.where", "url"]
            })
        );
    }

    #[test]
    fn test_dense_body_has_no_match_clause() {
        let request = SearchRequest {
            query: StoreQuery::Dense {
                vector: vec![1.0],
            },
            size: 3,
        };
        let body = request.to_body();
        assert!(body["query"].get("bool").is_none());
        assert_eq!(body["query"]["script_score"]["script"]["source"], COSINE_SCRIPT);
        assert_eq!(body["size"], 3);
    }

    #[test]
    fn test_summary_from_projected_source() {
        let summary: JobSummary = serde_json::from_value(json!({
            "id": "1",
            "title": "Nurse",
            "description": "Ward nurse",
            "company": {"name": "Health Co"},
            "location": {"where": "Perth WA"},
            "url": "https://example.com/1"
        }))
        .unwrap();
        assert_eq!(summary.company.name, "Health Co");
        assert_eq!(summary.location.where_.as_deref(), Some("Perth WA"));
    }
}
