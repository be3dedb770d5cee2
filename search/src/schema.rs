//! Job posting records, their stored form and the index mapping.

use chrono::{DateTime, Utc};
use jobmatch_embeddings::{EMBEDDING_DIMENSION, Embedding};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::error::{Result, SearchError};

/// A job posting as it appears in the scraped source corpus.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    pub title: String,
    /// Raw HTML description.
    #[serde(default)]
    pub description: Option<String>,
    /// Plain-text description; this is what gets embedded and searched.
    #[serde(alias = "clean_description")]
    pub clean_description: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub arrangement: Option<String>,
    pub location: Location,
    pub salary: Salary,
    pub url: String,
    pub listing_date: DateTime<Utc>,
    pub company: Company,
}

impl JobPosting {
    /// Parse one source record.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| SearchError::InvalidPosting(err.to_string()))
    }
}

/// Where the job is. Read camelCase from the source, written snake_case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Location {
    #[serde(rename = "where", default)]
    pub where_: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub suburb: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub postcode: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub country_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub country_code_numeric: Option<String>,
}

/// Advertised pay. Bounds that are missing or not finite are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Salary {
    #[serde(default, deserialize_with = "lenient::finite_f64")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient::finite_f64")]
    pub max: Option<f64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The advertiser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Company {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A job posting in the store's schema, carrying its description vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedDocument {
    pub id: String,
    pub title: String,
    pub description: String,
    pub description_vector: Embedding,
    pub types: Vec<String>,
    pub arrangement: Option<String>,
    pub url: String,
    pub listing_date: DateTime<Utc>,
    pub company: Company,
    pub location: Location,
    pub salary: Salary,
}

impl IndexedDocument {
    /// Map a posting onto the stored schema. The vector must have exactly
    /// `dimension` components.
    pub fn from_posting(posting: JobPosting, vector: Embedding, dimension: usize) -> Result<Self> {
        if vector.len() != dimension {
            return Err(SearchError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }
        Ok(Self {
            id: posting.id,
            title: posting.title,
            description: posting.clean_description,
            description_vector: vector,
            types: posting.types,
            arrangement: posting.arrangement,
            url: posting.url,
            listing_date: posting.listing_date,
            company: posting.company,
            location: posting.location,
            salary: posting.salary,
        })
    }
}

/// Index settings and field mapping for job postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSchema {
    pub shards: u32,
    pub replicas: u32,
    pub vector_dimension: usize,
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self {
            shards: 1,
            replicas: 0,
            vector_dimension: EMBEDDING_DIMENSION,
        }
    }
}

impl IndexSchema {
    pub fn with_vector_dimension(mut self, dimension: usize) -> Self {
        self.vector_dimension = dimension;
        self
    }

    /// Body for the index-creation request.
    pub fn to_json(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.shards,
                "number_of_replicas": self.replicas
            },
            "mappings": {
                "properties": {
                    "id": {"type": "keyword"},
                    "title": {"type": "text"},
                    "description": {"type": "text"},
                    "description_vector": {
                        "type": "dense_vector",
                        "dims": self.vector_dimension
                    },
                    "types": {"type": "keyword"},
                    "arrangement": {"type": "keyword"},
                    "url": {"type": "keyword"},
                    "listing_date": {"type": "date"},
                    "company": {
                        "properties": {
                            "id": {"type": "keyword"},
                            "name": {"type": "text"},
                            "logo_url": {"type": "keyword", "index": false}
                        }
                    },
                    "location": {
                        "properties": {
                            "where": {"type": "text"},
                            "suburb": {"type": "keyword"},
                            "state": {"type": "keyword"},
                            "postcode": {"type": "keyword"},
                            "country_code": {"type": "keyword"},
                            "country_code_numeric": {"type": "keyword"}
                        }
                    },
                    "salary": {
                        "properties": {
                            "min": {"type": "float"},
                            "max": {"type": "float"},
                            "type": {"type": "keyword"},
                            "currency": {"type": "keyword"},
                            "description": {"type": "text"}
                        }
                    }
                }
            }
        })
    }
}

/// Deserializers tolerating the shapes seen in scraped data.
mod lenient {
    use super::*;

    /// A string or a number, as a string.
    pub fn string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    /// Like [`string`], with `null` mapped to `None`.
    pub fn opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    /// A finite number, or `None` for `null`, `NaN` and unparseable text.
    pub fn finite_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(parsed.filter(|value| value.is_finite()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source_record() -> Value {
        json!({
            "id": 81234567,
            "title": "Data Engineer",
            "description": "<p>Build pipelines</p>",
            "clean_description": "Build pipelines in Python and Spark.",
            "types": ["Full time"],
            "arrangement": "Hybrid",
            "location": {
                "where": "Sydney NSW",
                "suburb": "Sydney",
                "state": "NSW",
                "postcode": 2000,
                "countryCode": "AU",
                "countryCodeNumeric": 36
            },
            "salary": {"min": 120000, "max": "NaN", "type": "annual", "currency": "AUD"},
            "url": "https://www.seek.com.au/job/81234567",
            "listingDate": "2025-03-01T02:15:00Z",
            "company": {"id": "c-1", "name": "Acme Analytics", "logoUrl": null}
        })
    }

    #[test]
    fn test_parse_source_record() {
        let posting = JobPosting::from_value(source_record()).unwrap();
        assert_eq!(posting.id, "81234567");
        assert_eq!(posting.clean_description, "Build pipelines in Python and Spark.");
        assert_eq!(posting.location.postcode.as_deref(), Some("2000"));
        assert_eq!(posting.location.country_code.as_deref(), Some("AU"));
        assert_eq!(posting.salary.min, Some(120000.0));
        assert_eq!(posting.salary.max, None);
        assert_eq!(posting.salary.kind.as_deref(), Some("annual"));
    }

    #[test]
    fn test_missing_salary_is_rejected() {
        let mut record = source_record();
        record.as_object_mut().unwrap().remove("salary");
        let err = JobPosting::from_value(record).unwrap_err();
        assert!(matches!(err, SearchError::InvalidPosting(_)));
        assert!(err.is_document_error());
    }

    #[test]
    fn test_indexed_document_uses_store_field_names() {
        let posting = JobPosting::from_value(source_record()).unwrap();
        let document = IndexedDocument::from_posting(posting, vec![0.5; 4], 4).unwrap();
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["description"], "Build pipelines in Python and Spark.");
        assert_eq!(value["listing_date"], "2025-03-01T02:15:00Z");
        assert_eq!(value["location"]["where"], "Sydney NSW");
        assert_eq!(value["location"]["country_code"], "AU");
        assert_eq!(value["salary"]["type"], "annual");
        assert_eq!(value["salary"]["max"], Value::Null);
        assert_eq!(value["company"]["logo_url"], Value::Null);
        assert_eq!(value["description_vector"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_wrong_vector_length_is_rejected() {
        let posting = JobPosting::from_value(source_record()).unwrap();
        let err = IndexedDocument::from_posting(posting, vec![0.0; 3], 384).unwrap_err();
        assert!(matches!(
            err,
            SearchError::DimensionMismatch {
                expected: 384,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_mapping() {
        let mapping = IndexSchema::default().to_json();
        assert_eq!(mapping["settings"]["number_of_shards"], 1);
        assert_eq!(mapping["settings"]["number_of_replicas"], 0);
        let properties = &mapping["mappings"]["properties"];
        assert_eq!(properties["description_vector"]["dims"], 384);
        assert_eq!(properties["company"]["properties"]["logo_url"]["index"], false);
        assert_eq!(properties["salary"]["properties"]["max"]["type"], "float");
    }
}
