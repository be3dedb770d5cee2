//! Top-level configuration shared by the server and the CLI.
//!
//! Every section is optional in the TOML file; missing keys keep their
//! defaults:
//!
//! ```toml
//! [store]
//! url = "http://localhost:9200"
//! index = "seek-jobs"
//!
//! [embedding]
//! provider = "local"
//!
//! [completion]
//! model = "gpt-5"
//! ```

use std::path::Path;

use jobmatch_embeddings::EmbeddingConfig;
use jobmatch_rag::{CompletionConfig, RagConfig};
use jobmatch_search::{IndexSchema, SearchConfig, StoreConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobmatchConfig {
    pub store: StoreConfig,
    pub search: SearchConfig,
    pub embedding: EmbeddingConfig,
    pub completion: CompletionConfig,
    pub rag: RagConfig,
}

impl JobmatchConfig {
    /// Parse a TOML document.
    pub fn from_toml(contents: &str, origin: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents, path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Mapping used when (re)creating the job index.
    pub fn index_schema(&self) -> IndexSchema {
        IndexSchema {
            vector_dimension: self.search.vector_dimension,
            ..IndexSchema::default()
        }
    }
}
