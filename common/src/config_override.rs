//! Command-line flags that take precedence over the config file.
//!
//! Both binaries flatten [`ConfigOverrides`] into their own `clap` parser so
//! the same flags and environment variables work everywhere.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use jobmatch_embeddings::EmbeddingProviderType;
use jobmatch_search::IndexName;

use crate::config::JobmatchConfig;
use crate::error::Result;

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// TOML config file.
    #[arg(long = "config", env = "JOBMATCH_CONFIG", global = true)]
    pub config_path: Option<PathBuf>,

    /// Base URL of the Elasticsearch-compatible store.
    #[arg(long, env = "JOBMATCH_ES_URL", global = true)]
    pub es_url: Option<String>,

    /// API key for the store.
    #[arg(long, env = "JOBMATCH_ES_API_KEY", hide_env_values = true, global = true)]
    pub es_api_key: Option<String>,

    /// Index holding the job postings.
    #[arg(long, env = "JOBMATCH_INDEX", global = true)]
    pub index: Option<String>,

    /// Embedding backend.
    #[arg(long, value_enum, global = true)]
    pub embedding_provider: Option<ProviderArg>,

    /// Default chat model for recommendations.
    #[arg(long, env = "JOBMATCH_MODEL", global = true)]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub openai_base_url: Option<String>,

    /// Key for completions and the openai embedding provider.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Local,
    Openai,
    Hashing,
}

impl From<ProviderArg> for EmbeddingProviderType {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Local => Self::Local,
            ProviderArg::Openai => Self::OpenAI,
            ProviderArg::Hashing => Self::Hashing,
        }
    }
}

impl ConfigOverrides {
    /// Load the config file (if any) and apply the flags on top.
    pub fn load(&self) -> Result<JobmatchConfig> {
        let mut config = JobmatchConfig::load(self.config_path.as_deref())?;
        self.apply(&mut config)?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut JobmatchConfig) -> Result<()> {
        if let Some(url) = &self.es_url {
            config.store.url = url.clone();
        }
        if let Some(key) = &self.es_api_key {
            config.store.api_key = Some(key.clone());
        }
        if let Some(index) = &self.index {
            config.store.index = IndexName::new(index.as_str())?;
        }
        if let Some(provider) = self.embedding_provider {
            config.embedding.provider = provider.into();
        }
        if let Some(model) = &self.model {
            config.completion.model = model.clone();
        }
        if let Some(base_url) = &self.openai_base_url {
            config.completion.base_url = base_url.clone();
            config.embedding.base_url = base_url.clone();
        }
        Ok(())
    }

    /// Non-blank API key, if one was supplied.
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
