//! Configuration for completions and the pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::completion::DEFAULT_COMPLETION_MODEL;
use crate::prompt::PromptMode;

/// Chat-completion API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Model used when a request names none.
    pub model: String,

    /// Seconds before a request times out. Reasoning models are slow.
    pub timeout_secs: u64,

    /// Attempts for transient failures.
    pub max_retries: usize,

    /// Output token cap applied when a request sets none.
    pub max_tokens: Option<u32>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            timeout_secs: 120,
            max_retries: 5,
            max_tokens: None,
        }
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Postings retrieved per résumé.
    pub top_k: usize,

    /// Instruction used by the HTTP endpoint and the `match` command.
    pub mode: PromptMode,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            mode: PromptMode::Full,
        }
    }
}
