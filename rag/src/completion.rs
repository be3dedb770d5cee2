//! Chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use jobmatch_utils_backoff::RetryPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CompletionConfig;
use crate::error::CompletionError;

/// Model used when neither the request nor the config names one.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-5";

/// One single-turn completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Overrides the client's default model.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Trait implemented by completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Text of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiCompletionClient {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl OpenAiCompletionClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, CompletionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CompletionError::NotConfigured(
                "OPENAI_API_KEY is empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            max_tokens: None,
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &CompletionConfig, api_key: Option<&str>) -> Result<Self, CompletionError> {
        let api_key = api_key.ok_or_else(|| {
            CompletionError::NotConfigured("OPENAI_API_KEY is not set".to_string())
        })?;
        let mut client = Self::new(api_key, config.timeout())?
            .with_base_url(&config.base_url)
            .with_model(&config.model)
            .with_retry(RetryPolicy::new(config.max_retries));
        client.max_tokens = config.max_tokens;
        Ok(client)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send(&self, body: &ChatRequest<'_>) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(CompletionError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(CompletionError::ApiRequest {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens.or(self.max_tokens),
        };

        debug!("Requesting completion from {model} ({} prompt chars)", request.prompt.len());
        let body = &body;
        let answer = self
            .retry
            .retry(
                "chat completion",
                move || self.send(body),
                CompletionError::is_retryable,
            )
            .await?;
        info!("Completion from {model}: {} chars", answer.len());
        Ok(answer)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}
