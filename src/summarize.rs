use std::future::Future;
use std::time::{Duration, Instant};

use eyre::{Result, bail};
use log::{debug, warn};
use serde::Serialize;

use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Chat-completion service that answers with a single JSON object
pub trait CompletionClient: Send + Sync {
    fn complete(&self, messages: &[ChatMessage]) -> impl Future<Output = Result<String>> + Send;
}

/// OpenAI-compatible chat-completions client (OpenRouter by default).
///
/// Holds one connection pool; share a single instance across requests.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.api_key()?, config.model.clone()).with_base_url(config.base_url.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "response_format": { "type": "json_object" }
        })
    }
}

impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!("Requesting completion from {} with model {}", self.base_url, self.model);

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("LLM API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_openai_text(&json)
    }
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    if let Some(text) = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
    {
        return Ok(text.to_string());
    }
    bail!("unexpected chat completion response format");
}

/// Request a completion, giving up after `limit`.
pub async fn summarize<C: CompletionClient>(
    client: &C,
    messages: &[ChatMessage],
    limit: Duration,
) -> Result<String, PipelineError> {
    let started = Instant::now();

    match tokio::time::timeout(limit, client.complete(messages)).await {
        Ok(Ok(text)) => {
            debug!("Completion received in {:?} ({} bytes)", started.elapsed(), text.len());
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!("Completion request failed: {e:#}");
            Err(PipelineError::LlmInvalidResponse {
                cause: format!("{e:#}"),
            })
        }
        Err(_) => Err(PipelineError::LlmTimeout { timeout: limit }),
    }
}
