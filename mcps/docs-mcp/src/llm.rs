//! Hosted model client
//!
//! Minimal OpenAI-compatible chat-completions client, used against Groq by
//! default. Only a single system + user exchange is needed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{DocsError, DocsResult, Stage};

/// Trait for chat models
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one system instruction and one user message, return the completion text
    async fn complete(&self, system: &str, user: &str) -> DocsResult<String>;

    /// Get the model name
    fn model(&self) -> &str;
}

// --- OpenAI-compatible serde structs ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint
pub struct OpenAiCompatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout_seconds: u64,
}

impl OpenAiCompatClient {
    pub fn new(config: &LlmConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        tracing::info!("Cleanup model configured: endpoint={}, model={}", endpoint, config.model);

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> DocsError {
        if err.is_timeout() {
            DocsError::Timeout {
                stage: Stage::Cleanup,
                seconds: self.timeout_seconds,
            }
        } else {
            DocsError::CleanupModel(err.to_string())
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
    async fn complete(&self, system: &str, user: &str) -> DocsResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocsError::CleanupModel(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| self.transport_error(e))?;
        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DocsError::CleanupModel("response contained no choices".to_string()))?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
