//! OpenAI-compatible provider implementation for Helpdesk
//!
//! Talks to any endpoint implementing the `/chat/completions` API: OpenAI
//! itself, Groq, vLLM, LiteLLM and similar gateways.

use crate::config::OpenAiConfig;
use crate::error::{HelpdeskError, Result};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible chat completions provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl OpenAiProvider {
    /// Create a provider reading the API key from `config.api_key_env`
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::Config` when the environment variable is unset
    /// or empty.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                HelpdeskError::Config(format!(
                    "Missing API key: set the {} environment variable",
                    config.api_key_env
                ))
            })?;
        Self::with_api_key(config, api_key)
    }

    /// Create a provider with an explicit API key
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::config::OpenAiConfig;
    /// use helpdesk::providers::OpenAiProvider;
    ///
    /// let provider = OpenAiProvider::with_api_key(OpenAiConfig::default(), "sk-test");
    /// assert!(provider.is_ok());
    /// ```
    pub fn with_api_key(config: OpenAiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("helpdesk/0.1.0")
            .build()
            .map_err(|e| HelpdeskError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized OpenAI-compatible provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        tracing::debug!(
            "Sending chat completion request: {} messages, model={}",
            messages.len(),
            self.config.model
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat completion request failed: {}", e);
                HelpdeskError::Provider(format!("Chat completion request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Completion endpoint returned error {}: {}", status, error_text);
            return Err(HelpdeskError::Provider(format!(
                "Completion endpoint returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse chat completion response: {}", e);
            HelpdeskError::Provider(format!("Failed to parse chat completion response: {}", e))
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                HelpdeskError::Provider("Completion response contained no choices".to_string())
            })?;

        let message = Message::assistant(content);
        Ok(match chat.usage {
            Some(usage) => CompletionResponse::with_usage(
                message,
                TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
            ),
            None => CompletionResponse::new(message),
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}
