//! OpenAI chat-completions adapter.
//!
//! Works with any endpoint speaking the OpenAI chat-completions protocol,
//! so `base_url` can point at a compatible gateway. Retryable failures
//! (rate limits, 5xx, network, timeouts) are retried with exponential
//! backoff up to `max_retries` times.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole, ProviderInfo,
    TokenUsage,
};

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// First backoff delay; doubles on each retry.
    pub retry_base_delay: Duration,
}

impl OpenAIConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base_delay.saturating_mul(1u32 << attempt.min(10))
    }
}

pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> ChatRequest {
        let system = request
            .system_prompt
            .iter()
            .map(|prompt| ChatMessage {
                role: "system",
                content: prompt.clone(),
            });
        let rest = request.messages.iter().map(|msg| ChatMessage {
            role: match msg.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            },
            content: msg.content.clone(),
        });

        ChatRequest {
            model: self.config.model.clone(),
            messages: system.chain(rest).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_response.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        self.client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.to_wire_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    async fn check_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => AIError::AuthenticationFailed,
            429 => AIError::rate_limited(parse_retry_after(&body)),
            400 if body.contains("context_length_exceeded") || body.contains("maximum context length") => {
                AIError::ContextTooLong { tokens: 0, max: 0 }
            }
            400 => AIError::InvalidRequest(body),
            500..=599 => AIError::unavailable(format!("Server error {}: {}", status, body)),
            _ => AIError::network(format!("Unexpected status {}: {}", status, body)),
        })
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = Self::check_status(self.send(request).await?).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;
        body.into_completion()
    }
}

/// Reads "try again in Ns" out of an OpenAI rate-limit message.
fn parse_retry_after(body: &str) -> u32 {
    const DEFAULT: u32 = 30;
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string));
    let Some(message) = message else {
        return DEFAULT;
    };
    let Some(idx) = message.find("try again in ") else {
        return DEFAULT;
    };
    let digits: String = message[idx + "try again in ".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(DEFAULT)
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut attempt = 0;
        loop {
            match self.attempt(&request).await {
                Ok(completion) => {
                    tracing::debug!(
                        purpose = %request.metadata.purpose,
                        trace_id = %request.metadata.trace_id,
                        tokens = completion.usage.total_tokens,
                        "AI completion finished"
                    );
                    return Ok(completion);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    tracing::warn!(
                        error = %err,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "AI completion failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", self.config.model.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatResponse {
    fn into_completion(self) -> Result<CompletionResponse, AIError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No choices in response"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => {
                return Err(AIError::content_filtered("Response was filtered by the provider"))
            }
            _ => FinishReason::Stop,
        };

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AIError::parse("Empty completion"))?;

        Ok(CompletionResponse {
            content,
            usage: self
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
                .unwrap_or_default(),
            model: self.model,
            finish_reason,
        })
    }
}
