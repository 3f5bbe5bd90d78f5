use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse};
use crate::errors::ProviderError;

/// OpenAI client for the chat completions API
///
/// Also used for LM Studio, which serves the same API locally.
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication (may be empty for local servers)
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model name
    model: String,
}

/// Chat completions request body
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,
    /// The messages for the conversation
    messages: Vec<ChatMessage>,
    /// Temperature for generation
    temperature: f32,
    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Completion choices
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Individual completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// Generated message
    pub message: OpenAIMessage,
}

/// Message inside a choice; content is null for refusals and tool calls
#[derive(Debug, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the author
    pub role: String,
    /// Generated text
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u64,
    /// Number of completion tokens
    pub completion_tokens: u64,
}

impl OpenAI {
    /// Create a new OpenAI-compatible client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: super::http_client(timeout_secs)?,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }

    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Convert a provider-neutral request into the API body
    pub fn build_request(&self, request: CompletionRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Extract candidates from an API response
    pub fn into_completion(response: OpenAIResponse) -> CompletionResponse {
        CompletionResponse {
            candidates: response
                .choices
                .into_iter()
                .map(|c| c.message.content.unwrap_or_default())
                .collect(),
            prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAI {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let body = self.build_request(request);

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("OpenAI", e))?;

        if !response.status().is_success() {
            return Err(super::status_error("OpenAI", response).await);
        }

        let parsed = response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("OpenAI: {}", e)))?;

        Ok(Self::into_completion(parsed))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
