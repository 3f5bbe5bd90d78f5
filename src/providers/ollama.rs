use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse};
use crate::errors::ProviderError;

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name
    model: String,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl Ollama {
    /// Create a new Ollama client; `endpoint` may omit the scheme (`localhost:11434`)
    pub fn new(endpoint: &str, model: impl Into<String>, timeout_secs: u64) -> Result<Self, ProviderError> {
        let endpoint = endpoint.trim();
        let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid Ollama endpoint '{}': {}", endpoint, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| ProviderError::ConnectionError(format!("Invalid host in endpoint: {}", endpoint)))?;
        let port = url.port().unwrap_or(11434);

        Ok(Self {
            base_url: format!("{}://{}:{}", url.scheme(), host, port),
            client: super::http_client(timeout_secs)?,
            model: model.into(),
        })
    }

    /// Base URL including scheme and port
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert a provider-neutral request into a non-streaming chat request
    pub fn build_request(&self, request: CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: request.messages,
            options: Some(GenerationOptions {
                temperature: Some(request.temperature),
                num_predict: Some(request.max_tokens),
            }),
            stream: false,
        }
    }
}

#[async_trait]
impl CompletionProvider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_request(request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("Ollama", e))?;

        if !response.status().is_success() {
            return Err(super::status_error("Ollama", response).await);
        }

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Ollama: {}", e)))?;

        Ok(CompletionResponse {
            candidates: vec![parsed.message.content],
            prompt_tokens: parsed.prompt_eval_count,
            completion_tokens: parsed.eval_count,
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
