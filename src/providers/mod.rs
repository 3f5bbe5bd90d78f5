/*!
 * Provider implementations for the language-model completion capability.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI API integration (also serves LM Studio)
 * - Anthropic: Anthropic API integration
 * - Gemini: Google Generative Language API integration
 * - Ollama: Local LLM server
 * - Mock: scripted provider for tests and offline dry runs
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod openai;

/// Role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// System instruction message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// User content message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Whether this is a system message
    pub fn is_system(&self) -> bool {
        self.role == "system"
    }
}

/// Provider-neutral completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Ordered conversation, system instruction first
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Output-length ceiling in tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request from a system instruction and a user prompt
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: 0.3,
            max_tokens: 8192,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output-length ceiling
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Concatenated system instructions, for APIs that take them separately
    pub fn system_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.is_system())
            .map(|m| m.content.as_str())
            .collect();

        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }

    /// All non-system messages
    pub fn conversation(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| !m.is_system())
    }
}

/// Provider-neutral completion response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    /// Candidate completions in provider order
    pub candidates: Vec<String>,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the provider
    pub completion_tokens: Option<u64>,
}

impl CompletionResponse {
    /// Response with a single candidate
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![text.into()],
            ..Default::default()
        }
    }

    /// Text of the first candidate, if any
    pub fn first_text(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }
}

/// Common trait for all LLM providers
///
/// This is the only seam between the pipeline and a language model, so
/// tests can substitute a deterministic fake.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Short provider name for log lines
    fn name(&self) -> &str;
}

/// Build the provider selected by the translation configuration
pub fn from_config(config: &TranslationConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    let model = config.get_model();
    let endpoint = config.get_endpoint();
    let api_key = config.get_api_key();
    let timeout_secs = config.get_timeout_secs();

    let provider: Arc<dyn CompletionProvider> = match config.provider {
        TranslationProvider::OpenAI | TranslationProvider::LMStudio => {
            Arc::new(openai::OpenAI::new(api_key, endpoint, model, timeout_secs)?)
        }
        TranslationProvider::Anthropic => {
            Arc::new(anthropic::Anthropic::new(api_key, endpoint, model, timeout_secs)?)
        }
        TranslationProvider::Gemini => {
            Arc::new(gemini::Gemini::new(api_key, endpoint, model, timeout_secs)?)
        }
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new(&endpoint, model, timeout_secs)?),
        TranslationProvider::Mock => Arc::new(mock::MockProvider::echo()),
    };

    Ok(provider)
}

/// Build the shared HTTP client used by the remote providers
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))
}

/// Read a non-success response body and classify it
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("{} API error ({}): {}", provider, status, error_text);
    ProviderError::from_status(status.as_u16(), error_text)
}
