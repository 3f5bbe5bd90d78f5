use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::errors::ProviderError;

/// Gemini client for the `generateContent` API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key, sent as the `x-goog-api-key` header
    api_key: String,
    /// API base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`
    endpoint: String,
    /// Model name
    model: String,
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns
    contents: Vec<GeminiContent>,
    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    /// Sampling settings
    generation_config: GenerationConfig,
}

/// One turn of content
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GeminiContent {
    /// `user` or `model`; absent for system instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text parts
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Single text part
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Text content
    #[serde(default)]
    pub text: String,
}

/// Sampling settings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature for generation
    temperature: f32,
    /// Maximum number of tokens to generate
    max_output_tokens: u32,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Candidate completions
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Token usage information
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

/// Individual candidate
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    /// Generated content; missing when the candidate was blocked
    #[serde(default)]
    pub content: Option<GeminiContent>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_token_count: Option<u64>,
    /// Number of candidate tokens
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
}

impl Gemini {
    /// Create a new Gemini client
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

    /// Full URL of the generateContent endpoint for the configured model
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    /// Convert a provider-neutral request into the API body
    pub fn build_request(&self, request: CompletionRequest) -> GeminiRequest {
        let system_instruction = request.system_text().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text }],
        });

        let contents = request
            .conversation()
            .map(|m| GeminiContent {
                // Gemini calls the assistant role "model"
                role: Some(if m.role == "assistant" { "model".to_string() } else { m.role.clone() }),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    /// Extract candidates from an API response
    pub fn into_completion(response: GeminiResponse) -> CompletionResponse {
        CompletionResponse {
            candidates: response
                .candidates
                .into_iter()
                .map(|candidate| {
                    candidate
                        .content
                        .map(|content| content.parts.into_iter().map(|p| p.text).collect::<String>())
                        .unwrap_or_default()
                })
                .collect(),
            prompt_tokens: response.usage_metadata.as_ref().and_then(|u| u.prompt_token_count),
            completion_tokens: response
                .usage_metadata
                .as_ref()
                .and_then(|u| u.candidates_token_count),
        }
    }
}

#[async_trait]
impl CompletionProvider for Gemini {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("Gemini", e))?;

        if !response.status().is_success() {
            return Err(super::status_error("Gemini", response).await);
        }

        let parsed = response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Gemini: {}", e)))?;

        Ok(Self::into_completion(parsed))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
