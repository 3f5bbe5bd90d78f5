/*!
 * Single-segment translation through a completion provider.
 */

use log::{debug, warn};
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::language_utils::{get_language_name, language_codes_match};
use crate::providers::CompletionProvider;

use super::prompts::{PromptTemplate, TranslationPromptBuilder};
use super::sanitize::sanitize_translation;
use super::segmenter::strip_annotations;

/// Translates one segment at a time; the source language is passed through
#[derive(Debug, Clone)]
pub struct TranslationClient {
    /// Completion capability
    provider: Arc<dyn CompletionProvider>,
    /// Language the documents are authored in
    source_language: String,
    /// System prompt template
    template: PromptTemplate,
    /// Sampling temperature
    temperature: f32,
    /// Output-length ceiling
    max_tokens: u32,
}

impl TranslationClient {
    /// Create a client with the default prompt and sampling settings
    pub fn new(provider: Arc<dyn CompletionProvider>, source_language: &str) -> Self {
        Self {
            provider,
            source_language: source_language.to_string(),
            template: PromptTemplate::default(),
            temperature: 0.3,
            max_tokens: 8192,
        }
    }

    /// Create a client from application configuration
    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        let common = &config.translation.common;
        Self::new(provider, &config.source_language)
            .with_template(PromptTemplate::new(&common.system_prompt))
            .with_sampling(common.temperature, common.max_tokens)
    }

    /// Replace the system prompt template
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Replace the sampling settings
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Source language code
    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Whether a target language needs no external call
    pub fn is_pass_through(&self, target_language: &str) -> bool {
        language_codes_match(&self.source_language, target_language)
    }

    /// Source-language result: the text without annotation markup
    pub fn pass_through(text: &str) -> String {
        strip_annotations(text)
    }

    /// Translate a segment into `target_language`, honouring its context
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
        context: &str,
    ) -> Result<String, TranslationError> {
        if self.is_pass_through(target_language) {
            return Ok(Self::pass_through(text));
        }

        let request = TranslationPromptBuilder::new(
            self.template.clone(),
            &display_name(&self.source_language),
            &display_name(target_language),
        )
        .with_context(context)
        .with_sampling(self.temperature, self.max_tokens)
        .build_request(text.trim());

        let response = self.provider.complete(request).await?;
        debug!(
            "{} answered for {} (prompt tokens: {:?}, completion tokens: {:?})",
            self.provider.name(),
            target_language,
            response.prompt_tokens,
            response.completion_tokens
        );

        let raw = response.first_text().unwrap_or_default();
        let translated = sanitize_translation(raw);
        if translated.is_empty() {
            return Err(TranslationError::EmptyTranslation);
        }

        Ok(translated)
    }
}

/// Human-readable language name, or the code itself when unknown
fn display_name(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| {
        warn!("Unknown language code '{}', using it verbatim in the prompt", code);
        code.trim().to_string()
    })
}
