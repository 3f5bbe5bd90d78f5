/*!
 * Prompt templates for segment translation.
 */

use crate::providers::CompletionRequest;

/// System prompt template with `{source_language}` / `{target_language}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for document translation.
    pub const DOCUMENT_TRANSLATOR: &'static str = r#"You are a professional translator. Translate the user's text from {source_language} to {target_language}.
Preserve all markdown syntax, links, placeholders and line structure exactly as in the source.
Output only the translated text, without explanations, notes or code fences."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default document translator template.
    pub fn document_translator() -> Self {
        Self::new(Self::DOCUMENT_TRANSLATOR)
    }

    /// Render the template with human-readable language names.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::document_translator()
    }
}

/// Builder for the two-message request sent for one segment.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    template: PromptTemplate,
    source_language: String,
    target_language: String,
    context: String,
    temperature: f32,
    max_tokens: u32,
}

impl TranslationPromptBuilder {
    /// Start a prompt; languages are human-readable names
    pub fn new(template: PromptTemplate, source_language: &str, target_language: &str) -> Self {
        Self {
            template,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            context: String::new(),
            temperature: 0.3,
            max_tokens: 8192,
        }
    }

    /// Segment context, appended as an additional directive when non-empty
    pub fn with_context(mut self, context: &str) -> Self {
        self.context = context.trim().to_string();
        self
    }

    /// Sampling settings
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Render the system instruction
    pub fn build_system_prompt(&self) -> String {
        let mut prompt = self
            .template
            .render(&self.source_language, &self.target_language);
        if !self.context.is_empty() {
            prompt.push_str("\n\nAdditional instruction: ");
            prompt.push_str(&self.context);
        }
        prompt
    }

    /// Build the completion request for a segment
    pub fn build_request(&self, text: &str) -> CompletionRequest {
        CompletionRequest::new(self.build_system_prompt(), text)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
    }
}
