use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::storage::SqliteBlobStore;
use crate::translation::pipeline::FailurePolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language the documents are authored in (ISO)
    pub source_language: String,

    /// Languages selected by `all`
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Directory holding the `<id>.md` source documents
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// Directory receiving `<id>.<lang>.md` translations
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Translation config
    pub translation: TranslationConfig,

    /// Segment cache config
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI chat completions
    #[default]
    OpenAI,
    // @provider: Anthropic messages API
    Anthropic,
    // @provider: Google Gemini generateContent
    Gemini,
    // @provider: Ollama local server
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
    // @provider: Offline echo provider for dry runs
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Gemini => "gemini".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }

    // @returns: Whether requests must carry an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic | Self::Gemini)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output-length ceiling for a single segment, in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Delay in milliseconds after every live translation call
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// What to do when a segment cannot be translated
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Blob store backend for the segment cache
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Nothing survives the process
    Memory,
    /// Directory of `<fingerprint>.md` files
    #[default]
    Filesystem,
    /// Single SQLite file
    Sqlite,
    /// Remote bucket over HTTP
    Http,
}

/// Segment cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Backend holding the cached segments
    #[serde(default)]
    pub backend: CacheBackend,

    /// First component of every cache key
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,

    /// Root directory (filesystem) or database file (sqlite); empty picks a default
    #[serde(default)]
    pub path: String,

    /// Bucket base URL (http)
    #[serde(default)]
    pub endpoint: String,

    /// Bearer token (http)
    #[serde(default)]
    pub token: String,

    /// Request timeout in seconds (http)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            prefix: default_cache_prefix(),
            path: String::new(),
            endpoint: String::new(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CacheConfig {
    /// Location used by the filesystem and sqlite backends
    pub fn resolved_path(&self) -> std::result::Result<PathBuf, crate::errors::StoreError> {
        if !self.path.trim().is_empty() {
            return Ok(PathBuf::from(self.path.trim()));
        }

        match self.backend {
            CacheBackend::Sqlite => SqliteBlobStore::default_database_path(),
            _ => Ok(PathBuf::from(DEFAULT_CACHE_DIR)),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Default cache directory for the filesystem backend
const DEFAULT_CACHE_DIR: &str = ".doclingo-cache";

fn default_target_languages() -> Vec<String> {
    vec!["fr".to_string(), "es".to_string(), "de".to_string()]
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("content/translated")
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_rate_limit_delay_ms() -> u64 {
    1000 // one live call per second
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_cache_prefix() -> String {
    "translations".to_string()
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::OpenAI => "gpt-4o-mini",
        TranslationProvider::Anthropic => "claude-3-5-haiku-latest",
        TranslationProvider::Gemini => "gemini-1.5-flash",
        TranslationProvider::Ollama => "llama3.2:3b",
        // Placeholder; users should set to the loaded model name in LM Studio
        TranslationProvider::LMStudio => "local-model",
        TranslationProvider::Mock => "echo",
    }
    .to_string()
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::OpenAI => "https://api.openai.com/v1",
        TranslationProvider::Anthropic => "https://api.anthropic.com",
        TranslationProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        TranslationProvider::Ollama => "http://localhost:11434",
        TranslationProvider::LMStudio => "http://localhost:1234/v1",
        TranslationProvider::Mock => "",
    }
    .to_string()
}

fn default_system_prompt() -> String {
    crate::translation::prompts::PromptTemplate::DOCUMENT_TRANSLATOR.to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.source_language)?;

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for language in &self.target_languages {
            crate::language_utils::get_language_name(language)?;
        }

        let provider = &self.translation.provider;
        if provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider",
                provider.display_name()
            ));
        }

        let common = &self.translation.common;
        if !(0.0..=2.0).contains(&common.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", common.temperature));
        }
        if common.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be greater than zero"));
        }

        if self.cache.backend == CacheBackend::Http && self.cache.endpoint.trim().is_empty() {
            return Err(anyhow!("Cache endpoint is required for the http backend"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_languages: default_target_languages(),
            documents_dir: default_documents_dir(),
            output_dir: default_output_dir(),
            translation: TranslationConfig::default(),
            cache: CacheConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a mutable provider configuration, inserting the defaults if missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers
                    .push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model(&self.provider))
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_endpoint(&self.provider))
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: [
                TranslationProvider::OpenAI,
                TranslationProvider::Anthropic,
                TranslationProvider::Gemini,
                TranslationProvider::Ollama,
                TranslationProvider::LMStudio,
            ]
            .into_iter()
            .map(ProviderConfig::new)
            .collect(),
            common: TranslationCommonConfig::default(),
        }
    }
}
