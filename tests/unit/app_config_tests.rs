/*!
 * Tests for application configuration
 */

use std::path::PathBuf;
use std::str::FromStr;

use doclingo::app_config::{CacheBackend, CacheConfig, Config, LogLevel, TranslationProvider};
use doclingo::translation::FailurePolicy;

fn offline_config() -> Config {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    config
}

/// Test the defaults a fresh config file is written with
#[test]
fn test_default_shouldUseDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_languages, vec!["fr", "es", "de"]);
    assert_eq!(config.documents_dir, PathBuf::from("content"));
    assert_eq!(config.output_dir, PathBuf::from("content/translated"));
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.common.rate_limit_delay_ms, 1000);
    assert_eq!(config.translation.common.failure_policy, FailurePolicy::Abort);
    assert_eq!(config.cache.backend, CacheBackend::Filesystem);
    assert_eq!(config.cache.prefix, "translations");
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that a minimal file picks up every default
#[test]
fn test_deserialize_withMinimalJson_shouldFillDefaults() {
    let json = r#"{
        "source_language": "en",
        "translation": { "provider": "ollama" }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_model(), "llama3.2:3b");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.get_timeout_secs(), 60);
    assert_eq!(config.target_languages, vec!["fr", "es", "de"]);
    assert!(config.translation.common.system_prompt.contains("{target_language}"));
    assert!(config.validate().is_ok());
}

/// Test the full set of options read from JSON
#[test]
fn test_deserialize_withFullJson_shouldReadEverySection() {
    let json = r#"{
        "source_language": "de",
        "target_languages": ["en", "pt-BR"],
        "documents_dir": "docs",
        "output_dir": "docs/out",
        "translation": {
            "provider": "anthropic",
            "available_providers": [
                { "type": "anthropic", "model": "claude-test", "api_key": "sk-ant", "timeout_secs": 5 }
            ],
            "common": {
                "temperature": 0.1,
                "max_tokens": 512,
                "rate_limit_delay_ms": 250,
                "failure_policy": "fallback_to_source"
            }
        },
        "cache": { "backend": "sqlite", "path": "cache.db", "prefix": "site" },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.translation.get_model(), "claude-test");
    assert_eq!(config.translation.get_api_key(), "sk-ant");
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
    assert_eq!(config.translation.get_timeout_secs(), 5);
    assert_eq!(config.translation.common.max_tokens, 512);
    assert_eq!(config.translation.common.failure_policy, FailurePolicy::FallbackToSource);
    assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    assert_eq!(config.cache.resolved_path().unwrap(), PathBuf::from("cache.db"));
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    assert!(config.validate().is_ok());
}

/// Test that a serialized config reads back the same
#[test]
fn test_serialize_thenDeserialize_shouldKeepValues() {
    let mut config = offline_config();
    config.target_languages = vec!["ja".to_string()];
    config.cache.backend = CacheBackend::Memory;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let restored: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.translation.provider, TranslationProvider::Mock);
    assert_eq!(restored.target_languages, vec!["ja"]);
    assert_eq!(restored.cache.backend, CacheBackend::Memory);
}

/// Test that hosted providers need an API key
#[test]
fn test_validate_withHostedProviderAndNoKey_shouldFail() {
    let config = Config::default();
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("API key"));

    let mut config = Config::default();
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

/// Test the remaining validation rules
#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = offline_config();
    config.source_language = "xx-invalid".to_string();
    assert!(config.validate().is_err());

    let mut config = offline_config();
    config.target_languages.clear();
    assert!(config.validate().is_err());

    let mut config = offline_config();
    config.target_languages.push("zz".to_string());
    assert!(config.validate().is_err());

    let mut config = offline_config();
    config.translation.common.temperature = 3.0;
    assert!(config.validate().is_err());

    let mut config = offline_config();
    config.translation.common.max_tokens = 0;
    assert!(config.validate().is_err());

    let mut config = offline_config();
    config.cache.backend = CacheBackend::Http;
    assert!(config.validate().is_err());
    config.cache.endpoint = "https://bucket.example.com".to_string();
    assert!(config.validate().is_ok());
}

/// Test that overriding a missing provider entry inserts one
#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldInsertDefaults() {
    let mut config = offline_config();
    let before = config.translation.available_providers.len();

    config.translation.active_provider_config_mut().model = "custom".to_string();

    assert_eq!(config.translation.available_providers.len(), before + 1);
    assert_eq!(config.translation.get_model(), "custom");
}

/// Test provider names in both directions
#[test]
fn test_translationProvider_fromStr_shouldAcceptLowercaseNames() {
    for provider in [
        TranslationProvider::OpenAI,
        TranslationProvider::Anthropic,
        TranslationProvider::Gemini,
        TranslationProvider::Ollama,
        TranslationProvider::LMStudio,
        TranslationProvider::Mock,
    ] {
        let name = provider.to_string();
        assert_eq!(TranslationProvider::from_str(&name).unwrap(), provider);
    }
    assert_eq!(TranslationProvider::from_str("OpenAI").unwrap(), TranslationProvider::OpenAI);
    assert!(TranslationProvider::from_str("bard").is_err());
}

/// Test the default cache location per backend
#[test]
fn test_cacheConfig_resolvedPath_withEmptyPath_shouldPickDefault() {
    let filesystem = CacheConfig::default();
    assert_eq!(filesystem.resolved_path().unwrap(), PathBuf::from(".doclingo-cache"));

    let sqlite = CacheConfig {
        backend: CacheBackend::Sqlite,
        ..Default::default()
    };
    assert!(sqlite.resolved_path().unwrap().ends_with("doclingo/cache.db"));
}
