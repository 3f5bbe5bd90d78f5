/*!
 * # doclingo - chunked, cached document translation with AI
 *
 * A Rust library for translating annotated markdown documents with
 * language models, one line at a time, with every translated segment kept
 * in a content-addressed cache so re-runs only pay for what changed.
 *
 * ## Features
 *
 * - Line-oriented segmentation with `<!-- instruction -->` context carried forward
 * - SHA-256 fingerprints of `(context, text)` as cache keys
 * - Pluggable blob stores: memory, filesystem, SQLite, HTTP
 * - Translate segments using various AI providers:
 *   - OpenAI API (and LM Studio)
 *   - Anthropic API
 *   - Gemini API
 *   - Ollama (local LLM)
 * - Deterministic output cleanup and ordered reassembly
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The translation pipeline:
 *   - `translation::segmenter`: Document segmentation
 *   - `translation::fingerprint`: Segment fingerprints
 *   - `translation::cache`: Cache store adapter
 *   - `translation::client`: Single-segment translation client
 *   - `translation::pipeline`: Orchestrator
 * - `storage`: Blob store capability and backends
 * - `providers`: Completion capability and LLM provider clients
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod storage;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{BatchSummary, Controller, PairReport};
pub use errors::{AppError, InputError, ProviderError, StoreError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use providers::{CompletionProvider, CompletionRequest, CompletionResponse};
pub use storage::BlobStore;
pub use translation::{
    FailurePolicy, PipelineOptions, RunReport, Segment, SourceDocument, TranslationCache,
    TranslationClient, TranslationPipeline,
};
