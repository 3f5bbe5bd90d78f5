/*!
 * Document translation pipeline.
 *
 * The pipeline is split into several submodules:
 *
 * - `document`: source documents and document-id validation
 * - `segmenter`: line-oriented segmentation with annotation context
 * - `fingerprint`: content-addressed segment fingerprints
 * - `cache`: cache store adapter over a blob store
 * - `prompts`: prompt templates and request building
 * - `sanitize`: cleanup of model output
 * - `client`: single-segment translation client
 * - `pipeline`: the orchestrator tying the pieces together
 */

// Re-export main types for easier usage
pub use self::cache::{CacheKey, CacheStats, TranslationCache};
pub use self::client::TranslationClient;
pub use self::document::SourceDocument;
pub use self::fingerprint::{Fingerprint, fingerprint};
pub use self::pipeline::{
    FailurePolicy, LanguageOutcome, LanguageStats, PipelineOptions, RunReport, SegmentFailure,
    TranslationPipeline,
};
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};
pub use self::sanitize::sanitize_translation;
pub use self::segmenter::{Segment, segment, strip_annotations};

// Submodules
pub mod cache;
pub mod client;
pub mod document;
pub mod fingerprint;
pub mod pipeline;
pub mod prompts;
pub mod sanitize;
pub mod segmenter;
