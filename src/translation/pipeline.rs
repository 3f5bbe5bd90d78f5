/*!
 * Pipeline orchestrator for document translation.
 *
 * For each target language the orchestrator walks the document's segments in
 * source order: cache lookup, live translation on a miss, best-effort cache
 * write, then reassembly with one blank line between segments. Languages and
 * segments are processed strictly sequentially, with a fixed pause after each
 * live call to stay under provider rate limits.
 */

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::language_utils::{canonical_language_tag, language_codes_match};

use super::cache::TranslationCache;
use super::client::TranslationClient;
use super::document::SourceDocument;
use super::fingerprint::Fingerprint;
use super::segmenter::Segment;

/// Separator placed between translated segments
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// Default pause after each live translation call
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1000);

/// What to do when a segment cannot be translated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the language and report the failing segment
    #[default]
    Abort,
    /// Keep the source text for the segment and flag it as degraded
    FallbackToSource,
}

/// Run options for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Skip cache reads; cache writes still happen
    pub force_refresh: bool,
    /// Policy for segments that fail to translate
    pub failure_policy: FailurePolicy,
    /// Pause after each live translation call
    pub request_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            force_refresh: false,
            failure_policy: FailurePolicy::default(),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

impl PipelineOptions {
    /// Options taken from application configuration.
    pub fn from_config(config: &Config) -> Self {
        let common = &config.translation.common;
        Self {
            force_refresh: false,
            failure_policy: common.failure_policy,
            request_delay: Duration::from_millis(common.rate_limit_delay_ms),
        }
    }

    /// Enable or disable force refresh.
    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Set the pause after live calls.
    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }
}

/// Counters for one (document, language) pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageStats {
    /// Segments in the document
    pub total_segments: usize,
    /// Segments served from the cache
    pub cache_hits: usize,
    /// Segments translated by a live call
    pub translated: usize,
    /// Segments that fell back to source text
    pub degraded: usize,
    /// Segments that failed and stopped the pass
    pub failed: usize,
    /// Wall time of the pass
    pub elapsed: Duration,
}

/// A segment whose translation stopped its language pass
#[derive(Error, Debug)]
#[error(
    "Segment {index} (line {line}, fingerprint {fingerprint}) of '{document_id}' failed for '{language}': {error}"
)]
pub struct SegmentFailure {
    /// Document being translated
    pub document_id: String,
    /// Target language
    pub language: String,
    /// 0-based segment index
    pub index: usize,
    /// 1-based source line
    pub line: usize,
    /// Segment fingerprint
    pub fingerprint: Fingerprint,
    /// Underlying translation error
    #[source]
    pub error: TranslationError,
}

/// Result of one (document, language) pass
#[derive(Debug)]
pub struct LanguageOutcome {
    /// Target language
    pub language: String,
    /// Counters for the pass, partial when it failed
    pub stats: LanguageStats,
    /// Translated document or the failing segment
    pub output: Result<String, SegmentFailure>,
}

impl LanguageOutcome {
    /// Whether the pass produced a document
    pub fn is_success(&self) -> bool {
        self.output.is_ok()
    }
}

/// Outcomes for every language requested for one document
#[derive(Debug)]
pub struct RunReport {
    /// Document the report covers
    pub document_id: String,
    /// One outcome per distinct target language, in request order
    pub outcomes: Vec<LanguageOutcome>,
}

impl RunReport {
    /// Successfully translated documents by language
    pub fn translated_documents(&self) -> BTreeMap<String, String> {
        self.outcomes
            .iter()
            .filter_map(|o| o.output.as_ref().ok().map(|text| (o.language.clone(), text.clone())))
            .collect()
    }

    /// Whether every language succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(LanguageOutcome::is_success)
    }

    /// Failed languages
    pub fn failures(&self) -> impl Iterator<Item = &SegmentFailure> {
        self.outcomes.iter().filter_map(|o| o.output.as_ref().err())
    }

    /// Outcome for a language, if it was requested
    pub fn outcome(&self, language: &str) -> Option<&LanguageOutcome> {
        self.outcomes.iter().find(|o| o.language == language)
    }
}

/// Orchestrates segmentation, caching and translation of documents
#[derive(Debug, Clone)]
pub struct TranslationPipeline {
    client: TranslationClient,
    cache: TranslationCache,
    options: PipelineOptions,
}

impl TranslationPipeline {
    /// Create a pipeline
    pub fn new(client: TranslationClient, cache: TranslationCache, options: PipelineOptions) -> Self {
        Self {
            client,
            cache,
            options,
        }
    }

    /// Replace the run options
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run options
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Cache adapter
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Translation client
    pub fn client(&self) -> &TranslationClient {
        &self.client
    }

    /// Translate a document into each target language
    pub async fn run(&self, document: &SourceDocument, target_languages: &[String]) -> RunReport {
        self.run_with_progress(document, target_languages, |_, _, _| {}).await
    }

    /// Translate a document, reporting `(language, done, total)` after every segment
    pub async fn run_with_progress<F>(
        &self,
        document: &SourceDocument,
        target_languages: &[String],
        mut progress: F,
    ) -> RunReport
    where
        F: FnMut(&str, usize, usize),
    {
        let segments = document.segments();
        debug!("Document '{}' has {} segments", document.id(), segments.len());

        let mut outcomes = Vec::new();
        for language in distinct_languages(target_languages) {
            let outcome = self
                .translate_language(document.id(), &segments, &language, &mut progress)
                .await;
            outcomes.push(outcome);
        }

        RunReport {
            document_id: document.id().to_string(),
            outcomes,
        }
    }

    async fn translate_language<F>(
        &self,
        document_id: &str,
        segments: &[Segment],
        language: &str,
        progress: &mut F,
    ) -> LanguageOutcome
    where
        F: FnMut(&str, usize, usize),
    {
        let start = Instant::now();
        let total = segments.len();
        let pass_through = self.client.is_pass_through(language);
        let mut stats = LanguageStats {
            total_segments: total,
            ..Default::default()
        };
        let mut parts = Vec::with_capacity(total);

        for (index, segment) in segments.iter().enumerate() {
            if pass_through {
                parts.push(TranslationClient::pass_through(&segment.text));
                progress(language, index + 1, total);
                continue;
            }

            // Fence lines are structure, not prose
            if segment.is_fence() {
                parts.push(segment.text.clone());
                progress(language, index + 1, total);
                continue;
            }

            let fingerprint = segment.fingerprint();

            if !self.options.force_refresh {
                // Read failures are already logged by the cache and count as misses
                if let Ok(Some(cached)) = self.cache.get(document_id, language, &fingerprint).await {
                    stats.cache_hits += 1;
                    parts.push(reindent(segment, &cached));
                    progress(language, index + 1, total);
                    continue;
                }
            }

            match self
                .client
                .translate(&segment.text, language, &segment.context)
                .await
            {
                Ok(translated) => {
                    // Write failures are logged by the cache; the translation is still used
                    let _ = self
                        .cache
                        .put(document_id, language, &fingerprint, &translated)
                        .await;
                    stats.translated += 1;
                    parts.push(reindent(segment, &translated));
                }
                Err(error) => match self.options.failure_policy {
                    FailurePolicy::Abort => {
                        stats.failed += 1;
                        stats.elapsed = start.elapsed();
                        let failure = SegmentFailure {
                            document_id: document_id.to_string(),
                            language: language.to_string(),
                            index,
                            line: segment.line,
                            fingerprint,
                            error,
                        };
                        error!("{}", failure);
                        return LanguageOutcome {
                            language: language.to_string(),
                            stats,
                            output: Err(failure),
                        };
                    }
                    FailurePolicy::FallbackToSource => {
                        warn!(
                            "Keeping source text for segment {} (line {}) of '{}' in {}: {}",
                            index, segment.line, document_id, language, error
                        );
                        stats.degraded += 1;
                        parts.push(segment.text.clone());
                    }
                },
            }

            progress(language, index + 1, total);

            if !self.options.request_delay.is_zero() {
                tokio::time::sleep(self.options.request_delay).await;
            }
        }

        stats.elapsed = start.elapsed();
        info!(
            "{} [{}]: {} segments, {} cached, {} translated, {} degraded in {:.1?}",
            document_id,
            language,
            stats.total_segments,
            stats.cache_hits,
            stats.translated,
            stats.degraded,
            stats.elapsed
        );

        LanguageOutcome {
            language: language.to_string(),
            stats,
            output: Ok(parts.join(SEGMENT_SEPARATOR)),
        }
    }
}

/// Trimmed, non-empty languages with equivalent codes removed, first wins
///
/// Known codes are spelled canonically so `FR` and `fr` share cache entries.
pub fn distinct_languages(languages: &[String]) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::new();
    for language in languages.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        if !distinct.iter().any(|seen| language_codes_match(seen, language)) {
            distinct.push(canonical_language_tag(language).unwrap_or_else(|_| language.to_string()));
        }
    }
    distinct
}

/// Restore the source line's indentation on translated text
fn reindent(segment: &Segment, translated: &str) -> String {
    let indentation = segment.indentation();
    if indentation.is_empty() || translated.starts_with(indentation) {
        translated.to_string()
    } else {
        format!("{}{}", indentation, translated.trim_start())
    }
}
