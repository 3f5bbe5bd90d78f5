use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::{self, CompletionProvider};
use crate::storage::{self, BlobStore};
use crate::translation::document::validate_document_id;
use crate::translation::pipeline::distinct_languages;
use crate::translation::{
    FailurePolicy, LanguageStats, PipelineOptions, RunReport, SourceDocument, TranslationCache,
    TranslationClient, TranslationPipeline,
};

// @module: Application controller for document translation

/// Selector that expands to every document or every configured language
pub const ALL: &str = "all";

/// Result of one (document, language) pair
#[derive(Debug, Clone)]
pub struct PairReport {
    /// Document id
    pub document_id: String,
    /// Target language
    pub language: String,
    /// Segment counters, partial when the pair failed
    pub stats: LanguageStats,
    /// Written translation, when the pair succeeded
    pub output_path: Option<PathBuf>,
    /// Failure description, when the pair failed
    pub error: Option<String>,
}

impl PairReport {
    /// Whether a translated document was written
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    fn failed(document_id: &str, language: &str, stats: LanguageStats, error: String) -> Self {
        Self {
            document_id: document_id.to_string(),
            language: language.to_string(),
            stats,
            output_path: None,
            error: Some(error),
        }
    }
}

impl fmt::Display for PairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} cached / {} translated / {} degraded / {} failed",
            self.document_id,
            self.language,
            self.stats.cache_hits,
            self.stats.translated,
            self.stats.degraded,
            self.stats.failed
        )?;
        match (&self.output_path, &self.error) {
            (_, Some(error)) => write!(f, " - FAILED: {}", error),
            (Some(path), None) => write!(f, " -> {}", path.display()),
            (None, None) => Ok(()),
        }
    }
}

/// Outcome of a whole batch
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// One report per (document, language) pair, in processing order
    pub pairs: Vec<PairReport>,
    /// Wall time of the batch
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Whether every pair succeeded
    pub fn is_success(&self) -> bool {
        self.pairs.iter().all(PairReport::is_success)
    }

    /// Number of failed pairs
    pub fn failed_count(&self) -> usize {
        self.pairs.iter().filter(|p| !p.is_success()).count()
    }

    /// Report for one pair
    pub fn pair(&self, document_id: &str, language: &str) -> Option<&PairReport> {
        self.pairs
            .iter()
            .find(|p| p.document_id == document_id && p.language == language)
    }
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translation pipeline built from the configuration
    pipeline: TranslationPipeline,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = providers::from_config(&config.translation).context("Failed to create translation provider")?;
        let store = storage::from_config(&config.cache).context("Failed to open translation cache")?;
        let options = PipelineOptions::from_config(&config);

        Ok(Self::with_components(config, provider, store, options))
    }

    // @method: Create a controller around injected capabilities
    pub fn with_components(
        config: Config,
        provider: Arc<dyn CompletionProvider>,
        store: Arc<dyn BlobStore>,
        options: PipelineOptions,
    ) -> Self {
        let client = TranslationClient::from_config(provider, &config);
        let cache = TranslationCache::with_prefix(store, &config.cache.prefix);
        let pipeline = TranslationPipeline::new(client, cache, options);

        Self { config, pipeline }
    }

    /// Skip cache reads for this controller's runs
    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        let options = self.pipeline.options().clone().with_force_refresh(force_refresh);
        self.pipeline = self.pipeline.with_options(options);
        self
    }

    /// Override the configured failure policy
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        let options = self.pipeline.options().clone().with_failure_policy(failure_policy);
        self.pipeline = self.pipeline.with_options(options);
        self
    }

    /// App configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Underlying pipeline
    pub fn pipeline(&self) -> &TranslationPipeline {
        &self.pipeline
    }

    /// Expand a document selection; an empty selection or `all` means every document
    pub fn resolve_documents(&self, selection: &[String]) -> Result<Vec<String>> {
        if selection.is_empty() || selection.iter().any(|s| s.trim().eq_ignore_ascii_case(ALL)) {
            let ids = FileManager::find_documents(&self.config.documents_dir)?;
            if ids.is_empty() {
                return Err(anyhow!("No documents found in {:?}", self.config.documents_dir));
            }
            return Ok(ids);
        }

        let mut ids: Vec<String> = Vec::new();
        for id in selection.iter().map(|s| s.trim()) {
            validate_document_id(id)?;
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Expand a language selection; an empty selection or `all` means the configured targets
    pub fn resolve_languages(&self, selection: &[String]) -> Result<Vec<String>> {
        let requested = if selection.is_empty() || selection.iter().any(|s| s.trim().eq_ignore_ascii_case(ALL)) {
            self.config.target_languages.clone()
        } else {
            selection.to_vec()
        };

        let languages = distinct_languages(&requested);
        for language in &languages {
            language_utils::validate_language_code(language)
                .with_context(|| format!("Unsupported target language '{}'", language))?;
        }
        if languages.is_empty() {
            return Err(anyhow!("No target languages selected"));
        }
        Ok(languages)
    }

    /// Load a document by id
    pub fn load_document(&self, document_id: &str) -> Result<SourceDocument> {
        FileManager::read_document(&self.config.documents_dir, document_id)
    }

    /// Translate the selected documents into the selected languages and write the results
    pub async fn run(&self, documents: &[String], languages: &[String]) -> Result<BatchSummary> {
        let start_time = Instant::now();

        let document_ids = self.resolve_documents(documents)?;
        let languages = self.resolve_languages(languages)?;
        FileManager::ensure_dir(&self.config.output_dir)?;

        info!(
            "🚀 doclingo: {} - {} ({} document(s), {} language(s))",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            document_ids.len(),
            languages.len()
        );

        let multi_progress = MultiProgress::new();
        let mut pairs = Vec::new();

        for document_id in &document_ids {
            let document = match self.load_document(document_id) {
                Ok(document) => document,
                Err(e) => {
                    error!("Error loading document {}: {:#}", document_id, e);
                    pairs.extend(
                        languages
                            .iter()
                            .map(|language| PairReport::failed(document_id, language, LanguageStats::default(), format!("{:#}", e))),
                    );
                    continue;
                }
            };

            let report = self.translate_document(&document, &languages, &multi_progress).await;
            pairs.extend(self.write_outputs(report));
        }

        let summary = BatchSummary {
            pairs,
            elapsed: start_time.elapsed(),
        };

        info!(
            "Batch completed: {} pair(s), {} failed in {}",
            summary.pairs.len(),
            summary.failed_count(),
            Self::format_duration(summary.elapsed)
        );

        Ok(summary)
    }

    /// Run the pipeline for one document with a progress bar
    async fn translate_document(
        &self,
        document: &SourceDocument,
        languages: &[String],
        multi_progress: &MultiProgress,
    ) -> RunReport {
        let segment_count = document.segments().len();
        let progress_bar = multi_progress.add(ProgressBar::new((segment_count * languages.len()) as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message(document.id().to_string());

        let pb = progress_bar.clone();
        let document_id = document.id().to_string();
        let report = self
            .pipeline
            .run_with_progress(document, languages, move |language, done, total| {
                let offset = languages.iter().position(|l| l == language).unwrap_or(0) * total;
                pb.set_position((offset + done) as u64);
                pb.set_message(format!("{} [{}]", document_id, language));
            })
            .await;

        progress_bar.finish_and_clear();
        report
    }

    /// Write successful outcomes to disk and turn every outcome into a pair report
    fn write_outputs(&self, report: RunReport) -> Vec<PairReport> {
        let document_id = report.document_id;

        report
            .outcomes
            .into_iter()
            .map(|outcome| match outcome.output {
                Ok(text) => {
                    let path = FileManager::generate_output_path(&self.config.output_dir, &document_id, &outcome.language);
                    let content = if text.is_empty() { text } else { format!("{}\n", text) };
                    match FileManager::write_to_file(&path, &content) {
                        Ok(()) => PairReport {
                            document_id: document_id.clone(),
                            language: outcome.language,
                            stats: outcome.stats,
                            output_path: Some(path),
                            error: None,
                        },
                        Err(e) => {
                            error!("Error writing {}: {:#}", path.display(), e);
                            PairReport::failed(&document_id, &outcome.language, outcome.stats, format!("{:#}", e))
                        }
                    }
                }
                Err(failure) => PairReport::failed(&document_id, &outcome.language, outcome.stats, failure.to_string()),
            })
            .collect()
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
