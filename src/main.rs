// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::process::ExitCode;

use doclingo::Controller;
use doclingo::app_config::{self, Config, TranslationProvider};
use doclingo::translation::FailurePolicy;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Gemini,
    Ollama,
    #[value(name = "lmstudio")]
    LMStudio,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate documents into one or more languages
    Translate(TranslateArgs),

    /// Print the segments of a document without translating anything
    Segment {
        /// Document id (file name without `.md`)
        #[arg(value_name = "DOC_ID")]
        document_id: String,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for doclingo
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Document ids to translate, or `all`
    #[arg(value_name = "DOC_ID", default_value = "all")]
    documents: Vec<String>,

    /// Target language codes, or `all` for the configured list
    #[arg(short = 'l', long = "language", value_name = "LANG", default_value = "all")]
    languages: Vec<String>,

    /// Skip cache reads; translations are still written to the cache
    #[arg(long)]
    no_cache: bool,

    /// Keep the source text for segments that fail instead of failing the language
    #[arg(long)]
    fallback_to_source: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the selected provider
    #[arg(long, env = "DOCLINGO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doclingo - chunked, cached document translation with AI
#[derive(Parser, Debug)]
#[command(name = "doclingo")]
#[command(version)]
#[command(about = "AI-powered markdown document translation with a segment cache")]
#[command(long_about = "doclingo splits markdown documents into line segments, translates each
segment with an AI provider and caches every translated segment, so re-runs
only translate what changed.

EXAMPLES:
    doclingo translate                          # All documents, all configured languages
    doclingo translate menu -l fr -l de         # One document, two languages
    doclingo translate menu --no-cache          # Re-translate, refreshing the cache
    doclingo translate -p ollama -m llama3.2:3b # Use a specific provider and model
    doclingo segment menu                       # Inspect segments and fingerprints
    doclingo completions bash > doclingo.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

ANNOTATIONS:
    A line holding only <!-- instruction --> sets the instruction passed to the
    model for every following line, until the next annotation.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself lets everything through; log::set_max_level filters
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doclingo", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Segment {
            document_id,
            config_path,
        } => run_segment(&document_id, &config_path),
        Commands::Translate(args) => run_translate(args).await,
    }
}

/// Load the configuration file, creating it with defaults when missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?;
        Ok(config)
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
    }
}

fn run_segment(document_id: &str, config_path: &str) -> Result<ExitCode> {
    let config = load_or_create_config(config_path)?;
    log::set_max_level(config.log_level.to_level_filter());

    let document = doclingo::file_utils::FileManager::read_document(&config.documents_dir, document_id)?;
    for (index, segment) in document.segments().iter().enumerate() {
        println!(
            "{:>4}  line {:<4} {}  [{}]  {}",
            index,
            segment.line,
            segment.fingerprint(),
            segment.context,
            segment.text
        );
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_translate(options: TranslateArgs) -> Result<ExitCode> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.active_provider_config_mut().api_key = api_key.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if options.fallback_to_source {
        config.translation.common.failure_policy = FailurePolicy::FallbackToSource;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?.with_force_refresh(options.no_cache);
    let summary = controller.run(&options.documents, &options.languages).await?;

    for pair in &summary.pairs {
        println!("{}", pair);
    }

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
