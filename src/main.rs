// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::PathBuf;

use vertimas::app_config::{self, Config};
use vertimas::language_utils::{Direction, get_language_name};
use vertimas::translation::quality::metrics::score_pair;
use vertimas::translation::quality::{EmbeddingBertScorer, HashedEmbedder, SelectionStrategy};
use vertimas::translation::{SelectionResult, TranslationService};

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

/// CLI Wrapper for the selection strategy
#[derive(Debug, Clone, ValueEnum)]
enum CliStrategy {
    Hybrid,
    Bleu,
    Longest,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate text with every model and keep the best candidate
    Translate(TranslateArgs),

    /// Score a hypothesis against a reference with BLEU, chrF and BERTScore
    Score {
        /// Hypothesis text
        hypothesis: String,

        /// Reference text
        reference: String,

        /// Language of both texts
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// List registered models and the directions they serve
    Models {
        /// Also ask every model server whether it is reachable
        #[arg(long)]
        check: bool,
    },

    /// Generate shell completions for vertimas
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Text to translate
    #[arg(value_name = "TEXT", required_unless_present = "file")]
    text: Option<String>,

    /// Translate a text file paragraph by paragraph instead
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Write the translation to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language code (e.g., 'lt', 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'lt', 'en')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Direction as "source-target", e.g. "lt-en"
    #[arg(short, long, conflicts_with_all = ["source_language", "target_language"])]
    direction: Option<String>,

    /// Selection strategy, overrides the configuration
    #[arg(long, value_enum)]
    strategy: Option<CliStrategy>,

    /// Print the full result (all candidates and scores) as JSON
    #[arg(long)]
    json: bool,
}

/// vertimas - multi-model Lithuanian/English translation
///
/// Translates with every configured model, translates each candidate back,
/// and keeps the candidate whose round trip best matches the source.
#[derive(Parser, Debug)]
#[command(name = "vertimas")]
#[command(version)]
#[command(about = "Multi-model translation with round-trip candidate selection")]
#[command(long_about = "vertimas translates text with every model serving the requested direction, \
translates each candidate back into the source language and picks the candidate whose round trip \
scores best on BLEU, BERTScore and chrF.

EXAMPLES:
    vertimas translate \"Labas vakaras, kaip sekasi?\"       # Default direction from config
    vertimas translate -d en-lt \"Good evening\"             # Explicit direction
    vertimas translate --file letter.txt -o letter.en.txt  # Paragraph by paragraph
    vertimas translate --strategy bleu --json \"Ačiū\"        # BLEU-only selection, JSON output
    vertimas score \"Good evening\" \"Good evening!\"           # Metric scores for a pair
    vertimas models --check                                # List models and check servers
    vertimas completions bash > vertimas.bash              # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "✗"),
            Level::Warn => ("1;33", "!"),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "·"),
            Level::Trace => ("1;35", "…"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("vertimas")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logger starts at trace; the effective level is capped by set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "vertimas", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;

    let result = match cli.command {
        Commands::Translate(args) => run_translate(args, &config).await,
        Commands::Score {
            hypothesis,
            reference,
            lang,
        } => run_score(&hypothesis, &reference, &lang, &config).await,
        Commands::Models { check } => run_models(check, &config).await,
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn resolve_direction(args: &TranslateArgs, config: &Config) -> Result<Direction> {
    if let Some(direction) = &args.direction {
        return Ok(direction.parse::<Direction>()?);
    }

    let source = args.source_language.as_deref().unwrap_or(&config.source_language);
    let target = args.target_language.as_deref().unwrap_or(&config.target_language);
    Ok(Direction::new(source, target))
}

fn print_result(result: &SelectionResult) {
    println!("{}", result.best_text);
    info!("Chosen model: {}", result.best_backend_id);
    for candidate in &result.scores {
        info!(
            "  {:<16} hybrid {:>6.2}  bleu {:>6.2}  bert {:.4}  chrf {:>6.2}  {}",
            candidate.backend_id,
            candidate.scores.hybrid,
            candidate.scores.bleu,
            candidate.scores.bert_f1,
            candidate.scores.chrf,
            candidate.text
        );
    }
}

async fn run_translate(args: TranslateArgs, config: &Config) -> Result<()> {
    let direction = resolve_direction(&args, config)?;
    let source_name = get_language_name(direction.source()).unwrap_or_else(|_| direction.source().to_string());
    let target_name = get_language_name(direction.target()).unwrap_or_else(|_| direction.target().to_string());
    info!("Translating {} -> {}", source_name, target_name);

    let mut service = TranslationService::from_config(config)?;
    if let Some(strategy) = args.strategy {
        service = service.with_strategy(match strategy {
            CliStrategy::Hybrid => SelectionStrategy::Hybrid(config.evaluation.weights),
            CliStrategy::Bleu => SelectionStrategy::BleuOnly,
            CliStrategy::Longest => SelectionStrategy::Longest,
        });
    }

    let translated = if let Some(path) = &args.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;

        let total = text.lines().filter(|l| !l.trim().is_empty()).count();
        let progress_bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let result = service
            .translate_paragraphs(&text, &direction, |done, _| progress_bar.set_position(done as u64))
            .await;
        progress_bar.finish_and_clear();
        let result = result?;

        let degraded = result.degraded_count();
        if degraded > 0 {
            info!("{} paragraph(s) used the longest-candidate fallback", degraded);
        }

        if args.json {
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        } else {
            result.text
        }
    } else {
        let text = args.text.as_deref().unwrap_or_default();
        let result = service.translate_direction(text, &direction).await?;

        if args.json {
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        } else {
            if args.output.is_none() {
                print_result(&result);
                return Ok(());
            }
            result.best_text
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, translated)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!("Success: {}", path.display());
        }
        None => println!("{}", translated),
    }

    Ok(())
}

async fn run_score(hypothesis: &str, reference: &str, lang: &str, config: &Config) -> Result<()> {
    let scorer = EmbeddingBertScorer::new(HashedEmbedder::new(config.evaluation.embedding_dim));
    let (bundle, bert_error) =
        score_pair(&scorer, hypothesis, reference, lang, &config.evaluation.weights).await;

    if let Some(e) = bert_error {
        error!("BERTScore unavailable, counted as 0: {}", e);
    }

    println!("BLEU:      {:>7.2}", bundle.bleu);
    println!("chrF:      {:>7.2}", bundle.chrf);
    println!("BERT F1:   {:>7.4}", bundle.bert_f1);
    println!("Hybrid:    {:>7.2}", bundle.hybrid);
    Ok(())
}

async fn run_models(check: bool, config: &Config) -> Result<()> {
    let service = TranslationService::from_config(config)?;
    let registry = service.registry();

    for registered in registry.backends() {
        let backend = &registered.backend;
        let directions = backend
            .directions()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let status = if check {
            match backend.health_check().await {
                Ok(()) => "  [ok]".to_string(),
                Err(e) => format!("  [unreachable: {}]", e),
            }
        } else {
            String::new()
        };

        println!("{:>2}. {:<16} {}{}", registered.priority + 1, backend.id(), directions, status);
    }

    let served = registry
        .directions()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    println!("Directions: {}", if served.is_empty() { "none" } else { served.as_str() });
    Ok(())
}
