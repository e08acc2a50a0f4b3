use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::language_utils::{Direction, base_code, validate_language_code};
use crate::providers::ModelFamily;
use crate::translation::concurrency::ExecutionLimits;
use crate::translation::quality::metrics::HybridWeights;
use crate::translation::quality::selector::SelectionStrategy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default source language code (ISO)
    pub source_language: String,

    /// Default target language code (ISO)
    pub target_language: String,

    /// Translation models to register
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,

    /// Backend invocation settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Candidate evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One translation model served by a model server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelConfig {
    /// Registry identifier
    pub id: String,

    /// Model family, decides language tagging
    #[serde(default)]
    pub family: ModelFamily,

    /// Model name on the server
    pub model_name: String,

    /// Supported directions as "source-target" strings
    pub directions: Vec<Direction>,

    /// Model server endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-call timeout override in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Whether the model is registered at startup
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ModelConfig {
    /// Create an enabled model on the default endpoint
    pub fn new(
        id: &str,
        family: ModelFamily,
        model_name: &str,
        directions: &[(&str, &str)],
    ) -> Self {
        Self {
            id: id.to_string(),
            family,
            model_name: model_name.to_string(),
            directions: directions
                .iter()
                .map(|(source, target)| Direction::new(source, target))
                .collect(),
            endpoint: default_endpoint(),
            timeout_secs: None,
            enabled: true,
        }
    }

    /// Per-call timeout: the model's own override when set, otherwise `default`
    pub fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(default)
    }
}

/// Backend invocation settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Timeout for backends without their own, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum backend calls in flight per stage
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

/// Selection strategy names accepted in the configuration file
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Hybrid,
    #[serde(alias = "bleu_only")]
    Bleu,
    Longest,
}

/// Candidate evaluation settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// Selection strategy
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Hybrid metric weights
    #[serde(default)]
    pub weights: HybridWeights,

    /// Dimension of the hashed token embeddings used for BERTScore
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            weights: HybridWeights::default(),
            embedding_dim: default_embedding_dim(),
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
    /// Matching `log` level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_embedding_dim() -> usize {
    256
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:8000".to_string()
}

/// Model catalogue: bilingual Marian models for each direction, two M2M100
/// sizes serving both, and the two mBART-50 variants
fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig::new(
            "lt_en",
            ModelFamily::Marian,
            "Helsinki-NLP/opus-mt-tc-big-lt-en",
            &[("lt", "en")],
        ),
        ModelConfig::new(
            "en_lt",
            ModelFamily::Marian,
            "Helsinki-NLP/opus-mt-tc-big-en-lt",
            &[("en", "lt")],
        ),
        ModelConfig::new(
            "m2m100_418M",
            ModelFamily::M2m100,
            "facebook/m2m100_418M",
            &[("lt", "en"), ("en", "lt")],
        ),
        ModelConfig::new(
            "m2m100_1.2B",
            ModelFamily::M2m100,
            "facebook/m2m100_1.2B",
            &[("lt", "en"), ("en", "lt")],
        ),
        ModelConfig::new(
            "mbart50_en2m",
            ModelFamily::Mbart50OneToMany,
            "facebook/mbart-large-50-one-to-many-mmt",
            &[("en_XX", "lt_LT")],
        ),
        ModelConfig::new(
            "mbart50_m2en",
            ModelFamily::Mbart50ManyToOne,
            "facebook/mbart-large-50-many-to-one-mmt",
            &[("lt_LT", "en_XX")],
        ),
    ]
}

impl Config {
    /// Load the configuration at `path`, writing a default one first if the
    /// file does not exist
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Read a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        validate_language_code(&self.source_language)
            .context("Invalid source language")?;
        validate_language_code(&self.target_language)
            .context("Invalid target language")?;

        let mut ids = HashSet::new();
        for model in &self.models {
            if model.id.trim().is_empty() {
                return Err(anyhow!("Model identifiers cannot be empty"));
            }
            if !ids.insert(model.id.as_str()) {
                return Err(anyhow!("Duplicate model identifier '{}'", model.id));
            }
            if model.model_name.trim().is_empty() {
                return Err(anyhow!("Model '{}' has no model name", model.id));
            }
            if model.directions.is_empty() {
                return Err(anyhow!("Model '{}' declares no direction", model.id));
            }
            for direction in &model.directions {
                for tag in [direction.source(), direction.target()] {
                    validate_language_code(&base_code(tag)).with_context(|| {
                        format!("Model '{}' has an invalid direction '{}'", model.id, direction)
                    })?;
                }
            }
        }

        if self.execution.concurrent_requests == 0 {
            return Err(anyhow!("execution.concurrent_requests must be at least 1"));
        }

        self.evaluation
            .weights
            .validate()
            .context("Invalid evaluation weights")?;

        if self.evaluation.embedding_dim == 0 {
            return Err(anyhow!("evaluation.embedding_dim must be positive"));
        }

        Ok(())
    }

    /// Default translation direction
    pub fn default_direction(&self) -> Direction {
        Direction::new(&self.source_language, &self.target_language)
    }

    /// Executor limits derived from the execution settings
    pub fn execution_limits(&self) -> ExecutionLimits {
        ExecutionLimits::new(
            Duration::from_secs(self.execution.timeout_secs.max(1)),
            self.execution.concurrent_requests,
        )
    }

    /// Selection strategy derived from the evaluation settings
    pub fn selection_strategy(&self) -> SelectionStrategy {
        match self.evaluation.strategy {
            StrategyKind::Hybrid => SelectionStrategy::Hybrid(self.evaluation.weights),
            StrategyKind::Bleu => SelectionStrategy::BleuOnly,
            StrategyKind::Longest => SelectionStrategy::Longest,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "lt".to_string(),
            target_language: "en".to_string(),
            models: default_models(),
            execution: ExecutionConfig::default(),
            evaluation: EvaluationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
