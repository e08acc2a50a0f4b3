/*!
 * Core translation service implementation.
 *
 * `TranslationService` runs the whole "translate and pick best" operation:
 * forward translation with every supporting backend, round-trip evaluation
 * of each candidate and selection of the winner.
 */

use anyhow::Result;
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::{AbsorbedError, Stage, TranslationError};
use crate::language_utils::Direction;
use crate::translation::back_translation::BackTranslationEngine;
use crate::translation::cache::truncate_text;
use crate::translation::candidates::CandidateSet;
use crate::translation::concurrency::ExecutionLimits;
use crate::translation::executor::TranslationExecutor;
use crate::translation::quality::selector::{
    CandidateScore, CandidateSelector, SelectionMethod, SelectionStrategy,
};
use crate::translation::quality::semantic::{EmbeddingBertScorer, HashedEmbedder, SemanticScorer};
use crate::translation::registry::ModelRegistry;

/// Result of translating one text
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResult {
    /// Winning translation
    pub best_text: String,
    /// Backend that produced it
    pub best_backend_id: String,
    /// Every candidate produced by the forward pass
    pub candidates: CandidateSet,
    /// Set when no reverse backend existed and the longest candidate was used
    pub degraded: bool,
    /// How the winner was picked
    pub method: SelectionMethod,
    /// Per-candidate evaluations (empty when no scoring happened)
    pub scores: Vec<CandidateScore>,
    /// Failures that were absorbed on the way
    #[serde(skip)]
    pub absorbed: Vec<AbsorbedError>,
}

/// Result of translating a multi-paragraph text
#[derive(Debug, Clone, Serialize)]
pub struct ParagraphTranslation {
    /// Translated text, blank lines kept in place
    pub text: String,
    /// One entry per input line; `None` for blank lines
    pub paragraphs: Vec<Option<SelectionResult>>,
}

impl ParagraphTranslation {
    /// Number of paragraphs that fell back to the length heuristic
    pub fn degraded_count(&self) -> usize {
        self.paragraphs
            .iter()
            .flatten()
            .filter(|p| p.degraded)
            .count()
    }
}

/// Translation service running the multi-model selection pipeline
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Registered backends, shared read-only
    registry: Arc<ModelRegistry>,

    /// Forward pass executor
    executor: TranslationExecutor,

    /// Candidate evaluator
    selector: CandidateSelector,
}

impl TranslationService {
    /// Create a new translation service
    pub fn new(
        registry: Arc<ModelRegistry>,
        limits: ExecutionLimits,
        scorer: Arc<dyn SemanticScorer>,
        strategy: SelectionStrategy,
    ) -> Self {
        let executor = TranslationExecutor::new(limits);
        let selector = CandidateSelector::new(
            registry.clone(),
            BackTranslationEngine::new(executor.clone()),
            scorer,
            strategy,
        );

        Self {
            registry,
            executor,
            selector,
        }
    }

    /// Build the service, its registry and its scorer from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(ModelRegistry::from_config(config)?);
        let scorer = Arc::new(EmbeddingBertScorer::new(HashedEmbedder::new(
            config.evaluation.embedding_dim,
        )));

        Ok(Self::new(
            registry,
            config.execution_limits(),
            scorer,
            config.selection_strategy(),
        ))
    }

    /// Registered backends
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Selection strategy in use
    pub fn strategy(&self) -> SelectionStrategy {
        self.selector.strategy()
    }

    /// Same service with a different selection strategy
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selector = self.selector.with_strategy(strategy);
        self
    }

    /// Translate `text` from `source_language` to `target_language`
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<SelectionResult, TranslationError> {
        let direction = Direction::new(source_language, target_language);
        self.translate_direction(text, &direction).await
    }

    /// Translate `text` along `direction` and pick the best candidate
    pub async fn translate_direction(
        &self,
        text: &str,
        direction: &Direction,
    ) -> Result<SelectionResult, TranslationError> {
        let source_text = text.trim();
        if source_text.is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let start_time = Instant::now();
        debug!("Translating '{}' ({})", truncate_text(source_text, 50), direction);

        let forward = self
            .executor
            .translate_all_reported(&self.registry, source_text, direction)
            .await?;

        let selection = self
            .selector
            .select_best(&forward.candidates, source_text, direction)
            .await?;

        let mut absorbed: Vec<AbsorbedError> = forward
            .failures
            .into_iter()
            .map(|error| AbsorbedError::Backend {
                stage: Stage::Forward,
                error,
            })
            .collect();
        absorbed.extend(selection.absorbed);

        info!(
            "Translated {} with '{}' in {:?} ({} candidate(s){})",
            direction,
            selection.best_backend_id,
            start_time.elapsed(),
            forward.candidates.len(),
            if selection.degraded { ", degraded" } else { "" }
        );

        Ok(SelectionResult {
            best_text: selection.best_text,
            best_backend_id: selection.best_backend_id,
            candidates: forward.candidates,
            degraded: selection.degraded,
            method: selection.method,
            scores: selection.scores,
            absorbed,
        })
    }

    /// Translate every non-blank line of `text` independently.
    ///
    /// Blank lines and line terminators (`\n` or `\r\n`, including a
    /// trailing one) are copied through unchanged. `progress_callback`
    /// receives (translated so far, total non-blank lines).
    pub async fn translate_paragraphs(
        &self,
        text: &str,
        direction: &Direction,
        progress_callback: impl Fn(usize, usize),
    ) -> Result<ParagraphTranslation, TranslationError> {
        let lines: Vec<(&str, &str)> = text.split_inclusive('\n').map(split_terminator).collect();
        let total = lines.iter().filter(|(line, _)| !line.trim().is_empty()).count();
        if total == 0 {
            return Err(TranslationError::EmptyInput);
        }

        let mut translated = String::with_capacity(text.len());
        let mut paragraphs = Vec::with_capacity(lines.len());
        let mut done = 0;

        for (line, terminator) in lines {
            if line.trim().is_empty() {
                translated.push_str(line);
                translated.push_str(terminator);
                paragraphs.push(None);
                continue;
            }

            let result = self.translate_direction(line, direction).await?;
            translated.push_str(&result.best_text);
            translated.push_str(terminator);
            paragraphs.push(Some(result));

            done += 1;
            progress_callback(done, total);
        }

        Ok(ParagraphTranslation {
            text: translated,
            paragraphs,
        })
    }
}

/// Split a line from `split_inclusive` into its content and terminator
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, &line[content.len()..])
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, &line[content.len()..])
    } else {
        (line, "")
    }
}
