/*!
 * Candidate evaluation and selection.
 *
 * Every forward candidate is translated back into the source language and
 * the round trips are compared with the original source. The candidate with
 * the highest ranking value wins; ties go to the backend registered first.
 *
 * When no backend serves the reverse direction nothing can be scored, and
 * the longest candidate is returned with the result flagged as degraded.
 */

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{AbsorbedError, MetricKind, Stage, TranslationError};
use crate::language_utils::Direction;
use crate::translation::back_translation::BackTranslationEngine;
use crate::translation::cache::RoundTripCache;
use crate::translation::candidates::{Candidate, CandidateSet};
use crate::translation::quality::metrics::{
    HybridWeights, ScoreBundle, average_bert_f1, average_bleu, average_chrf,
};
use crate::translation::quality::semantic::SemanticScorer;
use crate::translation::registry::ModelRegistry;

/// How candidates are ranked
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionStrategy {
    /// Weighted BLEU + BERTScore + chrF over round trips
    Hybrid(HybridWeights),
    /// Average round-trip BLEU only
    BleuOnly,
    /// Always pick the longest candidate, no round trips
    Longest,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::Hybrid(HybridWeights::default())
    }
}

impl SelectionStrategy {
    /// Configuration name of the strategy
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hybrid(_) => "hybrid",
            Self::BleuOnly => "bleu",
            Self::Longest => "longest",
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SelectionStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(Self::default()),
            "bleu" | "bleu_only" | "bleu-only" => Ok(Self::BleuOnly),
            "longest" => Ok(Self::Longest),
            other => Err(anyhow::anyhow!(
                "Unknown selection strategy '{}', expected hybrid, bleu or longest",
                other
            )),
        }
    }
}

/// How the winner of a selection was actually determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Hybrid metric score
    Hybrid,
    /// Round-trip BLEU
    BleuOnly,
    /// Longest candidate because the strategy asks for it
    Longest,
    /// Longest candidate because no reverse backend exists
    LongestFallback,
}

/// Evaluation of one candidate
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    /// Backend that produced the candidate
    pub backend_id: String,
    /// Candidate text
    pub text: String,
    /// Round-trip texts it was scored with
    pub round_trips: Vec<String>,
    /// Averaged scores
    pub scores: ScoreBundle,
}

/// Outcome of [`CandidateSelector::select_best`]
#[derive(Debug, Clone)]
pub struct Selection {
    /// Winning candidate text
    pub best_text: String,
    /// Backend that produced it
    pub best_backend_id: String,
    /// How the winner was picked
    pub method: SelectionMethod,
    /// Set when metric scoring was impossible and the heuristic was used
    pub degraded: bool,
    /// Per-candidate evaluations in priority order (empty for the heuristic)
    pub scores: Vec<CandidateScore>,
    /// Failures absorbed while evaluating
    pub absorbed: Vec<AbsorbedError>,
    /// Reverse backend calls made
    pub round_trip_calls: usize,
}

impl Selection {
    fn heuristic(winner: &Candidate, method: SelectionMethod) -> Self {
        Self {
            best_text: winner.text.clone(),
            best_backend_id: winner.backend_id.clone(),
            method,
            degraded: method == SelectionMethod::LongestFallback,
            scores: Vec::new(),
            absorbed: Vec::new(),
            round_trip_calls: 0,
        }
    }
}

/// Scores candidates through round trips and picks the best one
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    registry: Arc<ModelRegistry>,
    back_translation: BackTranslationEngine,
    scorer: Arc<dyn SemanticScorer>,
    strategy: SelectionStrategy,
}

impl CandidateSelector {
    /// Create a selector
    pub fn new(
        registry: Arc<ModelRegistry>,
        back_translation: BackTranslationEngine,
        scorer: Arc<dyn SemanticScorer>,
        strategy: SelectionStrategy,
    ) -> Self {
        Self {
            registry,
            back_translation,
            scorer,
            strategy,
        }
    }

    /// Strategy in use
    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Same selector with a different strategy
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Pick the best of `candidates` for `source_text` translated along `direction`
    pub async fn select_best(
        &self,
        candidates: &CandidateSet,
        source_text: &str,
        direction: &Direction,
    ) -> Result<Selection, TranslationError> {
        let longest = candidates.longest().ok_or_else(|| TranslationError::NoCandidatesProduced {
            direction: direction.clone(),
            failures: 0,
        })?;

        if self.strategy == SelectionStrategy::Longest {
            debug!("Longest strategy picked '{}'", longest.backend_id);
            return Ok(Selection::heuristic(longest, SelectionMethod::Longest));
        }

        if !self.back_translation.has_reverse_backends(&self.registry, direction) {
            warn!(
                "No backend serves {}, falling back to the longest candidate ('{}')",
                direction.reverse(),
                longest.backend_id
            );
            return Ok(Selection::heuristic(longest, SelectionMethod::LongestFallback));
        }

        let cache = RoundTripCache::new();
        let mut reports = self
            .back_translation
            .round_trip_candidates(&self.registry, candidates, direction, &cache)
            .await;

        let lang = direction.base().source().to_string();
        let mut absorbed = Vec::new();
        let mut seen_texts = HashSet::new();
        let mut round_trip_calls = 0;
        let mut scores = Vec::with_capacity(candidates.len());

        for candidate in candidates.iter() {
            let report = reports.remove(&candidate.backend_id).unwrap_or_default();

            // Candidates with identical text share one report
            if seen_texts.insert(candidate.text.clone()) {
                round_trip_calls += report.calls;
                absorbed.extend(report.failures.iter().cloned().map(|error| AbsorbedError::Backend {
                    stage: Stage::BackTranslation,
                    error,
                }));
            }

            let round_trips = report.texts;
            let bleu = average_bleu(&round_trips, source_text);

            let bundle = match self.strategy {
                SelectionStrategy::Hybrid(weights) => {
                    let chrf = average_chrf(&round_trips, source_text);
                    let bert_f1 =
                        match average_bert_f1(self.scorer.as_ref(), &round_trips, source_text, &lang).await {
                            Ok(f1) => f1,
                            Err(error) => {
                                warn!(
                                    "{} failed for '{}', scoring it 0: {}",
                                    self.scorer.name(),
                                    candidate.backend_id,
                                    error
                                );
                                absorbed.push(AbsorbedError::Metric {
                                    backend_id: candidate.backend_id.clone(),
                                    metric: MetricKind::BertScore,
                                    error,
                                });
                                0.0
                            }
                        };
                    ScoreBundle::hybrid(bleu, bert_f1, chrf, &weights)
                }
                _ => ScoreBundle::bleu_only(bleu),
            };

            debug!(
                "[{}] bleu={:.2} bert_f1={:.4} chrf={:.2} -> {:.2} over {} round trip(s)",
                candidate.backend_id,
                bundle.bleu,
                bundle.bert_f1,
                bundle.chrf,
                bundle.hybrid,
                round_trips.len()
            );

            scores.push(CandidateScore {
                backend_id: candidate.backend_id.clone(),
                text: candidate.text.clone(),
                round_trips,
                scores: bundle,
            });
        }

        // Strictly greater keeps the earliest candidate on ties
        let winner = scores
            .iter()
            .fold(None, |best: Option<&CandidateScore>, s| match best {
                Some(b) if b.scores.hybrid >= s.scores.hybrid => Some(b),
                _ => Some(s),
            })
            .ok_or_else(|| TranslationError::NoCandidatesProduced {
                direction: direction.clone(),
                failures: 0,
            })?;

        let method = match self.strategy {
            SelectionStrategy::BleuOnly => SelectionMethod::BleuOnly,
            _ => SelectionMethod::Hybrid,
        };

        info!(
            "Selected '{}' ({} score {:.2}) among {} candidate(s)",
            winner.backend_id,
            self.strategy,
            winner.scores.hybrid,
            scores.len()
        );

        Ok(Selection {
            best_text: winner.text.clone(),
            best_backend_id: winner.backend_id.clone(),
            method,
            degraded: false,
            absorbed,
            round_trip_calls,
            scores,
        })
    }
}
