/*!
 * Score bundles and hybrid weighting.
 *
 * BLEU and chrF are on a 0-100 scale and BERTScore F1 on 0-1. The hybrid
 * score rescales BERTScore by 100 so all three contribute on the same scale:
 *
 * `hybrid = w_bleu * bleu + w_bert * (bert_f1 * 100) + w_chrf * chrf`
 */

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::errors::MetricError;
use crate::translation::quality::bleu::sentence_bleu;
use crate::translation::quality::chrf::sentence_chrf;
use crate::translation::quality::semantic::SemanticScorer;

/// Weights of the three metrics in the hybrid score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    /// BLEU weight
    pub bleu: f64,
    /// BERTScore F1 weight (applied after rescaling to 0-100)
    pub bert: f64,
    /// chrF weight
    pub chrf: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            bleu: 0.5,
            bert: 0.3,
            chrf: 0.2,
        }
    }
}

impl HybridWeights {
    /// Create weights
    pub fn new(bleu: f64, bert: f64, chrf: f64) -> Self {
        Self { bleu, bert, chrf }
    }

    /// Check the weights are finite, non-negative and not all zero
    pub fn validate(&self) -> Result<()> {
        let all = [self.bleu, self.bert, self.chrf];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(anyhow!("Metric weights must be finite and non-negative: {:?}", self));
        }
        if all.iter().sum::<f64>() <= 0.0 {
            return Err(anyhow!("At least one metric weight must be positive"));
        }
        Ok(())
    }

    /// Weighted combination of the three averages
    pub fn combine(&self, bleu: f64, bert_f1: f64, chrf: f64) -> f64 {
        self.bleu * bleu + self.bert * (bert_f1 * 100.0) + self.chrf * chrf
    }
}

/// Averaged metric scores of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBundle {
    /// Average BLEU, 0-100
    pub bleu: f64,
    /// Average BERTScore F1, 0-1
    pub bert_f1: f64,
    /// Average chrF, 0-100
    pub chrf: f64,
    /// Value the candidates are ranked by
    pub hybrid: f64,
}

impl ScoreBundle {
    /// Bundle whose ranking value is the hybrid combination
    pub fn hybrid(bleu: f64, bert_f1: f64, chrf: f64, weights: &HybridWeights) -> Self {
        Self {
            bleu,
            bert_f1,
            chrf,
            hybrid: weights.combine(bleu, bert_f1, chrf),
        }
    }

    /// Bundle ranked by BLEU alone
    pub fn bleu_only(bleu: f64) -> Self {
        Self {
            bleu,
            hybrid: bleu,
            ..Self::default()
        }
    }
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Average BLEU of every round trip against the source
pub fn average_bleu(round_trips: &[String], source: &str) -> f64 {
    let scores: Vec<f64> = round_trips.iter().map(|r| sentence_bleu(r, source)).collect();
    mean(&scores)
}

/// Average chrF of every round trip against the source
pub fn average_chrf(round_trips: &[String], source: &str) -> f64 {
    let scores: Vec<f64> = round_trips.iter().map(|r| sentence_chrf(r, source)).collect();
    mean(&scores)
}

/// Average BERTScore F1 of every round trip against the source.
///
/// An empty round-trip set scores 0 without calling the scorer.
pub async fn average_bert_f1(
    scorer: &dyn SemanticScorer,
    round_trips: &[String],
    source: &str,
    lang: &str,
) -> Result<f64, MetricError> {
    if round_trips.is_empty() {
        return Ok(0.0);
    }

    let references = vec![source.to_string(); round_trips.len()];
    let scores = scorer.f1_batch(round_trips, &references, lang).await?;
    let finite: Vec<f64> = scores
        .into_iter()
        .map(|s| if s.is_finite() { s.clamp(0.0, 1.0) } else { 0.0 })
        .collect();
    Ok(mean(&finite))
}

/// Score a single hypothesis directly against a reference.
///
/// Returns the bundle plus the BERTScore failure, if any; a failing BERTScore
/// contributes 0 to the hybrid value.
pub async fn score_pair(
    scorer: &dyn SemanticScorer,
    hypothesis: &str,
    reference: &str,
    lang: &str,
    weights: &HybridWeights,
) -> (ScoreBundle, Option<MetricError>) {
    let bleu = sentence_bleu(hypothesis, reference);
    let chrf = sentence_chrf(hypothesis, reference);
    let (bert_f1, error) =
        match average_bert_f1(scorer, &[hypothesis.to_string()], reference, lang).await {
            Ok(f1) => (f1, None),
            Err(e) => (0.0, Some(e)),
        };

    (ScoreBundle::hybrid(bleu, bert_f1, chrf, weights), error)
}
