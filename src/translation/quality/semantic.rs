/*!
 * BERTScore-style semantic similarity.
 *
 * Each token of the hypothesis is greedily matched to its most similar
 * reference token by cosine similarity of contextual embeddings (precision),
 * and the other way round (recall). F1 combines the two.
 *
 * The embedding model is behind the `TokenEmbedder` trait. `HashedEmbedder`
 * is the offline default: it hashes character trigrams of each word into a
 * fixed-size vector and mixes in the neighbouring words, so inflected forms
 * of the same stem land close together.
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;

use crate::errors::MetricError;

/// Produces one embedding per token of a text
pub trait TokenEmbedder: Send + Sync + Debug {
    /// Contextual token embeddings for `text` in language `lang`
    fn embed_tokens(&self, text: &str, lang: &str) -> Result<Vec<Vec<f32>>, MetricError>;
}

/// Batched semantic scorer
#[async_trait]
pub trait SemanticScorer: Send + Sync + Debug {
    /// Scorer name for logs and reports
    fn name(&self) -> &str;

    /// F1 in [0, 1] for each (hypothesis, reference) pair.
    ///
    /// Failures are reported, never turned into silent zeros.
    async fn f1_batch(
        &self,
        hypotheses: &[String],
        references: &[String],
        lang: &str,
    ) -> Result<Vec<f64>, MetricError>;
}

/// Cosine similarity of two vectors; 0 when either is all zeros
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// FNV-1a over the UTF-8 bytes of `s`
fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

/// Deterministic hashed character-trigram embedder
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    /// Embedding dimension
    dim: usize,
    /// Weight of each neighbouring word in a token's contextual vector
    context_weight: f32,
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl HashedEmbedder {
    /// Create an embedder producing `dim`-dimensional vectors
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            context_weight: 0.25,
        }
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Lower-cased alphanumeric words of `text`
    pub fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn word_vector(&self, word: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let padded: Vec<char> = format!("<{}>", word).chars().collect();

        for trigram in padded.windows(3) {
            let key: String = trigram.iter().collect();
            let index = (fnv1a(&key) % self.dim as u64) as usize;
            vector[index] += 1.0;
        }

        normalize(&mut vector);
        vector
    }
}

impl TokenEmbedder for HashedEmbedder {
    fn embed_tokens(&self, text: &str, _lang: &str) -> Result<Vec<Vec<f32>>, MetricError> {
        if self.dim == 0 {
            return Err(MetricError::ModelUnavailable(
                "embedding dimension must be positive".to_string(),
            ));
        }

        let words: Vec<Vec<f32>> = Self::tokenize(text)
            .iter()
            .map(|w| self.word_vector(w))
            .collect();

        let contextual = (0..words.len())
            .map(|i| {
                let mut vector = words[i].clone();
                let neighbours = [i.checked_sub(1), Some(i + 1).filter(|j| *j < words.len())];
                for j in neighbours.into_iter().flatten() {
                    for (v, n) in vector.iter_mut().zip(words[j].iter()) {
                        *v += self.context_weight * n;
                    }
                }
                normalize(&mut vector);
                vector
            })
            .collect();

        Ok(contextual)
    }
}

/// BERTScore computed with greedy cosine matching over token embeddings
#[derive(Debug, Clone)]
pub struct EmbeddingBertScorer<E: TokenEmbedder> {
    embedder: E,
}

impl<E: TokenEmbedder> EmbeddingBertScorer<E> {
    /// Create a scorer backed by `embedder`
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// (precision, recall, F1) for one pair
    pub fn score_pair(
        &self,
        hypothesis: &str,
        reference: &str,
        lang: &str,
    ) -> Result<(f64, f64, f64), MetricError> {
        let hyp = self.embedder.embed_tokens(hypothesis, lang)?;
        let reference = self.embedder.embed_tokens(reference, lang)?;

        if hyp.is_empty() || reference.is_empty() {
            return Ok((0.0, 0.0, 0.0));
        }

        let greedy = |from: &[Vec<f32>], to: &[Vec<f32>]| -> f64 {
            let total: f64 = from
                .iter()
                .map(|a| {
                    to.iter()
                        .map(|b| f64::from(cosine_similarity(a, b)))
                        .fold(0.0, f64::max)
                })
                .sum();
            total / from.len() as f64
        };

        let precision = greedy(&hyp, &reference).clamp(0.0, 1.0);
        let recall = greedy(&reference, &hyp).clamp(0.0, 1.0);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok((precision, recall, f1.clamp(0.0, 1.0)))
    }
}

impl Default for EmbeddingBertScorer<HashedEmbedder> {
    fn default() -> Self {
        Self::new(HashedEmbedder::default())
    }
}

#[async_trait]
impl<E: TokenEmbedder> SemanticScorer for EmbeddingBertScorer<E> {
    fn name(&self) -> &str {
        "bertscore"
    }

    async fn f1_batch(
        &self,
        hypotheses: &[String],
        references: &[String],
        lang: &str,
    ) -> Result<Vec<f64>, MetricError> {
        if hypotheses.len() != references.len() {
            return Err(MetricError::LengthMismatch {
                hypotheses: hypotheses.len(),
                references: references.len(),
            });
        }
        if hypotheses.is_empty() {
            return Err(MetricError::EmptyBatch);
        }

        let scores = hypotheses
            .iter()
            .zip(references.iter())
            .map(|(h, r)| self.score_pair(h, r, lang).map(|(_, _, f1)| f1))
            .collect::<Result<Vec<f64>, MetricError>>()?;

        debug!("BERTScore F1 for {} pair(s) ({}): {:?}", scores.len(), lang, scores);
        Ok(scores)
    }
}
