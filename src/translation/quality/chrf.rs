/*!
 * Sentence-level chrF.
 *
 * Character n-gram F-score (orders 1 to 6, beta = 2) computed the way
 * sacreBLEU does it: whitespace is removed before extracting n-grams and
 * precision and recall are averaged over the orders both sides can fill.
 * Character matching tolerates Lithuanian inflection that word BLEU misses.
 */

use std::collections::HashMap;

/// Highest character n-gram order
pub const CHAR_ORDER: usize = 6;

/// Recall weight
pub const BETA: f64 = 2.0;

fn char_ngrams(chars: &[char], n: usize) -> HashMap<&[char], usize> {
    let mut counts = HashMap::new();
    if chars.len() >= n {
        for window in chars.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}

/// Sentence chrF of `hypothesis` against `reference`, in [0, 100]
pub fn sentence_chrf(hypothesis: &str, reference: &str) -> f64 {
    let hyp: Vec<char> = hypothesis.chars().filter(|c| !c.is_whitespace()).collect();
    let reference: Vec<char> = reference.chars().filter(|c| !c.is_whitespace()).collect();

    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut effective_order = 0;

    for n in 1..=CHAR_ORDER {
        let hyp_ngrams = char_ngrams(&hyp, n);
        let ref_ngrams = char_ngrams(&reference, n);

        let hyp_total: usize = hyp_ngrams.values().sum();
        let ref_total: usize = ref_ngrams.values().sum();
        if hyp_total == 0 || ref_total == 0 {
            continue;
        }

        let matches: usize = hyp_ngrams
            .iter()
            .map(|(ngram, count)| (*count).min(ref_ngrams.get(ngram).copied().unwrap_or(0)))
            .sum();

        precision_sum += matches as f64 / hyp_total as f64;
        recall_sum += matches as f64 / ref_total as f64;
        effective_order += 1;
    }

    if effective_order == 0 {
        return 0.0;
    }

    let precision = precision_sum / effective_order as f64;
    let recall = recall_sum / effective_order as f64;
    if precision + recall == 0.0 {
        return 0.0;
    }

    let beta2 = BETA * BETA;
    let score = (1.0 + beta2) * precision * recall / (beta2 * precision + recall);
    (100.0 * score).clamp(0.0, 100.0)
}
