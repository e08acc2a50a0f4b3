/*!
 * Sentence-level BLEU.
 *
 * Follows the sacreBLEU sentence scorer: 13a tokenization, clipped n-gram
 * precision for orders 1 to 4, brevity penalty, exponential smoothing of
 * zero-match orders and effective order for short sentences. Scores are on
 * the 0-100 scale and case-sensitive.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Highest n-gram order
pub const MAX_NGRAM_ORDER: usize = 4;

/// 13a tokenization rules, applied in order
static TOKENIZER_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // Split off punctuation and symbols
        (Regex::new(r"([{-~\[-` -&(-+:-@/])").unwrap(), " $1 "),
        // Period and comma unless preceded by a digit
        (Regex::new(r"([^0-9])([.,])").unwrap(), "$1 $2 "),
        // Period and comma unless followed by a digit
        (Regex::new(r"([.,])([^0-9])").unwrap(), " $1 $2"),
        // Dash preceded by a digit
        (Regex::new(r"([0-9])(-)").unwrap(), "$1 $2 "),
    ]
});

/// Tokenize the way the 13a (mteval-v13a) tokenizer does
pub fn tokenize_13a(text: &str) -> Vec<String> {
    let mut line = text
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");

    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let mut line = format!(" {} ", line);
    for (pattern, replacement) in TOKENIZER_RULES.iter() {
        line = pattern.replace_all(&line, *replacement).into_owned();
    }

    line.split_whitespace().map(str::to_string).collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for window in tokens.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}

/// Sufficient statistics of one hypothesis/reference pair
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BleuStats {
    /// Hypothesis length in tokens
    pub sys_len: usize,
    /// Reference length in tokens
    pub ref_len: usize,
    /// Clipped matches per order
    pub correct: [usize; MAX_NGRAM_ORDER],
    /// Hypothesis n-grams per order
    pub total: [usize; MAX_NGRAM_ORDER],
}

impl BleuStats {
    /// Collect statistics for `hypothesis` against `reference`
    pub fn collect(hypothesis: &str, reference: &str) -> Self {
        let hyp = tokenize_13a(hypothesis);
        let reference = tokenize_13a(reference);

        let mut stats = Self {
            sys_len: hyp.len(),
            ref_len: reference.len(),
            ..Self::default()
        };

        for n in 1..=MAX_NGRAM_ORDER {
            let hyp_ngrams = ngram_counts(&hyp, n);
            let ref_ngrams = ngram_counts(&reference, n);

            for (ngram, count) in &hyp_ngrams {
                stats.total[n - 1] += count;
                let ref_count = ref_ngrams.get(ngram).copied().unwrap_or(0);
                stats.correct[n - 1] += (*count).min(ref_count);
            }
        }

        stats
    }

    /// Brevity penalty
    pub fn brevity_penalty(&self) -> f64 {
        if self.sys_len >= self.ref_len {
            1.0
        } else if self.sys_len == 0 {
            0.0
        } else {
            (1.0 - self.ref_len as f64 / self.sys_len as f64).exp()
        }
    }

    /// Smoothed BLEU score in [0, 100]
    pub fn score(&self) -> f64 {
        if self.sys_len == 0 || self.correct[0] == 0 {
            return 0.0;
        }

        let mut precisions = [0.0f64; MAX_NGRAM_ORDER];
        let mut smooth_mteval = 1.0;
        let mut effective_order = 0;

        for n in 0..MAX_NGRAM_ORDER {
            if self.total[n] == 0 {
                break;
            }
            effective_order = n + 1;

            if self.correct[n] == 0 {
                smooth_mteval *= 2.0;
                precisions[n] = 100.0 / (smooth_mteval * self.total[n] as f64);
            } else {
                precisions[n] = 100.0 * self.correct[n] as f64 / self.total[n] as f64;
            }
        }

        let log_sum: f64 = precisions[..effective_order].iter().map(|p| p.ln()).sum();
        let score = self.brevity_penalty() * (log_sum / effective_order as f64).exp();
        score.clamp(0.0, 100.0)
    }
}

/// Sentence BLEU of `hypothesis` against `reference`, in [0, 100]
pub fn sentence_bleu(hypothesis: &str, reference: &str) -> f64 {
    BleuStats::collect(hypothesis, reference).score()
}
