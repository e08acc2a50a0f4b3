/*!
 * Translation quality estimation.
 *
 * - **bleu**: sentence BLEU with 13a tokenization
 * - **chrf**: character n-gram F-score
 * - **semantic**: BERTScore F1 over token embeddings
 * - **metrics**: score bundles and hybrid weighting
 * - **selector**: round-trip evaluation and winner selection
 */

pub mod bleu;
pub mod chrf;
pub mod metrics;
pub mod selector;
pub mod semantic;

// Re-export main types
pub use bleu::sentence_bleu;
pub use chrf::sentence_chrf;
pub use metrics::{HybridWeights, ScoreBundle};
pub use selector::{CandidateScore, CandidateSelector, Selection, SelectionMethod, SelectionStrategy};
pub use semantic::{EmbeddingBertScorer, HashedEmbedder, SemanticScorer, TokenEmbedder};
