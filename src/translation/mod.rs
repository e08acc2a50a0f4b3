/*!
 * Multi-model translation with round-trip candidate selection.
 *
 * This module is split into several submodules:
 *
 * - `core`: the `TranslationService` orchestrating one request
 * - `registry`: registered backends and direction lookup
 * - `executor`: concurrent forward translation with per-call timeouts
 * - `back_translation`: round trips of candidates into the source language
 * - `candidates`: candidate and round-trip collections
 * - `cache`: round-trip memoization
 * - `concurrency`: per-family invocation limits
 * - `quality`: metrics and candidate selection
 */

// Re-export main types for easier usage
pub use self::back_translation::BackTranslationEngine;
pub use self::cache::RoundTripCache;
pub use self::candidates::{Candidate, CandidateSet, ForwardTranslation, RoundTripReport, RoundTripSet};
pub use self::concurrency::{ExecutionLimits, InvocationProfile};
pub use self::core::{ParagraphTranslation, SelectionResult, TranslationService};
pub use self::executor::TranslationExecutor;
pub use self::registry::{ModelRegistry, RegisteredBackend};

// Submodules
pub mod back_translation;
pub mod cache;
pub mod candidates;
pub mod concurrency;
pub mod core;
pub mod executor;
pub mod quality;
pub mod registry;
