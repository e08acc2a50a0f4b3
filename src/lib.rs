/*!
 * # vertimas - multi-model translation with round-trip selection
 *
 * A Rust library that translates text between Lithuanian and English with
 * several neural MT models at once and keeps the best candidate.
 *
 * ## Features
 *
 * - Concurrent translation with every model serving a direction:
 *   - Marian (opus-mt) bilingual models
 *   - M2M100 many-to-many models
 *   - mBART-50 one-to-many and many-to-one models
 * - Round-trip back-translation of every candidate
 * - Sentence BLEU, chrF and BERTScore F1, combined into a weighted score
 * - Deterministic selection with registry-order tie-breaking
 * - Per-backend fault isolation and per-call timeouts
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The selection pipeline:
 *   - `translation::core`: `TranslationService`, one request end to end
 *   - `translation::registry`: Registered backends and direction lookup
 *   - `translation::executor`: Forward translation across backends
 *   - `translation::back_translation`: Round trips into the source language
 *   - `translation::quality`: Metrics and candidate selection
 * - `language_utils`: ISO language codes and translation directions
 * - `providers`: Translation backends:
 *   - `providers::remote`: Models served over HTTP by a model server
 *   - `providers::mock`: Scripted backends for tests and benchmarks
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AbsorbedError, AppError, BackendError, MetricError, TranslationError};
pub use language_utils::{Direction, get_language_name, language_codes_match, normalize_to_part2t};
pub use providers::{ModelFamily, TranslationBackend};
pub use translation::quality::{HybridWeights, SelectionMethod, SelectionStrategy};
pub use translation::{CandidateSet, ModelRegistry, SelectionResult, TranslationService};
