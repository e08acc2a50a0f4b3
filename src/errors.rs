/*!
 * Error types for the vertimas library.
 *
 * Errors are split by the layer that raises them, using the thiserror crate:
 * - `BackendError`: a single translation backend call failed
 * - `MetricError`: a scoring function could not produce a score
 * - `TranslationError`: a request-level failure surfaced to the caller
 * - `AppError`: top-level wrapper used by the binary
 */

use std::time::Duration;

use thiserror::Error;

use crate::language_utils::Direction;

/// Errors raised by a single backend invocation.
///
/// These are always absorbed by the executor and the back-translation engine:
/// the failing backend is excluded and the remaining backends continue.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend was asked for a direction it does not declare
    #[error("Backend '{backend}' does not support {direction}")]
    UnsupportedDirection {
        /// Backend identifier
        backend: String,
        /// Requested direction
        direction: Direction,
    },

    /// The model raised an error while translating
    #[error("Backend '{backend}' failed: {message}")]
    Invocation {
        /// Backend identifier
        backend: String,
        /// Error message from the model
        message: String,
    },

    /// The call did not finish within the per-call timeout
    #[error("Backend '{backend}' timed out after {timeout:?}")]
    Timeout {
        /// Backend identifier
        backend: String,
        /// Timeout that was exceeded
        timeout: Duration,
    },

    /// Transport-level failure talking to a model server
    #[error("Request to backend '{backend}' failed: {message}")]
    Request {
        /// Backend identifier
        backend: String,
        /// Transport error message
        message: String,
    },

    /// The model server answered with something we could not use
    #[error("Backend '{backend}' returned an invalid response: {message}")]
    InvalidResponse {
        /// Backend identifier
        backend: String,
        /// Parse or validation error message
        message: String,
    },
}

impl BackendError {
    /// Identifier of the backend that failed.
    pub fn backend(&self) -> &str {
        match self {
            Self::UnsupportedDirection { backend, .. }
            | Self::Invocation { backend, .. }
            | Self::Timeout { backend, .. }
            | Self::Request { backend, .. }
            | Self::InvalidResponse { backend, .. } => backend,
        }
    }

    /// Whether this failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors raised by metric providers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// The scoring model could not be loaded or reached
    #[error("Scoring model unavailable: {0}")]
    ModelUnavailable(String),

    /// Hypothesis and reference batches differ in length
    #[error("Batch length mismatch: {hypotheses} hypotheses vs {references} references")]
    LengthMismatch {
        /// Number of hypotheses
        hypotheses: usize,
        /// Number of references
        references: usize,
    },

    /// Nothing to score
    #[error("Cannot score an empty batch")]
    EmptyBatch,
}

/// Request-level errors surfaced to the caller of the translation service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// Nothing to translate
    #[error("Input text is empty")]
    EmptyInput,

    /// Direction string could not be parsed
    #[error("Invalid direction '{0}', expected 'source-target'")]
    InvalidDirection(String),

    /// No registered backend supports the direction
    #[error("No model available for {direction}")]
    NoSupportedModel {
        /// Requested direction
        direction: Direction,
    },

    /// Every active backend failed or timed out
    #[error("No model available for {direction}: all {failures} backend(s) failed")]
    NoCandidatesProduced {
        /// Requested direction
        direction: Direction,
        /// Failures absorbed while trying
        failures: usize,
    },
}

impl TranslationError {
    /// Whether the error means "no model could serve this direction".
    pub fn is_no_model_available(&self) -> bool {
        matches!(
            self,
            Self::NoSupportedModel { .. } | Self::NoCandidatesProduced { .. }
        )
    }
}

/// Pipeline stage a backend failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Source -> target translation
    Forward,
    /// Candidate -> source round trip
    BackTranslation,
}

/// Metric a scoring failure belongs to.
///
/// BLEU and chrF are computed locally and cannot fail, so only the
/// model-backed metric appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// BERTScore F1
    BertScore,
}

/// A failure that was recovered locally instead of failing the request.
#[derive(Debug, Clone, PartialEq)]
pub enum AbsorbedError {
    /// A backend was excluded from a stage
    Backend {
        /// Stage the backend was excluded from
        stage: Stage,
        /// The failure
        error: BackendError,
    },
    /// A metric defaulted to zero for one candidate
    Metric {
        /// Candidate whose score was affected
        backend_id: String,
        /// Affected metric
        metric: MetricKind,
        /// The failure
        error: MetricError,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from configuration loading or validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a backend
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Error from a metric provider
    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
