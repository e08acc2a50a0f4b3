/*!
 * Parallel backend invocation.
 *
 * Every backend call runs as its own future with a per-call timeout. Calls
 * are driven through a bounded `buffer_unordered` stream so one slow model
 * never holds back the others, and results are put back into registry order
 * afterwards so nothing downstream depends on completion order.
 */

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::time::Instant;

use crate::errors::{BackendError, TranslationError};
use crate::language_utils::Direction;
use crate::translation::cache::truncate_text;
use crate::translation::candidates::{CandidateSet, ForwardTranslation};
use crate::translation::concurrency::ExecutionLimits;
use crate::translation::registry::{ModelRegistry, RegisteredBackend};

/// One backend call to make
#[derive(Debug, Clone)]
pub(crate) struct Invocation {
    /// Caller-defined group (e.g. index of the candidate being round-tripped)
    pub slot: usize,
    /// Backend to call
    pub backend: RegisteredBackend,
    /// Text to translate
    pub text: String,
}

/// Result of one backend call
#[derive(Debug)]
pub(crate) struct InvocationOutcome {
    pub slot: usize,
    pub priority: usize,
    pub backend_id: String,
    pub result: Result<String, BackendError>,
}

/// Runs backend calls concurrently under [`ExecutionLimits`]
#[derive(Debug, Clone, Default)]
pub struct TranslationExecutor {
    limits: ExecutionLimits,
}

impl TranslationExecutor {
    /// Create an executor with the given limits
    pub fn new(limits: ExecutionLimits) -> Self {
        Self { limits }
    }

    /// Limits in use
    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// Translate `text` with every backend supporting `direction`.
    ///
    /// Failing backends are excluded. Fails only when no backend supports the
    /// direction or every supporting backend failed.
    pub async fn translate_all(
        &self,
        registry: &ModelRegistry,
        text: &str,
        direction: &Direction,
    ) -> Result<CandidateSet, TranslationError> {
        self.translate_all_reported(registry, text, direction)
            .await
            .map(|forward| forward.candidates)
    }

    /// Same as [`translate_all`](Self::translate_all) but also returns the
    /// failures that were absorbed along the way.
    pub async fn translate_all_reported(
        &self,
        registry: &ModelRegistry,
        text: &str,
        direction: &Direction,
    ) -> Result<ForwardTranslation, TranslationError> {
        let active = registry.active_backends(direction);
        if active.is_empty() {
            warn!("No backend supports {}", direction);
            return Err(TranslationError::NoSupportedModel {
                direction: direction.clone(),
            });
        }

        let invocations = active
            .into_iter()
            .map(|backend| Invocation {
                slot: 0,
                backend,
                text: text.to_string(),
            })
            .collect();

        let mut forward = ForwardTranslation::default();
        for outcome in self.invoke(invocations, direction).await {
            match outcome.result {
                Ok(translation) => {
                    forward
                        .candidates
                        .insert(outcome.backend_id, outcome.priority, translation);
                }
                Err(e) => {
                    warn!("Excluding backend from forward translation: {}", e);
                    forward.failures.push(e);
                }
            }
        }

        if forward.candidates.is_empty() {
            return Err(TranslationError::NoCandidatesProduced {
                direction: direction.clone(),
                failures: forward.failures.len(),
            });
        }

        debug!(
            "Forward translation {} produced {} candidate(s), {} failure(s)",
            direction,
            forward.candidates.len(),
            forward.failures.len()
        );
        Ok(forward)
    }

    /// Run `invocations` concurrently and return their outcomes sorted by
    /// (slot, backend priority).
    pub(crate) async fn invoke(
        &self,
        invocations: Vec<Invocation>,
        direction: &Direction,
    ) -> Vec<InvocationOutcome> {
        let default_timeout = self.limits.default_timeout();

        let mut outcomes = stream::iter(invocations)
            .map(|invocation| {
                let direction = direction.clone();
                async move {
                    let backend = &invocation.backend.backend;
                    let backend_id = backend.id().to_string();
                    let timeout = backend.timeout().unwrap_or(default_timeout);
                    let start_time = Instant::now();

                    debug!(
                        "[{}] translating '{}' ({})",
                        backend_id,
                        truncate_text(&invocation.text, 40),
                        direction
                    );

                    let result = match tokio::time::timeout(
                        timeout,
                        backend.translate(&invocation.text, &direction),
                    )
                    .await
                    {
                        Ok(Ok(translation)) if translation.trim().is_empty() => {
                            Err(BackendError::InvalidResponse {
                                backend: backend_id.clone(),
                                message: "empty translation".to_string(),
                            })
                        }
                        Ok(result) => result,
                        Err(_) => Err(BackendError::Timeout {
                            backend: backend_id.clone(),
                            timeout,
                        }),
                    };

                    debug!("[{}] finished in {:?}", backend_id, start_time.elapsed());

                    InvocationOutcome {
                        slot: invocation.slot,
                        priority: invocation.backend.priority,
                        backend_id,
                        result,
                    }
                }
            })
            .buffer_unordered(self.limits.max_concurrent_requests())
            .collect::<Vec<_>>()
            .await;

        outcomes.sort_by_key(|o| (o.slot, o.priority));
        outcomes
    }
}
