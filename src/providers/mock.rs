/*!
 * Mock backend implementations for testing.
 *
 * This module provides scripted backends that simulate different behaviors:
 * - `MockBackend::working(..)` - Always succeeds
 * - `MockBackend::intermittent(..)` - Fails every Nth request
 * - `MockBackend::failing(..)` - Always fails with an error
 * - `MockBackend::slow(..)` - Succeeds after a delay (for timeout testing)
 *
 * Working backends answer from a lookup table first, so tests can script
 * exact forward and round-trip texts.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::BackendError;
use crate::language_utils::Direction;
use crate::providers::TranslationBackend;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty translation
    Empty,
    /// Simulates slow inference
    Slow { delay_ms: u64 },
}

/// Mock backend for testing selection behavior
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Registry identifier
    id: String,
    /// Declared directions
    directions: Vec<Direction>,
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Scripted answers keyed by (direction, input text)
    responses: HashMap<(Direction, String), String>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str, &Direction) -> String>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(id: impl Into<String>, directions: &[Direction], behavior: MockBehavior) -> Self {
        Self {
            id: id.into(),
            directions: directions.to_vec(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            responses: HashMap::new(),
            custom_response: None,
        }
    }

    /// Create a working mock backend
    pub fn working(id: impl Into<String>, directions: &[Direction]) -> Self {
        Self::new(id, directions, MockBehavior::Working)
    }

    /// Create an intermittently failing mock backend
    pub fn intermittent(id: impl Into<String>, directions: &[Direction], fail_every: usize) -> Self {
        Self::new(id, directions, MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock backend that always errors
    pub fn failing(id: impl Into<String>, directions: &[Direction]) -> Self {
        Self::new(id, directions, MockBehavior::Failing)
    }

    /// Create a mock backend that returns empty translations
    pub fn empty(id: impl Into<String>, directions: &[Direction]) -> Self {
        Self::new(id, directions, MockBehavior::Empty)
    }

    /// Create a mock backend that sleeps before answering
    pub fn slow(id: impl Into<String>, directions: &[Direction], delay_ms: u64) -> Self {
        Self::new(id, directions, MockBehavior::Slow { delay_ms })
    }

    /// Script the answer for one input along one direction
    pub fn with_response(
        mut self,
        direction: &Direction,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.responses
            .insert((direction.base(), input.into()), output.into());
        self
    }

    /// Set a custom response generator for unscripted inputs
    pub fn with_custom_response(mut self, generator: fn(&str, &Direction) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn answer(&self, text: &str, direction: &Direction) -> String {
        if let Some(scripted) = self.responses.get(&(direction.base(), text.to_string())) {
            return scripted.clone();
        }

        match self.custom_response {
            Some(generator) => generator(text, direction),
            None => format!("[{} {}] {}", self.id, direction, text),
        }
    }

    fn simulated_failure(&self, message: String) -> BackendError {
        BackendError::Invocation {
            backend: self.id.clone(),
            message,
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn directions(&self) -> &[Direction] {
        &self.directions
    }

    async fn translate(&self, text: &str, direction: &Direction) -> Result<String, BackendError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        if !self.supports(direction) {
            return Err(BackendError::UnsupportedDirection {
                backend: self.id.clone(),
                direction: direction.clone(),
            });
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.answer(text, direction)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(self.simulated_failure(format!(
                        "Simulated intermittent failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(self.answer(text, direction))
                }
            }

            MockBehavior::Failing => {
                Err(self.simulated_failure("Simulated model failure".to_string()))
            }

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.answer(text, direction))
            }
        }
    }
}
