/*!
 * Translation backend implementations.
 *
 * Every model, whatever its family, is driven through the same
 * `TranslationBackend` capability:
 * - `remote`: neural MT models served over HTTP by a model server
 * - `mock`: scripted in-process backends used by tests and benchmarks
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

use crate::errors::BackendError;
use crate::language_utils::Direction;

/// Common trait for all translation backends
///
/// Backends are registered once at startup and are read-only afterwards.
/// Family-specific encoding details (how a language is tagged for a given
/// model) stay inside the implementation.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Unique identifier of this backend in the registry
    fn id(&self) -> &str;

    /// Directions this backend declares, possibly with region suffixes
    fn directions(&self) -> &[Direction];

    /// Whether the backend serves `direction` (base-code exact match)
    fn supports(&self, direction: &Direction) -> bool {
        self.directions().iter().any(|d| d.matches(direction))
    }

    /// Per-call timeout override for this backend
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Translate `text` along `direction`
    ///
    /// # Returns
    /// * `Result<String, BackendError>` - The translation or the reason it failed
    async fn translate(&self, text: &str, direction: &Direction) -> Result<String, BackendError>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Neural MT model family
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    // @family: Bilingual Marian (opus-mt), one direction per model
    #[default]
    Marian,
    // @family: M2M100 many-to-many
    M2m100,
    // @family: mBART-50 many-to-one (into English)
    Mbart50ManyToOne,
    // @family: mBART-50 one-to-many (out of English)
    Mbart50OneToMany,
}

impl ModelFamily {
    // @returns: Configuration identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Marian => "marian",
            Self::M2m100 => "m2m100",
            Self::Mbart50ManyToOne => "mbart50_many_to_one",
            Self::Mbart50OneToMany => "mbart50_one_to_many",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelFamily {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "marian" => Ok(Self::Marian),
            "m2m100" => Ok(Self::M2m100),
            "mbart50_many_to_one" | "mbart50_m2en" => Ok(Self::Mbart50ManyToOne),
            "mbart50_one_to_many" | "mbart50_en2m" => Ok(Self::Mbart50OneToMany),
            _ => Err(anyhow!("Invalid model family: {}", s)),
        }
    }
}

pub mod mock;
pub mod remote;

pub use mock::{MockBackend, MockBehavior};
pub use remote::RemoteModelBackend;
