/*!
 * Model registry.
 *
 * Holds every translation backend loaded at startup. The registry is built
 * once, shared behind an `Arc`, and never mutated per request.
 */

use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::app_config::Config;
use crate::language_utils::Direction;
use crate::providers::{RemoteModelBackend, TranslationBackend};

/// A backend together with its registration position.
///
/// The position is the fixed priority used to break ties between equally
/// scored candidates.
#[derive(Debug, Clone)]
pub struct RegisteredBackend {
    /// Registration index (0 = registered first)
    pub priority: usize,
    /// The backend itself
    pub backend: Arc<dyn TranslationBackend>,
}

impl RegisteredBackend {
    /// Identifier of the wrapped backend
    pub fn id(&self) -> &str {
        self.backend.id()
    }
}

/// Immutable set of registered backends
#[derive(Debug, Default)]
pub struct ModelRegistry {
    backends: Vec<RegisteredBackend>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend; identifiers must be unique
    pub fn register(&mut self, backend: Arc<dyn TranslationBackend>) -> Result<()> {
        if self.backends.iter().any(|b| b.id() == backend.id()) {
            return Err(anyhow!("Backend '{}' is already registered", backend.id()));
        }

        let priority = self.backends.len();
        debug!(
            "Registered backend '{}' (priority {}) for {:?}",
            backend.id(),
            priority,
            backend
                .directions()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        );
        self.backends.push(RegisteredBackend { priority, backend });
        Ok(())
    }

    /// Builder-style registration
    pub fn with_backend(mut self, backend: Arc<dyn TranslationBackend>) -> Result<Self> {
        self.register(backend)?;
        Ok(self)
    }

    /// Build the registry from the enabled models in the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        let default_timeout = config.execution_limits().default_timeout();

        for model in config.models.iter().filter(|m| m.enabled) {
            let backend = RemoteModelBackend::new(
                model.id.clone(),
                model.model_name.clone(),
                model.family,
                model.directions.clone(),
                &model.endpoint,
                model.effective_timeout(default_timeout),
            )?;
            registry.register(Arc::new(backend))?;
        }

        if registry.is_empty() {
            warn!("No translation models are enabled in the configuration");
        } else {
            info!("Loaded {} translation model(s)", registry.len());
        }

        Ok(registry)
    }

    /// Backends supporting exactly `direction`, in registration order
    pub fn active_backends(&self, direction: &Direction) -> Vec<RegisteredBackend> {
        let active: Vec<RegisteredBackend> = self
            .backends
            .iter()
            .filter(|b| b.backend.supports(direction))
            .cloned()
            .collect();

        debug!(
            "Active backends for {}: {:?}",
            direction,
            active.iter().map(|b| b.id()).collect::<Vec<_>>()
        );
        active
    }

    /// Whether any backend supports `direction`
    pub fn supports(&self, direction: &Direction) -> bool {
        self.backends.iter().any(|b| b.backend.supports(direction))
    }

    /// All registered backends in registration order
    pub fn backends(&self) -> &[RegisteredBackend] {
        &self.backends
    }

    /// Look up a backend by identifier
    pub fn get(&self, id: &str) -> Option<&RegisteredBackend> {
        self.backends.iter().find(|b| b.id() == id)
    }

    /// Registration priority of a backend, if registered
    pub fn priority_of(&self, id: &str) -> Option<usize> {
        self.get(id).map(|b| b.priority)
    }

    /// Every distinct direction served by at least one backend (base codes)
    pub fn directions(&self) -> Vec<Direction> {
        let mut seen = HashSet::new();
        let mut directions = Vec::new();
        for registered in &self.backends {
            for direction in registered.backend.directions() {
                let base = direction.base();
                if seen.insert(base.clone()) {
                    directions.push(base);
                }
            }
        }
        directions
    }

    /// Number of registered backends
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backend is registered
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
