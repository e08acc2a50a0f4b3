/*!
 * Backend invocation limits.
 *
 * `ExecutionLimits` bounds a whole stage: the per-call timeout and how many
 * backend calls are in flight at once. On top of that each model family
 * carries an `InvocationProfile` capping the calls one model server takes
 * at the same time, since inference cost differs a lot between families.
 */

use std::time::Duration;

use crate::providers::ModelFamily;

/// Family-specific invocation defaults
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationProfile {
    /// Calls a single model of this family may serve at once
    pub max_in_flight: usize,
}

impl InvocationProfile {
    /// Get the default profile for a model family
    pub fn for_family(family: ModelFamily) -> Self {
        let max_in_flight = match family {
            // Small bilingual models answer quickly
            ModelFamily::Marian => 8,
            ModelFamily::M2m100 => 4,
            ModelFamily::Mbart50ManyToOne | ModelFamily::Mbart50OneToMany => 2,
        };
        Self { max_in_flight }
    }
}

/// Request-wide execution limits applied by the executor
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionLimits {
    default_timeout: Duration,
    max_concurrent_requests: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(60),
            max_concurrent_requests: 4,
        }
    }
}

impl ExecutionLimits {
    /// Create limits, clamping concurrency to at least one call
    pub fn new(default_timeout: Duration, max_concurrent_requests: usize) -> Self {
        Self {
            default_timeout,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Timeout applied to backends that do not declare their own
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Maximum backend calls in flight for one stage, never zero
    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }
}
