/*!
 * Round-trip memoization.
 *
 * Two backends often produce the same candidate text. Back-translating it
 * again would only repeat identical work, so the evaluation keeps the
 * round-trip report of every distinct candidate text it has seen.
 */

use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::language_utils::Direction;
use crate::translation::candidates::RoundTripReport;

/// Cache key: candidate text plus the direction it is translated back along
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Candidate text
    text: String,

    /// Reverse direction (base codes)
    direction: Direction,
}

impl CacheKey {
    fn new(text: &str, direction: &Direction) -> Self {
        Self {
            text: text.to_string(),
            direction: direction.base(),
        }
    }
}

/// Cache of round-trip reports keyed by candidate text
#[derive(Debug, Clone, Default)]
pub struct RoundTripCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<CacheKey, RoundTripReport>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,
}

impl RoundTripCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the report for `text` translated back along `direction`
    pub fn get(&self, text: &str, direction: &Direction) -> Option<RoundTripReport> {
        let key = CacheKey::new(text, direction);
        let cached = self.cache.read().get(&key).cloned();

        match cached {
            Some(report) => {
                *self.hits.write() += 1;
                debug!("Round-trip cache hit for '{}' ({})", truncate_text(text, 30), direction);
                Some(report)
            }
            None => {
                *self.misses.write() += 1;
                None
            }
        }
    }

    /// Whether a report for `text` is already stored, without touching the counters
    pub fn contains(&self, text: &str, direction: &Direction) -> bool {
        self.cache.read().contains_key(&CacheKey::new(text, direction))
    }

    /// Store the report for `text`
    pub fn store(&self, text: &str, direction: &Direction, report: RoundTripReport) {
        self.cache.write().insert(CacheKey::new(text, direction), report);
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear entries and counters
    pub fn clear(&self) {
        self.cache.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;
    }

    /// Number of distinct texts stored
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
