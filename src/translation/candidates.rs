/*!
 * Candidate and round-trip collections.
 */

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use crate::errors::BackendError;

/// One forward translation produced by one backend
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Identifier of the backend that produced it
    pub backend_id: String,
    /// Registration priority of that backend (tie-break order)
    pub priority: usize,
    /// Translated text
    pub text: String,
}

/// Backend id -> candidate translation.
///
/// Entries are unique per backend and kept in priority order, so iteration
/// is deterministic no matter in which order concurrent calls finished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from (backend id, text) pairs; priority follows the order given
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (priority, (id, text)) in pairs.into_iter().enumerate() {
            set.insert(id, priority, text);
        }
        set
    }

    /// Insert or replace the candidate of a backend
    pub fn insert(&mut self, backend_id: impl Into<String>, priority: usize, text: impl Into<String>) {
        let backend_id = backend_id.into();
        self.candidates.retain(|c| c.backend_id != backend_id);

        let position = self
            .candidates
            .iter()
            .position(|c| c.priority > priority)
            .unwrap_or(self.candidates.len());
        self.candidates.insert(
            position,
            Candidate {
                backend_id,
                priority,
                text: text.into(),
            },
        );
    }

    /// Candidate text of a backend
    pub fn get(&self, backend_id: &str) -> Option<&str> {
        self.candidates
            .iter()
            .find(|c| c.backend_id == backend_id)
            .map(|c| c.text.as_str())
    }

    /// Whether `text` is one of the candidate values
    pub fn contains_text(&self, text: &str) -> bool {
        self.candidates.iter().any(|c| c.text == text)
    }

    /// Candidates in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// Longest candidate by character count; the first one wins ties
    pub fn longest(&self) -> Option<&Candidate> {
        self.candidates.iter().fold(None, |best: Option<&Candidate>, c| match best {
            Some(b) if b.text.chars().count() >= c.text.chars().count() => Some(b),
            _ => Some(c),
        })
    }

    /// Plain map view for callers
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.candidates
            .iter()
            .map(|c| (c.backend_id.clone(), c.text.clone()))
            .collect()
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl Serialize for CandidateSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.candidates.len()))?;
        for candidate in &self.candidates {
            map.serialize_entry(&candidate.backend_id, &candidate.text)?;
        }
        map.end()
    }
}

/// Outcome of the forward stage
#[derive(Debug, Clone, Default)]
pub struct ForwardTranslation {
    /// Candidates that were produced
    pub candidates: CandidateSet,
    /// Backends that were excluded, and why
    pub failures: Vec<BackendError>,
}

/// Round-trip texts for one forward candidate
pub type RoundTripSet = Vec<String>;

/// Outcome of back-translating one candidate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundTripReport {
    /// Back-translated texts in reverse-backend priority order
    pub texts: RoundTripSet,
    /// Reverse backends that were excluded, and why
    pub failures: Vec<BackendError>,
    /// Backend calls made
    pub calls: usize,
}

impl RoundTripReport {
    /// Whether no round-trip text was produced
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
