/*!
 * Back-translation engine.
 *
 * Translates forward candidates back into the source language with every
 * backend serving the reverse direction. The round-trip texts are what the
 * metrics compare against the original source.
 */

use log::{debug, warn};
use std::collections::HashMap;

use crate::language_utils::Direction;
use crate::translation::cache::RoundTripCache;
use crate::translation::candidates::{CandidateSet, RoundTripReport};
use crate::translation::executor::{Invocation, TranslationExecutor};
use crate::translation::registry::ModelRegistry;

/// Produces round-trip texts for forward candidates
#[derive(Debug, Clone, Default)]
pub struct BackTranslationEngine {
    executor: TranslationExecutor,
}

impl BackTranslationEngine {
    /// Create an engine that invokes reverse backends through `executor`
    pub fn new(executor: TranslationExecutor) -> Self {
        Self { executor }
    }

    /// Whether any backend can translate back along `forward_direction`
    pub fn has_reverse_backends(&self, registry: &ModelRegistry, forward_direction: &Direction) -> bool {
        registry.supports(&forward_direction.reverse())
    }

    /// Translate one candidate back along the reverse of `forward_direction`.
    ///
    /// Returns an empty report when no reverse backend exists.
    pub async fn round_trip(
        &self,
        registry: &ModelRegistry,
        candidate_text: &str,
        forward_direction: &Direction,
    ) -> RoundTripReport {
        let mut reports = self
            .round_trip_texts(registry, &[candidate_text.to_string()], forward_direction)
            .await;
        reports.pop().unwrap_or_default()
    }

    /// Round trips for every candidate, keyed by backend id.
    ///
    /// Candidates sharing the same text share one round trip, and texts
    /// already present in `cache` are not translated again.
    pub async fn round_trip_candidates(
        &self,
        registry: &ModelRegistry,
        candidates: &CandidateSet,
        forward_direction: &Direction,
        cache: &RoundTripCache,
    ) -> HashMap<String, RoundTripReport> {
        let reverse = forward_direction.reverse();

        let mut pending: Vec<String> = Vec::new();
        for candidate in candidates.iter() {
            if !cache.contains(&candidate.text, &reverse) && !pending.contains(&candidate.text) {
                pending.push(candidate.text.clone());
            }
        }

        if !pending.is_empty() {
            let reports = self.round_trip_texts(registry, &pending, forward_direction).await;
            for (text, report) in pending.iter().zip(reports) {
                cache.store(text, &reverse, report);
            }
        }

        candidates
            .iter()
            .map(|candidate| {
                let report = cache.get(&candidate.text, &reverse).unwrap_or_default();
                (candidate.backend_id.clone(), report)
            })
            .collect()
    }

    /// One report per input text, in input order
    async fn round_trip_texts(
        &self,
        registry: &ModelRegistry,
        texts: &[String],
        forward_direction: &Direction,
    ) -> Vec<RoundTripReport> {
        let reverse = forward_direction.reverse();
        let reverse_backends = registry.active_backends(&reverse);
        let mut reports = vec![RoundTripReport::default(); texts.len()];

        if reverse_backends.is_empty() {
            debug!("No reverse backends for {}, round trip is empty", reverse);
            return reports;
        }

        let invocations = texts
            .iter()
            .enumerate()
            .flat_map(|(slot, text)| {
                reverse_backends.iter().map(move |backend| Invocation {
                    slot,
                    backend: backend.clone(),
                    text: text.clone(),
                })
            })
            .collect();

        for outcome in self.executor.invoke(invocations, &reverse).await {
            let report = &mut reports[outcome.slot];
            report.calls += 1;
            match outcome.result {
                Ok(text) => report.texts.push(text),
                Err(e) => {
                    warn!("Excluding backend from back-translation: {}", e);
                    report.failures.push(e);
                }
            }
        }

        debug!(
            "Back-translated {} text(s) with {} reverse backend(s)",
            texts.len(),
            reverse_backends.len()
        );
        reports
    }
}
