/*!
 * Tests for round-trip candidate selection
 */

use std::sync::Arc;

use vertimas::errors::{AbsorbedError, MetricKind, Stage};
use vertimas::providers::MockBackend;
use vertimas::translation::quality::{
    CandidateSelector, SelectionMethod, SelectionStrategy, SemanticScorer,
};
use vertimas::translation::{BackTranslationEngine, CandidateSet, ModelRegistry};

use crate::common::{
    self, CountingScorer, FailingScorer, GOOD_CANDIDATE, POOR_CANDIDATE, SOURCE, en_lt, lt_en,
};

fn selector(
    registry: ModelRegistry,
    scorer: Arc<dyn SemanticScorer>,
    strategy: SelectionStrategy,
) -> CandidateSelector {
    CandidateSelector::new(
        Arc::new(registry),
        BackTranslationEngine::default(),
        scorer,
        strategy,
    )
}

fn scenario_candidates() -> CandidateSet {
    CandidateSet::from_pairs([("marian_lt_en", GOOD_CANDIDATE), ("m2m100_lt_en", POOR_CANDIDATE)])
}

#[tokio::test]
async fn test_selectBest_withReverseBackends_shouldPreferFaithfulCandidate() {
    let scorer = Arc::new(CountingScorer::default());
    let selection = selector(
        common::registry_of(common::reverse_backends()),
        scorer.clone(),
        SelectionStrategy::default(),
    )
    .select_best(&scenario_candidates(), SOURCE, &lt_en())
    .await
    .unwrap();

    assert_eq!(selection.best_text, GOOD_CANDIDATE);
    assert_eq!(selection.best_backend_id, "marian_lt_en");
    assert_eq!(selection.method, SelectionMethod::Hybrid);
    assert!(!selection.degraded);
    assert!(selection.scores[0].scores.hybrid > selection.scores[1].scores.hybrid);
    assert_eq!(scorer.calls(), 2);
    assert!(selection.absorbed.is_empty());
}

#[tokio::test]
async fn test_selectBest_withoutReverseBackends_shouldPickLongestWithoutScoring() {
    let scorer = Arc::new(FailingScorer::default());
    let candidates = CandidateSet::from_pairs([("short", POOR_CANDIDATE), ("long", GOOD_CANDIDATE)]);

    let selection = selector(
        common::registry_of(common::forward_backends()),
        scorer.clone(),
        SelectionStrategy::default(),
    )
    .select_best(&candidates, SOURCE, &lt_en())
    .await
    .unwrap();

    assert_eq!(selection.best_text, GOOD_CANDIDATE);
    assert_eq!(selection.method, SelectionMethod::LongestFallback);
    assert!(selection.degraded);
    assert!(selection.scores.is_empty());
    assert_eq!(selection.round_trip_calls, 0);
    assert_eq!(scorer.calls(), 0);
}

#[tokio::test]
async fn test_selectBest_withEqualLengthsAndNoReverse_shouldKeepFirst() {
    let candidates = CandidateSet::from_pairs([("first", "abc"), ("second", "xyz")]);
    let selection = selector(
        ModelRegistry::new(),
        Arc::new(CountingScorer::default()),
        SelectionStrategy::default(),
    )
    .select_best(&candidates, SOURCE, &lt_en())
    .await
    .unwrap();

    assert_eq!(selection.best_backend_id, "first");
}

#[tokio::test]
async fn test_selectBest_withLongestByChars_shouldCountCharactersNotBytes() {
    // "ąčęėįšųūž" is 9 chars but 18 bytes
    let candidates = CandidateSet::from_pairs([("bytes", "ąčęėįšųūž"), ("chars", "abcdefghij")]);
    let selection = selector(
        ModelRegistry::new(),
        Arc::new(CountingScorer::default()),
        SelectionStrategy::Longest,
    )
    .select_best(&candidates, SOURCE, &lt_en())
    .await
    .unwrap();

    assert_eq!(selection.best_backend_id, "chars");
}

#[tokio::test]
async fn test_selectBest_repeatedCalls_shouldReturnSameWinner() {
    let selector = selector(
        common::registry_of(common::reverse_backends()),
        Arc::new(CountingScorer::default()),
        SelectionStrategy::default(),
    );
    let candidates = scenario_candidates();

    let first = selector.select_best(&candidates, SOURCE, &lt_en()).await.unwrap();
    for _ in 0..5 {
        let again = selector.select_best(&candidates, SOURCE, &lt_en()).await.unwrap();
        assert_eq!(again.best_backend_id, first.best_backend_id);
        assert_eq!(again.best_text, first.best_text);
    }
}

#[tokio::test]
async fn test_selectBest_winner_shouldBeOneOfTheCandidates() {
    let candidates = CandidateSet::from_pairs([
        ("a", "Good evening"),
        ("b", "Evening, how are you"),
        ("c", "How is it going?"),
    ]);

    for strategy in [SelectionStrategy::default(), SelectionStrategy::BleuOnly, SelectionStrategy::Longest] {
        let selection = selector(
            common::registry_of(common::reverse_backends()),
            Arc::new(CountingScorer::default()),
            strategy,
        )
        .select_best(&candidates, SOURCE, &lt_en())
        .await
        .unwrap();

        assert!(candidates.contains_text(&selection.best_text));
        assert_eq!(candidates.get(&selection.best_backend_id), Some(selection.best_text.as_str()));
    }
}

#[tokio::test]
async fn test_selectBest_shouldCallEachReverseBackendOncePerCandidate() {
    let reverse = common::reverse_backends();
    let counters: Vec<MockBackend> = reverse.clone();
    let candidates = CandidateSet::from_pairs([
        ("a", GOOD_CANDIDATE),
        ("b", POOR_CANDIDATE),
        ("c", "Good evening"),
    ]);

    let selection = selector(
        common::registry_of(reverse),
        Arc::new(CountingScorer::default()),
        SelectionStrategy::default(),
    )
    .select_best(&candidates, SOURCE, &lt_en())
    .await
    .unwrap();

    // N = 3 candidates, M = 2 reverse backends
    assert_eq!(selection.round_trip_calls, 6);
    for counter in &counters {
        assert_eq!(counter.request_count(), 3);
    }
}

#[tokio::test]
async fn test_selectBest_withDuplicateCandidates_shouldRoundTripTextOnce() {
    let reverse = common::reverse_backends();
    let counters = reverse.clone();
    let candidates = CandidateSet::from_pairs([("a", GOOD_CANDIDATE), ("b", GOOD_CANDIDATE)]);

    let selection = selector(
        common::registry_of(reverse),
        Arc::new(CountingScorer::default()),
        SelectionStrategy::default(),
    )
    .select_best(&candidates, SOURCE, &lt_en())
    .await
    .unwrap();

    assert_eq!(selection.best_backend_id, "a");
    assert_eq!(selection.round_trip_calls, 2);
    assert_eq!(counters[0].request_count() + counters[1].request_count(), 2);
    assert_eq!(selection.scores[0].round_trips, selection.scores[1].round_trips);
}

#[tokio::test]
async fn test_selectBest_withFailingScorer_shouldAbsorbAndStillRank() {
    let scorer = Arc::new(FailingScorer::default());
    let selection = selector(
        common::registry_of(common::reverse_backends()),
        scorer.clone(),
        SelectionStrategy::default(),
    )
    .select_best(&scenario_candidates(), SOURCE, &lt_en())
    .await
    .unwrap();

    assert_eq!(selection.best_text, GOOD_CANDIDATE);
    assert!(!selection.degraded);
    assert_eq!(scorer.calls(), 2);
    assert!(selection.scores.iter().all(|s| s.scores.bert_f1 == 0.0));

    let metric_failures: Vec<&str> = selection
        .absorbed
        .iter()
        .filter_map(|a| match a {
            AbsorbedError::Metric {
                backend_id,
                metric: MetricKind::BertScore,
                ..
            } => Some(backend_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(metric_failures, vec!["marian_lt_en", "m2m100_lt_en"]);
}

#[tokio::test]
async fn test_selectBest_withFailingReverseBackend_shouldAbsorbOncePerText() {
    let mut reverse = common::reverse_backends();
    reverse.push(MockBackend::failing("broken_en_lt", &[en_lt()]));

    let selection = selector(
        common::registry_of(reverse),
        Arc::new(CountingScorer::default()),
        SelectionStrategy::default(),
    )
    .select_best(&scenario_candidates(), SOURCE, &lt_en())
    .await
    .unwrap();

    assert_eq!(selection.best_text, GOOD_CANDIDATE);
    assert_eq!(selection.round_trip_calls, 6);
    let backend_failures = selection
        .absorbed
        .iter()
        .filter(|a| {
            matches!(
                a,
                AbsorbedError::Backend {
                    stage: Stage::BackTranslation,
                    ..
                }
            )
        })
        .count();
    assert_eq!(backend_failures, 2);
    assert!(selection.scores.iter().all(|s| s.round_trips.len() == 2));
}

#[tokio::test]
async fn test_selectBest_withAllReverseBackendsFailing_shouldScoreZeroAndKeepCandidates() {
    let scorer = Arc::new(CountingScorer::default());
    let registry = common::registry_of(vec![
        MockBackend::failing("broken_a", &[en_lt()]),
        MockBackend::failing("broken_b", &[en_lt()]),
    ]);
    let candidates = CandidateSet::from_pairs([("a", "First option"), ("b", "Second, longer option")]);

    let selection = selector(registry, scorer.clone(), SelectionStrategy::default())
        .select_best(&candidates, SOURCE, &lt_en())
        .await
        .unwrap();

    assert_eq!(selection.method, SelectionMethod::Hybrid);
    assert!(!selection.degraded);
    assert_eq!(selection.best_backend_id, "a");
    assert_eq!(selection.scores.len(), 2);
    assert!(selection.scores.iter().all(|s| s.scores.hybrid == 0.0));
    assert!(selection.scores.iter().all(|s| s.round_trips.is_empty()));
    assert_eq!(scorer.calls(), 0);

    let backend_failures = selection
        .absorbed
        .iter()
        .filter(|a| {
            matches!(
                a,
                AbsorbedError::Backend {
                    stage: Stage::BackTranslation,
                    ..
                }
            )
        })
        .count();
    assert_eq!(backend_failures, 4);
    assert_eq!(selection.absorbed.len(), 4);
}

#[tokio::test]
async fn test_selectBest_withBleuOnly_shouldNotCallSemanticScorer() {
    let scorer = Arc::new(CountingScorer::default());
    let selection = selector(
        common::registry_of(common::reverse_backends()),
        scorer.clone(),
        SelectionStrategy::BleuOnly,
    )
    .select_best(&scenario_candidates(), SOURCE, &lt_en())
    .await
    .unwrap();

    assert_eq!(selection.best_text, GOOD_CANDIDATE);
    assert_eq!(selection.method, SelectionMethod::BleuOnly);
    assert_eq!(scorer.calls(), 0);
    for score in &selection.scores {
        assert_eq!(score.scores.hybrid, score.scores.bleu);
    }
}

#[tokio::test]
async fn test_selectBest_withUnscoredCandidate_shouldRankItLast() {
    // Only the second candidate has a scripted round trip; the first gets
    // tagged echo text that shares nothing with the source
    let registry = common::registry_of(vec![
        MockBackend::working("rev", &[en_lt()]).with_response(&en_lt(), GOOD_CANDIDATE, SOURCE),
    ]);
    let candidates = CandidateSet::from_pairs([("echo", "Completely different"), ("good", GOOD_CANDIDATE)]);

    let selection = selector(registry, Arc::new(CountingScorer::default()), SelectionStrategy::default())
        .select_best(&candidates, SOURCE, &lt_en())
        .await
        .unwrap();

    assert_eq!(selection.best_backend_id, "good");
}
