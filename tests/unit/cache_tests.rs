/*!
 * Tests for round-trip memoization
 */

use vertimas::errors::BackendError;
use vertimas::language_utils::Direction;
use vertimas::translation::{RoundTripCache, RoundTripReport};

use crate::common::{GOOD_CANDIDATE, SOURCE, en_lt};

fn report(texts: &[&str]) -> RoundTripReport {
    RoundTripReport {
        texts: texts.iter().map(|t| t.to_string()).collect(),
        failures: Vec::new(),
        calls: texts.len(),
    }
}

#[test]
fn test_cache_store_shouldReturnStoredReport() {
    let cache = RoundTripCache::new();
    cache.store(GOOD_CANDIDATE, &en_lt(), report(&[SOURCE]));

    assert_eq!(cache.get(GOOD_CANDIDATE, &en_lt()), Some(report(&[SOURCE])));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_get_withOtherDirection_shouldMiss() {
    let cache = RoundTripCache::new();
    cache.store(GOOD_CANDIDATE, &en_lt(), report(&[SOURCE]));

    assert!(cache.get(GOOD_CANDIDATE, &en_lt().reverse()).is_none());
    assert!(cache.get("Good evening", &en_lt()).is_none());
}

#[test]
fn test_cache_get_withRegionTaggedDirection_shouldHit() {
    let cache = RoundTripCache::new();
    cache.store(GOOD_CANDIDATE, &Direction::new("en_XX", "lt_LT"), report(&[SOURCE]));

    assert!(cache.contains(GOOD_CANDIDATE, &en_lt()));
    assert!(cache.get(GOOD_CANDIDATE, &en_lt()).is_some());
}

#[test]
fn test_cache_stats_shouldCountHitsAndMisses() {
    let cache = RoundTripCache::new();
    cache.store("a", &en_lt(), report(&["x"]));

    cache.get("a", &en_lt());
    cache.get("a", &en_lt());
    cache.get("b", &en_lt());
    // contains() leaves the counters alone
    cache.contains("b", &en_lt());

    let (hits, misses, rate) = cache.stats();
    assert_eq!(hits, 2);
    assert_eq!(misses, 1);
    assert!((rate - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_cache_clear_shouldResetEverything() {
    let cache = RoundTripCache::new();
    cache.store("a", &en_lt(), report(&["x"]));
    cache.get("a", &en_lt());

    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.stats(), (0, 0, 0.0));
}

#[test]
fn test_cache_clone_shouldShareStorage() {
    let cache = RoundTripCache::new();
    let shared = cache.clone();

    let mut failed = report(&["x"]);
    failed.failures.push(BackendError::Invocation {
        backend: "m2m100_418M".to_string(),
        message: "out of memory".to_string(),
    });
    cache.store("a", &en_lt(), failed.clone());

    assert_eq!(shared.get("a", &en_lt()), Some(failed));
}
