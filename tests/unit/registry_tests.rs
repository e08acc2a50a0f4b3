/*!
 * Tests for the model registry
 */

use std::sync::Arc;
use std::time::Duration;

use vertimas::app_config::Config;
use vertimas::language_utils::Direction;
use vertimas::providers::{MockBackend, TranslationBackend};
use vertimas::translation::ModelRegistry;

use crate::common::{self, en_lt, lt_en};

#[test]
fn test_fromConfig_withDefaultCatalogue_shouldServeBothDirections() {
    let registry = ModelRegistry::from_config(&Config::default()).unwrap();

    assert_eq!(registry.len(), 6);
    assert_eq!(registry.active_backends(&lt_en()).len(), 4);
    assert_eq!(registry.active_backends(&en_lt()).len(), 4);
    assert!(!registry.supports(&Direction::new("lt", "de")));
}

#[test]
fn test_fromConfig_shouldSkipDisabledModels() {
    let mut config = Config::default();
    for model in config.models.iter_mut().filter(|m| m.id.starts_with("m2m100")) {
        model.enabled = false;
    }

    let registry = ModelRegistry::from_config(&config).unwrap();
    assert_eq!(registry.len(), 4);
    assert!(registry.get("m2m100_418M").is_none());
    assert_eq!(registry.priority_of("mbart50_m2en"), Some(3));
}

#[test]
fn test_fromConfig_withInvalidEndpoint_shouldFail() {
    let mut config = Config::default();
    config.models[0].endpoint = "http://[::1".to_string();
    assert!(ModelRegistry::from_config(&config).is_err());
}

#[test]
fn test_activeBackends_shouldMatchRegionTaggedDirections() {
    let registry = common::registry_of(vec![
        MockBackend::working("marian", &[lt_en()]),
        MockBackend::working("mbart", &[Direction::new("lt_LT", "en_XX")]),
        MockBackend::working("reverse_only", &[en_lt()]),
    ]);

    let ids: Vec<String> = registry
        .active_backends(&lt_en())
        .iter()
        .map(|b| b.id().to_string())
        .collect();
    assert_eq!(ids, vec!["marian", "mbart"]);
}

#[test]
fn test_activeBackends_withNoMatch_shouldBeEmpty() {
    let registry = common::registry_of(vec![MockBackend::working("marian", &[lt_en()])]);
    assert!(registry.active_backends(&en_lt()).is_empty());
    assert!(!registry.supports(&en_lt()));
}

#[test]
fn test_register_shouldAssignPrioritiesInOrder() {
    let mut registry = ModelRegistry::new();
    for id in ["c", "a", "b"] {
        registry
            .register(Arc::new(MockBackend::working(id, &[lt_en()])))
            .unwrap();
    }

    let priorities: Vec<(String, usize)> = registry
        .backends()
        .iter()
        .map(|b| (b.id().to_string(), b.priority))
        .collect();
    assert_eq!(
        priorities,
        vec![("c".to_string(), 0), ("a".to_string(), 1), ("b".to_string(), 2)]
    );
}

#[test]
fn test_directions_shouldListEachBaseDirectionOnce() {
    let registry = ModelRegistry::from_config(&Config::default()).unwrap();
    assert_eq!(registry.directions(), vec![lt_en(), en_lt()]);
}

#[test]
fn test_fromConfig_withExecutionTimeout_shouldApplyItToEveryModel() {
    let mut config = Config::default();
    config.execution.timeout_secs = 1;

    let registry = ModelRegistry::from_config(&config).unwrap();
    for registered in registry.backends() {
        assert_eq!(
            registered.backend.timeout(),
            Some(Duration::from_secs(1)),
            "backend {}",
            registered.id()
        );
    }
}

#[test]
fn test_fromConfig_withModelTimeout_shouldOverrideExecutionTimeout() {
    let mut config = Config::default();
    config.execution.timeout_secs = 1;
    config.models[0].timeout_secs = Some(5);
    config.models[1].timeout_secs = Some(0);

    let registry = ModelRegistry::from_config(&config).unwrap();
    let first = registry.get(&config.models[0].id).unwrap();
    let second = registry.get(&config.models[1].id).unwrap();
    assert_eq!(first.backend.timeout(), Some(Duration::from_secs(5)));
    assert_eq!(second.backend.timeout(), Some(Duration::from_secs(1)));
}
