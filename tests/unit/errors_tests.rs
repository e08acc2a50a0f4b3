/*!
 * Tests for error types and conversions
 */

use std::time::Duration;

use vertimas::errors::{AppError, BackendError, MetricError, TranslationError};
use vertimas::language_utils::Direction;

#[test]
fn test_backendError_timeout_shouldDisplayBackendAndDuration() {
    let error = BackendError::Timeout {
        backend: "m2m100_1.2B".to_string(),
        timeout: Duration::from_secs(5),
    };
    let display = error.to_string();
    assert!(display.contains("m2m100_1.2B"));
    assert!(display.contains("5s"));
    assert!(error.is_timeout());
    assert_eq!(error.backend(), "m2m100_1.2B");
}

#[test]
fn test_backendError_unsupportedDirection_shouldNameDirection() {
    let error = BackendError::UnsupportedDirection {
        backend: "lt_en".to_string(),
        direction: Direction::new("en", "lt"),
    };
    assert!(error.to_string().contains("en-lt"));
    assert!(!error.is_timeout());
}

#[test]
fn test_metricError_lengthMismatch_shouldDisplayBothLengths() {
    let error = MetricError::LengthMismatch {
        hypotheses: 2,
        references: 3,
    };
    let display = error.to_string();
    assert!(display.contains('2'));
    assert!(display.contains('3'));
}

#[test]
fn test_translationError_noModel_shouldMentionDirection() {
    let unsupported = TranslationError::NoSupportedModel {
        direction: Direction::new("de", "lt"),
    };
    let exhausted = TranslationError::NoCandidatesProduced {
        direction: Direction::new("lt", "en"),
        failures: 3,
    };

    assert!(unsupported.to_string().contains("No model available for de-lt"));
    assert!(exhausted.to_string().contains("No model available for lt-en"));
    assert!(unsupported.is_no_model_available());
    assert!(exhausted.is_no_model_available());
    assert!(!TranslationError::EmptyInput.is_no_model_available());
}

#[test]
fn test_appError_fromTranslationError_shouldWrap() {
    let error: AppError = TranslationError::EmptyInput.into();
    assert!(matches!(error, AppError::Translation(_)));
    assert!(error.to_string().contains("Input text is empty"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "conf.json missing");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldKeepMessage() {
    let error: AppError = anyhow::anyhow!("something odd").into();
    assert!(error.to_string().contains("something odd"));
}
