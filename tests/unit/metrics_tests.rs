/*!
 * Tests for BLEU, chrF, BERTScore and hybrid weighting
 */

use vertimas::errors::MetricError;
use vertimas::translation::quality::metrics::{
    average_bert_f1, average_bleu, average_chrf, score_pair,
};
use vertimas::translation::quality::{
    EmbeddingBertScorer, HashedEmbedder, HybridWeights, SemanticScorer, sentence_bleu, sentence_chrf,
};

use crate::common::{CountingScorer, FailingScorer, GOOD_CANDIDATE, SOURCE};

const PAIRS: &[(&str, &str)] = &[
    ("Labas vakaras, kaip sekasi?", "Labas vakaras, kaip sekasi?"),
    ("Labas vakaras kaip", "Labas vakaras, kaip sekasi?"),
    ("Sveiki", "Labas vakaras, kaip sekasi?"),
    ("", "Labas vakaras"),
    ("Labas", ""),
    ("Ačiū labai, viskas gerai.", "Ačiū, gerai."),
    ("1.5 - 2", "1.5-2"),
];

#[test]
fn test_sentenceBleu_shouldStayWithinBounds() {
    for (hyp, reference) in PAIRS {
        let score = sentence_bleu(hyp, reference);
        assert!((0.0..=100.0).contains(&score), "bleu {} for {:?}", score, hyp);
    }
}

#[test]
fn test_sentenceChrf_shouldStayWithinBounds() {
    for (hyp, reference) in PAIRS {
        let score = sentence_chrf(hyp, reference);
        assert!((0.0..=100.0).contains(&score), "chrf {} for {:?}", score, hyp);
    }
}

#[tokio::test]
async fn test_bertScore_shouldStayWithinBounds() {
    let scorer = EmbeddingBertScorer::default();
    let hypotheses: Vec<String> = PAIRS.iter().map(|(h, _)| h.to_string()).collect();
    let references: Vec<String> = PAIRS.iter().map(|(_, r)| r.to_string()).collect();

    let scores = scorer.f1_batch(&hypotheses, &references, "lt").await.unwrap();
    assert_eq!(scores.len(), PAIRS.len());
    for score in scores {
        assert!((0.0..=1.0).contains(&score));
    }
}

#[test]
fn test_sentenceBleu_withIdenticalRoundTrip_shouldBe100() {
    assert!((sentence_bleu(SOURCE, SOURCE) - 100.0).abs() < 1e-9);
}

#[test]
fn test_sentenceBleu_withDisjointRoundTrip_shouldBeZero() {
    assert_eq!(sentence_bleu("Good evening", SOURCE), 0.0);
}

#[test]
fn test_sentenceChrf_shouldRewardPartialWordOverlap() {
    // Word BLEU sees no shared unigram here, chrF still sees the stems
    let hypothesis = "Namai dideli";
    let reference = "Namas didelis";
    assert_eq!(sentence_bleu(hypothesis, reference), 0.0);
    assert!(sentence_chrf(hypothesis, reference) > 0.0);
}

#[tokio::test]
async fn test_bertScore_withIdenticalText_shouldBeOne() {
    let scorer = EmbeddingBertScorer::default();
    let (precision, recall, f1) = scorer.score_pair(SOURCE, SOURCE, "lt").unwrap();
    assert!((precision - 1.0).abs() < 1e-4);
    assert!((recall - 1.0).abs() < 1e-4);
    assert!((f1 - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_bertScore_withParaphrase_shouldBeatUnrelatedText() {
    let scorer = EmbeddingBertScorer::default();
    let (_, _, close) = scorer
        .score_pair("Labas vakaras, kaip tau sekasi?", SOURCE, "lt")
        .unwrap();
    let (_, _, far) = scorer.score_pair("Šiandien lyja lietus", SOURCE, "lt").unwrap();
    assert!(close > far);
}

#[tokio::test]
async fn test_bertScore_withMismatchedBatches_shouldFail() {
    let scorer = EmbeddingBertScorer::default();
    let err = scorer
        .f1_batch(&["a".to_string()], &[], "lt")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MetricError::LengthMismatch {
            hypotheses: 1,
            references: 0
        }
    );

    let err = scorer.f1_batch(&[], &[], "lt").await.unwrap_err();
    assert_eq!(err, MetricError::EmptyBatch);
}

#[tokio::test]
async fn test_bertScore_withZeroDimension_shouldReportUnavailableModel() {
    let scorer = EmbeddingBertScorer::new(HashedEmbedder::new(0));
    let err = scorer
        .f1_batch(&["Labas".to_string()], &["Labas".to_string()], "lt")
        .await
        .unwrap_err();
    assert!(matches!(err, MetricError::ModelUnavailable(_)));
}

#[test]
fn test_averages_shouldMeanOverRoundTrips() {
    let round_trips = vec![SOURCE.to_string(), "Sveiki".to_string()];
    let expected_bleu = (sentence_bleu(SOURCE, SOURCE) + sentence_bleu("Sveiki", SOURCE)) / 2.0;
    let expected_chrf = (sentence_chrf(SOURCE, SOURCE) + sentence_chrf("Sveiki", SOURCE)) / 2.0;

    assert!((average_bleu(&round_trips, SOURCE) - expected_bleu).abs() < 1e-9);
    assert!((average_chrf(&round_trips, SOURCE) - expected_chrf).abs() < 1e-9);
    assert_eq!(average_bleu(&[], SOURCE), 0.0);
}

#[tokio::test]
async fn test_averageBertF1_withEmptyRoundTrips_shouldNotCallScorer() {
    let scorer = CountingScorer::default();
    assert_eq!(average_bert_f1(&scorer, &[], SOURCE, "lt").await.unwrap(), 0.0);
    assert_eq!(scorer.calls(), 0);

    average_bert_f1(&scorer, &[SOURCE.to_string()], SOURCE, "lt")
        .await
        .unwrap();
    assert_eq!(scorer.calls(), 1);
}

#[tokio::test]
async fn test_scorePair_withFailingScorer_shouldZeroBertAndReportError() {
    let weights = HybridWeights::default();
    let (bundle, error) = score_pair(&FailingScorer::default(), SOURCE, SOURCE, "lt", &weights).await;

    assert!(matches!(error, Some(MetricError::ModelUnavailable(_))));
    assert_eq!(bundle.bert_f1, 0.0);
    assert!((bundle.hybrid - weights.combine(100.0, 0.0, 100.0)).abs() < 1e-9);
}

#[tokio::test]
async fn test_scorePair_withDifferentTexts_shouldScoreBelowPerfect() {
    let (bundle, error) = score_pair(
        &EmbeddingBertScorer::default(),
        GOOD_CANDIDATE,
        "Good evening, how have you been?",
        "en",
        &HybridWeights::default(),
    )
    .await;

    assert!(error.is_none());
    assert!(bundle.hybrid > 0.0);
    assert!(bundle.hybrid < 100.0);
}
