//! End-to-end pipeline tests.
//!
//! Loads the sample quiz banks and submissions from disk, grades them through
//! the engine and an in-memory store, and renders the gradebook.

use std::path::Path;
use std::sync::Arc;

use quizmark_core::engine::{GradingEngine, GradingEngineConfig, NoopReporter};
use quizmark_core::model::Normalization;
use quizmark_core::parser::{load_submissions, parse_quiz, validate_quiz};
use quizmark_core::report::GradeReport;
use quizmark_core::store::{GradeStore, MemoryGradeStore};
use quizmark_report::html::generate_html;

async fn grade(quiz: &str, submissions: &str) -> (Arc<MemoryGradeStore>, GradeReport) {
    let quiz = parse_quiz(Path::new(quiz)).unwrap();
    assert!(validate_quiz(&quiz).is_empty());
    let submissions = load_submissions(Path::new(submissions)).unwrap();

    let store = Arc::new(MemoryGradeStore::new());
    let engine = GradingEngine::new(store.clone(), GradingEngineConfig::default());
    let report = engine
        .run(&quiz, &submissions, &NoopReporter)
        .await
        .unwrap();
    (store, report)
}

#[tokio::test]
async fn e2e_scoring_basics() {
    let (store, report) = grade(
        "../../quiz-banks/scoring-basics.toml",
        "../../submissions/scoring-basics",
    )
    .await;

    assert_eq!(report.quiz.max_score, 12.0);
    assert_eq!(report.quiz.passing_score, 60.0);
    let ids: Vec<&str> = report.attempts.iter().map(|a| a.attempt_id.as_str()).collect();
    assert_eq!(ids, vec!["alice-1", "bob-1", "carol-1", "carol-2"]);

    let alice = &report.attempts[0];
    assert_eq!(alice.summary.score, 12.0);
    assert!(alice.summary.is_passed);
    assert_eq!(alice.summary.feedback.as_deref(), Some("Excellent work!"));
    let essay = alice
        .responses
        .iter()
        .find(|r| r.question_id == "explain")
        .unwrap();
    assert!(essay.graded);
    assert!(essay.is_correct);
    assert_eq!(essay.feedback, "Clear and complete.");
    assert_eq!(essay.graded_by.as_deref(), Some("prof-lee"));

    let bob = &report.attempts[1];
    assert_eq!(bob.summary.score, 1.0);
    assert!(!bob.summary.is_passed);
    assert_eq!(bob.summary.ungraded, 1);
    let primes = bob.responses.iter().find(|r| r.question_id == "primes").unwrap();
    assert_eq!(primes.points_earned, 1.0);
    assert!(!primes.is_correct);

    // Neutral selection is ignored; the essay grade is below full marks.
    let carol = &report.attempts[2];
    assert_eq!(carol.summary.score, 8.0);
    assert!(carol.summary.is_passed);
    assert_eq!(carol.attempt_number, 1);
    assert_eq!(report.attempts[3].attempt_number, 2);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].attempt_id, "carol-3");
    assert!(report.failures[0].error.contains("attempt"));

    // Rejected attempts never reach the store.
    assert_eq!(store.len().await, 16);
    assert!(store.response("carol-3:capital").await.is_err());

    assert_eq!(report.statistics.attempts, 4);
    assert_eq!(report.statistics.pass_rate, 0.75);
    let capital = &report.statistics.per_question[0];
    assert_eq!(capital.correct_rate, 0.75);
    assert!(capital.suggested_normalization.is_none());
    // Partial-credit points 4, 1, 2, 4.
    let primes = &report.statistics.per_question[1];
    assert_eq!(primes.mean_points, 2.75);
    assert!(matches!(
        primes.suggested_normalization,
        Some(Normalization::ZScore { .. })
    ));
}

#[tokio::test]
async fn e2e_essays_with_rubric() {
    let (store, report) = grade("../../quiz-banks/essays.toml", "../../submissions/essays").await;

    let dan = &report.attempts[0];
    assert_eq!(dan.summary.score, 23.0);
    assert!(dan.summary.is_passed);
    assert!(dan.errors.is_empty());

    let design = &dan.responses[0];
    assert_eq!(design.points_earned, 16.0);
    assert_eq!(design.criterion_feedback.len(), 2);
    assert_eq!(
        design.criterion_feedback[0].performance_level.as_deref(),
        Some("Sound")
    );

    let stored = store.response("dan-1:design").await.unwrap();
    assert!(stored.is_graded());

    let erin = &report.attempts[1];
    assert_eq!(erin.summary.score, 0.0);
    assert_eq!(erin.summary.ungraded, 2);
    assert!(erin.responses.iter().all(|r| !r.graded));
}

#[tokio::test]
async fn e2e_report_roundtrip_and_html() {
    let (_, report) = grade(
        "../../quiz-banks/scoring-basics.toml",
        "../../submissions/scoring-basics",
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grades.json");
    report.save_json(&path).unwrap();
    let loaded = GradeReport::load_json(&path).unwrap();
    assert_eq!(loaded.attempts.len(), report.attempts.len());

    // Regrading the same submissions changes nothing.
    let regrade = loaded.compare(&report, 0.0);
    assert!(!regrade.has_regressions());
    assert_eq!(regrade.unchanged, 4);

    let html = generate_html(&loaded);
    assert!(html.contains("Scoring Basics"));
    assert!(html.contains("carol-2"));
    assert!(html.contains("carol-3"));
}
