//! Batch grading orchestrator.
//!
//! Grades many attempt submissions against one quiz with bounded
//! parallelism, recording every grade through a [`GradeStore`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::attempt::{check_attempt_limit, AttemptSummary};
use crate::config::QuizmarkConfig;
use crate::error::GradingError;
use crate::grading::{grade_response, GradeInput};
use crate::model::{AttemptSubmission, GradingRecord, QuestionResponse, Quiz};
use crate::report::{AttemptFailure, AttemptResult, GradeReport, QuizSummary, ResponseResult};
use crate::statistics::compute_statistics;
use crate::store::GradeStore;

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Maximum attempts graded concurrently.
    pub parallelism: usize,
    /// Identity recorded on automatic grades.
    pub grader: String,
    /// Passing percentage for quizzes without their own.
    pub default_passing_score: f64,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            grader: "quizmark".to_string(),
            default_passing_score: 70.0,
        }
    }
}

impl From<&QuizmarkConfig> for GradingEngineConfig {
    fn from(config: &QuizmarkConfig) -> Self {
        Self {
            parallelism: config.parallelism,
            grader: config.grader.clone(),
            default_passing_score: config.default_passing_score,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_attempt_start(&self, attempt_id: &str, student: &str);
    fn on_attempt_complete(&self, result: &AttemptResult);
    fn on_attempt_error(&self, attempt_id: &str, student: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_attempt_start(&self, _: &str, _: &str) {}
    fn on_attempt_complete(&self, _: &AttemptResult) {}
    fn on_attempt_error(&self, _: &str, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The batch grading engine.
pub struct GradingEngine {
    store: Arc<dyn GradeStore>,
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(store: Arc<dyn GradeStore>, config: GradingEngineConfig) -> Self {
        Self { store, config }
    }

    /// Grade every submission for `quiz`.
    ///
    /// Attempt limits are checked in submission order before any grading
    /// starts, so "first N attempts per student" does not depend on which
    /// task finishes first.
    pub async fn run(
        &self,
        quiz: &Quiz,
        submissions: &[AttemptSubmission],
        progress: &dyn ProgressReporter,
    ) -> Result<GradeReport> {
        let start = Instant::now();
        let report_id = Uuid::new_v4();
        let quiz = Arc::new(quiz.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut failures = Vec::new();
        let mut attempts_per_student: HashMap<&str, u32> = HashMap::new();
        let mut seen_attempts: HashSet<&str> = HashSet::new();
        let mut futures = FuturesUnordered::new();

        for (index, submission) in submissions.iter().enumerate() {
            if submission.quiz_id != quiz.id {
                let error = format!(
                    "submission is for quiz '{}', not '{}'",
                    submission.quiz_id, quiz.id
                );
                tracing::warn!("skipping attempt {}: {error}", submission.attempt_id);
                progress.on_attempt_error(&submission.attempt_id, &submission.student, &error);
                failures.push(failure(submission, error));
                continue;
            }

            // A repeated id would overwrite the first attempt's open responses.
            if !seen_attempts.insert(submission.attempt_id.as_str()) {
                let error =
                    GradingError::DuplicateAttempt(submission.attempt_id.clone()).to_string();
                tracing::warn!("skipping attempt {}: {error}", submission.attempt_id);
                progress.on_attempt_error(&submission.attempt_id, &submission.student, &error);
                failures.push(failure(submission, error));
                continue;
            }

            let previous = attempts_per_student
                .entry(submission.student.as_str())
                .or_default();
            let attempt_number = match check_attempt_limit(&quiz, *previous) {
                Ok(number) => number,
                Err(e) => {
                    tracing::warn!("rejecting attempt {}: {e}", submission.attempt_id);
                    progress.on_attempt_error(
                        &submission.attempt_id,
                        &submission.student,
                        &e.to_string(),
                    );
                    failures.push(failure(submission, e.to_string()));
                    continue;
                }
            };
            *previous = attempt_number;
            progress.on_attempt_start(&submission.attempt_id, &submission.student);

            let quiz = Arc::clone(&quiz);
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();
            let submission = submission.clone();

            futures.push(async move {
                let ctx_attempt = submission.attempt_id.clone();
                let ctx_student = submission.student.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    grade_attempt(&quiz, store.as_ref(), &submission, attempt_number, &config)
                        .await
                };
                (index, ctx_attempt, ctx_student, inner.await)
            });
        }

        let mut graded = Vec::new();
        let mut completed = 0usize;
        let mut failed = failures.len();
        let total = futures.len() + failures.len();

        while let Some((index, attempt_id, student, result)) = futures.next().await {
            match result {
                Ok(attempt) => {
                    progress.on_attempt_complete(&attempt);
                    graded.push((index, attempt));
                    completed += 1;
                }
                Err(e) => {
                    tracing::error!("grading failed for attempt {attempt_id}: {e:#}");
                    progress.on_attempt_error(&attempt_id, &student, &e.to_string());
                    failures.push(AttemptFailure {
                        attempt_id,
                        student,
                        error: format!("{e:#}"),
                    });
                    failed += 1;
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, completed, failed, elapsed);
        tracing::info!(
            quiz = %quiz.id,
            completed,
            failed,
            "graded {total} attempts in {}ms",
            elapsed.as_millis()
        );

        graded.sort_by_key(|(index, _)| *index);
        let attempts: Vec<AttemptResult> = graded.into_iter().map(|(_, a)| a).collect();
        let statistics = compute_statistics(&quiz, &attempts);

        Ok(GradeReport {
            id: report_id,
            created_at: chrono::Utc::now(),
            quiz: QuizSummary::new(&quiz, self.config.default_passing_score),
            attempts,
            failures,
            statistics,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

fn failure(submission: &AttemptSubmission, error: String) -> AttemptFailure {
    AttemptFailure {
        attempt_id: submission.attempt_id.clone(),
        student: submission.student.clone(),
        error,
    }
}

/// Response ids are stable per attempt and question so regrading the same
/// submission collides with its earlier grade.
fn response_id(attempt_id: &str, question_id: &str) -> String {
    format!("{attempt_id}:{question_id}")
}

async fn grade_attempt(
    quiz: &Quiz,
    store: &dyn GradeStore,
    submission: &AttemptSubmission,
    attempt_number: u32,
    config: &GradingEngineConfig,
) -> Result<AttemptResult> {
    // Ids already in the store belong to an earlier grading run.
    if !store
        .responses_for_attempt(&submission.attempt_id)
        .await?
        .is_empty()
    {
        return Err(GradingError::DuplicateAttempt(submission.attempt_id.clone()).into());
    }

    let mut errors = Vec::new();

    for submitted in &submission.responses {
        if quiz.question(&submitted.question_id).is_none() {
            tracing::warn!(
                attempt = %submission.attempt_id,
                "ignoring answer to unknown question {}",
                submitted.question_id
            );
            errors.push(format!("unknown question: {}", submitted.question_id));
        }
    }

    // Every question gets a response; unanswered ones are scored as empty.
    for question in &quiz.questions {
        let answer = submission
            .responses
            .iter()
            .rev()
            .find(|r| r.question_id == question.id)
            .and_then(|r| r.answer.clone());
        let evaluation = question.evaluate(answer.as_ref());
        let id = response_id(&submission.attempt_id, &question.id);

        store
            .submit(QuestionResponse {
                id: id.clone(),
                attempt_id: submission.attempt_id.clone(),
                question_id: question.id.clone(),
                answer,
                is_correct: evaluation.is_correct,
                points_earned: evaluation.points,
                feedback: evaluation.feedback.clone(),
                grading: None,
            })
            .await?;

        if question.is_auto_gradable() {
            store
                .finalize(&id, GradingRecord::automatic(&evaluation, &config.grader))
                .await?;
        }
    }

    for grade in &submission.grades {
        let Some(question) = quiz.question(&grade.question_id) else {
            errors.push(format!("grade for unknown question: {}", grade.question_id));
            continue;
        };
        let input = GradeInput {
            points: grade.points,
            comment: grade.comment.clone(),
            graded_by: grade
                .graded_by
                .clone()
                .unwrap_or_else(|| config.grader.clone()),
            criterion_scores: grade.criterion_scores.clone(),
        };
        let id = response_id(&submission.attempt_id, &question.id);
        let outcome = match grade_response(question, &quiz.rubrics, &input) {
            Ok(record) => store.finalize(&id, record).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            tracing::warn!(
                attempt = %submission.attempt_id,
                question = %question.id,
                "instructor grade rejected: {e}"
            );
            errors.push(format!("{}: {e}", question.id));
        }
    }

    let responses = store.responses_for_attempt(&submission.attempt_id).await?;
    let summary = AttemptSummary::compute(quiz, &responses, config.default_passing_score);
    let responses = responses
        .iter()
        .filter_map(|r| {
            quiz.question(&r.question_id)
                .map(|q| ResponseResult::from_response(q, r))
        })
        .collect();

    Ok(AttemptResult {
        attempt_id: submission.attempt_id.clone(),
        student: submission.student.clone(),
        attempt_number,
        submitted_at: submission.submitted_at,
        summary,
        responses,
        errors,
    })
}
