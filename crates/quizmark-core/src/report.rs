//! Grade report types with JSON persistence and regrade comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attempt::AttemptSummary;
use crate::model::{CriterionFeedback, Question, QuestionResponse, Quiz};
use crate::statistics::QuizStatistics;

/// A complete grading run over one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub quiz: QuizSummary,
    /// Graded attempts, in submission order.
    pub attempts: Vec<AttemptResult>,
    /// Attempts that could not be graded at all.
    #[serde(default)]
    pub failures: Vec<AttemptFailure>,
    pub statistics: QuizStatistics,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a quiz (without the full question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub question_count: usize,
    pub max_score: f64,
    pub passing_score: f64,
}

impl QuizSummary {
    pub fn new(quiz: &Quiz, default_passing: f64) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            question_count: quiz.questions.len(),
            max_score: quiz.max_score(),
            passing_score: quiz.passing_score_or(default_passing),
        }
    }
}

/// One graded attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt_id: String,
    pub student: String,
    /// 1-based attempt number for this student.
    pub attempt_number: u32,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    pub summary: AttemptSummary,
    pub responses: Vec<ResponseResult>,
    /// Problems that did not stop the attempt from being graded, such as a
    /// rejected instructor grade.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// One question's outcome inside an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseResult {
    pub question_id: String,
    pub question_type: String,
    pub max_points: f64,
    pub points_earned: f64,
    pub is_correct: bool,
    pub feedback: String,
    /// Whether the response carries a final grade.
    pub graded: bool,
    #[serde(default)]
    pub graded_by: Option<String>,
    #[serde(default)]
    pub criterion_feedback: Vec<CriterionFeedback>,
}

impl ResponseResult {
    /// Flatten a stored response. Grader comments replace submission feedback.
    pub fn from_response(question: &Question, response: &QuestionResponse) -> Self {
        let grading = response.grading.as_ref();
        let feedback = grading
            .map(|g| g.comment.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| response.feedback.clone());
        Self {
            question_id: response.question_id.clone(),
            question_type: question.kind.to_string(),
            max_points: question.points,
            points_earned: response.points_earned,
            is_correct: response.is_correct,
            feedback,
            graded: grading.is_some(),
            graded_by: grading.map(|g| g.graded_by.clone()),
            criterion_feedback: grading
                .map(|g| g.criterion_feedback.clone())
                .unwrap_or_default(),
        }
    }
}

/// An attempt rejected before grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptFailure {
    pub attempt_id: String,
    pub student: String,
    pub error: String,
}

impl GradeReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline grading of the same attempts.
    ///
    /// `threshold` is in percentage points: a change of exactly `threshold`
    /// counts as unchanged.
    pub fn compare(&self, baseline: &GradeReport, threshold: f64) -> RegradeReport {
        let by_attempt = |report: &GradeReport| -> HashMap<String, (String, f64, bool)> {
            report
                .attempts
                .iter()
                .map(|a| {
                    (
                        a.attempt_id.clone(),
                        (a.student.clone(), a.summary.percentage, a.summary.is_passed),
                    )
                })
                .collect()
        };

        let baseline_scores = by_attempt(baseline);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_attempts = 0usize;
        let mut status_changes = 0usize;

        for attempt in &self.attempts {
            let Some((_, baseline_pct, baseline_passed)) =
                baseline_scores.get(&attempt.attempt_id)
            else {
                new_attempts += 1;
                continue;
            };
            let current = attempt.summary.percentage;
            if *baseline_passed != attempt.summary.is_passed {
                status_changes += 1;
            }
            let change = ScoreChange {
                attempt_id: attempt.attempt_id.clone(),
                student: attempt.student.clone(),
                baseline_percentage: *baseline_pct,
                current_percentage: current,
                delta: current - baseline_pct,
            };
            if change.delta < -threshold {
                regressions.push(change);
            } else if change.delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let current_ids: std::collections::HashSet<&str> =
            self.attempts.iter().map(|a| a.attempt_id.as_str()).collect();
        let removed_attempts = baseline_scores
            .keys()
            .filter(|k| !current_ids.contains(k.as_str()))
            .count();

        RegradeReport {
            regressions,
            improvements,
            unchanged,
            new_attempts,
            removed_attempts,
            status_changes,
        }
    }
}

/// Result of comparing two grade reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegradeReport {
    /// Attempts whose percentage went down.
    pub regressions: Vec<ScoreChange>,
    /// Attempts whose percentage went up.
    pub improvements: Vec<ScoreChange>,
    /// Attempts with no significant change.
    pub unchanged: usize,
    /// Attempts in current but not baseline.
    pub new_attempts: usize,
    /// Attempts in baseline but not current.
    pub removed_attempts: usize,
    /// Attempts that flipped between passed and failed.
    pub status_changes: usize,
}

/// A percentage change for one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub attempt_id: String,
    pub student: String,
    pub baseline_percentage: f64,
    pub current_percentage: f64,
    pub delta: f64,
}

impl RegradeReport {
    /// Format the regrade report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged, {} pass/fail changes\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged,
            self.status_changes
        ));

        let mut section = |title: &str, changes: &[ScoreChange]| {
            if changes.is_empty() {
                return;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Attempt | Student | Baseline | Current | Delta |\n");
            md.push_str("|---------|---------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {:.1}% | {:.1}% | {:+.1}% |\n",
                    c.attempt_id, c.student, c.baseline_percentage, c.current_percentage, c.delta
                ));
            }
            md.push('\n');
        };
        section("Regressions", &self.regressions);
        section("Improvements", &self.improvements);

        if self.new_attempts > 0 || self.removed_attempts > 0 {
            md.push_str(&format!(
                "{} new attempts, {} removed attempts\n",
                self.new_attempts, self.removed_attempts
            ));
        }

        md
    }

    /// Returns true if any attempt lost points beyond the threshold.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GradingRecord, QuestionKind, TrueFalseQuestion};

    fn attempt(id: &str, percentage: f64) -> AttemptResult {
        AttemptResult {
            attempt_id: id.into(),
            student: format!("student-{id}"),
            attempt_number: 1,
            submitted_at: None,
            summary: AttemptSummary {
                score: percentage / 10.0,
                max_score: 10.0,
                percentage,
                is_passed: percentage >= 70.0,
                ungraded: 0,
                feedback: None,
            },
            responses: vec![],
            errors: vec![],
        }
    }

    fn make_report(attempts: Vec<AttemptResult>) -> GradeReport {
        GradeReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: "test".into(),
                title: "Test".into(),
                question_count: 1,
                max_score: 10.0,
                passing_score: 70.0,
            },
            attempts,
            failures: vec![],
            statistics: QuizStatistics::default(),
            duration_ms: 0,
        }
    }

    #[test]
    fn compare_identical_reports() {
        let baseline = make_report(vec![attempt("a1", 80.0)]);
        let current = make_report(vec![attempt("a1", 80.0)]);

        let report = current.compare(&baseline, 5.0);
        assert!(report.regressions.is_empty());
        assert!(report.improvements.is_empty());
        assert_eq!(report.unchanged, 1);
        assert!(!report.has_regressions());
    }

    #[test]
    fn compare_with_regression_and_status_change() {
        let baseline = make_report(vec![attempt("a1", 80.0), attempt("a2", 40.0)]);
        let current = make_report(vec![attempt("a1", 60.0), attempt("a2", 50.0)]);

        let report = current.compare(&baseline, 5.0);
        assert_eq!(report.regressions.len(), 1);
        assert_eq!(report.regressions[0].attempt_id, "a1");
        assert_eq!(report.regressions[0].delta, -20.0);
        assert_eq!(report.improvements.len(), 1);
        assert_eq!(report.status_changes, 1);
        assert!(report.has_regressions());
    }

    #[test]
    fn change_at_threshold_is_unchanged() {
        let baseline = make_report(vec![attempt("a1", 80.0)]);
        let current = make_report(vec![attempt("a1", 75.0)]);
        assert_eq!(current.compare(&baseline, 5.0).unchanged, 1);
    }

    #[test]
    fn compare_with_new_and_removed() {
        let baseline = make_report(vec![attempt("old", 80.0)]);
        let current = make_report(vec![attempt("new", 80.0)]);

        let report = current.compare(&baseline, 5.0);
        assert_eq!(report.new_attempts, 1);
        assert_eq!(report.removed_attempts, 1);
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(vec![attempt("a1", 80.0)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = GradeReport::load_json(&path).unwrap();

        assert_eq!(loaded.quiz.id, "test");
        assert_eq!(loaded.attempts.len(), 1);
        assert_eq!(loaded.attempts[0].summary.percentage, 80.0);
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report(vec![attempt("a1", 80.0)]);
        let current = make_report(vec![attempt("a1", 60.0)]);

        let md = current.compare(&baseline, 5.0).to_markdown();
        assert!(md.contains("Regressions"));
        assert!(md.contains("a1"));
        assert!(md.contains("-20.0%"));
        assert!(!md.contains("Improvements"));
    }

    #[test]
    fn response_result_prefers_grader_comment() {
        let question = Question {
            id: "q1".into(),
            text: "?".into(),
            points: 5.0,
            correct_feedback: None,
            incorrect_feedback: None,
            explanation: String::new(),
            kind: QuestionKind::TrueFalse(TrueFalseQuestion {
                correct_answer: true,
            }),
        };
        let mut response = QuestionResponse {
            id: "r1".into(),
            attempt_id: "a1".into(),
            question_id: "q1".into(),
            answer: None,
            is_correct: false,
            points_earned: 0.0,
            feedback: "Incorrect.".into(),
            grading: None,
        };

        let ungraded = ResponseResult::from_response(&question, &response);
        assert!(!ungraded.graded);
        assert_eq!(ungraded.feedback, "Incorrect.");

        response.grading = Some(GradingRecord {
            points_earned: 5.0,
            is_correct: true,
            comment: "Accepted on appeal".into(),
            graded_at: Utc::now(),
            graded_by: "instructor".into(),
            criterion_feedback: vec![],
        });
        let graded = ResponseResult::from_response(&question, &response);
        assert!(graded.graded);
        assert_eq!(graded.feedback, "Accepted on appeal");
        assert_eq!(graded.graded_by.as_deref(), Some("instructor"));
        assert_eq!(graded.question_type, "true_false");
    }
}
