//! Attempt-level scoring: totals, pass/fail, conditional feedback, and
//! attempt limits.

use serde::{Deserialize, Serialize};

use crate::error::GradingError;
use crate::model::{Quiz, QuestionResponse};

/// Score summary for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub score: f64,
    pub max_score: f64,
    /// 0–100.
    pub percentage: f64,
    pub is_passed: bool,
    /// Responses still waiting for an instructor.
    pub ungraded: usize,
    /// Message of the first conditional feedback band that matched.
    #[serde(default)]
    pub feedback: Option<String>,
}

impl AttemptSummary {
    /// Summarize `responses` against `quiz`.
    ///
    /// Ungraded essays count as zero until graded. `default_passing` applies
    /// when the quiz has no passing score of its own.
    pub fn compute(quiz: &Quiz, responses: &[QuestionResponse], default_passing: f64) -> Self {
        let score: f64 = responses.iter().map(|r| r.points_earned).sum();
        let max_score = quiz.max_score();
        let percentage = if max_score > 0.0 {
            score / max_score * 100.0
        } else {
            0.0
        };

        let ungraded = responses
            .iter()
            .filter(|r| !r.is_graded())
            .filter(|r| {
                quiz.question(&r.question_id)
                    .is_some_and(|q| !q.is_auto_gradable())
            })
            .count();

        // Bands are written as whole-number ranges ("80-89"), so 89.5% lands
        // in that band rather than falling between two.
        let band_key = percentage.floor();
        let feedback = quiz
            .conditional_feedback
            .iter()
            .find(|band| band.contains(band_key))
            .map(|band| band.message.clone());

        Self {
            score,
            max_score,
            percentage,
            is_passed: percentage >= quiz.passing_score_or(default_passing),
            ungraded,
            feedback,
        }
    }
}

/// The number of the next attempt, given how many a student already made.
pub fn check_attempt_limit(quiz: &Quiz, previous_attempts: u32) -> Result<u32, GradingError> {
    if quiz.max_attempts > 0 && previous_attempts >= quiz.max_attempts {
        return Err(GradingError::AttemptLimitReached {
            max_attempts: quiz.max_attempts,
        });
    }
    Ok(previous_attempts + 1)
}
