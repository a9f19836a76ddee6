//! Score statistics across graded attempts.
//!
//! Per-question means and spreads feed `suggest_zscore`, which proposes
//! z-score normalization parameters from observed scores.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Normalization, Question, QuestionKind, Quiz};
use crate::report::AttemptResult;

/// Mean and population standard deviation, `None` for an empty slice.
pub fn mean_and_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Propose z-score parameters from observed scores.
///
/// Returns `None` when there is nothing to learn from: no scores, or scores
/// with no spread (a zero `std_dev` would disable normalization anyway).
pub fn suggest_zscore(raw_scores: &[f64]) -> Option<Normalization> {
    let (mean, std_dev) = mean_and_std_dev(raw_scores)?;
    if std_dev < f64::EPSILON {
        return None;
    }
    Some(Normalization::ZScore { mean, std_dev })
}

/// Statistics for one question across all attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    /// Question kind, e.g. "multiple_choice".
    pub question_type: String,
    pub max_points: f64,
    /// Responses seen, graded or not.
    pub responses: usize,
    /// Responses carrying a final grade.
    pub graded: usize,
    pub mean_points: f64,
    pub std_dev: f64,
    /// Share of graded responses marked correct, 0.0–1.0.
    pub correct_rate: f64,
    /// Z-score parameters fitted to the final points of graded responses.
    /// Only set for partial-credit choice questions, the only kind that
    /// normalizes. Final points are already normalized and clamped, so treat
    /// this as a starting point when tuning, not the raw-sum distribution.
    #[serde(default)]
    pub suggested_normalization: Option<Normalization>,
}

fn normalizes(question: &Question) -> bool {
    match &question.kind {
        QuestionKind::SingleChoice(c) | QuestionKind::MultipleChoice(c) => c.use_partial_credit,
        QuestionKind::TrueFalse(_) | QuestionKind::Essay(_) => false,
    }
}

/// Quiz-level statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizStatistics {
    pub attempts: usize,
    /// Mean attempt percentage, 0–100.
    pub mean_percentage: f64,
    pub std_dev_percentage: f64,
    /// Share of attempts that passed, 0.0–1.0.
    pub pass_rate: f64,
    /// In quiz question order.
    pub per_question: Vec<QuestionStats>,
}

/// Compute statistics from graded attempts.
///
/// Only graded responses contribute to means and correct rates, so an essay
/// waiting for an instructor does not drag its question's average to zero.
pub fn compute_statistics(quiz: &Quiz, attempts: &[AttemptResult]) -> QuizStatistics {
    let percentages: Vec<f64> = attempts.iter().map(|a| a.summary.percentage).collect();
    let (mean_percentage, std_dev_percentage) =
        mean_and_std_dev(&percentages).unwrap_or((0.0, 0.0));
    let passed = attempts.iter().filter(|a| a.summary.is_passed).count();
    let pass_rate = if attempts.is_empty() {
        0.0
    } else {
        passed as f64 / attempts.len() as f64
    };

    // question_id -> (responses seen, graded points, graded correct count)
    let mut observed: HashMap<&str, (usize, Vec<f64>, usize)> = HashMap::new();
    for attempt in attempts {
        for response in &attempt.responses {
            let entry = observed.entry(response.question_id.as_str()).or_default();
            entry.0 += 1;
            if response.graded {
                entry.1.push(response.points_earned);
                if response.is_correct {
                    entry.2 += 1;
                }
            }
        }
    }

    let per_question = quiz
        .questions
        .iter()
        .map(|question| {
            let (responses, points, correct) = observed
                .remove(question.id.as_str())
                .unwrap_or_default();
            let (mean_points, std_dev) = mean_and_std_dev(&points).unwrap_or((0.0, 0.0));
            let correct_rate = if points.is_empty() {
                0.0
            } else {
                correct as f64 / points.len() as f64
            };
            QuestionStats {
                question_id: question.id.clone(),
                question_type: question.kind.to_string(),
                max_points: question.points,
                responses,
                graded: points.len(),
                mean_points,
                std_dev,
                correct_rate,
                suggested_normalization: if normalizes(question) {
                    suggest_zscore(&points)
                } else {
                    None
                },
            }
        })
        .collect();

    QuizStatistics {
        attempts: attempts.len(),
        mean_percentage,
        std_dev_percentage,
        pass_rate,
        per_question,
    }
}
