//! Rubric aggregation for essay grading.
//!
//! Criterion scores are clamped per criterion, summed, turned into a share
//! of the rubric total, and rescaled onto the question's own point budget.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GradingError;
use crate::model::{CriterionFeedback, CriterionScore, Rubric};

/// The result of applying a rubric to one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricOutcome {
    /// Sum of clamped criterion scores.
    pub rubric_points: f64,
    /// The rubric's total at grading time.
    pub rubric_total: f64,
    /// `rubric_points / rubric_total`, in `[0, 1]`.
    pub fraction: f64,
    /// Points on the question's scale.
    pub final_points: f64,
    pub criterion_feedback: Vec<CriterionFeedback>,
}

impl Rubric {
    /// Score a map of criterion id to points without rescaling.
    ///
    /// Returns `(total, max, percentage)` where `percentage` is 0–100.
    /// Absent criteria count as zero; unknown ids are ignored.
    pub fn calculate_score(&self, scores: &BTreeMap<String, f64>) -> (f64, f64, f64) {
        let total: f64 = self
            .criteria
            .iter()
            .filter_map(|c| scores.get(&c.id).map(|p| p.max(0.0).min(c.max_points)))
            .sum();
        let max = self.total_points();
        let percentage = if max > 0.0 { total / max * 100.0 } else { 0.0 };
        (total, max, percentage)
    }
}

/// Apply `rubric` to `scores` and rescale onto `question_points`.
pub fn aggregate(
    rubric: &Rubric,
    question_points: f64,
    scores: &BTreeMap<String, CriterionScore>,
) -> Result<RubricOutcome, GradingError> {
    let rubric_total = rubric.total_points();
    if rubric_total <= 0.0 {
        return Err(GradingError::EmptyRubric(rubric.id.clone()));
    }

    for id in scores.keys() {
        if rubric.criterion(id).is_none() {
            tracing::debug!(rubric = %rubric.id, criterion = %id, "ignoring unknown criterion");
        }
    }

    let mut rubric_points = 0.0;
    let mut criterion_feedback = Vec::new();
    for criterion in &rubric.criteria {
        let Some(score) = scores.get(&criterion.id) else {
            continue;
        };
        let points = score.points.max(0.0).min(criterion.max_points);
        rubric_points += points;
        criterion_feedback.push(CriterionFeedback {
            criterion_id: criterion.id.clone(),
            points_earned: points,
            comments: score.comments.clone(),
            performance_level: score
                .level
                .clone()
                .or_else(|| criterion.level_for(points)),
        });
    }

    let fraction = rubric_points / rubric_total;
    let maximum = question_points.max(0.0);
    let final_points = (fraction * maximum).round().max(0.0).min(maximum);

    Ok(RubricOutcome {
        rubric_points,
        rubric_total,
        fraction,
        final_points,
        criterion_feedback,
    })
}
