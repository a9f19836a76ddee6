//! Finalizing grades: automatic records for auto-gradable questions and
//! instructor grading (simple points or rubric-based) for essays.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::error::GradingError;
use crate::evaluator::Evaluation;
use crate::model::{CriterionScore, GradingRecord, Question, QuestionKind, Rubric};
use crate::rubric::aggregate;

/// An instructor's grading request for one response.
#[derive(Debug, Clone)]
pub struct GradeInput {
    /// Points for simple grading. Ignored when rubric grading applies.
    pub points: f64,
    pub comment: String,
    pub graded_by: String,
    /// Per-criterion scores; triggers rubric grading when present.
    pub criterion_scores: Option<BTreeMap<String, CriterionScore>>,
}

impl GradeInput {
    pub fn simple(points: f64, comment: impl Into<String>, graded_by: impl Into<String>) -> Self {
        Self {
            points,
            comment: comment.into(),
            graded_by: graded_by.into(),
            criterion_scores: None,
        }
    }

    pub fn with_rubric(mut self, scores: BTreeMap<String, CriterionScore>) -> Self {
        self.criterion_scores = Some(scores);
        self
    }
}

impl GradingRecord {
    /// The record the engine attaches to an auto-graded response.
    pub fn automatic(evaluation: &Evaluation, graded_by: &str) -> Self {
        Self {
            points_earned: evaluation.points,
            is_correct: evaluation.is_correct,
            comment: evaluation.feedback.clone(),
            graded_at: Utc::now(),
            graded_by: graded_by.to_string(),
            criterion_feedback: Vec::new(),
        }
    }
}

/// Produce a final grade for a response to `question`.
///
/// Rubric grading applies when criterion scores are supplied; the question
/// must then be an essay configured for detailed rubrics whose rubric exists
/// in `rubrics`. Otherwise the supplied points are used: negative points are
/// rejected and points above the question maximum are capped.
pub fn grade_response(
    question: &Question,
    rubrics: &[Rubric],
    input: &GradeInput,
) -> Result<GradingRecord, GradingError> {
    let (points_earned, criterion_feedback) = match &input.criterion_scores {
        Some(scores) => {
            let rubric = rubric_for(question, rubrics)?;
            let outcome = aggregate(rubric, question.points, scores)?;
            tracing::debug!(
                question = %question.id,
                rubric = %rubric.id,
                rubric_points = outcome.rubric_points,
                rubric_total = outcome.rubric_total,
                final_points = outcome.final_points,
                "rubric grade computed"
            );
            (outcome.final_points, outcome.criterion_feedback)
        }
        None => {
            if input.points.is_nan() || input.points < 0.0 {
                return Err(GradingError::NegativePoints(input.points));
            }
            let capped = input.points.min(question.points);
            if capped < input.points {
                tracing::warn!(
                    question = %question.id,
                    "capping awarded points {} at question maximum {}",
                    input.points,
                    question.points
                );
            }
            (capped, Vec::new())
        }
    };

    Ok(GradingRecord {
        points_earned,
        is_correct: points_earned >= question.points,
        comment: input.comment.clone(),
        graded_at: Utc::now(),
        graded_by: input.graded_by.clone(),
        criterion_feedback,
    })
}

fn rubric_for<'a>(question: &Question, rubrics: &'a [Rubric]) -> Result<&'a Rubric, GradingError> {
    let QuestionKind::Essay(essay) = &question.kind else {
        return Err(GradingError::NotRubricGradable(question.id.clone()));
    };
    if !essay.use_detailed_rubric {
        return Err(GradingError::RubricNotConfigured(question.id.clone()));
    }
    essay
        .rubric
        .as_deref()
        .and_then(|id| rubrics.iter().find(|r| r.id == id))
        .ok_or_else(|| GradingError::RubricNotConfigured(question.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Criterion, EssayQuestion, TrueFalseQuestion};

    fn essay(points: f64, rubric: Option<&str>, use_detailed_rubric: bool) -> Question {
        Question {
            id: "essay-1".into(),
            text: "Explain testing".into(),
            points,
            correct_feedback: None,
            incorrect_feedback: None,
            explanation: String::new(),
            kind: QuestionKind::Essay(EssayQuestion {
                min_word_count: 50,
                max_word_count: 500,
                rubric: rubric.map(str::to_string),
                use_detailed_rubric,
                allow_attachments: false,
            }),
        }
    }

    fn rubrics() -> Vec<Rubric> {
        let criterion = |id: &str, max_points: f64| Criterion {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            max_points,
            weight: 1.0,
            performance_levels: vec![],
        };
        vec![Rubric {
            id: "essay-rubric".into(),
            title: "Essay".into(),
            description: String::new(),
            criteria: vec![
                criterion("content", 10.0),
                criterion("organization", 5.0),
                criterion("clarity", 5.0),
            ],
        }]
    }

    fn criterion_scores(values: &[(&str, f64, &str)]) -> BTreeMap<String, CriterionScore> {
        values
            .iter()
            .map(|(id, points, level)| {
                (
                    id.to_string(),
                    CriterionScore {
                        points: *points,
                        comments: String::new(),
                        level: Some(level.to_string()),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn simple_grade() {
        let q = essay(10.0, None, false);
        let record = grade_response(
            &q,
            &[],
            &GradeInput::simple(8.0, "Good explanation", "instructor"),
        )
        .unwrap();
        assert_eq!(record.points_earned, 8.0);
        assert_eq!(record.comment, "Good explanation");
        assert_eq!(record.graded_by, "instructor");
        assert!(!record.is_correct);
        assert!(record.criterion_feedback.is_empty());
    }

    #[test]
    fn negative_points_rejected() {
        let q = essay(10.0, None, false);
        let err = grade_response(&q, &[], &GradeInput::simple(-5.0, "", "instructor")).unwrap_err();
        assert_eq!(err, GradingError::NegativePoints(-5.0));
    }

    #[test]
    fn points_above_max_are_capped() {
        let q = essay(10.0, None, false);
        let record =
            grade_response(&q, &[], &GradeInput::simple(15.0, "", "instructor")).unwrap();
        assert_eq!(record.points_earned, 10.0);
        assert!(record.is_correct);
    }

    #[test]
    fn rubric_grade_on_matching_scale() {
        let q = essay(20.0, Some("essay-rubric"), true);
        let input = GradeInput::simple(0.0, "Overall good work", "instructor").with_rubric(
            criterion_scores(&[
                ("content", 8.0, "Good"),
                ("organization", 4.0, "Excellent"),
                ("clarity", 3.0, "Satisfactory"),
            ]),
        );
        let record = grade_response(&q, &rubrics(), &input).unwrap();
        assert_eq!(record.points_earned, 15.0);
        assert_eq!(record.comment, "Overall good work");
        assert_eq!(record.criterion_feedback.len(), 3);
        assert_eq!(record.criterion_feedback[0].points_earned, 8.0);
        assert_eq!(
            record.criterion_feedback[0].performance_level.as_deref(),
            Some("Good")
        );
    }

    #[test]
    fn rubric_grade_rescales() {
        let q = essay(10.0, Some("essay-rubric"), true);
        let input = GradeInput::simple(0.0, "", "instructor").with_rubric(criterion_scores(&[
            ("content", 8.0, "Good"),
            ("organization", 4.0, "Good"),
            ("clarity", 3.0, "Good"),
        ]));
        let record = grade_response(&q, &rubrics(), &input).unwrap();
        assert_eq!(record.points_earned, 8.0);
    }

    #[test]
    fn rubric_question_can_still_take_simple_grade() {
        let q = essay(20.0, Some("essay-rubric"), true);
        let record =
            grade_response(&q, &rubrics(), &GradeInput::simple(16.0, "", "instructor")).unwrap();
        assert_eq!(record.points_earned, 16.0);
    }

    #[test]
    fn rubric_scores_without_detailed_rubric() {
        let q = essay(10.0, Some("essay-rubric"), false);
        let input = GradeInput::simple(0.0, "", "instructor")
            .with_rubric(criterion_scores(&[("content", 8.0, "Good")]));
        let err = grade_response(&q, &rubrics(), &input).unwrap_err();
        assert_eq!(err, GradingError::RubricNotConfigured("essay-1".into()));
    }

    #[test]
    fn missing_rubric_is_distinct_error() {
        let q = essay(10.0, Some("gone"), true);
        let input = GradeInput::simple(0.0, "", "instructor")
            .with_rubric(criterion_scores(&[("content", 8.0, "Good")]));
        let err = grade_response(&q, &rubrics(), &input).unwrap_err();
        assert!(matches!(err, GradingError::RubricNotConfigured(_)));
    }

    #[test]
    fn rubric_on_non_essay() {
        let q = Question {
            id: "tf".into(),
            text: "?".into(),
            points: 1.0,
            correct_feedback: None,
            incorrect_feedback: None,
            explanation: String::new(),
            kind: QuestionKind::TrueFalse(TrueFalseQuestion {
                correct_answer: true,
            }),
        };
        let input = GradeInput::simple(0.0, "", "instructor").with_rubric(BTreeMap::new());
        let err = grade_response(&q, &rubrics(), &input).unwrap_err();
        assert_eq!(err, GradingError::NotRubricGradable("tf".into()));
    }

    #[test]
    fn automatic_record_copies_evaluation() {
        let evaluation = Evaluation {
            is_correct: true,
            points: 3.0,
            feedback: "Correct!".into(),
        };
        let record = GradingRecord::automatic(&evaluation, "quizmark");
        assert_eq!(record.points_earned, 3.0);
        assert!(record.is_correct);
        assert_eq!(record.graded_by, "quizmark");
        assert_eq!(record.comment, "Correct!");
    }
}
