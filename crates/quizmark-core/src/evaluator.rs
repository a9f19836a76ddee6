//! Answer evaluation: correctness, points, and feedback for one answer.
//!
//! Evaluation never fails. Missing, malformed, or unknown answers are simply
//! wrong and worth zero points.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{
    Choice, ChoiceQuestion, EssayQuestion, Question, QuestionKind, SubmittedAnswer,
    TrueFalseQuestion,
};
use crate::normalizer::{clamp_points, normalize};

/// The outcome of evaluating one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub is_correct: bool,
    pub points: f64,
    pub feedback: String,
}

impl Evaluation {
    fn correct(question: &Question) -> Self {
        Self {
            is_correct: true,
            points: question.points,
            feedback: question.correct_feedback().to_string(),
        }
    }

    fn incorrect(question: &Question) -> Self {
        Self {
            is_correct: false,
            points: 0.0,
            feedback: question.incorrect_feedback().to_string(),
        }
    }

    fn pending(feedback: String) -> Self {
        Self {
            is_correct: false,
            points: 0.0,
            feedback,
        }
    }
}

impl Question {
    /// Evaluate `answer` against this question.
    pub fn evaluate(&self, answer: Option<&SubmittedAnswer>) -> Evaluation {
        evaluate(self, answer)
    }
}

/// Evaluate an answer against any question kind.
pub fn evaluate(question: &Question, answer: Option<&SubmittedAnswer>) -> Evaluation {
    match &question.kind {
        QuestionKind::SingleChoice(choices) => evaluate_choice(question, choices, false, answer),
        QuestionKind::MultipleChoice(choices) => evaluate_choice(question, choices, true, answer),
        QuestionKind::TrueFalse(tf) => evaluate_true_false(question, tf, answer),
        QuestionKind::Essay(essay) => evaluate_essay(essay, answer),
    }
}

fn evaluate_choice(
    question: &Question,
    config: &ChoiceQuestion,
    allow_multiple: bool,
    answer: Option<&SubmittedAnswer>,
) -> Evaluation {
    let submitted: HashSet<String> = answer
        .map(SubmittedAnswer::selected_ids)
        .unwrap_or_default()
        .into_iter()
        .collect();

    // Unknown ids fall away here, and neutral choices never count.
    let selected: Vec<&Choice> = config
        .choices
        .iter()
        .filter(|c| !c.is_neutral && submitted.contains(&c.id))
        .collect();

    if selected.is_empty() {
        return Evaluation::incorrect(question);
    }

    // Naming several choices is not a valid single-choice answer, with or
    // without partial credit.
    if !allow_multiple && selected.len() > 1 {
        return Evaluation::incorrect(question);
    }

    let exact = if allow_multiple {
        let chosen: HashSet<&str> = selected.iter().map(|c| c.id.as_str()).collect();
        let correct: HashSet<&str> = config.correct_ids().collect();
        chosen == correct
    } else {
        selected.len() == 1 && selected[0].is_correct
    };

    if !config.use_partial_credit {
        return if exact {
            Evaluation::correct(question)
        } else {
            Evaluation::incorrect(question)
        };
    }

    let raw: f64 = selected
        .iter()
        .map(|c| c.points_value.unwrap_or(0.0))
        .sum();
    let adjusted = normalize(raw, question.points, &config.normalization);
    let points = clamp_points(
        adjusted,
        config.minimum_score.unwrap_or(0.0),
        question.points,
    );
    tracing::trace!(
        question = %question.id,
        raw,
        adjusted,
        points,
        method = config.normalization.method_name(),
        "partial credit scored"
    );

    let feedback = if exact {
        question.correct_feedback().to_string()
    } else if points > 0.0 {
        format!(
            "Partially correct: {} of {} points.",
            points, question.points
        )
    } else {
        question.incorrect_feedback().to_string()
    };

    Evaluation {
        is_correct: exact,
        points,
        feedback,
    }
}

fn evaluate_true_false(
    question: &Question,
    config: &TrueFalseQuestion,
    answer: Option<&SubmittedAnswer>,
) -> Evaluation {
    match answer.and_then(SubmittedAnswer::as_bool) {
        Some(value) if value == config.correct_answer => Evaluation::correct(question),
        _ => Evaluation::incorrect(question),
    }
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn evaluate_essay(config: &EssayQuestion, answer: Option<&SubmittedAnswer>) -> Evaluation {
    let text = answer.and_then(SubmittedAnswer::text).unwrap_or("");
    if text.trim().is_empty() {
        return Evaluation::pending("No response provided.".to_string());
    }

    let words = word_count(text);
    let min = config.min_word_count as usize;
    let max = config.max_word_count as usize;

    let feedback = if min > 0 && words < min {
        format!("Your response is too short ({words} words). Minimum required: {min} words.")
    } else if max > 0 && words > max {
        format!(
            "Your response exceeds maximum word count ({words} words). Maximum allowed: {max} words."
        )
    } else {
        format!("Essay submitted successfully ({words} words). It will be graded by your instructor.")
    };

    Evaluation::pending(feedback)
}
