//! Grading and configuration error types.
//!
//! Scoring an answer never fails: bad or missing answers are worth zero
//! points. These errors cover the cases where a response *cannot* be graded,
//! so callers can tell "graded zero" apart from "cannot grade".

use thiserror::Error;

/// Errors raised while finalizing a grade.
#[derive(Debug, Error, PartialEq)]
pub enum GradingError {
    /// The grader supplied a negative point value.
    #[error("points cannot be negative (got {0})")]
    NegativePoints(f64),

    /// The response already carries a final grade.
    #[error("response {0} has already been graded")]
    AlreadyGraded(String),

    /// Criterion scores were supplied but the question has no usable rubric.
    #[error("question {0} is not configured for rubric grading")]
    RubricNotConfigured(String),

    /// The referenced rubric has no criteria or only zero-point criteria.
    #[error("rubric {0} has a total of zero points")]
    EmptyRubric(String),

    /// Rubric grading was requested for a question kind that cannot use one.
    #[error("question {0} is not an essay question")]
    NotRubricGradable(String),

    #[error("question not found: {0}")]
    QuestionNotFound(String),

    #[error("response not found: {0}")]
    ResponseNotFound(String),

    /// The student has used every attempt the quiz allows.
    #[error("maximum number of attempts reached ({max_attempts})")]
    AttemptLimitReached { max_attempts: u32 },

    /// An attempt with this id was already submitted.
    #[error("attempt {0} was already submitted")]
    DuplicateAttempt(String),
}

impl GradingError {
    /// Returns `true` if another writer got there first.
    ///
    /// Conflicts are safe to swallow on retry: the stored grade is final.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            GradingError::AlreadyGraded(_) | GradingError::DuplicateAttempt(_)
        )
    }
}

/// Errors in quiz bank configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A normalization block carried unusable parameters.
    #[error("invalid normalization parameters for question {question}: {message}")]
    InvalidNormalization { question: String, message: String },

    /// A question's own settings contradict each other.
    #[error("invalid configuration for question {question}: {message}")]
    InvalidQuestion { question: String, message: String },

    /// A conditional feedback band could not be parsed.
    #[error("invalid feedback band '{0}', expected \"lo-hi\"")]
    InvalidFeedbackBand(String),
}
