//! Core data model types for quizmark.
//!
//! Quizzes, question variants, choices, rubrics, submitted answers, and the
//! grading records attached to responses once they are finalized.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A quiz: an ordered list of questions plus the rubrics they reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Passing threshold in percent. `None` falls back to the configured default.
    #[serde(default)]
    pub passing_score: Option<f64>,
    /// Maximum attempts per student (0 = unlimited).
    #[serde(default)]
    pub max_attempts: u32,
    /// Messages shown for attempt percentage ranges.
    #[serde(default)]
    pub conditional_feedback: Vec<FeedbackBand>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub rubrics: Vec<Rubric>,
}

impl Quiz {
    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Look up a rubric by id.
    pub fn rubric(&self, id: &str) -> Option<&Rubric> {
        self.rubrics.iter().find(|r| r.id == id)
    }

    /// Sum of every question's maximum points.
    pub fn max_score(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }

    pub fn passing_score_or(&self, default: f64) -> f64 {
        self.passing_score.unwrap_or(default)
    }
}

/// A percentage range (inclusive on both ends) with its feedback message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackBand {
    pub min: f64,
    pub max: f64,
    pub message: String,
}

impl FeedbackBand {
    /// Parse a `"lo-hi"` range such as `"60-79"`.
    pub fn parse(range: &str, message: impl Into<String>) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidFeedbackBand(range.to_string());
        let (lo, hi) = range.split_once('-').ok_or_else(invalid)?;
        let min: f64 = lo.trim().parse().map_err(|_| invalid())?;
        let max: f64 = hi.trim().parse().map_err(|_| invalid())?;
        if min > max {
            return Err(invalid());
        }
        Ok(Self {
            min,
            max,
            message: message.into(),
        })
    }

    pub fn contains(&self, percentage: f64) -> bool {
        (self.min..=self.max).contains(&percentage)
    }
}

/// A single question of any kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Maximum points this question is worth.
    pub points: f64,
    #[serde(default)]
    pub correct_feedback: Option<String>,
    #[serde(default)]
    pub incorrect_feedback: Option<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// Feedback shown for a correct answer.
    pub fn correct_feedback(&self) -> &str {
        self.correct_feedback.as_deref().unwrap_or("Correct!")
    }

    /// Feedback shown for an incorrect answer.
    pub fn incorrect_feedback(&self) -> &str {
        self.incorrect_feedback.as_deref().unwrap_or("Incorrect.")
    }

    /// Whether the engine can finalize this question without an instructor.
    pub fn is_auto_gradable(&self) -> bool {
        !matches!(self.kind, QuestionKind::Essay(_))
    }
}

/// The question variants, each carrying only the settings it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice(ChoiceQuestion),
    MultipleChoice(ChoiceQuestion),
    TrueFalse(TrueFalseQuestion),
    Essay(EssayQuestion),
}

impl QuestionKind {
    pub fn allows_multiple(&self) -> bool {
        matches!(self, QuestionKind::MultipleChoice(_))
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::SingleChoice(_) => write!(f, "single_choice"),
            QuestionKind::MultipleChoice(_) => write!(f, "multiple_choice"),
            QuestionKind::TrueFalse(_) => write!(f, "true_false"),
            QuestionKind::Essay(_) => write!(f, "essay"),
        }
    }
}

/// Settings shared by single- and multiple-choice questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceQuestion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Score by summing per-choice `points_value` instead of all-or-nothing.
    #[serde(default)]
    pub use_partial_credit: bool,
    /// Floor for partial-credit scores (defaults to 0).
    #[serde(default)]
    pub minimum_score: Option<f64>,
    #[serde(default)]
    pub normalization: Normalization,
}

impl ChoiceQuestion {
    /// Ids of the non-neutral choices marked correct.
    pub fn correct_ids(&self) -> impl Iterator<Item = &str> {
        self.choices
            .iter()
            .filter(|c| c.is_correct && !c.is_neutral)
            .map(|c| c.id.as_str())
    }
}

/// One selectable answer of a choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    /// Signed weight, only used under partial credit.
    #[serde(default)]
    pub points_value: Option<f64>,
    /// Neutral choices ("I don't know") never affect the score.
    #[serde(default)]
    pub is_neutral: bool,
}

/// Post-hoc transformation of a raw partial-credit total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Normalization {
    #[default]
    None,
    ZScore {
        mean: f64,
        std_dev: f64,
    },
    MinMax {
        input_min: f64,
        input_max: f64,
        output_min: f64,
        output_max: f64,
    },
    Custom {
        mapping: BTreeMap<String, f64>,
    },
}

impl Normalization {
    pub fn method_name(&self) -> &'static str {
        match self {
            Normalization::None => "none",
            Normalization::ZScore { .. } => "zscore",
            Normalization::MinMax { .. } => "minmax",
            Normalization::Custom { .. } => "custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrueFalseQuestion {
    pub correct_answer: bool,
}

/// A free-text question graded by an instructor, optionally with a rubric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EssayQuestion {
    /// Minimum words (0 = no minimum).
    #[serde(default)]
    pub min_word_count: u32,
    /// Maximum words (0 = no maximum).
    #[serde(default)]
    pub max_word_count: u32,
    /// Id of the rubric in the owning quiz.
    #[serde(default)]
    pub rubric: Option<String>,
    #[serde(default)]
    pub use_detailed_rubric: bool,
    #[serde(default)]
    pub allow_attachments: bool,
}

/// An ordered list of scored criteria.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl Rubric {
    /// Always derived from the current criterion maxima.
    pub fn total_points(&self) -> f64 {
        self.criteria.iter().map(|c| c.max_points).sum()
    }

    pub fn criterion(&self, id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == id)
    }
}

/// One scored dimension of a rubric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_points: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Named levels; empty means the default ladder applies.
    #[serde(default)]
    pub performance_levels: Vec<PerformanceLevel>,
}

fn default_weight() -> f64 {
    1.0
}

/// Default ladder as (name, share of the criterion maximum).
const DEFAULT_LEVELS: [(&str, f64); 5] = [
    ("Excellent", 1.0),
    ("Good", 0.75),
    ("Satisfactory", 0.5),
    ("Needs Improvement", 0.25),
    ("Unsatisfactory", 0.0),
];

impl Criterion {
    /// Configured levels, or the default ladder truncated to whole points.
    pub fn levels(&self) -> Vec<PerformanceLevel> {
        if !self.performance_levels.is_empty() {
            return self.performance_levels.clone();
        }
        DEFAULT_LEVELS
            .iter()
            .map(|(name, share)| PerformanceLevel {
                name: (*name).to_string(),
                points: (self.max_points * share).floor(),
                description: String::new(),
            })
            .collect()
    }

    /// The highest level whose points do not exceed `points`.
    pub fn level_for(&self, points: f64) -> Option<String> {
        self.levels()
            .into_iter()
            .filter(|l| l.points <= points)
            .max_by(|a, b| a.points.total_cmp(&b.points))
            .map(|l| l.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceLevel {
    pub name: String,
    pub points: f64,
    #[serde(default)]
    pub description: String,
}

/// A student's raw answer as it arrives from the submission layer.
///
/// Choice ids may be sent as strings or integers; true/false answers as
/// booleans, `"true"`/`"false"`/`"1"`/`"0"`, or a one-element list of those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Flag(bool),
    Number(i64),
    Text(String),
    List(Vec<AnswerItem>),
    Essay {
        essay_text: String,
        #[serde(default)]
        attachment: Option<Attachment>,
    },
    /// Anything else; scored as no answer.
    Unrecognized(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerItem {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl AnswerItem {
    fn as_id(&self) -> Option<String> {
        match self {
            AnswerItem::Flag(_) => None,
            AnswerItem::Number(n) => Some(n.to_string()),
            AnswerItem::Text(s) => Some(s.trim().to_string()),
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerItem::Flag(b) => Some(*b),
            AnswerItem::Number(1) => Some(true),
            AnswerItem::Number(0) => Some(false),
            AnswerItem::Number(_) => None,
            AnswerItem::Text(s) => parse_bool(s),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl SubmittedAnswer {
    /// Choice ids named by this answer. Booleans name no choice.
    pub fn selected_ids(&self) -> Vec<String> {
        match self {
            SubmittedAnswer::Number(n) => vec![n.to_string()],
            SubmittedAnswer::Text(s) => vec![s.trim().to_string()],
            SubmittedAnswer::List(items) => items.iter().filter_map(AnswerItem::as_id).collect(),
            SubmittedAnswer::Flag(_)
            | SubmittedAnswer::Essay { .. }
            | SubmittedAnswer::Unrecognized(_) => Vec::new(),
        }
    }

    /// Coerce to a boolean for true/false questions.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SubmittedAnswer::Flag(b) => Some(*b),
            SubmittedAnswer::Number(n) => AnswerItem::Number(*n).as_bool(),
            SubmittedAnswer::Text(s) => parse_bool(s),
            SubmittedAnswer::List(items) if items.len() == 1 => items[0].as_bool(),
            SubmittedAnswer::List(_)
            | SubmittedAnswer::Essay { .. }
            | SubmittedAnswer::Unrecognized(_) => None,
        }
    }

    /// Free text for essay questions.
    pub fn text(&self) -> Option<&str> {
        match self {
            SubmittedAnswer::Text(s) => Some(s),
            SubmittedAnswer::Essay { essay_text, .. } => Some(essay_text),
            _ => None,
        }
    }
}

/// Metadata about a file uploaded alongside an essay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// A stored answer to one question within one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: String,
    pub attempt_id: String,
    pub question_id: String,
    #[serde(default)]
    pub answer: Option<SubmittedAnswer>,
    pub is_correct: bool,
    pub points_earned: f64,
    /// Feedback produced at submission time.
    pub feedback: String,
    /// Present once the response is final.
    #[serde(default)]
    pub grading: Option<GradingRecord>,
}

impl QuestionResponse {
    pub fn is_graded(&self) -> bool {
        self.grading.is_some()
    }
}

/// The final grade attached to a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRecord {
    pub points_earned: f64,
    pub is_correct: bool,
    /// Overall comment from the grader.
    pub comment: String,
    pub graded_at: DateTime<Utc>,
    pub graded_by: String,
    #[serde(default)]
    pub criterion_feedback: Vec<CriterionFeedback>,
}

/// Per-criterion outcome of rubric grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionFeedback {
    pub criterion_id: String,
    pub points_earned: f64,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub performance_level: Option<String>,
}

/// Points a grader awards for one criterion, before clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub points: f64,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub level: Option<String>,
}

/// One attempt as delivered by the submission layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSubmission {
    pub attempt_id: String,
    pub quiz_id: String,
    pub student: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responses: Vec<SubmittedResponse>,
    /// Instructor grades to apply after auto-grading.
    #[serde(default)]
    pub grades: Vec<ManualGrade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedResponse {
    pub question_id: String,
    #[serde(default)]
    pub answer: Option<SubmittedAnswer>,
}

/// An instructor's grade for one question of an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualGrade {
    pub question_id: String,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub graded_by: Option<String>,
    #[serde(default)]
    pub criterion_scores: Option<BTreeMap<String, CriterionScore>>,
}
