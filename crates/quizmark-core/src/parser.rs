//! TOML quiz bank parser and JSON submission loader.
//!
//! Loads quizzes from TOML files and directories, validates them, and reads
//! attempt submissions from JSON.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{
    AttemptSubmission, Choice, ChoiceQuestion, Criterion, EssayQuestion, FeedbackBand,
    Normalization, PerformanceLevel, Question, QuestionKind, Quiz, Rubric, TrueFalseQuestion,
};

/// Intermediate TOML structure for parsing quiz bank files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    rubrics: Vec<TomlRubric>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    passing_score: Option<f64>,
    #[serde(default)]
    max_attempts: u32,
    /// `"lo-hi"` percentage range to message.
    #[serde(default)]
    conditional_feedback: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    text: String,
    #[serde(default = "default_points")]
    points: f64,
    #[serde(default)]
    correct_feedback: Option<String>,
    #[serde(default)]
    incorrect_feedback: Option<String>,
    #[serde(default)]
    explanation: String,

    // choice questions
    #[serde(default)]
    allow_multiple: Option<bool>,
    #[serde(default)]
    use_partial_credit: bool,
    #[serde(default)]
    minimum_score: Option<f64>,
    #[serde(default)]
    normalization: Option<TomlNormalization>,
    #[serde(default)]
    choices: Vec<TomlChoice>,

    // true/false
    #[serde(default)]
    correct_answer: Option<bool>,

    // essay
    #[serde(default)]
    min_word_count: u32,
    #[serde(default)]
    max_word_count: u32,
    #[serde(default)]
    rubric: Option<String>,
    #[serde(default)]
    use_detailed_rubric: bool,
    #[serde(default)]
    allow_attachments: bool,
}

fn default_points() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct TomlChoice {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    points_value: Option<f64>,
    #[serde(default)]
    is_neutral: bool,
}

#[derive(Debug, Deserialize)]
struct TomlNormalization {
    method: String,
    #[serde(default)]
    mean: Option<f64>,
    #[serde(default)]
    std_dev: Option<f64>,
    #[serde(default)]
    input_min: Option<f64>,
    #[serde(default)]
    input_max: Option<f64>,
    #[serde(default)]
    output_min: Option<f64>,
    #[serde(default)]
    output_max: Option<f64>,
    #[serde(default)]
    mapping: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct TomlRubric {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    criteria: Vec<TomlCriterion>,
}

#[derive(Debug, Deserialize)]
struct TomlCriterion {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    max_points: f64,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    performance_levels: Vec<TomlPerformanceLevel>,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct TomlPerformanceLevel {
    name: String,
    points: f64,
    #[serde(default)]
    description: String,
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz bank file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut conditional_feedback = parsed
        .quiz
        .conditional_feedback
        .into_iter()
        .map(|(range, message)| FeedbackBand::parse(&range, message))
        .collect::<Result<Vec<_>, _>>()?;
    conditional_feedback.sort_by(|a, b| a.min.total_cmp(&b.min));

    let questions = parsed
        .questions
        .into_iter()
        .map(convert_question)
        .collect::<Result<Vec<_>, _>>()?;

    let rubrics = parsed.rubrics.into_iter().map(convert_rubric).collect();

    Ok(Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        passing_score: parsed.quiz.passing_score,
        max_attempts: parsed.quiz.max_attempts,
        conditional_feedback,
        questions,
        rubrics,
    })
}

fn convert_question(q: TomlQuestion) -> Result<Question, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidQuestion {
        question: q.id.clone(),
        message,
    };

    if q.points < 0.0 {
        return Err(invalid(format!("points cannot be negative (got {})", q.points)));
    }

    let kind = match q.kind.as_str() {
        "single_choice" | "multiple_choice" => {
            let normalization = q
                .normalization
                .as_ref()
                .map(|n| convert_normalization(&q.id, n))
                .transpose()?
                .unwrap_or_default();
            let choice = ChoiceQuestion {
                choices: q
                    .choices
                    .iter()
                    .map(|c| Choice {
                        id: c.id.clone(),
                        text: c.text.clone(),
                        is_correct: c.is_correct,
                        points_value: c.points_value,
                        is_neutral: c.is_neutral,
                    })
                    .collect(),
                use_partial_credit: q.use_partial_credit,
                minimum_score: q.minimum_score,
                normalization,
            };
            // `allow_multiple` wins over the declared type when given.
            let multiple = q.allow_multiple.unwrap_or(q.kind == "multiple_choice");
            if multiple {
                QuestionKind::MultipleChoice(choice)
            } else {
                QuestionKind::SingleChoice(choice)
            }
        }
        "true_false" => {
            let correct_answer = q
                .correct_answer
                .ok_or_else(|| invalid("true_false question needs correct_answer".into()))?;
            QuestionKind::TrueFalse(TrueFalseQuestion { correct_answer })
        }
        "essay" => QuestionKind::Essay(EssayQuestion {
            min_word_count: q.min_word_count,
            max_word_count: q.max_word_count,
            rubric: q.rubric.clone(),
            use_detailed_rubric: q.use_detailed_rubric,
            allow_attachments: q.allow_attachments,
        }),
        other => return Err(invalid(format!("unknown question type: {other}"))),
    };

    Ok(Question {
        id: q.id,
        text: q.text,
        points: q.points,
        correct_feedback: q.correct_feedback,
        incorrect_feedback: q.incorrect_feedback,
        explanation: q.explanation,
        kind,
    })
}

fn convert_normalization(
    question: &str,
    n: &TomlNormalization,
) -> Result<Normalization, ConfigError> {
    let missing = |field: &str| ConfigError::InvalidNormalization {
        question: question.to_string(),
        message: format!("{} normalization needs {field}", n.method),
    };

    match n.method.to_lowercase().as_str() {
        "none" => Ok(Normalization::None),
        "zscore" | "z_score" => Ok(Normalization::ZScore {
            mean: n.mean.ok_or_else(|| missing("mean"))?,
            std_dev: n.std_dev.ok_or_else(|| missing("std_dev"))?,
        }),
        "minmax" | "min_max" => Ok(Normalization::MinMax {
            input_min: n.input_min.ok_or_else(|| missing("input_min"))?,
            input_max: n.input_max.ok_or_else(|| missing("input_max"))?,
            output_min: n.output_min.ok_or_else(|| missing("output_min"))?,
            output_max: n.output_max.ok_or_else(|| missing("output_max"))?,
        }),
        "custom" => Ok(Normalization::Custom {
            mapping: n.mapping.clone(),
        }),
        other => Err(ConfigError::InvalidNormalization {
            question: question.to_string(),
            message: format!("unknown method: {other}"),
        }),
    }
}

fn convert_rubric(r: TomlRubric) -> Rubric {
    Rubric {
        id: r.id,
        title: r.title,
        description: r.description,
        criteria: r
            .criteria
            .into_iter()
            .map(|c| Criterion {
                id: c.id,
                name: c.name,
                description: c.description,
                max_points: c.max_points,
                weight: c.weight,
                performance_levels: c
                    .performance_levels
                    .into_iter()
                    .map(|l| PerformanceLevel {
                        name: l.name,
                        points: l.points,
                        description: l.description,
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Recursively load all `.toml` quiz bank files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a quiz for common authoring mistakes.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning::question(
                &question.id,
                format!("duplicate question ID: {}", question.id),
            ));
        }
    }

    for question in &quiz.questions {
        match &question.kind {
            QuestionKind::SingleChoice(choice) | QuestionKind::MultipleChoice(choice) => {
                validate_choice_question(question, choice, &mut warnings);
            }
            QuestionKind::Essay(essay) => {
                validate_essay_question(quiz, question, essay, &mut warnings);
            }
            QuestionKind::TrueFalse(_) => {}
        }
    }

    for rubric in &quiz.rubrics {
        if rubric.total_points() <= 0.0 {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("rubric {} has a total of zero points", rubric.id),
            });
        }
    }

    warnings
}

fn validate_choice_question(
    question: &Question,
    choice: &ChoiceQuestion,
    warnings: &mut Vec<ValidationWarning>,
) {
    let id = &question.id;

    let mut seen = HashSet::new();
    for c in &choice.choices {
        if !seen.insert(&c.id) {
            warnings.push(ValidationWarning::question(
                id,
                format!("duplicate choice ID: {}", c.id),
            ));
        }
    }

    if choice.correct_ids().next().is_none() {
        warnings.push(ValidationWarning::question(id, "no correct choice"));
    }

    if choice.use_partial_credit {
        let has_positive = choice
            .choices
            .iter()
            .any(|c| !c.is_neutral && c.points_value.is_some_and(|p| p > 0.0));
        if !has_positive {
            warnings.push(ValidationWarning::question(
                id,
                "partial credit enabled but no choice has a positive points_value",
            ));
        }
    }

    if let Some(minimum) = choice.minimum_score {
        if minimum < 0.0 {
            warnings.push(ValidationWarning::question(
                id,
                format!("minimum_score {minimum} is negative and will be treated as 0"),
            ));
        }
        if minimum > question.points {
            warnings.push(ValidationWarning::question(
                id,
                format!(
                    "minimum_score {minimum} exceeds question points {}",
                    question.points
                ),
            ));
        }
    }

    match &choice.normalization {
        Normalization::ZScore { std_dev, .. } if *std_dev == 0.0 => {
            warnings.push(ValidationWarning::question(
                id,
                "zscore std_dev is zero; raw scores will pass through",
            ));
        }
        Normalization::MinMax {
            input_min,
            input_max,
            ..
        } if input_min == input_max => {
            warnings.push(ValidationWarning::question(
                id,
                "minmax input_min equals input_max; raw scores will pass through",
            ));
        }
        Normalization::None => {}
        _ if !choice.use_partial_credit => {
            warnings.push(ValidationWarning::question(
                id,
                "normalization is ignored without use_partial_credit",
            ));
        }
        _ => {}
    }
}

fn validate_essay_question(
    quiz: &Quiz,
    question: &Question,
    essay: &EssayQuestion,
    warnings: &mut Vec<ValidationWarning>,
) {
    let id = &question.id;

    if essay.min_word_count > 0
        && essay.max_word_count > 0
        && essay.min_word_count > essay.max_word_count
    {
        warnings.push(ValidationWarning::question(
            id,
            format!(
                "min_word_count {} exceeds max_word_count {}",
                essay.min_word_count, essay.max_word_count
            ),
        ));
    }

    match &essay.rubric {
        Some(rubric) if quiz.rubric(rubric).is_none() => {
            warnings.push(ValidationWarning::question(
                id,
                format!("rubric not found: {rubric}"),
            ));
        }
        None if essay.use_detailed_rubric => {
            warnings.push(ValidationWarning::question(
                id,
                "use_detailed_rubric is true but no rubric provided",
            ));
        }
        _ => {}
    }
}

/// Parse one JSON submission file.
pub fn load_submission(path: &Path) -> Result<AttemptSubmission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse submission JSON: {}", path.display()))
}

/// Load submissions from a file or a directory of `.json` files.
///
/// A file may hold a single submission object or an array of them. Directory
/// entries are read in file name order.
pub fn load_submissions(path: &Path) -> Result<Vec<AttemptSubmission>> {
    if path.is_dir() {
        let mut files = std::fs::read_dir(path)
            .with_context(|| format!("failed to read directory: {}", path.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        files.retain(|p| p.extension().is_some_and(|ext| ext == "json"));
        files.sort();

        let mut submissions = Vec::new();
        for file in files {
            submissions.extend(load_submissions(&file)?);
        }
        return Ok(submissions);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse submission JSON: {}", path.display()))?;

    let submissions: Vec<AttemptSubmission> = if value.is_array() {
        serde_json::from_value(value)
            .with_context(|| format!("invalid submission: {}", path.display()))?
    } else {
        vec![serde_json::from_value(value)
            .with_context(|| format!("invalid submission: {}", path.display()))?]
    };

    Ok(submissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
id = "basics"
title = "Scoring Basics"
description = "A small quiz"
passing_score = 60
max_attempts = 2

[quiz.conditional_feedback]
"80-100" = "Great work!"
"0-79" = "Keep practicing."

[[questions]]
id = "capital"
type = "multiple_choice"
allow_multiple = false
text = "Capital of France?"
points = 2

[[questions.choices]]
id = "a"
text = "Paris"
is_correct = true

[[questions.choices]]
id = "b"
text = "Lyon"

[[questions]]
id = "primes"
type = "multiple_choice"
text = "Select the primes"
points = 10
use_partial_credit = true
minimum_score = 0

[questions.normalization]
method = "minmax"
input_min = 0
input_max = 9
output_min = 1
output_max = 10

[[questions.choices]]
id = "2"
is_correct = true
points_value = 5

[[questions.choices]]
id = "9"
points_value = -2

[[questions.choices]]
id = "idk"
is_neutral = true

[[questions]]
id = "sky"
type = "true_false"
text = "The sky is blue."
correct_answer = true

[[questions]]
id = "essay"
type = "essay"
text = "Explain unit testing."
points = 20
min_word_count = 50
max_word_count = 500
rubric = "essay-rubric"
use_detailed_rubric = true

[[rubrics]]
id = "essay-rubric"
title = "Essay Rubric"

[[rubrics.criteria]]
id = "content"
name = "Content"
max_points = 10

[[rubrics.criteria]]
id = "clarity"
name = "Clarity"
max_points = 10

[[rubrics.criteria.performance_levels]]
name = "Clear"
points = 10

[[rubrics.criteria.performance_levels]]
name = "Unclear"
points = 0
"#;

    fn parse(toml: &str) -> Quiz {
        parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap()
    }

    #[test]
    fn parse_valid_toml() {
        let quiz = parse(VALID_TOML);
        assert_eq!(quiz.id, "basics");
        assert_eq!(quiz.passing_score, Some(60.0));
        assert_eq!(quiz.max_attempts, 2);
        assert_eq!(quiz.questions.len(), 4);
        assert_eq!(quiz.max_score(), 33.0);

        // Bands come back ordered by their lower bound.
        assert_eq!(quiz.conditional_feedback[0].min, 0.0);
        assert_eq!(quiz.conditional_feedback[1].message, "Great work!");

        assert!(matches!(quiz.questions[0].kind, QuestionKind::SingleChoice(_)));
        let QuestionKind::MultipleChoice(primes) = &quiz.questions[1].kind else {
            panic!("expected multiple choice");
        };
        assert!(primes.use_partial_credit);
        assert_eq!(primes.normalization.method_name(), "minmax");
        assert!(primes.choices[2].is_neutral);

        let QuestionKind::Essay(essay) = &quiz.questions[3].kind else {
            panic!("expected essay");
        };
        assert_eq!(essay.rubric.as_deref(), Some("essay-rubric"));
        assert_eq!(quiz.rubrics[0].total_points(), 20.0);
        assert_eq!(quiz.rubrics[0].criteria[1].performance_levels.len(), 2);
        assert!(validate_quiz(&quiz).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[quiz]
id = "minimal"
title = "Minimal"

[[questions]]
id = "q1"
type = "true_false"
text = "Rust is memory safe."
correct_answer = true
"#;
        let quiz = parse(toml);
        assert_eq!(quiz.passing_score, None);
        assert_eq!(quiz.max_attempts, 0);
        assert_eq!(quiz.questions[0].points, 1.0);
        assert!(quiz.conditional_feedback.is_empty());
    }

    #[test]
    fn parse_zscore_and_custom() {
        let toml = r#"
[quiz]
id = "norm"
title = "Normalization"

[[questions]]
id = "z"
type = "multiple_choice"
text = "?"
points = 10
use_partial_credit = true
normalization = { method = "zscore", mean = 5, std_dev = 2 }

[[questions.choices]]
id = "a"
is_correct = true
points_value = 5

[[questions]]
id = "c"
type = "multiple_choice"
text = "?"
points = 10
use_partial_credit = true

[questions.normalization]
method = "custom"
mapping = { "2" = 4, "5" = 7 }

[[questions.choices]]
id = "a"
is_correct = true
points_value = 5
"#;
        let quiz = parse(toml);
        let QuestionKind::MultipleChoice(z) = &quiz.questions[0].kind else {
            panic!("expected multiple choice");
        };
        assert_eq!(
            z.normalization,
            Normalization::ZScore {
                mean: 5.0,
                std_dev: 2.0
            }
        );
        let QuestionKind::MultipleChoice(c) = &quiz.questions[1].kind else {
            panic!("expected multiple choice");
        };
        let Normalization::Custom { mapping } = &c.normalization else {
            panic!("expected custom");
        };
        assert_eq!(mapping.get("5"), Some(&7.0));
    }

    #[test]
    fn missing_normalization_parameter() {
        let toml = r#"
[quiz]
id = "bad"
title = "Bad"

[[questions]]
id = "z"
type = "multiple_choice"
text = "?"
normalization = { method = "zscore", mean = 5 }
"#;
        let err = parse_quiz_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("needs std_dev"));
    }

    #[test]
    fn unknown_type_and_method() {
        let bad_type = r#"
[quiz]
id = "bad"
title = "Bad"

[[questions]]
id = "q"
type = "matching"
text = "?"
"#;
        let err = parse_quiz_str(bad_type, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown question type"));

        let bad_method = r#"
[quiz]
id = "bad"
title = "Bad"

[[questions]]
id = "q"
type = "multiple_choice"
text = "?"
normalization = { method = "curve" }
"#;
        let err = parse_quiz_str(bad_method, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown method"));
    }

    #[test]
    fn true_false_needs_answer() {
        let toml = r#"
[quiz]
id = "bad"
title = "Bad"

[[questions]]
id = "q"
type = "true_false"
text = "?"
"#;
        assert!(parse_quiz_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn bad_feedback_band() {
        let toml = r#"
[quiz]
id = "bad"
title = "Bad"

[quiz.conditional_feedback]
"high" = "Nope"
"#;
        let err = parse_quiz_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("invalid feedback band"));
    }

    #[test]
    fn validate_reports_authoring_mistakes() {
        let toml = r#"
[quiz]
id = "dupes"
title = "Dupes"

[[questions]]
id = "same"
type = "multiple_choice"
text = "?"
points = 2
use_partial_credit = true
minimum_score = 5

[[questions.choices]]
id = "a"
points_value = -1

[[questions.choices]]
id = "a"

[[questions]]
id = "same"
type = "essay"
text = "?"
min_word_count = 100
max_word_count = 10
use_detailed_rubric = true

[[questions]]
id = "z"
type = "multiple_choice"
text = "?"
use_partial_credit = true
normalization = { method = "zscore", mean = 1, std_dev = 0 }

[[questions.choices]]
id = "a"
is_correct = true
points_value = 1

[[questions]]
id = "orphan"
type = "essay"
text = "?"
rubric = "missing"
"#;
        let quiz = parse(toml);
        let messages: Vec<String> = validate_quiz(&quiz)
            .into_iter()
            .map(|w| w.message)
            .collect();
        let has = |needle: &str| messages.iter().any(|m| m.contains(needle));

        assert!(has("duplicate question ID"));
        assert!(has("duplicate choice ID"));
        assert!(has("no correct choice"));
        assert!(has("no choice has a positive points_value"));
        assert!(has("exceeds question points"));
        assert!(has("exceeds max_word_count"));
        assert!(has("no rubric provided"));
        assert!(has("std_dev is zero"));
        assert!(has("rubric not found: missing"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_quiz_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("basics.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id, "basics");
    }

    #[test]
    fn load_single_and_array_submissions() {
        let dir = tempfile::tempdir().unwrap();
        let single = r#"{
            "attempt_id": "a1",
            "quiz_id": "basics",
            "student": "alice",
            "responses": [
                {"question_id": "capital", "answer": "a"},
                {"question_id": "primes", "answer": ["2", 9]},
                {"question_id": "sky", "answer": true},
                {"question_id": "essay", "answer": {"essay_text": "Tests check code."}}
            ]
        }"#;
        let many = r#"[
            {"attempt_id": "b1", "quiz_id": "basics", "student": "bob", "responses": []},
            {"attempt_id": "c1", "quiz_id": "basics", "student": "carol"}
        ]"#;
        std::fs::write(dir.path().join("01-alice.json"), single).unwrap();
        std::fs::write(dir.path().join("02-others.json"), many).unwrap();

        let alice = load_submission(&dir.path().join("01-alice.json")).unwrap();
        assert_eq!(alice.responses.len(), 4);
        assert_eq!(
            alice.responses[1].answer.as_ref().unwrap().selected_ids(),
            vec!["2", "9"]
        );

        let all = load_submissions(dir.path()).unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.attempt_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn invalid_submission_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"student": "x"}"#).unwrap();
        assert!(load_submissions(&path).is_err());
    }
}
