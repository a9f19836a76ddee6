//! The `quizmark init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizmark.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("quiz-banks").context("failed to create quiz-banks/")?;
    write_if_missing(Path::new("quiz-banks/example.toml"), EXAMPLE_QUIZ)?;

    println!("\nNext steps:");
    println!("  1. Edit quiz-banks/example.toml with your questions");
    println!("  2. Run: quizmark validate --quiz quiz-banks/example.toml");
    println!("  3. Run: quizmark grade --quiz quiz-banks/example.toml --submissions submissions/");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizmark configuration

# Recorded as the grader on automatically scored responses.
grader = "quizmark"

# Attempts graded concurrently.
parallelism = 4

# Where grade reports are written.
output_dir = "./quizmark-results"

# Used when a quiz does not set passing_score.
default_passing_score = 70
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Quiz"
description = "A small quiz to get started"
passing_score = 60
max_attempts = 3

[quiz.conditional_feedback]
"90-100" = "Excellent work!"
"60-89" = "Good job, review the questions you missed."
"0-59" = "Please review the material and try again."

[[questions]]
id = "capital"
type = "single_choice"
text = "What is the capital of France?"
points = 2
explanation = "Paris has been the capital since the 10th century."

[[questions.choices]]
id = "a"
text = "Paris"
is_correct = true

[[questions.choices]]
id = "b"
text = "Lyon"

[[questions.choices]]
id = "c"
text = "Marseille"

[[questions]]
id = "primes"
type = "multiple_choice"
text = "Select every prime number."
points = 4
use_partial_credit = true

[[questions.choices]]
id = "2"
is_correct = true
points_value = 2

[[questions.choices]]
id = "3"
is_correct = true
points_value = 2

[[questions.choices]]
id = "4"
points_value = -1

[[questions.choices]]
id = "unsure"
text = "I don't know"
is_neutral = true

[[questions]]
id = "rust-memory"
type = "true_false"
text = "Rust uses a garbage collector."
correct_answer = false

[[questions]]
id = "reflection"
type = "essay"
text = "Describe what you learned this week."
points = 10
min_word_count = 20
max_word_count = 300
rubric = "reflection-rubric"
use_detailed_rubric = true

[[rubrics]]
id = "reflection-rubric"
title = "Reflection"

[[rubrics.criteria]]
id = "insight"
name = "Insight"
max_points = 6

[[rubrics.criteria]]
id = "writing"
name = "Writing"
max_points = 4
"#;
