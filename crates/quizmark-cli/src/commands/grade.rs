//! The `quizmark grade` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use quizmark_core::config::load_config_from;
use quizmark_core::engine::{GradingEngine, GradingEngineConfig, ProgressReporter};
use quizmark_core::parser;
use quizmark_core::report::{AttemptResult, GradeReport};
use quizmark_core::store::MemoryGradeStore;
use quizmark_report::html::write_html_report;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_attempt_start(&self, attempt_id: &str, student: &str) {
        eprintln!("  Grading: {student} :: {attempt_id}");
    }

    fn on_attempt_complete(&self, result: &AttemptResult) {
        let pending = if result.summary.ungraded > 0 {
            format!(", {} awaiting instructor", result.summary.ungraded)
        } else {
            String::new()
        };
        eprintln!(
            "  Done: {} :: {} [{}] {}/{} ({:.1}%){}",
            result.student,
            result.attempt_id,
            result.attempt_number,
            result.summary.score,
            result.summary.max_score,
            result.summary.percentage,
            pending,
        );
    }

    fn on_attempt_error(&self, attempt_id: &str, student: &str, error: &str) {
        eprintln!("  ERROR: {student} :: {attempt_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    quiz_path: PathBuf,
    submissions_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut engine_config = GradingEngineConfig::from(&config);
    if let Some(parallelism) = parallelism {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
        engine_config.parallelism = parallelism;
    }
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let quiz = parser::parse_quiz(&quiz_path)?;
    for w in parser::validate_quiz(&quiz) {
        let prefix = w
            .question_id
            .map(|id| format!("[{id}] "))
            .unwrap_or_default();
        eprintln!("Warning: {prefix}{}", w.message);
    }

    let submissions = parser::load_submissions(&submissions_path)?;
    anyhow::ensure!(
        !submissions.is_empty(),
        "no submissions found in {}",
        submissions_path.display()
    );

    eprintln!(
        "quizmark v{} - Grading {} attempts for '{}' ({} questions)",
        env!("CARGO_PKG_VERSION"),
        submissions.len(),
        quiz.title,
        quiz.questions.len()
    );
    eprintln!();

    let store = Arc::new(MemoryGradeStore::new());
    let engine = GradingEngine::new(store, engine_config);
    let report = engine.run(&quiz, &submissions, &ConsoleReporter).await?;

    print_summary(&report);

    // Save outputs
    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create output directory: {}", output.display()))?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("grades-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("gradebook-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML gradebook: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(report: &GradeReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Attempt", "Student", "#", "Score", "Percent", "Result", "Ungraded", "Feedback",
    ]);

    for attempt in &report.attempts {
        let summary = &attempt.summary;
        table.add_row(vec![
            Cell::new(&attempt.attempt_id),
            Cell::new(&attempt.student),
            Cell::new(attempt.attempt_number),
            Cell::new(format!("{}/{}", summary.score, summary.max_score)),
            Cell::new(format!("{:.1}%", summary.percentage)),
            Cell::new(if summary.is_passed { "PASS" } else { "FAIL" }),
            Cell::new(summary.ungraded),
            Cell::new(summary.feedback.as_deref().unwrap_or("")),
        ]);
    }

    println!("\n{table}");
    println!(
        "Mean: {:.1}% | Pass rate: {:.1}% | Rejected: {}",
        report.statistics.mean_percentage,
        report.statistics.pass_rate * 100.0,
        report.failures.len()
    );
}
