//! The `quizmark compare` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::report::GradeReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold cannot be negative");

    let baseline = GradeReport::load_json(&baseline_path)?;
    let current = GradeReport::load_json(&current_path)?;

    if baseline.quiz.id != current.quiz.id {
        eprintln!(
            "Warning: comparing reports for different quizzes ('{}' vs '{}')",
            baseline.quiz.id, current.quiz.id
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged, {} pass/fail changes",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged,
                report.status_changes
            );

            for (title, changes) in [
                ("Regressions", &report.regressions),
                ("Improvements", &report.improvements),
            ] {
                if changes.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for c in changes {
                    println!(
                        "  {} ({}) {:.1}% -> {:.1}% ({:+.1}%)",
                        c.attempt_id,
                        c.student,
                        c.baseline_percentage,
                        c.current_percentage,
                        c.delta
                    );
                }
            }

            if report.new_attempts > 0 {
                println!("\n{} new attempt(s)", report.new_attempts);
            }
            if report.removed_attempts > 0 {
                println!("{} removed attempt(s)", report.removed_attempts);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
