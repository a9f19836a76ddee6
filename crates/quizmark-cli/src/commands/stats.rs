//! The `quizmark stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizmark_core::model::Normalization;
use quizmark_core::report::GradeReport;

pub fn execute(report_path: PathBuf) -> Result<()> {
    let report = GradeReport::load_json(&report_path)?;
    let stats = &report.statistics;

    println!(
        "Quiz: {} | {} attempts | mean {:.1}% (std dev {:.1}) | pass rate {:.1}%",
        report.quiz.title,
        stats.attempts,
        stats.mean_percentage,
        stats.std_dev_percentage,
        stats.pass_rate * 100.0
    );

    let mut table = Table::new();
    table.set_header(vec![
        "Question",
        "Type",
        "Points",
        "Graded",
        "Mean",
        "Std Dev",
        "Correct %",
        "Suggested z-score",
    ]);

    for q in &stats.per_question {
        let suggestion = match &q.suggested_normalization {
            Some(Normalization::ZScore { mean, std_dev }) => {
                format!("mean = {mean:.2}, std_dev = {std_dev:.2}")
            }
            _ => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&q.question_id),
            Cell::new(&q.question_type),
            Cell::new(q.max_points),
            Cell::new(format!("{}/{}", q.graded, q.responses)),
            Cell::new(format!("{:.2}", q.mean_points)),
            Cell::new(format!("{:.2}", q.std_dev)),
            Cell::new(format!("{:.1}%", q.correct_rate * 100.0)),
            Cell::new(suggestion),
        ]);
    }

    println!("{table}");
    Ok(())
}
