//! HTML gradebook generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use quizmark_core::report::GradeReport;
use quizmark_core::statistics::QuestionStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML gradebook from a grade report.
pub fn generate_html(report: &GradeReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizmark gradebook: {}</title>\n",
        html_escape(&report.quiz.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>quizmark gradebook</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Quiz: <strong>{}</strong> | {} questions | {} points | pass at {:.0}% | {}</p>\n",
        html_escape(&report.quiz.title),
        report.quiz.question_count,
        report.quiz.max_score,
        report.quiz.passing_score,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    let stats = &report.statistics;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Attempts</th><th>Failed</th><th>Mean</th><th>Std Dev</th><th>Pass Rate</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{:.1}%</td><td>{:.1}</td><td>{:.1}%</td></tr></tbody>\n",
        stats.attempts,
        report.failures.len(),
        stats.mean_percentage,
        stats.std_dev_percentage,
        stats.pass_rate * 100.0,
    ));
    html.push_str("</table>\n");

    // Per-question table and chart
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"questions\">\n");
    html.push_str("<thead><tr><th>Question</th><th>Type</th><th>Points</th><th>Graded</th><th>Mean</th><th>Std Dev</th><th>Correct</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for q in &stats.per_question {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.1}%</td></tr>\n",
            html_escape(&q.question_id),
            html_escape(&q.question_type),
            q.max_points,
            q.graded,
            q.responses,
            q.mean_points,
            q.std_dev,
            q.correct_rate * 100.0,
        ));
    }
    html.push_str("</tbody></table>\n");

    if !stats.per_question.is_empty() {
        html.push_str(&generate_bar_chart(&stats.per_question));
    }

    html.push_str("</section>\n");

    // Per-attempt results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Attempts</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Attempt</th><th onclick=\"sortTable(1)\">Student</th><th onclick=\"sortTable(2)\">#</th><th onclick=\"sortTable(3)\">Score</th><th onclick=\"sortTable(4)\">Percent</th><th onclick=\"sortTable(5)\">Result</th><th>Ungraded</th><th>Feedback</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for a in &report.attempts {
        let class = if a.summary.is_passed { "pass" } else { "fail" };
        let result = if a.summary.is_passed { "PASS" } else { "FAIL" };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{:.1}%</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&a.attempt_id),
            html_escape(&a.student),
            a.attempt_number,
            a.summary.score,
            a.summary.max_score,
            a.summary.percentage,
            result,
            a.summary.ungraded,
            html_escape(a.summary.feedback.as_deref().unwrap_or("")),
        ));
    }

    html.push_str("</tbody></table>\n");

    if !report.failures.is_empty() {
        html.push_str("<h2>Rejected attempts</h2>\n<ul class=\"failures\">\n");
        for f in &report.failures {
            html.push_str(&format!(
                "<li><strong>{}</strong> ({}): {}</li>\n",
                html_escape(&f.attempt_id),
                html_escape(&f.student),
                html_escape(&f.error)
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML gradebook to a file.
pub fn write_html_report(report: &GradeReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Horizontal bars of per-question correct rates.
fn generate_bar_chart(questions: &[QuestionStats]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    let total_height = questions.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg class=\"chart\" width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, q) in questions.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let rate = q.correct_rate.clamp(0.0, 1.0);
        let width = (rate * max_width as f64) as usize;

        let color = if rate >= 0.8 {
            "#22c55e"
        } else if rate >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&q.question_id)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            rate * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.failures li { margin: 0.25rem 0; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  const key = cell => {
    const n = parseFloat(cell.textContent);
    return isNaN(n) ? cell.textContent : n;
  };
  rows.sort((a, b) => {
    const va = key(a.cells[col]);
    const vb = key(b.cells[col]);
    const cmp = typeof va === 'number' && typeof vb === 'number' ? va - vb : String(va).localeCompare(String(vb));
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
