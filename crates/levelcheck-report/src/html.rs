//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use levelcheck_core::analysis::{GrammarAreaStat, WEAK_AREA_THRESHOLD};
use levelcheck_core::report::{AssessmentReport, SectionResult};
use levelcheck_core::scoring::SectionScore;
use levelcheck_core::session::format_clock;

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an assessment report.
pub fn generate_html(report: &AssessmentReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Assessment report: {}</title>\n",
        html_escape(&report.student_name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>Assessment report: {}</h1>\n",
        html_escape(&report.student_name)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Bank: <strong>{}</strong> | {} questions | {} answered | Time taken {} | {}</p>\n",
        html_escape(&report.bank.name),
        report.bank.question_count,
        report.answered_count(),
        format_clock(report.elapsed_secs),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if report.timer_enabled {
        html.push_str(&format!(
            "<p class=\"meta\">Timed session | {} left | {} extension(s) used</p>\n",
            format_clock(u64::from(report.time_remaining_secs)),
            report.extensions_used
        ));
    }
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Section</th><th>Score</th><th>Percentage</th><th>Level</th><th>Band</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    html.push_str(&summary_row("Vocabulary", report.scores.vocabulary, &report.vocabulary));
    html.push_str(&summary_row("Grammar", report.scores.grammar, &report.grammar));
    html.push_str(&format!(
        "<tr class=\"overall\"><td>Overall</td><td>{}/{}</td><td>{}</td><td colspan=\"2\"></td></tr>\n",
        report.scores.combined().correct,
        report.scores.combined().total,
        report
            .overall_percentage
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "undefined".to_string()),
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Grammar areas
    if !report.grammar_areas.is_empty() {
        html.push_str("<section class=\"areas\">\n");
        html.push_str("<h2>Grammar areas</h2>\n");
        html.push_str(&generate_bar_chart(&report.grammar_areas));
        html.push_str("</section>\n");
    }

    // Feedback
    html.push_str("<section class=\"narrative\">\n");
    html.push_str("<h2>Examiner feedback</h2>\n");
    for paragraph in report.narrative.split("\n\n") {
        html.push_str(&format!("<p>{}</p>\n", html_escape(paragraph.trim())));
    }
    html.push_str("</section>\n");

    // Per-question breakdown
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Question breakdown</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Question</th><th onclick=\"sortTable(1)\">Section</th><th onclick=\"sortTable(2)\">Tag</th><th>Text</th><th onclick=\"sortTable(4)\">Your answer</th><th>Correct answer</th><th>Explanation</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for outcome in &report.breakdown {
        let class = if outcome.is_correct { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&outcome.question_id),
            outcome.section,
            html_escape(&outcome.tag),
            html_escape(&outcome.text),
            html_escape(&outcome.selected_text),
            html_escape(&outcome.correct_text),
            html_escape(outcome.explanation.as_deref().unwrap_or("")),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn summary_row(name: &str, score: SectionScore, result: &SectionResult) -> String {
    format!(
        "<tr><td>{}</td><td>{}/{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        name,
        score.correct,
        score.total,
        result.percentage_label(),
        result.level_label(),
        result.external_band().unwrap_or("n/a"),
    )
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AssessmentReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars, one per grammar area, weakest at the top.
fn generate_bar_chart(areas: &[GrammarAreaStat]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 220;

    let total_height = areas.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 100,
        total_height
    );

    for (i, area) in areas.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (area.percentage / 100.0 * max_width as f64).round() as usize;

        let color = if area.percentage >= 80.0 {
            "#22c55e"
        } else if area.percentage >= WEAK_AREA_THRESHOLD {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&area.area)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}% ({}/{})</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            area.percentage,
            area.correct,
            area.total
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
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); max-width: 72rem; }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); cursor: pointer; }
tr.overall td { font-weight: bold; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.narrative p { line-height: 1.6; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
@media print { details, script { display: none; } body { padding: 0; } }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
