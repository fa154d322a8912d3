//! Markdown report generator.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use levelcheck_core::report::{AssessmentReport, SectionResult};
use levelcheck_core::scoring::SectionScore;
use levelcheck_core::session::format_clock;

/// Escape characters that would break a Markdown table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Generate a Markdown report from an assessment report.
pub fn generate_markdown(report: &AssessmentReport) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Assessment report: {}\n", report.student_name);
    let _ = writeln!(
        md,
        "- **Bank:** {} ({} questions, {} answered)",
        report.bank.name,
        report.bank.question_count,
        report.answered_count()
    );
    let _ = writeln!(md, "- **Time taken:** {}", format_clock(report.elapsed_secs));
    if report.timer_enabled {
        let _ = writeln!(
            md,
            "- **Time left:** {} ({} extension(s) used)",
            format_clock(u64::from(report.time_remaining_secs)),
            report.extensions_used
        );
    }
    let _ = writeln!(
        md,
        "- **Date:** {}\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    md.push_str("## Summary\n\n");
    md.push_str("| Section | Score | Percentage | Level | Band |\n");
    md.push_str("|---|---|---|---|---|\n");
    md.push_str(&summary_row("Vocabulary", report.scores.vocabulary, &report.vocabulary));
    md.push_str(&summary_row("Grammar", report.scores.grammar, &report.grammar));
    let combined = report.scores.combined();
    let _ = writeln!(
        md,
        "| **Overall** | {}/{} | {} | | |\n",
        combined.correct,
        combined.total,
        report
            .overall_percentage
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "undefined".to_string())
    );

    if !report.grammar_areas.is_empty() {
        md.push_str("## Grammar areas\n\n");
        md.push_str("| Area | Correct | Percentage | |\n");
        md.push_str("|---|---|---|---|\n");
        for area in &report.grammar_areas {
            let _ = writeln!(
                md,
                "| {} | {}/{} | {:.1}% | {} |",
                cell(&area.area),
                area.correct,
                area.total,
                area.percentage,
                if area.is_weak() { "weak" } else { "" }
            );
        }
        md.push('\n');
    }

    md.push_str("## Examiner feedback\n\n");
    for paragraph in report.narrative.split("\n\n") {
        let _ = writeln!(md, "{}\n", paragraph.trim());
    }

    md.push_str("## Question breakdown\n\n");
    md.push_str("| # | Section | Tag | Question | Your answer | Correct answer | |\n");
    md.push_str("|---|---|---|---|---|---|---|\n");
    for outcome in &report.breakdown {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} | {} |",
            cell(&outcome.question_id),
            outcome.section,
            cell(&outcome.tag),
            cell(&outcome.text),
            cell(&outcome.selected_text),
            cell(&outcome.correct_text),
            if outcome.is_correct { "✓" } else { "✗" }
        );
    }

    let explained: Vec<_> = report
        .breakdown
        .iter()
        .filter_map(|o| o.explanation.as_deref().map(|e| (o, e)))
        .collect();
    if !explained.is_empty() {
        md.push_str("\n### Explanations\n\n");
        for (outcome, explanation) in explained {
            let _ = writeln!(md, "- **{}:** {}", outcome.question_id, explanation);
        }
    }

    md
}

fn summary_row(name: &str, score: SectionScore, result: &SectionResult) -> String {
    format!(
        "| {} | {}/{} | {} | {} | {} |\n",
        name,
        score.correct,
        score.total,
        result.percentage_label(),
        result.level_label(),
        result.external_band().unwrap_or("n/a"),
    )
}

/// Write a Markdown report to a file.
pub fn write_markdown_report(report: &AssessmentReport, path: &Path) -> Result<()> {
    let md = generate_markdown(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, md)
        .with_context(|| format!("failed to write Markdown report to {}", path.display()))?;
    Ok(())
}
