//! Report output shared by the `take` and `grade` commands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use levelcheck_core::engine::SessionObserver;
use levelcheck_core::report::AssessmentReport;
use levelcheck_core::session::{format_clock, SessionProgress};
use levelcheck_report::html::write_html_report;
use levelcheck_report::markdown::write_markdown_report;

/// A report file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Html,
    Markdown,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
        }
    }
}

/// Parse a comma-separated format list; `all` selects every format.
pub fn parse_formats(format: &str) -> Result<Vec<ReportFormat>> {
    if format.trim() == "all" {
        return Ok(vec![
            ReportFormat::Json,
            ReportFormat::Html,
            ReportFormat::Markdown,
        ]);
    }

    let mut formats = Vec::new();
    for name in format.split(',').map(str::trim) {
        let fmt = match name {
            "json" => ReportFormat::Json,
            "html" => ReportFormat::Html,
            "markdown" | "md" => ReportFormat::Markdown,
            other => anyhow::bail!("unknown format: '{other}' (expected json, html, markdown, all)"),
        };
        if !formats.contains(&fmt) {
            formats.push(fmt);
        }
    }
    Ok(formats)
}

/// Write the report in each format and return the written paths.
pub fn write_reports(
    report: &AssessmentReport,
    output: &Path,
    formats: &[ReportFormat],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output)?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
    let stem = format!("report-{}-{timestamp}", report.file_stem());

    let mut written = Vec::new();
    for fmt in formats {
        let path = output.join(format!("{stem}.{}", fmt.extension()));
        match fmt {
            ReportFormat::Json => {
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            ReportFormat::Html => {
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            ReportFormat::Markdown => {
                write_markdown_report(report, &path)?;
                eprintln!("Markdown report: {}", path.display());
            }
        }
        written.push(path);
    }
    Ok(written)
}

/// Print the per-section summary table.
pub fn print_summary(report: &AssessmentReport) {
    let mut table = Table::new();
    table.set_header(vec!["Section", "Score", "Percentage", "Level", "Band"]);

    for (name, score, result) in [
        ("Vocabulary", report.scores.vocabulary, &report.vocabulary),
        ("Grammar", report.scores.grammar, &report.grammar),
    ] {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{}/{}", score.correct, score.total)),
            Cell::new(result.percentage_label()),
            Cell::new(result.level_label()),
            Cell::new(result.external_band().unwrap_or("n/a")),
        ]);
    }

    let combined = report.scores.combined();
    table.add_row(vec![
        Cell::new("Overall"),
        Cell::new(format!("{}/{}", combined.correct, combined.total)),
        Cell::new(
            report
                .overall_percentage
                .map(|p| format!("{p:.1}%"))
                .unwrap_or_else(|| "undefined".to_string()),
        ),
        Cell::new(""),
        Cell::new(""),
    ]);

    println!("\n{table}");
    println!(
        "Student: {} | Time taken: {}",
        report.student_name,
        format_clock(report.elapsed_secs)
    );
    if !report.weak_areas.is_empty() {
        println!("Weak areas: {}", report.weak_areas.join(", "));
    }
}

/// Console session observer.
pub struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_start(&self, student_name: &str, timer_enabled: bool) {
        let mode = if timer_enabled { "timed" } else { "untimed" };
        eprintln!("Starting assessment for {student_name} ({mode})");
    }

    fn on_answer(&self, _: &str, _: &str) {}

    fn on_time_exhausted(&self) {
        eprintln!("\nTime is up.");
    }

    fn on_submit(&self, progress: SessionProgress) {
        eprintln!(
            "Submitted: {}/{} answered ({:.0}%)",
            progress.answered,
            progress.total,
            progress.percent_complete()
        );
    }

    fn on_restart(&self) {
        eprintln!("Assessment abandoned.");
    }
}
