//! The `levelcheck show` command.

use std::path::PathBuf;

use anyhow::Result;

use levelcheck_core::report::AssessmentReport;
use levelcheck_report::markdown::generate_markdown;

use super::output::print_summary;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = AssessmentReport::load_json(&report_path)?;

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", generate_markdown(&report));
        }
        "text" => {
            println!("{} | {}", report.bank.name, report.created_at.format("%Y-%m-%d %H:%M UTC"));
            print_summary(&report);

            if !report.grammar_areas.is_empty() {
                println!("\nGrammar areas (weakest first):");
                for area in &report.grammar_areas {
                    println!(
                        "  {:<28} {:>3}/{:<3} {:>5.1}%{}",
                        area.area,
                        area.correct,
                        area.total,
                        area.percentage,
                        if area.is_weak() { "  weak" } else { "" }
                    );
                }
            }

            println!("\n{}", report.narrative);
        }
        other => anyhow::bail!("unknown format: '{other}' (expected text or markdown)"),
    }

    Ok(())
}
