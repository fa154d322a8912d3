//! The `levelcheck grade` command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use levelcheck_core::config::load_config_from;
use levelcheck_core::engine::Assessment;
use levelcheck_core::parser;

use super::output::{parse_formats, print_summary, write_reports, ConsoleObserver};

/// Answers collected outside the interactive session.
#[derive(Debug, Deserialize)]
struct AnswerSheet {
    student_name: String,
    #[serde(default)]
    answers: BTreeMap<String, String>,
    #[serde(default)]
    elapsed_secs: Option<u64>,
}

fn load_answer_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answer sheet: {}", path.display()))
}

pub fn execute(
    bank_path: PathBuf,
    answers_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let formats = parse_formats(format.as_deref().unwrap_or(&config.default_format))?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let bank = parser::load_bank(&bank_path)?;
    let sheet = load_answer_sheet(&answers_path)?;
    tracing::info!(
        answers = sheet.answers.len(),
        elapsed_secs = sheet.elapsed_secs.unwrap_or(0),
        "grading answer sheet"
    );

    let mut assessment =
        Assessment::with_config(Arc::new(bank), &config).with_observer(Arc::new(ConsoleObserver));
    let lease = assessment.start_session(&sheet.student_name, false)?;

    let mut skipped = 0usize;
    for (question_id, key) in &sheet.answers {
        match assessment.record_answer(question_id, key) {
            Ok(()) => {}
            Err(e) if e.is_invalid_answer() => {
                eprintln!("Skipping answer: {e}");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    if skipped > 0 {
        eprintln!("{skipped} answer(s) skipped.");
    }

    assessment.advance_clock(&lease, sheet.elapsed_secs.unwrap_or(0));
    assessment.submit()?;

    let report = assessment.report()?;
    print_summary(&report);
    println!("\n{}\n", report.narrative);
    write_reports(&report, &output, &formats)?;

    Ok(())
}
