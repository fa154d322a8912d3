//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{GrammarArea, Question, QuestionBank, Section};

/// Allowed number of options per question.
pub const OPTION_COUNT_RANGE: std::ops::RangeInclusive<usize> = 2..=5;

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    section: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    options: BTreeMap<String, String>,
    correct_option: String,
    #[serde(default)]
    grammar_area: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let section: Section = q
                .section
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

            let grammar_area = q
                .grammar_area
                .map(|a| {
                    a.parse::<GrammarArea>()
                        .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))
                })
                .transpose()?;

            anyhow::ensure!(
                q.options.contains_key(&q.correct_option),
                "question {}: correct_option '{}' is not one of its options",
                q.id,
                q.correct_option
            );

            Ok(Question {
                id: q.id,
                text: q.text,
                section,
                options: q.options,
                correct_option: q.correct_option,
                grammar_area,
                explanation: q.explanation.filter(|e| !e.trim().is_empty()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionBank {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        questions,
    })
}

/// Recursively load all `.toml` bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Load a bank from a file, or the first bank found in a directory.
pub fn load_bank(path: &Path) -> Result<QuestionBank> {
    if path.is_dir() {
        load_bank_directory(path)?
            .into_iter()
            .next()
            .with_context(|| format!("no question bank found in {}", path.display()))
    } else {
        parse_bank(path)
    }
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a bank for common issues.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning::question(
                &q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
    }

    for q in &bank.questions {
        if !OPTION_COUNT_RANGE.contains(&q.options.len()) {
            warnings.push(ValidationWarning::question(
                &q.id,
                format!(
                    "has {} options, expected {} to {}",
                    q.options.len(),
                    OPTION_COUNT_RANGE.start(),
                    OPTION_COUNT_RANGE.end()
                ),
            ));
        }

        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning::question(&q.id, "question text is empty"));
        }

        match (q.section, q.grammar_area) {
            (Section::Grammar, None) => warnings.push(ValidationWarning::question(
                &q.id,
                "grammar question has no grammar_area and will be grouped as Unknown Area",
            )),
            (Section::Vocabulary, Some(_)) => warnings.push(ValidationWarning::question(
                &q.id,
                "grammar_area is ignored on vocabulary questions",
            )),
            _ => {}
        }
    }

    for section in Section::ALL {
        if bank.section_total(section) == 0 {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("{section} section has no questions; its score will be undefined"),
            });
        }
    }

    warnings
}
