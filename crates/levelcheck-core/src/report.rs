//! Assessment report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{analyze, weak_areas, GrammarAreaStat};
use crate::model::{QuestionBank, Section};
use crate::narrative;
use crate::scoring::{score, ProficiencyLevel, ScoreCard, SectionScore};
use crate::session::Session;

/// Text shown for a question the student did not answer.
pub const NO_ANSWER: &str = "No Answer";

/// A complete assessment report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub student_name: String,
    /// Summary of the question bank.
    pub bank: BankSummary,
    /// Wall-clock seconds spent in the active session.
    pub elapsed_secs: u64,
    pub timer_enabled: bool,
    pub time_remaining_secs: u32,
    pub extensions_used: u32,
    pub scores: ScoreCard,
    pub vocabulary: SectionResult,
    pub grammar: SectionResult,
    /// Overall percentage across both sections, if defined.
    pub overall_percentage: Option<f64>,
    /// Grammar areas, weakest first.
    pub grammar_areas: Vec<GrammarAreaStat>,
    /// Weak area labels, weakest first.
    pub weak_areas: Vec<String>,
    /// Examiner feedback.
    pub narrative: String,
    /// Per-question outcomes in bank order.
    pub breakdown: Vec<QuestionOutcome>,
}

/// Summary of a bank (without the questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

/// Derived result for one section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    /// `None` when the section has no questions.
    pub percentage: Option<f64>,
    pub level: Option<ProficiencyLevel>,
}

impl SectionResult {
    fn from_score(score: SectionScore) -> Self {
        Self {
            percentage: score.percentage(),
            level: score.level(),
        }
    }

    /// The informational external band, if the level is defined.
    pub fn external_band(&self) -> Option<&'static str> {
        self.level.map(ProficiencyLevel::external_band)
    }

    /// Percentage formatted for display, or "undefined".
    pub fn percentage_label(&self) -> String {
        self.percentage
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "undefined".to_string())
    }

    /// Level formatted for display, or "n/a".
    pub fn level_label(&self) -> String {
        self.level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "n/a".to_string())
    }
}

/// What the student did with one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub section: Section,
    pub text: String,
    /// Grammar area label, or the vocabulary level for vocabulary questions.
    pub tag: String,
    pub selected_key: Option<String>,
    pub selected_text: String,
    pub correct_key: String,
    pub correct_text: String,
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl AssessmentReport {
    /// Build the report for a session against its bank.
    ///
    /// Works for any session state; the engine only offers it once finished.
    pub fn build(bank: &QuestionBank, session: &Session) -> Self {
        let answers = session.answers();
        let scores = score(answers, bank);
        let vocabulary = SectionResult::from_score(scores.vocabulary);
        let grammar = SectionResult::from_score(scores.grammar);
        let overall_percentage = scores.combined().percentage();

        let grammar_areas = analyze(answers, bank);
        let weak = weak_areas(&grammar_areas);

        let narrative = narrative::generate(
            session.student_name(),
            overall_percentage,
            vocabulary.level,
            grammar.level,
            &weak,
        );

        let vocab_tag = format!("Vocab Level {}", vocabulary.level_label());
        let breakdown = bank
            .questions
            .iter()
            .map(|q| {
                let selected = session.answer_for(&q.id);
                QuestionOutcome {
                    question_id: q.id.clone(),
                    section: q.section,
                    text: q.text.clone(),
                    tag: match q.section {
                        Section::Grammar => q.area_label().to_string(),
                        Section::Vocabulary => vocab_tag.clone(),
                    },
                    selected_key: selected.map(str::to_string),
                    selected_text: selected
                        .and_then(|key| q.option_text(key))
                        .unwrap_or(NO_ANSWER)
                        .to_string(),
                    correct_key: q.correct_option.clone(),
                    correct_text: q
                        .option_text(&q.correct_option)
                        .unwrap_or_default()
                        .to_string(),
                    is_correct: q.is_correct(selected),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            student_name: session.student_name().to_string(),
            bank: BankSummary {
                id: bank.id.clone(),
                name: bank.name.clone(),
                question_count: bank.len(),
            },
            elapsed_secs: session.elapsed_secs(),
            timer_enabled: session.timer_enabled(),
            time_remaining_secs: session.time_remaining_secs(),
            extensions_used: session.extensions_used(),
            scores,
            vocabulary,
            grammar,
            overall_percentage,
            grammar_areas,
            weak_areas: weak,
            narrative,
            breakdown,
        }
    }

    /// Number of questions answered.
    pub fn answered_count(&self) -> usize {
        self.breakdown
            .iter()
            .filter(|o| o.selected_key.is_some())
            .count()
    }

    /// Student name reduced to a single safe path component: every
    /// character other than an ASCII letter, digit, `-` or `_` becomes `_`.
    pub fn file_stem(&self) -> String {
        let name: String = self
            .student_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if name.is_empty() {
            "student".to_string()
        } else {
            name
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AssessmentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
