//! Core data model types for levelcheck.
//!
//! These are the immutable inputs the engine queries: questions, the two
//! test sections, grammar sub-topics, and the question bank that holds them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Label used when a grammar question carries no area tag.
pub const UNKNOWN_AREA_LABEL: &str = "Unknown Area";

/// Display label for the legacy tense tag.
pub const LEGACY_TENSES_LABEL: &str = "Verb Tenses";

/// The two sections of the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Vocabulary,
    Grammar,
}

impl Section {
    /// Both sections in the order they are administered.
    pub const ALL: [Section; 2] = [Section::Vocabulary, Section::Grammar];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Vocabulary => write!(f, "Vocabulary"),
            Section::Grammar => write!(f, "Grammar"),
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vocabulary" | "vocab" => Ok(Section::Vocabulary),
            "grammar" => Ok(Section::Grammar),
            other => Err(format!("unknown section: {other}")),
        }
    }
}

/// Grammar sub-topics used to group grammar questions for weak-area analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarArea {
    Tenses,
    ArticlesQuantifiers,
    AdjectivesAdverbs,
    Prepositions,
    Modals,
    GerundsInfinitives,
    Conditionals,
    RelativeClauses,
    PassiveVoice,
    Connectors,
    WordFormation,
    /// Tag written by banks that predate the tense topic rename.
    /// Displays and groups as "Verb Tenses".
    TensesFuture,
}

impl GrammarArea {
    /// The eleven current sub-topics.
    pub const ALL: [GrammarArea; 11] = [
        GrammarArea::Tenses,
        GrammarArea::ArticlesQuantifiers,
        GrammarArea::AdjectivesAdverbs,
        GrammarArea::Prepositions,
        GrammarArea::Modals,
        GrammarArea::GerundsInfinitives,
        GrammarArea::Conditionals,
        GrammarArea::RelativeClauses,
        GrammarArea::PassiveVoice,
        GrammarArea::Connectors,
        GrammarArea::WordFormation,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            GrammarArea::Tenses => "Tenses & Future Forms",
            GrammarArea::ArticlesQuantifiers => "Articles & Quantifiers",
            GrammarArea::AdjectivesAdverbs => "Adjectives & Adverbs",
            GrammarArea::Prepositions => "Prepositions",
            GrammarArea::Modals => "Modals",
            GrammarArea::GerundsInfinitives => "Gerunds & Infinitives",
            GrammarArea::Conditionals => "Conditionals & Wishes",
            GrammarArea::RelativeClauses => "Relative Clauses",
            GrammarArea::PassiveVoice => "Passive Voice",
            GrammarArea::Connectors => "Connectors & Discourse",
            GrammarArea::WordFormation => "Word Formation",
            GrammarArea::TensesFuture => LEGACY_TENSES_LABEL,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            GrammarArea::Tenses => "tenses",
            GrammarArea::ArticlesQuantifiers => "articles_quantifiers",
            GrammarArea::AdjectivesAdverbs => "adjectives_adverbs",
            GrammarArea::Prepositions => "prepositions",
            GrammarArea::Modals => "modals",
            GrammarArea::GerundsInfinitives => "gerunds_infinitives",
            GrammarArea::Conditionals => "conditionals",
            GrammarArea::RelativeClauses => "relative_clauses",
            GrammarArea::PassiveVoice => "passive_voice",
            GrammarArea::Connectors => "connectors",
            GrammarArea::WordFormation => "word_formation",
            GrammarArea::TensesFuture => "tenses_future",
        }
    }
}

impl fmt::Display for GrammarArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GrammarArea {
    type Err = String;

    /// Accepts either the snake_case tag or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        GrammarArea::ALL
            .iter()
            .chain(std::iter::once(&GrammarArea::TensesFuture))
            .copied()
            .find(|area| {
                area.tag().eq_ignore_ascii_case(wanted) || area.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| format!("unknown grammar area: {wanted}"))
    }
}

/// Normalize an optional grammar area into the label used for display and
/// grouping. Every place that shows or groups by area goes through here.
pub fn area_label(area: Option<GrammarArea>) -> &'static str {
    match area {
        None => UNKNOWN_AREA_LABEL,
        Some(area) => area.label(),
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier, also the stable ordering key.
    pub id: String,
    /// The question prompt.
    pub text: String,
    /// Which section the question belongs to.
    pub section: Section,
    /// Option key to option text.
    pub options: BTreeMap<String, String>,
    /// Key of the correct option. Always present in `options`.
    pub correct_option: String,
    /// Grammar sub-topic (grammar questions only).
    #[serde(default)]
    pub grammar_area: Option<GrammarArea>,
    /// Optional explanation shown in the report.
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// Whether `key` selects the correct option.
    pub fn is_correct(&self, key: Option<&str>) -> bool {
        key == Some(self.correct_option.as_str())
    }

    /// Display text for an option key, if the key exists.
    pub fn option_text(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Normalized grammar area label for this question.
    pub fn area_label(&self) -> &'static str {
        area_label(self.grammar_area)
    }
}

/// An ordered, immutable collection of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this bank.
    #[serde(default)]
    pub description: String,
    /// Questions in administration order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// Look up a question by id.
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions belonging to `section`, in bank order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.section == section)
    }

    /// Number of questions in `section`.
    pub fn section_total(&self, section: Section) -> usize {
        self.section(section).count()
    }

    /// Total number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when the bank holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
