//! Section scoring and proficiency levels.
//!
//! Levels follow approximate CEFR bands over the percentage score; each level
//! also carries an informational IELTS-style band.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{QuestionBank, Section};

/// Band returned for a level label that is not recognised.
pub const UNKNOWN_BAND: &str = "0";

/// Correct answers out of the section's question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionScore {
    pub correct: usize,
    pub total: usize,
}

impl SectionScore {
    /// Percentage correct, or `None` when the section has no questions.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64 * 100.0)
        }
    }

    /// Proficiency level, or `None` when the percentage is undefined.
    pub fn level(&self) -> Option<ProficiencyLevel> {
        self.percentage().map(ProficiencyLevel::from_percentage)
    }
}

/// Scores for both sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreCard {
    pub vocabulary: SectionScore,
    pub grammar: SectionScore,
}

impl ScoreCard {
    pub fn section(&self, section: Section) -> SectionScore {
        match section {
            Section::Vocabulary => self.vocabulary,
            Section::Grammar => self.grammar,
        }
    }

    /// Both sections pooled into one score.
    pub fn combined(&self) -> SectionScore {
        SectionScore {
            correct: self.vocabulary.correct + self.grammar.correct,
            total: self.vocabulary.total + self.grammar.total,
        }
    }
}

/// Score the recorded answers against the bank.
///
/// Unanswered questions count as incorrect; totals always come from the bank.
pub fn score(answers: &BTreeMap<String, String>, bank: &QuestionBank) -> ScoreCard {
    let mut card = ScoreCard::default();
    for q in &bank.questions {
        let slot = match q.section {
            Section::Vocabulary => &mut card.vocabulary,
            Section::Grammar => &mut card.grammar,
        };
        slot.total += 1;
        if q.is_correct(answers.get(&q.id).map(String::as_str)) {
            slot.correct += 1;
        }
    }
    card
}

/// Six ordered proficiency bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProficiencyLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl ProficiencyLevel {
    pub const ALL: [ProficiencyLevel; 6] = [
        ProficiencyLevel::A1,
        ProficiencyLevel::A2,
        ProficiencyLevel::B1,
        ProficiencyLevel::B2,
        ProficiencyLevel::C1,
        ProficiencyLevel::C2,
    ];

    /// Map a percentage onto a level. Lower bounds are inclusive.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage.is_nan() || percentage < 20.0 {
            ProficiencyLevel::A1
        } else if percentage < 40.0 {
            ProficiencyLevel::A2
        } else if percentage < 60.0 {
            ProficiencyLevel::B1
        } else if percentage < 80.0 {
            ProficiencyLevel::B2
        } else if percentage < 90.0 {
            ProficiencyLevel::C1
        } else {
            ProficiencyLevel::C2
        }
    }

    /// Informational IELTS-style band for this level.
    pub fn external_band(self) -> &'static str {
        match self {
            ProficiencyLevel::A1 => "2.0 - 2.5",
            ProficiencyLevel::A2 => "3.0 - 3.5",
            ProficiencyLevel::B1 => "4.0 - 5.0",
            ProficiencyLevel::B2 => "5.5 - 6.5",
            ProficiencyLevel::C1 => "7.0 - 8.0",
            ProficiencyLevel::C2 => "8.5 - 9.0",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProficiencyLevel::A1 => "A1",
            ProficiencyLevel::A2 => "A2",
            ProficiencyLevel::B1 => "B1",
            ProficiencyLevel::B2 => "B2",
            ProficiencyLevel::C1 => "C1",
            ProficiencyLevel::C2 => "C2",
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProficiencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProficiencyLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown proficiency level: {s}"))
    }
}

/// External band for a level given by label, e.g. from a saved report.
///
/// Unrecognised labels map to [`UNKNOWN_BAND`].
pub fn external_band_for(label: &str) -> &'static str {
    label
        .parse::<ProficiencyLevel>()
        .map(ProficiencyLevel::external_band)
        .unwrap_or(UNKNOWN_BAND)
}
