//! Grammar weak-area analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{QuestionBank, Section};

/// Areas scoring below this percentage are weak.
pub const WEAK_AREA_THRESHOLD: f64 = 60.0;

/// How many weak areas the feedback names before truncating.
pub const WEAK_AREAS_NAMED: usize = 3;

/// Correctness for one grammar area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarAreaStat {
    /// Normalized area label.
    pub area: String,
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
}

impl GrammarAreaStat {
    pub fn is_weak(&self) -> bool {
        self.percentage < WEAK_AREA_THRESHOLD
    }
}

/// Per-area correctness over the grammar section, weakest first.
///
/// Areas are grouped by their normalized label. Ties keep the order in
/// which the areas first appear in the bank.
pub fn analyze(answers: &BTreeMap<String, String>, bank: &QuestionBank) -> Vec<GrammarAreaStat> {
    let mut stats: Vec<GrammarAreaStat> = Vec::new();

    for q in bank.section(Section::Grammar) {
        let label = q.area_label();
        let idx = match stats.iter().position(|s| s.area == label) {
            Some(idx) => idx,
            None => {
                stats.push(GrammarAreaStat {
                    area: label.to_string(),
                    correct: 0,
                    total: 0,
                    percentage: 0.0,
                });
                stats.len() - 1
            }
        };
        let stat = &mut stats[idx];
        stat.total += 1;
        if q.is_correct(answers.get(&q.id).map(String::as_str)) {
            stat.correct += 1;
        }
    }

    for stat in &mut stats {
        stat.percentage = stat.correct as f64 / stat.total as f64 * 100.0;
    }

    // `sort_by` is stable, which keeps first-seen order for ties.
    stats.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));
    stats
}

/// Labels of the weak areas, weakest first.
pub fn weak_areas(stats: &[GrammarAreaStat]) -> Vec<String> {
    stats
        .iter()
        .filter(|s| s.is_weak())
        .map(|s| s.area.clone())
        .collect()
}
