//! Templated examiner feedback.
//!
//! Pure functions of their inputs; no randomness.

use crate::analysis::WEAK_AREAS_NAMED;
use crate::scoring::ProficiencyLevel;

const DEFAULT_NAME: &str = "student";
const UNDEFINED_LEVEL: &str = "n/a";

fn level_label(level: Option<ProficiencyLevel>) -> &'static str {
    level.map(ProficiencyLevel::as_str).unwrap_or(UNDEFINED_LEVEL)
}

fn opening(overall_percentage: Option<f64>) -> &'static str {
    match overall_percentage {
        Some(p) if p > 90.0 => {
            "Excellent work. You've demonstrated a command of the language that rivals native speakers. "
        }
        Some(p) if p > 75.0 => {
            "Very impressive. You have a solid grasp of complex structures, though minor refinements are possible. "
        }
        Some(p) if p > 50.0 => {
            "A solid effort. You have the foundations, but there are specific gaps we need to address to reach the next level. "
        }
        _ => "We have work to do. The foundation is shaky, but with consistent practice, improvement is inevitable. ",
    }
}

fn vocabulary_remark(level: Option<ProficiencyLevel>) -> &'static str {
    use crate::scoring::ProficiencyLevel::*;
    match level {
        Some(C1 | C2) => {
            "Your lexical resource is sophisticated. You handled abstract concepts and nuance effectively."
        }
        Some(B1 | B2) => {
            "You manage standard communication well, but struggle slightly with lower-frequency academic terms."
        }
        _ => "We need to build your core lexicon. Focus on high-frequency academic word lists first.",
    }
}

fn grammar_remark(weak_areas: &[String]) -> String {
    if weak_areas.is_empty() {
        return "I can find no significant structural weaknesses. Your accuracy is commendable."
            .to_string();
    }

    let named = weak_areas
        .iter()
        .take(WEAK_AREAS_NAMED)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let more = if weak_areas.len() > WEAK_AREAS_NAMED {
        "Among others. "
    } else {
        ""
    };
    format!(
        "Pay close attention to these areas: {named}. {more}Reviewing the rules governing these structures is your next homework."
    )
}

/// Build the feedback message.
///
/// `weak_areas` must already be ordered weakest first; only the first three
/// are named.
pub fn generate(
    student_name: &str,
    overall_percentage: Option<f64>,
    vocabulary_level: Option<ProficiencyLevel>,
    grammar_level: Option<ProficiencyLevel>,
    weak_areas: &[String],
) -> String {
    let name = match student_name.trim() {
        "" => DEFAULT_NAME,
        name => name,
    };

    let mut text = format!("Listen up, {name}. Here is your evaluation. ");
    text.push_str(opening(overall_percentage));

    text.push_str(&format!(
        "\n\nRegarding Vocabulary ({}): ",
        level_label(vocabulary_level)
    ));
    text.push_str(vocabulary_remark(vocabulary_level));

    text.push_str(&format!(
        "\n\nRegarding Grammar ({}): ",
        level_label(grammar_level)
    ));
    text.push_str(&grammar_remark(weak_areas));

    text
}
