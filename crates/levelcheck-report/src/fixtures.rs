use std::collections::BTreeMap;

use levelcheck_core::model::{GrammarArea, Question, QuestionBank, Section};
use levelcheck_core::report::AssessmentReport;
use levelcheck_core::session::Session;

fn question(
    id: &str,
    section: Section,
    text: &str,
    area: Option<GrammarArea>,
    explanation: Option<&str>,
) -> Question {
    let options: BTreeMap<String, String> = [("a", "make"), ("b", "do"), ("c", "<take>")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Question {
        id: id.into(),
        text: text.into(),
        section,
        options,
        correct_option: "a".into(),
        grammar_area: area,
        explanation: explanation.map(str::to_string),
    }
}

/// A finished report: vocabulary 1/2, grammar 1/3, answered in 125 seconds.
pub(crate) fn sample_report() -> AssessmentReport {
    let bank = QuestionBank {
        id: "sample".into(),
        name: "Sample & Co".into(),
        description: String::new(),
        questions: vec![
            question("V1", Section::Vocabulary, "Can you ___ a decision?", None, None),
            question("V2", Section::Vocabulary, "She did her ___ best.", None, None),
            question(
                "G1",
                Section::Grammar,
                "If I ___ you, I'd go.",
                Some(GrammarArea::Conditionals),
                Some("Second conditional uses \"were\"."),
            ),
            question("G2", Section::Grammar, "He ___ swim.", Some(GrammarArea::Modals), None),
            question("G3", Section::Grammar, "I look forward ___ it.", None, None),
        ],
    };

    let mut session = Session::default();
    let lease = session.start("Ada <Lovelace>", true).unwrap();
    for (id, key) in [("V1", "a"), ("V2", "c"), ("G1", "a"), ("G2", "b")] {
        session.record_answer(bank.get(id).unwrap(), key).unwrap();
    }
    for _ in 0..125 {
        session.tick(&lease);
    }
    session.submit().unwrap();

    AssessmentReport::build(&bank, &session)
}
