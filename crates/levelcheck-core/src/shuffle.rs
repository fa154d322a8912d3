//! Session-scoped answer option shuffling.
//!
//! Each question's options are permuted once when a session starts and the
//! resulting order is held for the rest of the session, so answer positions
//! never move between renders.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::model::{Question, QuestionBank};

/// One displayed option: the key recorded as the answer and its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OptionEntry {
    pub key: String,
    pub text: String,
}

/// Return a uniformly random permutation of a question's options.
///
/// A question without options yields an empty vector.
pub fn shuffle_options<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<OptionEntry> {
    let mut entries: Vec<OptionEntry> = question
        .options
        .iter()
        .map(|(key, text)| OptionEntry {
            key: key.clone(),
            text: text.clone(),
        })
        .collect();
    entries.shuffle(rng);
    entries
}

/// Shuffled option order for every question of a bank, keyed by question id.
#[derive(Debug, Clone, Default)]
pub struct OptionLayout {
    by_question: HashMap<String, Vec<OptionEntry>>,
}

impl OptionLayout {
    /// Shuffle the options of every question in `bank` exactly once.
    pub fn shuffle<R: Rng + ?Sized>(bank: &QuestionBank, rng: &mut R) -> Self {
        let by_question = bank
            .questions
            .iter()
            .map(|q| (q.id.clone(), shuffle_options(q, rng)))
            .collect();
        Self { by_question }
    }

    /// The cached option order for a question.
    pub fn get(&self, question_id: &str) -> Option<&[OptionEntry]> {
        self.by_question.get(question_id).map(Vec::as_slice)
    }

    /// Number of questions in the layout.
    pub fn len(&self) -> usize {
        self.by_question.len()
    }

    /// Returns true when no question has been laid out.
    pub fn is_empty(&self) -> bool {
        self.by_question.is_empty()
    }
}
