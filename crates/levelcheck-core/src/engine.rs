//! Assessment engine.
//!
//! [`Assessment`] owns one question bank and one session and is the only
//! thing that mutates the session. Option layouts are shuffled once per run
//! when the session starts.

use std::sync::Arc;

use rand::Rng;

use crate::analysis::{analyze, weak_areas, GrammarAreaStat};
use crate::config::LevelcheckConfig;
use crate::error::AssessmentError;
use crate::model::{Question, QuestionBank, Section};
use crate::narrative;
use crate::report::AssessmentReport;
use crate::scoring::{score, ScoreCard};
use crate::session::{Session, SessionProgress, SessionStatus, TickLease, TickOutcome};
use crate::shuffle::{OptionEntry, OptionLayout};

/// Hooks for presentation layers that want to follow the session.
pub trait SessionObserver: Send + Sync {
    fn on_start(&self, student_name: &str, timer_enabled: bool);
    fn on_answer(&self, question_id: &str, key: &str);
    fn on_time_exhausted(&self);
    fn on_submit(&self, progress: SessionProgress);
    fn on_restart(&self);
}

/// No-op session observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_start(&self, _: &str, _: bool) {}
    fn on_answer(&self, _: &str, _: &str) {}
    fn on_time_exhausted(&self) {}
    fn on_submit(&self, _: SessionProgress) {}
    fn on_restart(&self) {}
}

/// A question bank paired with the session being taken against it.
pub struct Assessment {
    bank: Arc<QuestionBank>,
    session: Session,
    layout: Option<OptionLayout>,
    observer: Arc<dyn SessionObserver>,
}

impl Assessment {
    /// An assessment with the default time limit.
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self::with_session(bank, Session::default())
    }

    pub fn with_time_limit(bank: Arc<QuestionBank>, time_limit_secs: u32) -> Self {
        Self::with_session(bank, Session::new(time_limit_secs))
    }

    pub fn with_config(bank: Arc<QuestionBank>, config: &LevelcheckConfig) -> Self {
        Self::with_time_limit(bank, config.time_limit_secs)
    }

    fn with_session(bank: Arc<QuestionBank>, session: Session) -> Self {
        Self {
            bank,
            session,
            layout: None,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach an observer.
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Read-only snapshot of the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Questions in presentation order: the vocabulary section, then grammar,
    /// each in bank order.
    pub fn questions(&self) -> Vec<&Question> {
        Section::ALL
            .into_iter()
            .flat_map(|section| self.bank.section(section))
            .collect()
    }

    /// Start a session, shuffling options with the thread-local RNG.
    pub fn start_session(
        &mut self,
        student_name: &str,
        timer_enabled: bool,
    ) -> Result<TickLease, AssessmentError> {
        self.start_session_with_rng(student_name, timer_enabled, &mut rand::rng())
    }

    /// Start a session, shuffling options with the given RNG.
    pub fn start_session_with_rng<R: Rng + ?Sized>(
        &mut self,
        student_name: &str,
        timer_enabled: bool,
        rng: &mut R,
    ) -> Result<TickLease, AssessmentError> {
        let lease = self.session.start(student_name, timer_enabled)?;
        self.layout = Some(OptionLayout::shuffle(&self.bank, rng));
        tracing::info!(
            student = self.session.student_name(),
            bank = %self.bank.id,
            questions = self.bank.len(),
            timer_enabled,
            "assessment started"
        );
        self.observer
            .on_start(self.session.student_name(), timer_enabled);
        Ok(lease)
    }

    /// The shuffled options for a question, once a session has started.
    pub fn options_for(&self, question_id: &str) -> Option<&[OptionEntry]> {
        self.layout.as_ref()?.get(question_id)
    }

    /// Record the answer to a question by id.
    ///
    /// # Errors
    ///
    /// `UnknownQuestion` if the bank has no such question, otherwise whatever
    /// the session rejects.
    pub fn record_answer(&mut self, question_id: &str, key: &str) -> Result<(), AssessmentError> {
        let Some(question) = self.bank.get(question_id) else {
            tracing::warn!(question = question_id, "rejected answer: unknown question");
            return Err(AssessmentError::UnknownQuestion(question_id.to_string()));
        };
        self.session.record_answer(question, key)?;
        self.observer.on_answer(question_id, key);
        Ok(())
    }

    /// Advance the clock by one second.
    pub fn tick(&mut self, lease: &TickLease) -> TickOutcome {
        self.advance_clock(lease, 1)
    }

    /// Advance the clock by `secs` at once, e.g. to replay recorded time.
    pub fn advance_clock(&mut self, lease: &TickLease, secs: u64) -> TickOutcome {
        let was_exhausted = self.session.is_time_exhausted();
        let outcome = self.session.advance(lease, secs);
        if outcome == TickOutcome::TimeExhausted && !was_exhausted {
            tracing::info!(
                student = self.session.student_name(),
                "time exhausted, waiting for submission"
            );
            self.observer.on_time_exhausted();
        }
        outcome
    }

    /// Add one time extension. Returns the new remaining time.
    pub fn extend_time(&mut self) -> Result<u32, AssessmentError> {
        self.session.extend_time()
    }

    pub fn submit(&mut self) -> Result<(), AssessmentError> {
        self.session.submit()?;
        let progress = self.progress();
        tracing::info!(
            student = self.session.student_name(),
            answered = progress.answered,
            total = progress.total,
            elapsed_secs = self.session.elapsed_secs(),
            "assessment submitted"
        );
        self.observer.on_submit(progress);
        Ok(())
    }

    /// Return to a fresh intro state, discarding the run and its layout.
    pub fn restart(&mut self) {
        if self.session.status() == SessionStatus::Intro {
            return;
        }
        self.session.restart();
        self.layout = None;
        self.observer.on_restart();
    }

    pub fn progress(&self) -> SessionProgress {
        self.session.progress(self.bank.len())
    }

    /// Scores for the answers recorded so far.
    pub fn score(&self) -> ScoreCard {
        score(self.session.answers(), &self.bank)
    }

    /// Grammar areas for the answers recorded so far, weakest first.
    pub fn analyze(&self) -> Vec<GrammarAreaStat> {
        analyze(self.session.answers(), &self.bank)
    }

    /// Feedback text for the answers recorded so far.
    pub fn narrative(&self) -> String {
        let card = self.score();
        let weak = weak_areas(&self.analyze());
        narrative::generate(
            self.session.student_name(),
            card.combined().percentage(),
            card.vocabulary.level(),
            card.grammar.level(),
            &weak,
        )
    }

    /// The full report.
    ///
    /// # Errors
    ///
    /// `ReportUnavailable` until the session is finished.
    pub fn report(&self) -> Result<AssessmentReport, AssessmentError> {
        match self.session.status() {
            SessionStatus::Finished => Ok(AssessmentReport::build(&self.bank, &self.session)),
            status => Err(AssessmentError::ReportUnavailable(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::model::GrammarArea;
    use crate::scoring::ProficiencyLevel;

    fn question(id: String, section: Section, area: Option<GrammarArea>) -> Question {
        Question {
            id,
            text: "?".into(),
            section,
            options: [("a", "one"), ("b", "two"), ("c", "three"), ("d", "four")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            correct_option: "a".into(),
            grammar_area: area,
            explanation: None,
        }
    }

    /// 50 vocabulary then 50 grammar questions, areas cycling through all 11.
    fn bank_of_100() -> Arc<QuestionBank> {
        let mut questions: Vec<Question> = (1..=50)
            .map(|i| question(format!("V{i}"), Section::Vocabulary, None))
            .collect();
        questions.extend((1..=50).map(|i| {
            let area = GrammarArea::ALL[i % GrammarArea::ALL.len()];
            question(format!("G{i}"), Section::Grammar, Some(area))
        }));
        Arc::new(QuestionBank {
            id: "full".into(),
            name: "Full".into(),
            description: String::new(),
            questions,
        })
    }

    fn interleaved_bank() -> Arc<QuestionBank> {
        Arc::new(QuestionBank {
            id: "mixed".into(),
            name: "Mixed".into(),
            description: String::new(),
            questions: vec![
                question("G1".into(), Section::Grammar, Some(GrammarArea::Modals)),
                question("V1".into(), Section::Vocabulary, None),
                question("G2".into(), Section::Grammar, Some(GrammarArea::ArticlesQuantifiers)),
                question("V2".into(), Section::Vocabulary, None),
            ],
        })
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl SessionObserver for Recorder {
        fn on_start(&self, student_name: &str, timer_enabled: bool) {
            self.push(format!("start {student_name} {timer_enabled}"));
        }
        fn on_answer(&self, question_id: &str, key: &str) {
            self.push(format!("answer {question_id}={key}"));
        }
        fn on_time_exhausted(&self) {
            self.push("exhausted".into());
        }
        fn on_submit(&self, progress: SessionProgress) {
            self.push(format!("submit {}/{}", progress.answered, progress.total));
        }
        fn on_restart(&self) {
            self.push("restart".into());
        }
    }

    #[test]
    fn restart_after_answering_equals_fresh_session() {
        let mut engine = Assessment::new(bank_of_100());
        let fresh = engine.session().clone();

        engine.start_session("Ada", true).unwrap();
        for i in 1..=10 {
            engine.record_answer(&format!("V{i}"), "a").unwrap();
        }
        engine.submit().unwrap();
        assert_eq!(engine.progress().answered, 10);

        engine.restart();
        assert_eq!(engine.session(), &fresh);
        assert!(engine.options_for("V1").is_none());
        assert!(engine.report().is_err());
    }

    #[test]
    fn layout_is_fixed_for_the_run() {
        let mut engine = Assessment::new(bank_of_100());
        assert!(engine.options_for("V1").is_none());

        let mut rng = StdRng::seed_from_u64(11);
        engine.start_session_with_rng("Ada", false, &mut rng).unwrap();
        let first: Vec<_> = engine.options_for("V1").unwrap().to_vec();
        engine.record_answer("V1", "b").unwrap();
        assert_eq!(engine.options_for("V1").unwrap(), first.as_slice());

        let mut keys: Vec<_> = first.iter().map(|o| o.key.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn seeded_layouts_are_reproducible() {
        let layout = |seed| {
            let mut engine = Assessment::new(bank_of_100());
            let mut rng = StdRng::seed_from_u64(seed);
            engine.start_session_with_rng("Ada", false, &mut rng).unwrap();
            engine.options_for("G7").unwrap().to_vec()
        };
        assert_eq!(layout(3), layout(3));
    }

    #[test]
    fn unknown_question_is_rejected_without_a_write() {
        let mut engine = Assessment::new(bank_of_100());
        engine.start_session("Ada", false).unwrap();
        let err = engine.record_answer("X99", "a").unwrap_err();
        assert_eq!(err, AssessmentError::UnknownQuestion("X99".into()));
        assert!(err.is_invalid_answer());
        assert!(engine.session().answers().is_empty());
    }

    #[test]
    fn failed_start_leaves_no_layout() {
        let mut engine = Assessment::new(bank_of_100());
        assert_eq!(engine.start_session(" ", false).unwrap_err(), AssessmentError::InvalidStart);
        assert!(engine.options_for("V1").is_none());
        assert_eq!(engine.status(), SessionStatus::Intro);
    }

    #[test]
    fn questions_are_grouped_by_section() {
        let engine = Assessment::new(interleaved_bank());
        let order: Vec<_> = engine.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(order, vec!["V1", "V2", "G1", "G2"]);
    }

    #[test]
    fn report_only_after_submit() {
        let mut engine = Assessment::new(interleaved_bank());
        assert_eq!(
            engine.report().unwrap_err(),
            AssessmentError::ReportUnavailable(SessionStatus::Intro)
        );

        engine.start_session("Ada", false).unwrap();
        engine.record_answer("V1", "a").unwrap();
        engine.record_answer("G1", "a").unwrap();
        engine.record_answer("G2", "c").unwrap();
        assert_eq!(
            engine.report().unwrap_err(),
            AssessmentError::ReportUnavailable(SessionStatus::Active)
        );

        engine.submit().unwrap();
        let report = engine.report().unwrap();
        assert_eq!(report.student_name, "Ada");
        assert_eq!(report.vocabulary.level, Some(ProficiencyLevel::B1));
        assert_eq!(report.overall_percentage, Some(50.0));
        assert_eq!(report.weak_areas, vec!["Articles & Quantifiers"]);
        assert_eq!(report.narrative, engine.narrative());
    }

    #[test]
    fn live_scoring_tracks_answers() {
        let mut engine = Assessment::new(interleaved_bank());
        engine.start_session("Ada", false).unwrap();
        assert_eq!(engine.score().vocabulary.correct, 0);
        engine.record_answer("V2", "a").unwrap();
        assert_eq!(engine.score().vocabulary.correct, 1);
        assert_eq!(engine.analyze().len(), 2);
        assert_eq!(engine.score().grammar.total, 2);
    }

    #[test]
    fn observer_sees_the_lifecycle() {
        let recorder = Arc::new(Recorder::default());
        let mut engine = Assessment::with_time_limit(interleaved_bank(), 2)
            .with_observer(recorder.clone());

        let lease = engine.start_session("Ada", true).unwrap();
        engine.record_answer("V1", "b").unwrap();
        assert!(engine.record_answer("V1", "z").is_err());
        for _ in 0..4 {
            engine.tick(&lease);
        }
        engine.submit().unwrap();
        engine.restart();
        engine.restart();

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["start Ada true", "answer V1=b", "exhausted", "submit 1/4", "restart"]
        );
    }

    #[test]
    fn config_sets_time_limit() {
        let config = LevelcheckConfig {
            time_limit_secs: 90,
            ..LevelcheckConfig::default()
        };
        let mut engine = Assessment::with_config(interleaved_bank(), &config);
        engine.start_session("Ada", true).unwrap();
        assert_eq!(engine.session().time_remaining_secs(), 90);
        assert_eq!(engine.extend_time().unwrap(), 690);
    }
}
