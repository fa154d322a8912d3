//! Session state machine.
//!
//! A session moves `intro → active → finished` and back to `intro` only via
//! [`Session::restart`]. Time is advanced by [`Session::tick`], which requires
//! the [`TickLease`] handed out by [`Session::start`]; leaving the active
//! state invalidates that lease, so ticks from an earlier run are inert.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;
use crate::model::Question;

/// Default time limit: 50 minutes.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 3000;

/// Seconds added by one time extension.
pub const EXTENSION_SECS: u32 = 600;

/// Maximum number of extensions per session.
pub const MAX_EXTENSIONS: u32 = 3;

/// Remaining time below which a timed session is flagged as critical.
pub const TIME_CRITICAL_SECS: u32 = 300;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Intro,
    Active,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Intro => write!(f, "intro"),
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Finished => write!(f, "finished"),
        }
    }
}

/// The right to advance one run's clock.
///
/// Only [`Session::start`] creates a lease, and it cannot be cloned, so each
/// active run has exactly one tick source.
#[derive(Debug)]
pub struct TickLease {
    epoch: u64,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Elapsed time advanced. `remaining_secs` is `None` for untimed sessions.
    Counted { remaining_secs: Option<u32> },
    /// Elapsed time advanced and the countdown is at zero.
    TimeExhausted,
    /// The session is not active or the lease belongs to an earlier run.
    Ignored,
}

/// Aggregated view of answer progress, useful for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
}

impl SessionProgress {
    /// Share of questions answered, 0–100.
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.answered as f64 / self.total as f64 * 100.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// A single assessment attempt.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    status: SessionStatus,
    timer_enabled: bool,
    time_remaining_secs: u32,
    extensions_used: u32,
    answers: BTreeMap<String, String>,
    student_name: String,
    elapsed_secs: u64,
    #[serde(skip)]
    time_limit_secs: u32,
    #[serde(skip)]
    epoch: u64,
}

/// The run epoch only exists to retire tick leases and is not part of the
/// observable session state.
impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.timer_enabled == other.timer_enabled
            && self.time_remaining_secs == other.time_remaining_secs
            && self.extensions_used == other.extensions_used
            && self.answers == other.answers
            && self.student_name == other.student_name
            && self.elapsed_secs == other.elapsed_secs
            && self.time_limit_secs == other.time_limit_secs
    }
}

impl Eq for Session {}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_LIMIT_SECS)
    }
}

impl Session {
    /// A fresh session in the intro state.
    pub fn new(time_limit_secs: u32) -> Self {
        Self {
            status: SessionStatus::Intro,
            timer_enabled: false,
            time_remaining_secs: time_limit_secs,
            extensions_used: 0,
            answers: BTreeMap::new(),
            student_name: String::new(),
            elapsed_secs: 0,
            time_limit_secs,
            epoch: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn timer_enabled(&self) -> bool {
        self.timer_enabled
    }

    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining_secs
    }

    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    pub fn extensions_used(&self) -> u32 {
        self.extensions_used
    }

    /// Extensions that can still be requested.
    pub fn extensions_left(&self) -> u32 {
        MAX_EXTENSIONS.saturating_sub(self.extensions_used)
    }

    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    /// The recorded option key for a question, if answered.
    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// True when a timed session has run its countdown to zero.
    pub fn is_time_exhausted(&self) -> bool {
        self.timer_enabled && self.time_remaining_secs == 0
    }

    /// True when a timed session has less than five minutes left.
    pub fn is_time_critical(&self) -> bool {
        self.timer_enabled && self.time_remaining_secs < TIME_CRITICAL_SECS
    }

    /// Answer progress against a bank of `total` questions.
    pub fn progress(&self, total: usize) -> SessionProgress {
        let answered = self.answers.len().min(total);
        SessionProgress {
            total,
            answered,
            remaining: total - answered,
        }
    }

    fn require(&self, status: SessionStatus, action: &'static str) -> Result<(), AssessmentError> {
        if self.status == status {
            Ok(())
        } else {
            tracing::warn!("rejected {action}: session is {}", self.status);
            Err(AssessmentError::InvalidTransition {
                action,
                status: self.status,
            })
        }
    }

    /// Begin the assessment.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the session is in intro, `InvalidStart` if
    /// the trimmed name is empty. Neither changes the session.
    pub fn start(&mut self, student_name: &str, timer_enabled: bool) -> Result<TickLease, AssessmentError> {
        self.require(SessionStatus::Intro, "start")?;
        let name = student_name.trim();
        if name.is_empty() {
            tracing::warn!("rejected start: empty student name");
            return Err(AssessmentError::InvalidStart);
        }

        let epoch = self.epoch + 1;
        *self = Self {
            status: SessionStatus::Active,
            timer_enabled,
            student_name: name.to_string(),
            epoch,
            ..Self::new(self.time_limit_secs)
        };
        tracing::debug!(timer_enabled, epoch, "session started");
        Ok(TickLease { epoch })
    }

    /// Record (or overwrite) the answer to `question`.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless active, `UnknownOption` if `key` is not one
    /// of the question's options.
    pub fn record_answer(&mut self, question: &Question, key: &str) -> Result<(), AssessmentError> {
        self.require(SessionStatus::Active, "record an answer")?;
        if !question.options.contains_key(key) {
            tracing::warn!(question = %question.id, key, "rejected answer: unknown option");
            return Err(AssessmentError::UnknownOption {
                question_id: question.id.clone(),
                key: key.to_string(),
            });
        }
        self.answers.insert(question.id.clone(), key.to_string());
        tracing::debug!(question = %question.id, key, "answer recorded");
        Ok(())
    }

    /// Advance the clock by one second.
    pub fn tick(&mut self, lease: &TickLease) -> TickOutcome {
        self.advance(lease, 1)
    }

    /// Advance the clock by `secs` in one step, with the same outcome as
    /// that many consecutive ticks.
    pub fn advance(&mut self, lease: &TickLease, secs: u64) -> TickOutcome {
        if self.status != SessionStatus::Active || lease.epoch != self.epoch {
            return TickOutcome::Ignored;
        }

        self.elapsed_secs = self.elapsed_secs.saturating_add(secs);
        if !self.timer_enabled {
            return TickOutcome::Counted {
                remaining_secs: None,
            };
        }

        let secs = u32::try_from(secs).unwrap_or(u32::MAX);
        self.time_remaining_secs = self.time_remaining_secs.saturating_sub(secs);
        if self.time_remaining_secs == 0 {
            TickOutcome::TimeExhausted
        } else {
            TickOutcome::Counted {
                remaining_secs: Some(self.time_remaining_secs),
            }
        }
    }

    /// Add one ten-minute block to the remaining time.
    ///
    /// Returns the new remaining time.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless active, `TimerDisabled` for untimed
    /// sessions, `ExtensionExhausted` once all extensions are used. None of
    /// them changes the session.
    pub fn extend_time(&mut self) -> Result<u32, AssessmentError> {
        self.require(SessionStatus::Active, "extend time")?;
        if !self.timer_enabled {
            return Err(AssessmentError::TimerDisabled);
        }
        if self.extensions_used >= MAX_EXTENSIONS {
            tracing::warn!("rejected extension: all {MAX_EXTENSIONS} used");
            return Err(AssessmentError::ExtensionExhausted {
                used: self.extensions_used,
                max: MAX_EXTENSIONS,
            });
        }
        self.time_remaining_secs += EXTENSION_SECS;
        self.extensions_used += 1;
        tracing::debug!(
            remaining = self.time_remaining_secs,
            used = self.extensions_used,
            "time extended"
        );
        Ok(self.time_remaining_secs)
    }

    /// Finish the run. The answers are frozen from here on.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless active.
    pub fn submit(&mut self) -> Result<(), AssessmentError> {
        self.require(SessionStatus::Active, "submit")?;
        self.status = SessionStatus::Finished;
        self.epoch += 1;
        tracing::debug!(answered = self.answers.len(), "session submitted");
        Ok(())
    }

    /// Discard the run and return to a fresh intro state.
    ///
    /// Accepted from active (abandon) and finished; a no-op in intro.
    pub fn restart(&mut self) {
        if self.status == SessionStatus::Intro {
            return;
        }
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            ..Self::new(self.time_limit_secs)
        };
        tracing::debug!("session reset");
    }
}

/// Format seconds as `mm:ss`.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
