//! Assessment error types.
//!
//! Every variant describes a rejected command: the session is left exactly as
//! it was before the call, so callers can surface the message and carry on.

use thiserror::Error;

use crate::session::SessionStatus;

/// Errors raised by the session state machine and the assessment engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    /// A session was started without a student name.
    #[error("a student name is required to start the assessment")]
    InvalidStart,

    /// The command is not accepted in the current status.
    #[error("cannot {action} while the session is {status}")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },

    /// An answer referenced a question id the bank does not contain.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// An answer referenced an option key the question does not offer.
    #[error("question {question_id} has no option '{key}'")]
    UnknownOption { question_id: String, key: String },

    /// All time extensions have already been used.
    #[error("no time extensions left ({used} of {max} used)")]
    ExtensionExhausted { used: u32, max: u32 },

    /// Time extensions only apply to timed sessions.
    #[error("the timer is disabled for this session")]
    TimerDisabled,

    /// The report is only available once the session is finished.
    #[error("the report is only available after submission (session is {0})")]
    ReportUnavailable(SessionStatus),
}

impl AssessmentError {
    /// Returns `true` for rejections caused by bad answer input rather than
    /// by the session lifecycle.
    pub fn is_invalid_answer(&self) -> bool {
        matches!(
            self,
            AssessmentError::UnknownQuestion(_) | AssessmentError::UnknownOption { .. }
        )
    }
}
