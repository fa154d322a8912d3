//! levelcheck-core — Assessment session engine, scoring, and analysis.
//!
//! This crate defines the question bank model, the session state machine,
//! and the scoring, weak-area analysis, and feedback logic that the
//! levelcheck tools build on.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod narrative;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod shuffle;
pub mod ticker;

pub use engine::{Assessment, NoopObserver, SessionObserver};
pub use error::AssessmentError;
pub use session::{Session, SessionStatus, TickLease, TickOutcome};
